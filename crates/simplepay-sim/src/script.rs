//! Scripted checkout sessions.
//!
//! A script is a JSON document with the page's device profile and a list
//! of steps, each tagged by `action`:
//!
//! ```json
//! {
//!   "mobile": true,
//!   "viewport": { "width": 390, "height": 844 },
//!   "steps": [
//!     { "action": "pay", "url": "https://checkout.example/pay/1" },
//!     { "action": "advance", "ms": 500 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use simplepay_checkout::PointerInput;
use simplepay_common::{SimplePayError, Viewport};

const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 800.0,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Pay {
        url: String,
    },
    ContentLoaded,
    /// Message posted by the embedded checkout document.
    Message {
        data: Value,
    },
    Resize {
        width: f64,
        height: f64,
    },
    DragStart {
        y: f64,
        #[serde(default)]
        touch: bool,
    },
    DragMove {
        y: f64,
        #[serde(default)]
        touch: bool,
    },
    DragEnd,
    Close,
    AskToClose,
    /// The host installs its channel and signals readiness.
    InstallChannel,
    /// The native side invokes `closeApp`.
    NativeClose,
    CallNative {
        name: String,
        #[serde(default)]
        payload: Value,
    },
    /// Move the clock forward, running scheduled steps on the way.
    Advance {
        ms: u64,
    },
}

impl Step {
    pub fn pointer(y: f64, touch: bool) -> PointerInput {
        if touch {
            PointerInput::Touch { touches: vec![y] }
        } else {
            PointerInput::Mouse { page_y: y }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub mobile: bool,
    pub viewport: Option<Viewport>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, SimplePayError> {
        let script: Script =
            serde_json::from_str(text).map_err(|e| SimplePayError::Script(e.to_string()))?;
        if script.steps.is_empty() {
            return Err(SimplePayError::Script("script has no steps".into()));
        }
        Ok(script)
    }

    pub fn from_path(path: &Path) -> Result<Self, SimplePayError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// A full session on a phone: queued native call, pay, load, success,
    /// a short drag and a native close.
    pub fn demo() -> Self {
        let steps = vec![
            Step::CallNative {
                name: "getDeviceInfo".into(),
                payload: Value::Null,
            },
            Step::InstallChannel,
            Step::Pay {
                url: "https://checkout.simplepay.example/pay/SP-1042".into(),
            },
            Step::Advance { ms: 16 },
            Step::ContentLoaded,
            Step::Advance { ms: 800 },
            Step::Message {
                data: serde_json::json!({
                    "type": "SUCCESS",
                    "status": "success",
                    "reference": "SP-1042"
                }),
            },
            Step::DragStart {
                y: 200.0,
                touch: true,
            },
            Step::DragMove {
                y: 260.0,
                touch: true,
            },
            Step::DragEnd,
            Step::NativeClose,
            Step::Advance { ms: 400 },
        ];
        Self {
            mobile: true,
            viewport: Some(Viewport {
                width: 390.0,
                height: 844.0,
            }),
            steps,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.unwrap_or(DEFAULT_VIEWPORT)
    }
}
