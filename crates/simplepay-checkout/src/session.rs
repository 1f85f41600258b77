//! The checkout session opened by `pay` and its callbacks.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use simplepay_common::SessionId;

/// Called with the full success message from the embedded content.
pub type SuccessCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Called once the overlay has finished closing.
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks supplied to `pay`.
#[derive(Clone, Default)]
pub struct PayOptions {
    pub on_success: Option<SuccessCallback>,
    pub on_close: Option<CloseCallback>,
}

impl PayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for PayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayOptions")
            .field("on_success", &self.on_success.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// One `pay` call, alive until its close settles.
#[derive(Debug, Clone)]
pub struct ModalSession {
    pub id: SessionId,
    pub content_url: String,
    pub options: PayOptions,
}

impl ModalSession {
    pub fn new(content_url: impl Into<String>, options: PayOptions) -> Self {
        Self {
            id: SessionId::new(),
            content_url: content_url.into(),
            options,
        }
    }
}
