//! Drives a [`SimplePay`] instance through a script on a virtual clock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use simplepay_bridge::READY_EVENT;
use simplepay_checkout::{CheckoutHost, LoaderState, PayOptions, SimplePay, CLOSE_APP_HANDLER};
use simplepay_common::{EnvironmentProbe, HostFamily, ModalState, Viewport};
use simplepay_config::CheckoutConfig;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::host::SimHost;
use crate::script::{Script, Step};

struct NativeCall {
    name: String,
    task: JoinHandle<()>,
}

pub struct Runner {
    host: Arc<SimHost>,
    sdk: SimplePay,
    calls: Vec<NativeCall>,
    last_state: ModalState,
    last_loader: LoaderState,
}

impl Runner {
    pub fn new(host: Arc<SimHost>, config: CheckoutConfig) -> Self {
        let sdk = SimplePay::new(Arc::clone(&host), config);
        let view = sdk.view();
        host.record(format!(
            "checkout ready ({:?} layout, bridge {:?})",
            view.layout,
            sdk.bridge().readiness()
        ));
        Self {
            host,
            last_state: sdk.state(),
            last_loader: view.loader,
            sdk,
            calls: Vec::new(),
        }
    }

    /// Run every step, then report native calls that never settled.
    pub async fn run(mut self, script: &Script) -> Vec<String> {
        for step in &script.steps {
            debug!(?step, "running step");
            self.step(step);
            tokio::task::yield_now().await;
            self.observe();
        }

        for call in self.calls.drain(..) {
            if !call.task.is_finished() {
                self.host
                    .record(format!("native call {} still pending", call.name));
                call.task.abort();
            }
        }
        self.host.timeline()
    }

    fn step(&mut self, step: &Step) {
        match step {
            Step::Pay { url } => {
                self.host.record(format!("pay {url}"));
                let on_success = Arc::clone(&self.host);
                let on_close = Arc::clone(&self.host);
                let options = PayOptions::new()
                    .on_success(move |data| on_success.record(format!("on_success {data}")))
                    .on_close(move || on_close.record("on_close"));
                self.sdk.pay(url, options);
            }
            Step::ContentLoaded => {
                self.host.record("content loaded");
                self.sdk.content_loaded();
            }
            Step::Message { data } => {
                self.host.record(format!("message {data}"));
                self.sdk.handle_message(data);
            }
            Step::Resize { width, height } => {
                self.host.record(format!("resize {width}x{height}"));
                self.host.set_viewport(Viewport {
                    width: *width,
                    height: *height,
                });
                self.sdk.resize();
                self.host
                    .record(format!("layout {:?}", self.sdk.view().layout));
            }
            Step::DragStart { y, touch } => {
                let armed = self.sdk.drag_start(&Step::pointer(*y, *touch));
                self.host.record(format!("drag start at {y} (armed: {armed})"));
            }
            Step::DragMove { y, touch } => {
                self.sdk.drag_move(&Step::pointer(*y, *touch));
                self.host
                    .record(format!("drag to {y}, offset {}", self.sdk.view().drag_offset()));
            }
            Step::DragEnd => {
                // Recorded before release: a dismissing drag prompts.
                self.host.record("drag end");
                if let Some(outcome) = self.sdk.drag_end() {
                    self.host.record(format!("drag outcome {outcome:?}"));
                }
            }
            Step::Close => {
                self.host.record("close");
                self.sdk.close();
            }
            Step::AskToClose => {
                self.host.record("ask to close");
                self.sdk.ask_to_close();
            }
            Step::InstallChannel => {
                let channel = self.host.install_channel();
                match self.host.host_family() {
                    HostFamily::Android => self.host.record(format!("native fires {READY_EVENT}")),
                    _ => self.host.record("native channel installed"),
                }
                self.sdk.notify_bridge_ready();
                self.host.record(format!(
                    "native handlers [{}]",
                    channel.handler_names().join(", ")
                ));
            }
            Step::NativeClose => {
                let answer = self
                    .host
                    .sim_channel()
                    .and_then(|channel| channel.invoke(CLOSE_APP_HANDLER, Value::Null));
                match answer {
                    Some(answer) => self.host.record(format!("native {CLOSE_APP_HANDLER} -> {answer}")),
                    None => self.host.record(format!("native {CLOSE_APP_HANDLER} not available")),
                }
            }
            Step::CallNative { name, payload } => self.call_native(name, payload.clone()),
            Step::Advance { ms } => self.advance(Duration::from_millis(*ms)),
        }
    }

    fn call_native(&mut self, name: &str, payload: Value) {
        let call = self.sdk.call_native(name, payload);
        self.host
            .record(format!("native call {name} (id {})", call.id()));
        let host = Arc::clone(&self.host);
        let handler = name.to_string();
        let task = tokio::spawn(async move {
            match call.await {
                Ok(response) => host.record(format!("native {handler} -> {response}")),
                Err(e) => host.record(format!("native {handler} failed: {e}")),
            }
        });
        self.calls.push(NativeCall {
            name: name.to_string(),
            task,
        });
    }

    /// Move the clock forward, stopping at every scheduled step.
    fn advance(&mut self, by: Duration) {
        let target = self.host.now() + by;
        while let Some(due) = self.sdk.next_wakeup() {
            if due > target {
                break;
            }
            self.host.set_now(due);
            self.sdk.poll_at(due);
            self.observe();
        }
        self.host.set_now(target);
    }

    fn observe(&mut self) {
        let state = self.sdk.state();
        if state != self.last_state {
            self.host
                .record(format!("state {} -> {state}", self.last_state));
            self.last_state = state;
        }
        let loader = self.sdk.view().loader;
        if loader != self.last_loader {
            self.host.record(format!("loader {loader:?}"));
            self.last_loader = loader;
        }
    }
}
