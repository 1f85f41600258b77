//! Host-side capabilities the bridge is built on.

use std::sync::Arc;

use serde_json::Value;
use simplepay_common::{BridgeError, EnvironmentProbe};

/// Single-use answer callback for one invocation.
pub type Responder = Box<dyn FnOnce(Value) + Send>;

/// Handler installed into the native channel. Receives the raw payload.
pub type NativeHandler = Arc<dyn Fn(Value, Responder) + Send + Sync>;

/// The channel object a hybrid host installs into the page.
pub trait NativeChannel: Send + Sync {
    /// Install `handler` under `name`, replacing any previous one.
    fn register_handler(&self, name: &str, handler: NativeHandler);

    /// Send a request to the native handler `name`. `on_response` is
    /// invoked when (and if) the native side answers. An `Err` means the
    /// call surface itself failed and nothing was sent.
    fn call_handler(
        &self,
        name: &str,
        payload: Value,
        on_response: Responder,
    ) -> Result<(), BridgeError>;
}

/// Environment as seen by the bridge.
pub trait BridgeHost: EnvironmentProbe {
    /// The installed channel, if the host has provided one yet.
    fn channel(&self) -> Option<Arc<dyn NativeChannel>>;

    /// Start an invisible navigation to `probe_url`. Generic-webview hosts
    /// intercept it and respond by installing their channel.
    fn request_channel(&self, probe_url: &str);
}
