//! In-process host page with a virtual clock and a scripted native side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use simplepay_bridge::{codec, BridgeHost, NativeChannel, NativeHandler, Responder};
use simplepay_checkout::CheckoutHost;
use simplepay_common::{BridgeError, EnvironmentProbe, HostFamily, Viewport};
use tracing::info;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Native channel that echoes every call back.
#[derive(Default)]
pub struct SimChannel {
    handlers: Mutex<HashMap<String, NativeHandler>>,
}

impl SimChannel {
    /// Invoke a page handler as the native side. Returns its answer, if it
    /// answered synchronously.
    pub fn invoke(&self, name: &str, payload: Value) -> Option<Value> {
        let handler = lock(&self.handlers).get(name).cloned()?;
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        handler(
            payload,
            Box::new(move |answer: Value| {
                *lock(&sink) = Some(answer);
            }),
        );
        let answer = lock(&slot).take();
        answer
    }

    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.handlers).keys().cloned().collect();
        names.sort();
        names
    }
}

impl NativeChannel for SimChannel {
    fn register_handler(&self, name: &str, handler: NativeHandler) {
        lock(&self.handlers).insert(name.to_string(), handler);
    }

    fn call_handler(
        &self,
        name: &str,
        payload: Value,
        on_response: Responder,
    ) -> Result<(), BridgeError> {
        // Native hosts hand responses back as serialized text.
        let response = json!({ "status": "ok", "handler": name, "echo": payload });
        on_response(codec::encode_text(&response));
        Ok(())
    }
}

pub struct SimHost {
    family: HostFamily,
    mobile: bool,
    confirm_answer: bool,
    viewport: Mutex<Viewport>,
    channel: Mutex<Option<Arc<SimChannel>>>,
    origin: Instant,
    clock: Mutex<Instant>,
    timeline: Mutex<Vec<String>>,
}

impl SimHost {
    pub fn new(family: HostFamily, mobile: bool, viewport: Viewport, confirm_answer: bool) -> Arc<Self> {
        let origin = Instant::now();
        Arc::new(Self {
            family,
            mobile,
            confirm_answer,
            viewport: Mutex::new(viewport),
            channel: Mutex::new(None),
            origin,
            clock: Mutex::new(origin),
            timeline: Mutex::new(Vec::new()),
        })
    }

    /// Append an event to the timeline, stamped with the virtual clock.
    pub fn record(&self, event: impl Into<String>) {
        let event = event.into();
        let elapsed = self.elapsed();
        info!(at_ms = elapsed.as_millis() as u64, "{event}");
        lock(&self.timeline).push(format!("[+{:>5}ms] {event}", elapsed.as_millis()));
    }

    pub fn timeline(&self) -> Vec<String> {
        lock(&self.timeline).clone()
    }

    pub fn elapsed(&self) -> Duration {
        *lock(&self.clock) - self.origin
    }

    pub fn set_now(&self, now: Instant) {
        let mut clock = lock(&self.clock);
        if now > *clock {
            *clock = now;
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *lock(&self.viewport) = viewport;
    }

    /// Install the native channel. Installing twice keeps the first one.
    pub fn install_channel(&self) -> Arc<SimChannel> {
        let mut slot = lock(&self.channel);
        let channel = slot.get_or_insert_with(|| Arc::new(SimChannel::default()));
        Arc::clone(channel)
    }

    pub fn sim_channel(&self) -> Option<Arc<SimChannel>> {
        lock(&self.channel).clone()
    }
}

impl EnvironmentProbe for SimHost {
    fn host_family(&self) -> HostFamily {
        self.family
    }

    fn is_mobile_device(&self) -> bool {
        self.mobile
    }

    fn viewport(&self) -> Viewport {
        *lock(&self.viewport)
    }
}

impl BridgeHost for SimHost {
    fn channel(&self) -> Option<Arc<dyn NativeChannel>> {
        let channel = self.sim_channel()?;
        Some(channel as Arc<dyn NativeChannel>)
    }

    fn request_channel(&self, probe_url: &str) {
        self.record(format!("probe navigation to {probe_url}"));
    }
}

impl CheckoutHost for SimHost {
    fn confirm(&self, prompt: &str) -> bool {
        let answer = self.confirm_answer;
        self.record(format!("confirm \"{prompt}\" -> {answer}"));
        answer
    }

    fn reload(&self) {
        self.record("host page reload");
    }

    fn now(&self) -> Instant {
        *lock(&self.clock)
    }
}
