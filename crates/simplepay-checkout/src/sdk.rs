//! `SimplePay`: the public face of the checkout overlay.
//!
//! Owns the modal controller behind a mutex and the native bridge. Every
//! entry point locks the controller, applies one transition, releases the
//! lock and only then runs user callbacks, so a callback may call back
//! into the SDK.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use serde_json::{json, Value};
use simplepay_bridge::{Bridge, BridgeHost, BridgeOptions, PendingCall, Responder};
use simplepay_common::ModalState;
use simplepay_config::CheckoutConfig;
use tracing::{debug, info};

use crate::controller::{Effect, ModalController};
use crate::gesture::{DragOutcome, PointerInput};
use crate::session::PayOptions;
use crate::view::ModalView;

/// Handler name the native host calls to dismiss the overlay.
pub const CLOSE_APP_HANDLER: &str = "closeApp";

/// Everything the checkout needs from the page it runs in.
pub trait CheckoutHost: BridgeHost {
    /// Blocking yes/no confirmation shown to the user.
    fn confirm(&self, prompt: &str) -> bool;

    /// Full reload of the host page.
    fn reload(&self);

    /// Clock used for scheduled steps.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Shared {
    controller: Mutex<ModalController>,
    host: Arc<dyn CheckoutHost>,
    config: CheckoutConfig,
}

impl Shared {
    fn controller(&self) -> MutexGuard<'_, ModalController> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the lock, then the effects it produced outside it.
    fn apply(&self, f: impl FnOnce(&mut ModalController, Instant) -> Vec<Effect>) {
        let now = self.host.now();
        let effects = {
            let mut controller = self.controller();
            f(&mut controller, now)
        };
        for effect in effects {
            effect.run();
        }
    }

    fn close(&self) {
        let now = self.host.now();
        let mut controller = self.controller();
        controller.close(now);
    }
}

/// Checkout overlay with its native bridge.
///
/// Cheap to clone; clones drive the same overlay.
#[derive(Clone)]
pub struct SimplePay {
    shared: Arc<Shared>,
    bridge: Bridge,
}

impl SimplePay {
    /// Set up the overlay for `host`. On hybrid hosts this also registers
    /// the `closeApp` handler, which starts the bridge handshake.
    pub fn new<H: CheckoutHost + 'static>(host: Arc<H>, config: CheckoutConfig) -> Self {
        let bridge_host: Arc<dyn BridgeHost> = host.clone();
        let bridge = Bridge::new(
            bridge_host,
            BridgeOptions {
                debug: config.bridge.debug,
            },
        );

        let layout = host.layout(config.layout.compact_max_width);
        let family = host.host_family();
        let shared = Arc::new(Shared {
            controller: Mutex::new(ModalController::new(&config, layout)),
            host,
            config,
        });
        info!(%family, ?layout, "checkout initialised");

        if family.is_hybrid() {
            let weak: Weak<Shared> = Arc::downgrade(&shared);
            bridge.register_handler(
                CLOSE_APP_HANDLER,
                move |_payload: Value, respond: Responder| {
                    debug!("native host requested close");
                    if let Some(shared) = weak.upgrade() {
                        shared.close();
                    }
                    respond(json!({ "status": "closed" }));
                },
            );
        }

        Self { shared, bridge }
    }

    // =========================================================================
    // CHECKOUT
    // =========================================================================

    /// Open the overlay on the checkout document at `url`.
    pub fn pay(&self, url: &str, options: PayOptions) {
        self.shared.apply(|c, now| c.pay(url, options, now));
    }

    pub fn close(&self) {
        self.shared.close();
    }

    /// User-initiated cancel. Asks for confirmation; on confirm closes the
    /// overlay and reloads the host page, otherwise returns a dragged sheet
    /// to rest. Returns whether the user confirmed.
    pub fn ask_to_close(&self) -> bool {
        if !self.state().is_showing() {
            debug!("cancel requested while not showing");
            return false;
        }

        let confirmed = self.shared.host.confirm(&self.shared.config.text.cancel_prompt);
        if confirmed {
            info!("cancel confirmed");
            self.shared.close();
            self.shared.host.reload();
        } else {
            debug!("cancel declined");
            self.shared.controller().spring_back();
        }
        confirmed
    }

    // =========================================================================
    // NATIVE BRIDGE
    // =========================================================================

    /// Call a native handler. See [`Bridge::call_handler`].
    pub fn call_native(&self, name: &str, payload: Value) -> PendingCall {
        self.bridge.call_handler(name, payload)
    }

    /// Expose `handler` to the native host under `name`.
    pub fn register_native<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        self.bridge.register_handler(name, handler);
    }

    /// The host's channel is installed (ready event or probe answered).
    pub fn notify_bridge_ready(&self) {
        self.bridge.notify_ready();
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    // =========================================================================
    // EVENT-LOOP ENTRY POINTS
    // =========================================================================

    /// Message posted by the embedded checkout document.
    pub fn handle_message(&self, data: &Value) {
        self.shared.apply(|c, now| c.handle_message(data, now));
    }

    /// The embedded document finished loading.
    pub fn content_loaded(&self) {
        let now = self.shared.host.now();
        self.shared.controller().content_loaded(now);
    }

    /// The viewport changed size; re-evaluate the layout.
    pub fn resize(&self) {
        let layout = self
            .shared
            .host
            .layout(self.shared.config.layout.compact_max_width);
        self.shared.controller().set_layout(layout);
    }

    pub fn drag_start(&self, input: &PointerInput) -> bool {
        let Some(y) = input.y() else {
            return false;
        };
        self.shared.controller().drag_start(y)
    }

    pub fn drag_move(&self, input: &PointerInput) {
        if let Some(y) = input.y() {
            self.shared.controller().drag_move(y);
        }
    }

    /// Release the drag. A dismissing drag runs [`Self::ask_to_close`].
    pub fn drag_end(&self) -> Option<DragOutcome> {
        let height = self.shared.host.viewport().height;
        let outcome = self.shared.controller().drag_end(height);
        if outcome == Some(DragOutcome::Dismiss) {
            self.ask_to_close();
        }
        outcome
    }

    /// Run every step due now. Returns when the next step is due.
    pub fn poll(&self) -> Option<Instant> {
        self.poll_at(self.shared.host.now())
    }

    pub fn poll_at(&self, now: Instant) -> Option<Instant> {
        self.shared.apply(|c, _| c.poll(now));
        self.next_wakeup()
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    pub fn state(&self) -> ModalState {
        self.shared.controller().state()
    }

    /// Snapshot of the presentation state.
    pub fn view(&self) -> ModalView {
        self.shared.controller().view().clone()
    }

    pub fn next_wakeup(&self) -> Option<Instant> {
        self.shared.controller().next_wakeup()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use simplepay_bridge::{NativeChannel, NativeHandler, Readiness};
    use simplepay_common::{
        BridgeError, EnvironmentProbe, HostFamily, LayoutMode, Viewport,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::view::ContainerTransform;

    const URL: &str = "https://checkout.example/pay/123";

    #[derive(Default)]
    struct FakeChannel {
        handlers: Mutex<HashMap<String, NativeHandler>>,
    }

    impl FakeChannel {
        /// Invoke a registered handler as the native side would.
        fn invoke(&self, name: &str, payload: Value) -> Option<Value> {
            let handler = self.handlers.lock().unwrap().get(name).cloned()?;
            let slot = Arc::new(Mutex::new(None));
            let sink = Arc::clone(&slot);
            handler(
                payload,
                Box::new(move |v: Value| {
                    *sink.lock().unwrap() = Some(v);
                }),
            );
            let answer = slot.lock().unwrap().take();
            answer
        }
    }

    impl NativeChannel for FakeChannel {
        fn register_handler(&self, name: &str, handler: NativeHandler) {
            self.handlers
                .lock()
                .unwrap()
                .insert(name.to_string(), handler);
        }

        fn call_handler(
            &self,
            name: &str,
            payload: Value,
            on_response: Responder,
        ) -> Result<(), BridgeError> {
            on_response(json!({ "handler": name, "echo": payload }));
            Ok(())
        }
    }

    struct FakeHost {
        family: HostFamily,
        mobile: bool,
        viewport: Mutex<Viewport>,
        channel: Mutex<Option<Arc<FakeChannel>>>,
        probes: AtomicUsize,
        answer: AtomicBool,
        prompts: Mutex<Vec<String>>,
        reloads: AtomicUsize,
        clock: Mutex<Instant>,
    }

    impl FakeHost {
        fn new(family: HostFamily, mobile: bool, width: f64) -> Arc<Self> {
            Arc::new(Self {
                family,
                mobile,
                viewport: Mutex::new(Viewport {
                    width,
                    height: 800.0,
                }),
                channel: Mutex::new(None),
                probes: AtomicUsize::new(0),
                answer: AtomicBool::new(true),
                prompts: Mutex::new(Vec::new()),
                reloads: AtomicUsize::new(0),
                clock: Mutex::new(Instant::now()),
            })
        }

        fn install(&self) -> Arc<FakeChannel> {
            let channel = Arc::new(FakeChannel::default());
            *self.channel.lock().unwrap() = Some(Arc::clone(&channel));
            channel
        }

        fn advance(&self, ms: u64) {
            *self.clock.lock().unwrap() += Duration::from_millis(ms);
        }
    }

    impl EnvironmentProbe for FakeHost {
        fn host_family(&self) -> HostFamily {
            self.family
        }

        fn is_mobile_device(&self) -> bool {
            self.mobile
        }

        fn viewport(&self) -> Viewport {
            *self.viewport.lock().unwrap()
        }
    }

    impl BridgeHost for FakeHost {
        fn channel(&self) -> Option<Arc<dyn NativeChannel>> {
            let channel = self.channel.lock().unwrap().clone()?;
            Some(channel as Arc<dyn NativeChannel>)
        }

        fn request_channel(&self, _probe_url: &str) {
            self.probes.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CheckoutHost for FakeHost {
        fn confirm(&self, prompt: &str) -> bool {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.load(Ordering::SeqCst)
        }

        fn reload(&self) {
            self.reloads.fetch_add(1, Ordering::SeqCst);
        }

        fn now(&self) -> Instant {
            *self.clock.lock().unwrap()
        }
    }

    fn open(sdk: &SimplePay, options: PayOptions) {
        sdk.pay(URL, options);
        sdk.poll();
        assert_eq!(sdk.state(), ModalState::Open);
    }

    fn close_counter() -> (Arc<AtomicUsize>, PayOptions) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let options = PayOptions::new().on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (hits, options)
    }

    #[test]
    fn browser_host_never_touches_bridge() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());

        assert_eq!(sdk.bridge().readiness(), Readiness::Idle);
        assert_eq!(sdk.bridge().pending_len(), 0);
        assert_eq!(host.probes.load(Ordering::SeqCst), 0);
        assert_eq!(sdk.view().layout, LayoutMode::Full);
    }

    #[test]
    fn ios_host_probes_for_channel_on_startup() {
        let host = FakeHost::new(HostFamily::Ios, true, 390.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());

        assert_eq!(sdk.bridge().readiness(), Readiness::Probing);
        assert_eq!(host.probes.load(Ordering::SeqCst), 1);

        let channel = host.install();
        sdk.notify_bridge_ready();
        assert!(channel.handlers.lock().unwrap().contains_key(CLOSE_APP_HANDLER));
    }

    #[test]
    fn native_close_app_closes_and_acknowledges() {
        let host = FakeHost::new(HostFamily::Android, true, 390.0);
        let channel = host.install();
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        let (hits, options) = close_counter();
        open(&sdk, options);

        let answer = channel.invoke(CLOSE_APP_HANDLER, json!({}));
        assert_eq!(answer, Some(json!({ "status": "closed" })));
        assert_eq!(sdk.state(), ModalState::Closing);

        // A second request mid-close changes nothing.
        channel.invoke(CLOSE_APP_HANDLER, json!({}));
        host.advance(400);
        sdk.poll();
        assert_eq!(sdk.state(), ModalState::Hidden);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_app_while_hidden_still_acknowledges() {
        let host = FakeHost::new(HostFamily::Ios, true, 390.0);
        let channel = host.install();
        let _sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        assert_eq!(
            channel.invoke(CLOSE_APP_HANDLER, Value::Null),
            Some(json!({ "status": "closed" }))
        );
    }

    #[test]
    fn ask_to_close_confirmed_closes_and_reloads() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        open(&sdk, PayOptions::new());

        assert!(sdk.ask_to_close());
        assert_eq!(sdk.state(), ModalState::Closing);
        assert_eq!(host.reloads.load(Ordering::SeqCst), 1);
        assert_eq!(
            host.prompts.lock().unwrap().as_slice(),
            ["Are you sure you want to cancel the payment?".to_string()]
        );
    }

    #[test]
    fn ask_to_close_declined_changes_nothing() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        host.answer.store(false, Ordering::SeqCst);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        open(&sdk, PayOptions::new());
        let before = sdk.view();

        assert!(!sdk.ask_to_close());
        assert_eq!(sdk.state(), ModalState::Open);
        assert_eq!(sdk.view(), before);
        assert_eq!(host.reloads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dismissing_drag_asks_to_close() {
        let host = FakeHost::new(HostFamily::Browser, true, 390.0);
        host.answer.store(false, Ordering::SeqCst);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        open(&sdk, PayOptions::new());

        assert!(sdk.drag_start(&PointerInput::Touch {
            touches: vec![100.0]
        }));
        sdk.drag_move(&PointerInput::Touch {
            touches: vec![300.0]
        });
        assert_eq!(sdk.view().transform, ContainerTransform::Offset(200.0));

        assert_eq!(sdk.drag_end(), Some(DragOutcome::Dismiss));
        assert_eq!(host.prompts.lock().unwrap().len(), 1);
        assert_eq!(sdk.state(), ModalState::Open);
        assert_eq!(sdk.view().transform, ContainerTransform::Rest);
    }

    #[test]
    fn short_drag_does_not_prompt() {
        let host = FakeHost::new(HostFamily::Browser, true, 390.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        open(&sdk, PayOptions::new());

        sdk.drag_start(&PointerInput::Mouse { page_y: 100.0 });
        sdk.drag_move(&PointerInput::Mouse { page_y: 140.0 });
        assert_eq!(sdk.drag_end(), Some(DragOutcome::SpringBack));
        assert!(host.prompts.lock().unwrap().is_empty());
        assert!(!sdk.drag_start(&PointerInput::Touch { touches: vec![] }));
    }

    #[test]
    fn callbacks_may_reenter_the_sdk() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        let inner = sdk.clone();
        let options = PayOptions::new().on_success(move |_| inner.close());
        open(&sdk, options);

        sdk.handle_message(&json!({ "type": "SIMPLEPAY_SUCCESS" }));
        assert_eq!(sdk.state(), ModalState::Closing);
    }

    #[test]
    fn close_message_settles_with_content_cleared() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        let (hits, options) = close_counter();
        open(&sdk, options);

        sdk.handle_message(&json!({ "type": "CLOSE" }));
        let wake = sdk.next_wakeup();
        assert_eq!(
            wake,
            Some(host.now() + Duration::from_millis(400))
        );
        host.advance(400);
        assert_eq!(sdk.poll(), None);
        assert_eq!(sdk.view().content_src, None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resize_reclassifies_layout_without_disturbing_session() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        open(&sdk, PayOptions::new());

        host.viewport.lock().unwrap().width = 400.0;
        sdk.resize();
        assert_eq!(sdk.view().layout, LayoutMode::Compact);
        assert_eq!(sdk.state(), ModalState::Open);
        assert_eq!(sdk.view().content_src.as_deref(), Some(URL));
    }

    #[test]
    fn loader_hides_after_content_load() {
        let host = FakeHost::new(HostFamily::Browser, false, 1280.0);
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        open(&sdk, PayOptions::new());

        sdk.content_loaded();
        host.advance(700);
        sdk.poll();
        assert_eq!(sdk.view().loader, crate::view::LoaderState::Hidden);
    }

    #[tokio::test]
    async fn call_native_resolves_through_channel() {
        let host = FakeHost::new(HostFamily::Ios, true, 390.0);
        host.install();
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());

        let response = sdk.call_native("getToken", json!({ "scope": "pay" })).await;
        assert_eq!(
            response,
            Ok(json!({ "handler": "getToken", "echo": { "scope": "pay" } }))
        );
    }

    #[test]
    fn registered_native_handler_is_invocable() {
        let host = FakeHost::new(HostFamily::Android, true, 390.0);
        let channel = host.install();
        let sdk = SimplePay::new(Arc::clone(&host), CheckoutConfig::default());
        sdk.register_native("ping", |_payload: Value, respond: Responder| {
            respond(json!("pong"));
        });
        assert_eq!(channel.invoke("ping", json!({})), Some(json!("pong")));
    }
}
