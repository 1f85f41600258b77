//! The bridge itself: handler registry, readiness handshake and the queue
//! of work waiting for the native channel.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use simplepay_common::{new_correlation_id, HostFamily};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::channel::{BridgeHost, NativeChannel, NativeHandler, Responder};
use crate::codec::{self, PROBE_URL};
use crate::pending::{PendingCall, Resolver};

/// Handler registered by page code. Receives the parsed payload.
pub type Handler = Arc<dyn Fn(Value, Responder) + Send + Sync>;

/// Work that needs the channel. Runs exactly once, either immediately or
/// when the queue is drained.
type Continuation = Box<dyn FnOnce(&Arc<dyn NativeChannel>) + Send>;

/// Where the readiness handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Nothing has needed the channel yet.
    Idle,
    /// Android family: waiting for the one-time ready event. No timeout.
    AwaitingSignal,
    /// Generic webview: probe navigation sent, waiting for the host to
    /// install its channel.
    Probing,
    /// Channel available; work runs immediately.
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct BridgeOptions {
    /// Log every call, response and registration.
    pub debug: bool,
}

struct BridgeState {
    handlers: HashMap<String, Handler>,
    pending: VecDeque<Continuation>,
    readiness: Readiness,
}

/// Asynchronous request/response channel to the native host.
///
/// Cheap to clone; clones share the registry and the pending queue.
#[derive(Clone)]
pub struct Bridge {
    host: Arc<dyn BridgeHost>,
    state: Arc<Mutex<BridgeState>>,
    options: BridgeOptions,
}

impl Bridge {
    pub fn new(host: Arc<dyn BridgeHost>, options: BridgeOptions) -> Self {
        Self {
            host,
            state: Arc::new(Mutex::new(BridgeState {
                handlers: HashMap::new(),
                pending: VecDeque::new(),
                readiness: Readiness::Idle,
            })),
            options,
        }
    }

    /// `Ready` only once the channel exists and nothing is left queued.
    pub fn readiness(&self) -> Readiness {
        let installed = self.host.channel().is_some();
        let state = lock(&self.state);
        if installed && state.pending.is_empty() {
            return Readiness::Ready;
        }
        state.readiness
    }

    /// Number of registrations and calls waiting for the channel.
    pub fn pending_len(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Make `handler` invocable by the native host under `name`.
    ///
    /// Re-registering a name replaces the previous handler. Before the
    /// channel is ready the registration is queued behind earlier work.
    pub fn register_handler<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        let name = name.into();
        let replaced = lock(&self.state)
            .handlers
            .insert(name.clone(), Arc::new(handler))
            .is_some();
        if self.options.debug {
            debug!(handler = %name, replaced, "registering native handler");
        }

        let registry = Arc::downgrade(&self.state);
        self.with_channel(Box::new(move |channel: &Arc<dyn NativeChannel>| {
            let native = dispatcher(name.clone(), registry);
            channel.register_handler(&name, native);
        }));
    }

    /// Call the native handler `name`.
    ///
    /// The returned future waits for the channel if needed. It resolves with
    /// the parsed response, or with the host's error if the call surface
    /// fails synchronously. Nothing is retried.
    pub fn call_handler(&self, name: &str, payload: Value) -> PendingCall {
        let (tx, rx) = oneshot::channel();
        let call_id = new_correlation_id();
        let debug_calls = self.options.debug;
        if debug_calls {
            debug!(call_id = %call_id, handler = name, "native call requested");
        }

        let handler = name.to_string();
        let id = call_id.clone();
        self.with_channel(Box::new(move |channel: &Arc<dyn NativeChannel>| {
            let resolver = Resolver::new(tx);
            let on_response = resolver.clone();
            let response_id = id.clone();
            let sent = channel.call_handler(
                &handler,
                payload,
                Box::new(move |response: Value| {
                    if debug_calls {
                        debug!(call_id = %response_id, "native response received");
                    }
                    on_response.settle(codec::decode(response));
                }),
            );
            if let Err(e) = sent {
                warn!(call_id = %id, handler = %handler, error = %e, "native call failed");
                resolver.settle(Err(e));
            }
        }));

        PendingCall::new(call_id, name.to_string(), rx)
    }

    /// The host reports its channel is installed: the Android ready event
    /// fired, or the generic webview drained its callback list.
    ///
    /// Queued work runs in FIFO order.
    pub fn notify_ready(&self) {
        let Some(channel) = self.host.channel() else {
            warn!("ready signal received but no native channel is installed");
            return;
        };

        let queued = {
            let mut state = lock(&self.state);
            state.readiness = Readiness::Ready;
            state.pending.len()
        };
        info!(queued, "native bridge ready");

        // One at a time, so work queued while draining lands behind the rest.
        loop {
            let next = lock(&self.state).pending.pop_front();
            let Some(work) = next else {
                break;
            };
            work(&channel);
        }
    }

    /// Run `work` now if the channel is installed and nothing is queued
    /// ahead of it; otherwise queue it and start the handshake if needed.
    fn with_channel(&self, work: Continuation) {
        let channel = self.host.channel();
        let family = self.host.host_family();
        let mut state = lock(&self.state);
        if state.pending.is_empty() {
            if let Some(channel) = channel.as_ref() {
                drop(state);
                work(channel);
                return;
            }
        }

        state.pending.push_back(work);
        let send_probe = if channel.is_some() {
            // Installed but the ready signal has not drained the queue yet.
            false
        } else {
            match state.readiness {
                Readiness::AwaitingSignal | Readiness::Probing => false,
                Readiness::Idle | Readiness::Ready => {
                    if family == HostFamily::Android {
                        state.readiness = Readiness::AwaitingSignal;
                        false
                    } else {
                        state.readiness = Readiness::Probing;
                        true
                    }
                }
            }
        };
        drop(state);

        if send_probe {
            debug!(%family, probe = PROBE_URL, "requesting native channel");
            self.host.request_channel(PROBE_URL);
        } else {
            debug!(%family, "waiting for native channel");
        }
    }
}

/// Native-facing wrapper for a registered name. Looks the handler up at
/// invocation time so the latest registration always wins.
fn dispatcher(name: String, registry: Weak<Mutex<BridgeState>>) -> NativeHandler {
    Arc::new(move |data: Value, respond: Responder| {
        let payload = match codec::decode(data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(handler = %name, error = %e, "dropping native invocation");
                return;
            }
        };
        match lookup(&registry, &name) {
            Some(handler) => handler(payload, respond),
            None => warn!(handler = %name, "native invocation for unknown handler"),
        }
    })
}

fn lookup(registry: &Weak<Mutex<BridgeState>>, name: &str) -> Option<Handler> {
    let state = registry.upgrade()?;
    let guard = lock(&state);
    guard.handlers.get(name).cloned()
}

fn lock(state: &Mutex<BridgeState>) -> MutexGuard<'_, BridgeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// TESTS
// =============================================================================
