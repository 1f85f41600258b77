//! Outbound native calls awaiting their response.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use serde_json::Value;
use simplepay_common::BridgeError;
use tokio::sync::oneshot;

type Outcome = Result<Value, BridgeError>;

/// A native call in flight.
///
/// Resolves with the parsed response, or with an error if the call
/// surface failed. Stays pending for as long as the bridge has no
/// channel; there is no cancellation.
#[derive(Debug)]
pub struct PendingCall {
    id: String,
    name: String,
    rx: oneshot::Receiver<Outcome>,
}

impl PendingCall {
    pub(crate) fn new(id: String, name: String, rx: oneshot::Receiver<Outcome>) -> Self {
        Self { id, name, rx }
    }

    /// Correlation id, as it appears in logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the native handler being called.
    pub fn handler(&self) -> &str {
        &self.name
    }
}

impl Future for PendingCall {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(_) => Err(BridgeError::Abandoned),
        })
    }
}

/// Settles a `PendingCall` at most once, from whichever path gets there
/// first (response callback or synchronous failure).
#[derive(Clone)]
pub(crate) struct Resolver(Arc<Mutex<Option<oneshot::Sender<Outcome>>>>);

impl Resolver {
    pub(crate) fn new(tx: oneshot::Sender<Outcome>) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    /// Returns false if the call was already settled.
    pub(crate) fn settle(&self, outcome: Outcome) -> bool {
        let sender = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        match sender {
            // A dropped PendingCall means nobody is listening; that still
            // counts as settled.
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}
