//! Checkout overlay for hosted payment pages.
//!
//! The overlay shows an embedded checkout document by URL, relays its
//! success/close messages to the host application, supports
//! drag-to-dismiss in the compact (bottom sheet) layout and answers the
//! native host's `closeApp` request through the bridge.
//!
//! All presentation is explicit state in [`ModalView`]; a renderer reads
//! it after each call. Timed steps run from [`SimplePay::poll`], driven by
//! the host's event loop.

pub mod controller;
pub mod gesture;
pub mod message;
pub mod schedule;
pub mod sdk;
pub mod session;
pub mod view;

pub use controller::{Effect, ModalController};
pub use gesture::{DragOutcome, DragSession, GestureRecognizer, PointerInput};
pub use message::{classify, CheckoutEvent};
pub use sdk::{CheckoutHost, SimplePay, CLOSE_APP_HANDLER};
pub use session::{CloseCallback, ModalSession, PayOptions, SuccessCallback};
pub use view::{ContainerTransform, LoaderState, ModalView, Transition};
