//! Modal lifecycle: Hidden → Opening → Open → Closing → Hidden.
//!
//! `ModalController` is the single owner of the session, the presentation
//! state and the drag session. Every entry point checks the current state
//! before acting, so overlapping triggers (a tap and a native `closeApp`
//! arriving together) collapse into one transition. User callbacks are
//! not invoked here; they are returned as [`Effect`]s for the caller to
//! run once it has released the controller.

use std::time::Instant;

use serde_json::Value;
use simplepay_common::{LayoutMode, ModalState};
use simplepay_config::{CheckoutConfig, TimingConfig};
use tracing::{debug, error, info, warn};

use crate::gesture::{DragOutcome, GestureRecognizer};
use crate::message::{classify, CheckoutEvent};
use crate::schedule::{Schedule, Step};
use crate::session::{CloseCallback, ModalSession, PayOptions, SuccessCallback};
use crate::view::{ContainerTransform, LoaderState, ModalView, Transition};

/// A user callback to run after the controller is released.
pub enum Effect {
    Success {
        callback: SuccessCallback,
        data: Value,
    },
    Closed {
        callback: CloseCallback,
    },
}

impl Effect {
    pub fn run(self) {
        match self {
            Self::Success { callback, data } => callback(&data),
            Self::Closed { callback } => callback(),
        }
    }
}

pub struct ModalController {
    timing: TimingConfig,
    dismiss_threshold: f64,
    state: ModalState,
    session: Option<ModalSession>,
    view: ModalView,
    gesture: GestureRecognizer,
    schedule: Schedule,
    /// Incremented on every close; a settle step only applies to its own
    /// cycle.
    close_cycle: u64,
}

impl ModalController {
    pub fn new(config: &CheckoutConfig, layout: LayoutMode) -> Self {
        Self {
            timing: config.timing.clone(),
            dismiss_threshold: config.gesture.dismiss_threshold,
            state: ModalState::Hidden,
            session: None,
            view: ModalView::new(layout),
            gesture: GestureRecognizer::new(),
            schedule: Schedule::new(),
            close_cycle: 0,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn view(&self) -> &ModalView {
        &self.view
    }

    pub fn session(&self) -> Option<&ModalSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// When `poll` next has work to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.schedule.next_due()
    }

    // =========================================================================
    // OPEN / CLOSE
    // =========================================================================

    /// Show the overlay with the checkout document at `url`.
    ///
    /// An empty URL is logged and ignored. Paying while a session is
    /// showing replaces its content and callbacks in place; paying while a
    /// close is settling completes that close first.
    pub fn pay(&mut self, url: &str, options: PayOptions, now: Instant) -> Vec<Effect> {
        let url = url.trim();
        if url.is_empty() {
            error!("pay called without a checkout URL");
            return Vec::new();
        }

        let mut effects = Vec::new();
        match self.state {
            ModalState::Closing => effects.extend(self.settle()),
            ModalState::Opening | ModalState::Open => {
                warn!(state = %self.state, "replacing the active checkout session");
            }
            ModalState::Hidden => {}
        }

        let session = ModalSession::new(url, options);
        info!(session = %session.id, url, layout = ?self.view.layout, "opening checkout");

        self.release_drag();
        self.schedule
            .cancel(|s| matches!(s, Step::FadeLoader | Step::HideLoader));
        self.view.transform = ContainerTransform::Rest;
        self.view.loader = LoaderState::Shown;
        self.view.content_src = Some(url.to_string());
        self.view.overlay_visible = true;
        if self.view.layout.is_compact() {
            self.view.scroll_locked = true;
        }
        self.session = Some(session);

        if self.state != ModalState::Open {
            self.state = ModalState::Opening;
            if !self.schedule.contains(|s| *s == Step::RevealContainer) {
                self.schedule.push(now, Step::RevealContainer);
            }
        }
        effects
    }

    /// Start closing. A no-op unless the overlay is Opening or Open.
    pub fn close(&mut self, now: Instant) {
        if !self.state.is_showing() {
            debug!(state = %self.state, "close ignored");
            return;
        }

        self.close_cycle += 1;
        self.state = ModalState::Closing;
        self.release_drag();
        self.schedule.cancel(|s| {
            matches!(
                s,
                Step::RevealContainer | Step::FadeLoader | Step::HideLoader
            )
        });

        self.view.overlay_visible = false;
        self.view.container_visible = false;
        self.view.scroll_locked = false;
        if self.view.layout.is_compact() {
            self.view.transform = ContainerTransform::Dismissed;
        }

        self.schedule.push(
            now + self.timing.settle(),
            Step::Settle {
                cycle: self.close_cycle,
            },
        );
        debug!(cycle = self.close_cycle, "close started");
    }

    /// Run every step due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some((due, step)) = self.schedule.pop_due(now) {
            match step {
                Step::RevealContainer => {
                    if self.state == ModalState::Opening {
                        self.view.container_visible = true;
                        self.state = ModalState::Open;
                        debug!("checkout open");
                    }
                }
                Step::FadeLoader => {
                    if self.view.loader == LoaderState::Shown {
                        self.view.loader = LoaderState::Fading;
                        self.schedule
                            .push(due + self.timing.loader_hide_delay(), Step::HideLoader);
                    }
                }
                Step::HideLoader => {
                    if self.view.loader == LoaderState::Fading {
                        self.view.loader = LoaderState::Hidden;
                    }
                }
                Step::Settle { cycle } => {
                    if self.state == ModalState::Closing && cycle == self.close_cycle {
                        effects.extend(self.settle());
                    }
                }
            }
        }
        effects
    }

    /// Closing → Hidden: blank the content and hand back `on_close`.
    fn settle(&mut self) -> Vec<Effect> {
        self.schedule.cancel(|s| matches!(s, Step::Settle { .. }));
        self.view.content_src = None;
        self.view.transform = ContainerTransform::Rest;
        self.view.transition = Transition::Default;
        self.state = ModalState::Hidden;

        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        info!(session = %session.id, "checkout closed");
        session
            .options
            .on_close
            .map(|callback| Effect::Closed { callback })
            .into_iter()
            .collect()
    }

    // =========================================================================
    // CONTENT EVENTS
    // =========================================================================

    /// The embedded document finished loading. Fades the loader out if it
    /// is still showing.
    pub fn content_loaded(&mut self, now: Instant) {
        if !self.state.is_showing() || self.view.loader != LoaderState::Shown {
            return;
        }
        if self.schedule.contains(|s| *s == Step::FadeLoader) {
            return;
        }
        self.schedule
            .push(now + self.timing.loader_fade_delay(), Step::FadeLoader);
    }

    /// A message posted by the embedded document.
    pub fn handle_message(&mut self, data: &Value, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        for event in classify(data) {
            match event {
                CheckoutEvent::Success(data) => {
                    let callback = self
                        .session
                        .as_ref()
                        .and_then(|s| s.options.on_success.clone());
                    match callback {
                        Some(callback) => effects.push(Effect::Success { callback, data }),
                        None => debug!("success message without a handler"),
                    }
                }
                CheckoutEvent::Close => self.close(now),
                CheckoutEvent::FrameHeight(height) => {
                    debug!(height, "frame height hint ignored");
                }
            }
        }
        effects
    }

    // =========================================================================
    // LAYOUT & GESTURE
    // =========================================================================

    /// Apply a new layout classification. Never changes the modal state;
    /// a drag in progress is dropped if the layout stops being compact.
    pub fn set_layout(&mut self, layout: LayoutMode) {
        if self.view.layout == layout {
            return;
        }
        debug!(from = ?self.view.layout, to = ?layout, "layout changed");
        self.view.layout = layout;
        if !layout.is_compact() {
            if self.gesture.is_dragging() {
                self.view.transform = ContainerTransform::Rest;
            }
            self.release_drag();
        }
    }

    /// Begin a drag at `y`. Only armed while Open in the compact layout.
    pub fn drag_start(&mut self, y: f64) -> bool {
        if self.state != ModalState::Open || !self.view.layout.is_compact() {
            return false;
        }
        if !self.gesture.start(y) {
            return false;
        }
        self.view.selectable = false;
        self.view.transition = Transition::Suppressed;
        true
    }

    pub fn drag_move(&mut self, y: f64) {
        if let Some(offset) = self.gesture.update(y) {
            self.view.transform = if offset > 0.0 {
                ContainerTransform::Offset(offset)
            } else {
                ContainerTransform::Rest
            };
        }
    }

    /// Release the drag. On `SpringBack` the sheet is already back at
    /// rest; on `Dismiss` it stays where it was released until the caller
    /// closes or calls [`Self::spring_back`].
    pub fn drag_end(&mut self, viewport_height: f64) -> Option<DragOutcome> {
        let outcome = self
            .gesture
            .finish(viewport_height, self.dismiss_threshold)?;
        self.view.selectable = true;
        self.view.transition = Transition::Spring;
        if outcome == DragOutcome::SpringBack {
            self.view.transform = ContainerTransform::Rest;
        }
        debug!(?outcome, "drag released");
        Some(outcome)
    }

    /// Return a dragged sheet to rest (dismissal declined).
    pub fn spring_back(&mut self) {
        if let ContainerTransform::Offset(_) = self.view.transform {
            self.view.transform = ContainerTransform::Rest;
            self.view.transition = Transition::Spring;
        }
    }

    fn release_drag(&mut self) {
        if self.gesture.cancel() {
            self.view.selectable = true;
            self.view.transition = Transition::Default;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
