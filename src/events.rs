//! Typed publish/subscribe event contract published by the [`Call`].
//!
//! Mirrors `medea-jason`'s `utils::callback::Callback<A>` wrapper (there, a
//! single-slot holder for a JS callback function); generalized here to a
//! native multi-listener emitter, since this crate has no single JS-side
//! handle to hand a callback to.
//!
//! [`Call`]: crate::orchestrator::Call

use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::error::CallError;

/// Public events a [`Call`](crate::orchestrator::Call) emits.
///
/// Listeners run synchronously, in registration order, on the publishing
/// task; they must not block (see the concurrency model in SPEC_FULL.md §5).
#[derive(Clone, Debug)]
pub enum CallEvent {
    /// Some piece of the [`Call`](crate::orchestrator::Call)'s externally
    /// visible state changed (e.g. `matched`, `connected`, `audio`, `video`,
    /// `external_controls`).
    Change,

    /// The local stream's tracks changed (acquired, replaced, or stopped).
    LocalTrackChange,

    /// The remote peer stream's tracks changed (added, muted, unmuted, or
    /// ended).
    TrackChange,

    /// The call has reached the terminal `finished` state.
    Finish,

    /// An application-level message arrived over the data channel.
    Message(Value),

    /// A recoverable or terminal error occurred; see [`CallError::kind`] for
    /// how a consumer should react.
    Error(CallError),
}

type Listener = Box<dyn FnMut(&CallEvent)>;

/// Publish/subscribe emitter for [`CallEvent`]s.
///
/// Listeners are appended to a `Vec` and invoked in that order on every
/// `emit`; there is no back-pressure or async delivery, matching the
/// synchronous, single-threaded delivery model of SPEC_FULL.md §5.
#[derive(Clone, Default)]
pub struct EventEmitter(Rc<RefCell<Vec<Listener>>>);

impl EventEmitter {
    /// Creates an empty [`EventEmitter`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new listener, invoked on every subsequent [`emit`](Self::emit).
    pub fn subscribe(&self, listener: impl FnMut(&CallEvent) + 'static) {
        self.0.borrow_mut().push(Box::new(listener));
    }

    /// Publishes `event` to every registered listener, in registration order.
    ///
    /// Re-entrant: a listener that triggers another `emit` is allowed, since
    /// listeners are invoked by index against a borrow taken once per
    /// listener rather than held across the whole loop.
    pub fn emit(&self, event: CallEvent) {
        let len = self.0.borrow().len();
        for i in 0..len {
            // Swap the listener out before invoking it so a nested `emit`
            // triggered by the listener itself can still borrow the `Vec`.
            let taken = self
                .0
                .borrow_mut()
                .get_mut(i)
                .map(|slot| std::mem::replace(slot, Box::new(|_: &CallEvent| {})));
            if let Some(mut f) = taken {
                f(&event);
                if let Some(slot) = self.0.borrow_mut().get_mut(i) {
                    *slot = f;
                }
            }
        }
    }
}
