//! L3 Molecular Layer: resize/orientation reset triggers
//!
//! Coarse-pointer devices reset when they rotate into landscape. Fine-pointer
//! devices reset on resize, collapsed through a single-slot trailing-edge
//! debounce. The coordinator only decides that a reset is due; the widget
//! performs it.

use std::time::Duration;

use tracing::debug;

use crate::host::{ListenerId, ListenerKind, Listeners, TimerId, Timers};

/// Single-slot trailing-edge debounce over host timers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Restart the countdown, cancelling whatever was pending
    pub fn call<T: Timers + ?Sized>(&mut self, timers: &mut T) -> TimerId {
        self.cancel(timers);
        let timer = timers.schedule(self.delay);
        self.pending = Some(timer);
        timer
    }

    /// Consume a timer fire. Only the pending timer counts; stale ids are
    /// ignored.
    pub fn fire(&mut self, timer: TimerId) -> bool {
        if self.pending == Some(timer) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<T: Timers + ?Sized>(&mut self, timers: &mut T) {
        if let Some(timer) = self.pending.take() {
            timers.cancel(timer);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Listener bookkeeping for the two reset triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCoordinator {
    debouncer: Debouncer,
    orientation: Option<ListenerId>,
    resize: Option<ListenerId>,
}

impl ResetCoordinator {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(debounce),
            orientation: None,
            resize: None,
        }
    }

    pub fn watch_orientation<L: Listeners + ?Sized>(&mut self, listeners: &mut L) {
        if self.orientation.is_none() {
            self.orientation = Some(listeners.listen(ListenerKind::OrientationChange));
        }
    }

    pub fn unwatch_orientation<L: Listeners + ?Sized>(&mut self, listeners: &mut L) {
        if let Some(listener) = self.orientation.take() {
            listeners.unlisten(listener);
        }
    }

    pub fn watch_resize<L: Listeners + ?Sized>(&mut self, listeners: &mut L) {
        if self.resize.is_none() {
            self.resize = Some(listeners.listen(ListenerKind::Resize));
        }
    }

    /// Stop listening and drop any reset still waiting on the debounce
    pub fn unwatch_resize<H: Listeners + Timers + ?Sized>(&mut self, host: &mut H) {
        if let Some(listener) = self.resize.take() {
            host.unlisten(listener);
        }
        self.debouncer.cancel(host);
    }

    /// Whether an orientation change calls for a reset
    pub fn on_orientation_change(&self, portrait: bool) -> bool {
        self.orientation.is_some() && !portrait
    }

    /// Restart the debounce for a resize event
    pub fn on_resize<T: Timers + ?Sized>(&mut self, timers: &mut T) {
        if self.resize.is_some() {
            let timer = self.debouncer.call(timers);
            debug!(%timer, "Resize debounced");
        }
    }

    /// Whether a timer fire completes the debounce
    pub fn on_timer(&mut self, timer: TimerId) -> bool {
        self.debouncer.fire(timer)
    }

    pub fn is_watching_orientation(&self) -> bool {
        self.orientation.is_some()
    }

    pub fn is_watching_resize(&self) -> bool {
        self.resize.is_some()
    }

    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_pending()
    }
}
