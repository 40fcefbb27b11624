//! Single-threaded event dispatch for the controller.
//!
//! Window messages can re-enter the window procedure while the controller is
//! in the middle of handling an event: showing the popup sends `WM_ACTIVATE`,
//! hiding it sends a deactivation, moving it sends `WM_SIZE`. The dispatcher
//! queues events that arrive while the controller is busy and drains them, in
//! order, once the outer call returns.

use crate::controller::{NotifyIcon, PopupEvent, PopupShell, WindowVisibilityController};
use crate::intercept::{Interception, NativeMessage};
use std::cell::RefCell;
use std::collections::VecDeque;
use tracing::trace;

/// Receiver for popup events and native messages.
///
/// The platform window procedure holds one of these as its interceptor.
pub trait MessageSink {
    /// Deliver an event; it is handled now or queued behind the running one.
    fn post(&self, event: PopupEvent);

    /// Decide on a native message. Messages that arrive while the controller
    /// is busy pass through, with any refresh they call for queued.
    fn intercept(&self, message: NativeMessage, over_client: bool) -> Interception;
}

/// Owns the controller and serialises everything delivered to it.
pub struct Dispatcher<S, I> {
    controller: RefCell<WindowVisibilityController<S, I>>,
    pending: RefCell<VecDeque<PopupEvent>>,
}

impl<S: PopupShell, I: NotifyIcon> Dispatcher<S, I> {
    pub fn new(controller: WindowVisibilityController<S, I>) -> Self {
        Self {
            controller: RefCell::new(controller),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// Inspect the controller; `None` while it is handling an event.
    pub fn with_controller<R>(
        &self,
        f: impl FnOnce(&WindowVisibilityController<S, I>) -> R,
    ) -> Option<R> {
        self.controller.try_borrow().ok().map(|controller| f(&controller))
    }

    /// Events waiting for the controller.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    fn drain(&self) {
        loop {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                return;
            };
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                return;
            };
            controller.handle(event);
        }
    }
}

impl<S: PopupShell, I: NotifyIcon> MessageSink for Dispatcher<S, I> {
    fn post(&self, event: PopupEvent) {
        self.pending.borrow_mut().push_back(event);
        self.drain();
    }

    fn intercept(&self, message: NativeMessage, over_client: bool) -> Interception {
        let interception = match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.on_native_message(message, over_client),
            Err(_) => {
                trace!(?message, "Native message re-entered the controller");
                if matches!(
                    message,
                    NativeMessage::CompositionChanged | NativeMessage::SizeChanged
                ) {
                    self.pending.borrow_mut().push_back(PopupEvent::Refresh);
                }
                Interception::PassThrough
            }
        };
        self.drain();
        interception
    }
}
