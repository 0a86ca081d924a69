//=========================================================================
// Event Channel
//=========================================================================
//
// Named subscriber list for one event stream (render tick, physics tick,
// pause, resume, input).
//
// Architecture:
//   subscribe(handler) ──> Subscription (id + weak link back)
//   dispatch(&payload) ──> snapshot of handlers ──> guarded call each
//
// Dispatch clones the handler list before calling anything, so a handler
// may unsubscribe itself (or others) mid-dispatch. Each call is guarded:
// an `Err` or a panic is logged and the remaining handlers still run.
//
// Channels are UI-context confined (`Rc`), never shared across threads.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::{error, trace, warn};

//=== Handler Types =======================================================

/// Error returned by a failing subscriber.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Return type for every subscriber callback.
pub type HandlerResult = Result<(), HandlerError>;

type Handler<T> = Rc<RefCell<dyn FnMut(&T) -> HandlerResult>>;

//=== Subscribers =========================================================

struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Handler<T>)>,
}

/// Type-erased removal, so `Subscription` need not carry the payload type.
trait Detach {
    fn detach(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<T> Detach for RefCell<Subscribers<T>> {
    fn detach(&self, id: u64) -> bool {
        match self.try_borrow_mut() {
            Ok(mut subscribers) => {
                let before = subscribers.entries.len();
                subscribers.entries.retain(|(entry_id, _)| *entry_id != id);
                subscribers.entries.len() != before
            }
            Err(_) => {
                warn!(target: "game_loop::dispatch", "Subscriber list busy, detach skipped");
                false
            }
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.try_borrow()
            .map(|subscribers| subscribers.entries.iter().any(|(entry_id, _)| *entry_id == id))
            .unwrap_or(false)
    }
}

//=== Subscription ========================================================

/// Handle returned by [`EventChannel::subscribe`].
///
/// Dropping the handle does NOT unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    channel: Weak<dyn Detach>,
}

impl Subscription {
    /// Removes the handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        self.channel
            .upgrade()
            .map_or(false, |channel| channel.detach(self.id))
    }

    /// Returns `true` while the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.channel
            .upgrade()
            .map_or(false, |channel| channel.contains(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

//=== EventChannel ========================================================

/// Multicast subscriber list with guarded, snapshot-based dispatch.
pub struct EventChannel<T> {
    name: &'static str,
    inner: Rc<RefCell<Subscribers<T>>>,
}

impl<T: 'static> EventChannel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    //--- Subscription Management ------------------------------------------

    /// Registers `handler` and returns its subscription handle.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&T) -> HandlerResult + 'static,
    {
        let handler: Handler<T> = Rc::new(RefCell::new(handler));

        let mut subscribers = self.inner.borrow_mut();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, handler));

        let inner: Rc<dyn Detach> = self.inner.clone();
        Subscription {
            id,
            channel: Rc::downgrade(&inner),
        }
    }

    /// Drops every subscriber.
    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //--- Dispatch ---------------------------------------------------------

    /// Calls every handler registered at the time of the call.
    ///
    /// Returns how many handlers failed (returned `Err` or panicked).
    pub fn dispatch(&self, payload: &T) -> usize {
        let snapshot: Vec<Handler<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        trace!(
            target: "game_loop::dispatch",
            "Dispatching {} to {} handler(s)",
            self.name,
            snapshot.len()
        );

        let mut failures = 0;
        for handler in snapshot {
            let Ok(mut callback) = handler.try_borrow_mut() else {
                warn!(
                    target: "game_loop::dispatch",
                    "Re-entrant {} dispatch skipped a running handler",
                    self.name
                );
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| (&mut *callback)(payload))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    error!(target: "game_loop::dispatch", "{} handler failed: {}", self.name, e);
                }
                Err(panic) => {
                    failures += 1;
                    error!(
                        target: "game_loop::dispatch",
                        "{} handler panicked: {}",
                        self.name,
                        panic_message(panic.as_ref())
                    );
                }
            }
        }

        failures
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
