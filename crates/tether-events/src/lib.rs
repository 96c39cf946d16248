//! Synchronous publish/subscribe event fabric.
//!
//! The [`EventBus`] is an explicit mediator owning per-event-kind subscriber
//! lists, keyed by [`TypeId`]. Dispatch is synchronous and depth-first on the
//! calling thread: [`EventBus::publish`] delivers to all current subscribers
//! of the exact event type, in subscription order, before returning.
//! Publishing from inside a handler is permitted and dispatches immediately;
//! callers must avoid unbounded recursive publish chains.
//!
//! Subscriptions are scoped: dropping the [`Subscription`] guard removes the
//! handler, so a component's handlers can never outlive the component.
//!
//! The bus is single-threaded by construction (`Rc`/`RefCell` internals) —
//! all state mutation in this core runs on one logical execution context per
//! server tick, so no locking is needed or wanted here.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

type BoxedHandler = Rc<dyn Fn(&dyn Any)>;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct Subscriber {
    id: u64,
    /// Shared with the owning [`Subscription`]; cleared on unsubscribe so a
    /// subscriber removed mid-dispatch is skipped rather than invoked.
    active: Rc<Cell<bool>>,
    handler: BoxedHandler,
}

#[derive(Default)]
struct Registry {
    channels: HashMap<TypeId, Vec<Subscriber>>,
    next_id: u64,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Synchronous event mediator. Cloning is cheap and yields a second handle to
/// the same subscriber registry, so handlers can capture a clone to publish
/// follow-up events reentrantly.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of type `E`. The returned
    /// [`Subscription`] removes the handler when dropped.
    pub fn subscribe<E: 'static>(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let erased: BoxedHandler = Rc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        let active = Rc::new(Cell::new(true));
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .channels
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Subscriber {
                id,
                active: Rc::clone(&active),
                handler: erased,
            });

        Subscription {
            type_id: TypeId::of::<E>(),
            id,
            active,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Publishes `event` to all current subscribers of `E`, in subscription
    /// order, returning after every handler has run.
    ///
    /// The subscriber list is snapshotted before dispatch and the registry
    /// borrow released, so handlers may freely subscribe, unsubscribe, and
    /// publish. A subscriber unsubscribed mid-dispatch that has not yet been
    /// invoked is skipped; one subscribed mid-dispatch first sees the *next*
    /// publish.
    pub fn publish<E: 'static>(&self, event: &E) {
        let snapshot: Vec<(Rc<Cell<bool>>, BoxedHandler)> = {
            let registry = self.registry.borrow();
            let Some(subscribers) = registry.channels.get(&TypeId::of::<E>()) else {
                tracing::trace!(
                    "no subscribers for {}, dropping event",
                    std::any::type_name::<E>()
                );
                return;
            };
            subscribers
                .iter()
                .map(|s| (Rc::clone(&s.active), Rc::clone(&s.handler)))
                .collect()
        };

        for (active, handler) in snapshot {
            if active.get() {
                handler(event);
            }
        }
    }

    /// Number of live subscribers for `E`. Intended for tests and
    /// diagnostics.
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.registry
            .borrow()
            .channels
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Scoped subscription guard. Dropping it removes the handler from the bus;
/// dropping it from inside the handler's own invocation is safe.
pub struct Subscription {
    type_id: TypeId,
    id: u64,
    active: Rc<Cell<bool>>,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Leaks the registration, keeping the handler subscribed for the
    /// lifetime of the bus.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Deactivate first: even if the registry entry cannot be pruned right
        // now, the handler will never run again.
        self.active.set(false);

        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // The registry borrow is only held across subscribe and the publish
        // snapshot, never while handlers run, so this succeeds in every
        // supported drop site. The active flag above covers the rest.
        if let Ok(mut registry) = registry.try_borrow_mut() {
            if let Some(subscribers) = registry.channels.get_mut(&self.type_id) {
                subscribers.retain(|s| s.id != self.id);
                if subscribers.is_empty() {
                    registry.channels.remove(&self.type_id);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
