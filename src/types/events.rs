use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A notification that can be routed to listeners by kind.
pub trait Notification {
    type Kind: Copy + PartialEq + std::fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener<E> = Box<dyn FnMut(&E)>;

/// Listener registry for one notification source (a media element, a viewport).
pub struct EventTarget<E: Notification> {
    next_id: u64,
    listeners: Vec<(ListenerId, E::Kind, Listener<E>)>,
    /// Listeners whose subscription was dropped while the target was borrowed.
    /// They are skipped from then on and removed when the target is next mutated.
    released: Rc<RefCell<Vec<ListenerId>>>,
}

impl<E: Notification> EventTarget<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
            released: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn add_listener(&mut self, kind: E::Kind, listener: Listener<E>) -> ListenerId {
        self.drain_released();
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Calls every listener registered for the event's kind, in registration order.
    /// A listener released by an earlier callback in the same dispatch is not called.
    pub fn dispatch(&mut self, event: &E) {
        self.drain_released();
        let kind = event.kind();
        for (id, listener_kind, listener) in self.listeners.iter_mut() {
            if *listener_kind == kind && !self.released.borrow().contains(id) {
                listener(event);
            }
        }
        self.drain_released();
    }

    fn drain_released(&mut self) {
        let released = std::mem::take(&mut *self.released.borrow_mut());
        for id in released {
            self.remove_listener(id);
        }
    }

    fn is_live(&self, id: ListenerId) -> bool {
        !self.released.borrow().contains(&id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .iter()
            .filter(|(id, _, _)| self.is_live(*id))
            .count()
    }

    pub fn listener_count_for(&self, kind: E::Kind) -> usize {
        self.listeners
            .iter()
            .filter(|(id, k, _)| *k == kind && self.is_live(*id))
            .count()
    }

    /// Registers a listener whose lifetime is tied to the returned guard.
    pub fn subscribe(
        target: &Rc<RefCell<Self>>,
        kind: E::Kind,
        listener: impl FnMut(&E) + 'static,
    ) -> Subscription<E>
    where
        E: 'static,
    {
        let mut registry = target.borrow_mut();
        let id = registry.add_listener(kind, Box::new(listener));
        Subscription {
            target: Rc::downgrade(target),
            released: Rc::downgrade(&registry.released),
            id,
            kind,
        }
    }
}

impl<E: Notification> Default for EventTarget<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes its listener from the target when dropped.
pub struct Subscription<E: Notification> {
    target: Weak<RefCell<EventTarget<E>>>,
    released: Weak<RefCell<Vec<ListenerId>>>,
    id: ListenerId,
    kind: E::Kind,
}

impl<E: Notification> Subscription<E> {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl<E: Notification> Drop for Subscription<E> {
    fn drop(&mut self) {
        let Some(target) = self.target.upgrade() else {
            return;
        };
        if let Ok(mut target) = target.try_borrow_mut() {
            target.remove_listener(self.id);
            return;
        }
        // The target is mid-dispatch; it drops the listener once it is free.
        if let Some(released) = self.released.upgrade() {
            log::debug!(
                "deferring release of {:?} listener {:?}",
                self.kind,
                self.id
            );
            released.borrow_mut().push(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Ping {
        A(u32),
        B,
    }

    impl Notification for Ping {
        type Kind = u8;

        fn kind(&self) -> u8 {
            match self {
                Ping::A(_) => 0,
                Ping::B => 1,
            }
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let target = EventTarget::<Ping>::shared();
        let seen = Rc::new(Cell::new(0u32));
        let b_count = Rc::new(Cell::new(0u32));

        let seen_clone = seen.clone();
        let _a = EventTarget::subscribe(&target, 0, move |ping| {
            if let Ping::A(n) = ping {
                seen_clone.set(seen_clone.get() + n);
            }
        });
        let b_clone = b_count.clone();
        let _b = EventTarget::subscribe(&target, 1, move |_| b_clone.set(b_clone.get() + 1));

        target.borrow_mut().dispatch(&Ping::A(3));
        target.borrow_mut().dispatch(&Ping::A(4));
        target.borrow_mut().dispatch(&Ping::B);

        assert_eq!(seen.get(), 7);
        assert_eq!(b_count.get(), 1);
        assert_eq!(target.borrow().listener_count_for(0), 1);
    }

    #[test]
    fn test_dropping_subscription_releases_listener() {
        let target = EventTarget::<Ping>::shared();
        let first = EventTarget::subscribe(&target, 0, |_| {});
        let second = EventTarget::subscribe(&target, 1, |_| {});
        assert_ne!(first.id(), second.id());
        assert_eq!(target.borrow().listener_count(), 2);

        drop(first);
        assert_eq!(target.borrow().listener_count(), 1);
        drop(second);
        assert_eq!(target.borrow().listener_count(), 0);
    }

    #[test]
    fn test_subscription_dropped_during_dispatch_is_released() {
        let target = EventTarget::<Ping>::shared();
        let later_calls = Rc::new(Cell::new(0u32));
        let guards: Rc<RefCell<Vec<Subscription<Ping>>>> = Rc::new(RefCell::new(Vec::new()));

        // The first listener drops its own guard and the one registered after it.
        let guards_clone = guards.clone();
        let first = EventTarget::subscribe(&target, 0, move |_| {
            guards_clone.borrow_mut().clear();
        });
        let calls_clone = later_calls.clone();
        let later = EventTarget::subscribe(&target, 0, move |_| {
            calls_clone.set(calls_clone.get() + 1)
        });
        guards.borrow_mut().extend([first, later]);
        let _kept = EventTarget::subscribe(&target, 1, |_| {});
        assert_eq!(target.borrow().listener_count(), 3);

        target.borrow_mut().dispatch(&Ping::A(1));
        assert_eq!(later_calls.get(), 0);
        assert_eq!(target.borrow().listener_count(), 1);
        assert_eq!(target.borrow().listener_count_for(0), 0);

        target.borrow_mut().dispatch(&Ping::A(2));
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn test_subscription_outliving_target_is_harmless() {
        let target = EventTarget::<Ping>::shared();
        let subscription = EventTarget::subscribe(&target, 0, |_| {});
        drop(target);
        drop(subscription);
    }
}
