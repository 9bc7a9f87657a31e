//! Container size tracking.
//!
//! The host forwards raw layout measurements through [`SizeObserver::report`].
//! Each subscription only hears about a size when its whole-pixel value differs
//! from the last one it was given.

use std::collections::{BTreeMap, HashMap};

use crate::geometry::MeasuredSize;
use crate::log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

/// Handle returned by [`SizeObserver::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type SizeCallback = Box<dyn FnMut(MeasuredSize)>;

struct Watch {
    container: ContainerId,
    last: Option<MeasuredSize>,
    callback: SizeCallback,
}

#[derive(Default)]
pub struct SizeObserver {
    sizes: HashMap<ContainerId, MeasuredSize>,
    watches: BTreeMap<u64, Watch>,
    next_id: u64,
}

impl SizeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `container`. If its size is already known the callback
    /// receives it right away, like an initial layout observation.
    pub fn observe<F>(&mut self, container: ContainerId, callback: F) -> Subscription
    where
        F: FnMut(MeasuredSize) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        let mut watch = Watch {
            container,
            last: None,
            callback: Box::new(callback),
        };
        if let Some(size) = self.sizes.get(&container).copied() {
            watch.last = Some(size);
            (watch.callback)(size);
        }
        self.watches.insert(id, watch);
        Subscription(id)
    }

    /// Layout hook: records the container's new box size and notifies its
    /// watchers whose last emitted size differs.
    pub fn report(&mut self, container: ContainerId, width: f64, height: f64) -> MeasuredSize {
        let size = MeasuredSize::from_layout(width, height);
        self.sizes.insert(container, size);
        for watch in self.watches.values_mut() {
            if watch.container != container || watch.last == Some(size) {
                continue;
            }
            watch.last = Some(size);
            (watch.callback)(size);
        }
        size
    }

    /// Synchronous read for mount time.
    pub fn current_size(&self, container: ContainerId) -> Option<MeasuredSize> {
        self.sizes.get(&container).copied()
    }

    /// Stops a subscription. Unknown or already removed handles are a no-op.
    /// The container's size is forgotten once nothing watches it.
    pub fn unobserve(&mut self, subscription: Subscription) -> bool {
        let Some(watch) = self.watches.remove(&subscription.0) else {
            debug!(id = subscription.0, "unobserve on inactive subscription");
            return false;
        };
        let container = watch.container;
        if !self.watches.values().any(|w| w.container == container) {
            self.sizes.remove(&container);
        }
        true
    }

    /// Forgets a container and every subscription watching it.
    pub fn remove_container(&mut self, container: ContainerId) -> usize {
        self.sizes.remove(&container);
        let before = self.watches.len();
        self.watches.retain(|_, watch| watch.container != container);
        before - self.watches.len()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.watches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<MeasuredSize>>>, impl FnMut(MeasuredSize) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |size| sink.borrow_mut().push(size))
    }

    #[test]
    fn emits_only_on_integer_change() {
        let mut observer = SizeObserver::new();
        let box_a = ContainerId(1);
        let (seen, cb) = recorder();
        observer.observe(box_a, cb);

        observer.report(box_a, 100.2, 50.0);
        observer.report(box_a, 99.8, 50.4);
        observer.report(box_a, 120.0, 50.0);
        observer.report(box_a, 120.0, 50.0);

        assert_eq!(
            *seen.borrow(),
            vec![MeasuredSize::new(100, 50), MeasuredSize::new(120, 50)]
        );
    }

    #[test]
    fn zero_size_is_clamped() {
        let mut observer = SizeObserver::new();
        let (seen, cb) = recorder();
        observer.observe(ContainerId(7), cb);
        observer.report(ContainerId(7), 0.0, 0.0);
        assert_eq!(*seen.borrow(), vec![MeasuredSize::new(1, 1)]);
    }

    #[test]
    fn late_observer_gets_current_size() {
        let mut observer = SizeObserver::new();
        observer.report(ContainerId(1), 64.0, 32.0);
        let (seen, cb) = recorder();
        observer.observe(ContainerId(1), cb);
        assert_eq!(*seen.borrow(), vec![MeasuredSize::new(64, 32)]);
        observer.report(ContainerId(1), 64.0, 32.0);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(
            observer.current_size(ContainerId(1)),
            Some(MeasuredSize::new(64, 32))
        );
    }

    #[test]
    fn containers_are_independent() {
        let mut observer = SizeObserver::new();
        let (seen_a, cb_a) = recorder();
        let (seen_b, cb_b) = recorder();
        observer.observe(ContainerId(1), cb_a);
        observer.observe(ContainerId(2), cb_b);
        observer.report(ContainerId(2), 10.0, 10.0);
        assert!(seen_a.borrow().is_empty());
        assert_eq!(seen_b.borrow().len(), 1);
    }

    #[test]
    fn unobserve_is_idempotent() {
        let mut observer = SizeObserver::new();
        let (seen, cb) = recorder();
        let sub = observer.observe(ContainerId(1), cb);
        assert!(observer.unobserve(sub));
        assert!(!observer.unobserve(sub));
        observer.report(ContainerId(1), 10.0, 10.0);
        assert!(seen.borrow().is_empty());
        assert_eq!(observer.active_subscriptions(), 0);
    }

    #[test]
    fn last_unobserve_forgets_size() {
        let mut observer = SizeObserver::new();
        let (_, cb_a) = recorder();
        let (_, cb_b) = recorder();
        let first = observer.observe(ContainerId(1), cb_a);
        let second = observer.observe(ContainerId(1), cb_b);
        observer.report(ContainerId(1), 80.0, 20.0);

        assert!(observer.unobserve(first));
        assert_eq!(
            observer.current_size(ContainerId(1)),
            Some(MeasuredSize::new(80, 20))
        );
        assert!(observer.unobserve(second));
        assert_eq!(observer.current_size(ContainerId(1)), None);

        let (seen, cb) = recorder();
        observer.observe(ContainerId(1), cb);
        assert!(seen.borrow().is_empty());
        observer.report(ContainerId(1), 80.0, 20.0);
        assert_eq!(*seen.borrow(), vec![MeasuredSize::new(80, 20)]);
    }

    #[test]
    fn removing_container_drops_watchers() {
        let mut observer = SizeObserver::new();
        let (_, cb_a) = recorder();
        let (_, cb_b) = recorder();
        let (_, cb_c) = recorder();
        observer.observe(ContainerId(1), cb_a);
        let other = observer.observe(ContainerId(2), cb_b);
        observer.observe(ContainerId(1), cb_c);
        observer.report(ContainerId(1), 5.0, 5.0);
        assert_eq!(observer.remove_container(ContainerId(1)), 2);
        assert_eq!(observer.current_size(ContainerId(1)), None);
        assert_eq!(observer.active_subscriptions(), 1);
        assert!(observer.unobserve(other));
    }

    #[test]
    fn callbacks_drop_with_subscription() {
        let mut observer = SizeObserver::new();
        let token = Rc::new(());
        let held = Rc::clone(&token);
        let sub = observer.observe(ContainerId(1), move |_| {
            let _ = &held;
        });
        assert_eq!(Rc::strong_count(&token), 2);
        observer.unobserve(sub);
        assert_eq!(Rc::strong_count(&token), 1);
    }
}
