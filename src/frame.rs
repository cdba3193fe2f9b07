//! Per-frame "about to render" notifications.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies the frame being rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub number: u64,
    /// Simulation time since the clock started
    pub seconds: f64,
}

pub struct Clock {
    frame: FrameTime,
    delta: Duration,
    last_update: Instant,
}

impl Clock {
    pub fn new() -> Clock {
        Clock {
            frame: FrameTime::default(),
            delta: Duration::from_secs(0),
            last_update: Instant::now(),
        }
    }

    pub fn now(&self) -> FrameTime {
        self.frame
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Advances by the wall-clock time since the previous update.
    pub fn update(&mut self) -> FrameTime {
        let delta_time = self.last_update.elapsed();
        self.advance(delta_time)
    }

    /// Advances by a fixed step.
    pub fn advance(&mut self, delta: Duration) -> FrameTime {
        self.last_update = Instant::now();
        self.delta = delta;
        self.frame.number += 1;
        self.frame.seconds += delta.as_secs_f64();
        self.frame
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle returned by [`FrameEvent::subscribe`]. Consumed when unsubscribing.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a Subscription leaves the listener attached with no way to remove it"]
pub struct Subscription {
    event: u64,
    id: u64,
}

type FrameCallback<C> = Rc<RefCell<dyn FnMut(&mut C, FrameTime)>>;

struct Listeners<C> {
    next_id: u64,
    entries: Vec<(u64, FrameCallback<C>)>,
}

/// A listener list raised once per frame with mutable access to `C` (usually the camera).
///
/// Cloning yields another handle to the same list.
pub struct FrameEvent<C> {
    event: u64,
    listeners: Rc<RefCell<Listeners<C>>>,
}

impl<C> FrameEvent<C> {
    pub fn new() -> Self {
        Self {
            event: NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed),
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&mut C, FrameTime) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        let callback: FrameCallback<C> = Rc::new(RefCell::new(callback));
        listeners.entries.push((id, callback));
        Subscription {
            event: self.event,
            id,
        }
    }

    /// Returns whether a listener was actually removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        if subscription.event != self.event {
            log::warn!("Ignoring a subscription that belongs to another event");
            return false;
        }
        let mut listeners = self.listeners.borrow_mut();
        let count = listeners.entries.len();
        listeners
            .entries
            .retain(|(id, _)| *id != subscription.id);
        listeners.entries.len() != count
    }

    pub fn is_subscribed(&self, subscription: &Subscription) -> bool {
        subscription.event == self.event && self.contains(subscription.id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.listeners
            .borrow()
            .entries
            .iter()
            .any(|(entry, _)| *entry == id)
    }

    /// Invokes every listener in subscription order.
    ///
    /// Listeners may subscribe or unsubscribe while the event is being raised. A listener removed
    /// mid-raise is not invoked afterwards, one added mid-raise first runs on the next raise.
    pub fn raise(&self, target: &mut C, time: FrameTime) {
        let snapshot: Vec<(u64, FrameCallback<C>)> = self.listeners.borrow().entries.clone();
        for (id, callback) in snapshot {
            if !self.contains(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(target, time),
                Err(_) => log::warn!("Skipping re-entrant frame listener {}", id),
            }
        }
    }
}

impl<C> Clone for FrameEvent<C> {
    fn clone(&self) -> Self {
        Self {
            event: self.event,
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<C> Default for FrameEvent<C> {
    fn default() -> Self {
        Self::new()
    }
}
