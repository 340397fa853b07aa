#![forbid(unsafe_code)]

//! Cooperative fixed-delay task scheduler on virtual time.
//!
//! A [`Scheduler<T>`] stores task bodies of type `T` together with their
//! deadlines. Time only moves when the owner calls [`Scheduler::advance`],
//! which returns every body that became due. Bodies are plain data: the
//! owner matches on them and runs the corresponding logic itself, so a body
//! may freely mutate the owner and schedule new tasks.
//!
//! # Invariants
//!
//! 1. A cancelled task's body is dropped and never returned by `advance`.
//! 2. Due bodies are returned in deadline order; ties keep scheduling order.
//! 3. A body scheduled with zero delay is returned by the next `advance`,
//!    even when that advance is by `Duration::ZERO`.
//! 4. [`TaskSlot`] holds at most one pending task: replacing it cancels the
//!    previous one first.

use std::time::Duration;

/// Opaque token for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancellableTask(u64);

impl CancellableTask {
    /// Raw sequence number (for logging).
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Entry<T> {
    task: CancellableTask,
    due: Duration,
    body: T,
}

/// Deadline-ordered queue of deferred bodies.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at virtual time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Virtual time elapsed since creation.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending tasks.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue `body` to become due after `delay`.
    pub fn schedule(&mut self, delay: Duration, body: T) -> CancellableTask {
        let task = CancellableTask(self.next_id);
        self.next_id += 1;
        self.pending.push(Entry {
            task,
            due: self.now.saturating_add(delay),
            body,
        });
        task
    }

    /// Cancel `task`. Returns `true` if it was still pending.
    pub fn cancel(&mut self, task: CancellableTask) -> bool {
        let Some(pos) = self.pending.iter().position(|e| e.task == task) else {
            return false;
        };
        self.pending.remove(pos);
        true
    }

    /// Whether `task` has neither fired nor been cancelled.
    pub fn is_pending(&self, task: CancellableTask) -> bool {
        self.pending.iter().any(|e| e.task == task)
    }

    /// Time left until `task` is due, if still pending.
    pub fn remaining(&self, task: CancellableTask) -> Option<Duration> {
        self.pending
            .iter()
            .find(|e| e.task == task)
            .map(|e| e.due.saturating_sub(self.now))
    }

    /// Borrow the body of a pending task.
    pub fn body(&self, task: CancellableTask) -> Option<&T> {
        self.pending.iter().find(|e| e.task == task).map(|e| &e.body)
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move virtual time forward and return every body that became due.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("scheduler.advance", pending = self.pending.len()).entered();

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.due, e.task.0));
        due.into_iter().map(|e| e.body).collect()
    }
}

/// Holder for the single pending task of one deferred kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskSlot {
    task: Option<CancellableTask>,
}

impl TaskSlot {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { task: None }
    }

    /// Cancel whatever this slot holds, then schedule `body`.
    pub fn replace<T>(
        &mut self,
        scheduler: &mut Scheduler<T>,
        delay: Duration,
        body: T,
    ) -> CancellableTask {
        self.cancel(scheduler);
        let task = scheduler.schedule(delay, body);
        self.task = Some(task);
        task
    }

    /// Cancel the held task. Returns `true` if one was still pending.
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        self.task
            .take()
            .is_some_and(|task| scheduler.cancel(task))
    }

    /// Whether the held task is still pending.
    pub fn is_pending<T>(&self, scheduler: &Scheduler<T>) -> bool {
        self.task.is_some_and(|task| scheduler.is_pending(task))
    }

    /// Forget the held token without cancelling (after it fired).
    pub fn clear(&mut self) {
        self.task = None;
    }

    /// The held token, if any.
    #[inline]
    pub fn task(&self) -> Option<CancellableTask> {
        self.task
    }
}
