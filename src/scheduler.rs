//! Fixed-interval task scheduler.
//!
//! Tasks are plain functions invoked every `interval` base ticks with the
//! shared context. The embedding firmware calls [`Scheduler::tick`] once
//! per base tick (one display tick, see `config::DISPLAY_TICK_MS`); there
//! is no preemption and no reentrancy - a task runs to completion before
//! anything else is dispatched.
//!
//! A task can also be run out of band with [`Scheduler::trigger_now`],
//! which fires it immediately and restarts its countdown. The display
//! engine uses this so fresh text appears within one tick instead of
//! waiting for the next natural tick.

use crate::error::Error;
use heapless::Vec;

/// Task callback: receives the shared context.
pub type TaskFn<C> = fn(&mut C);

/// Opaque handle returned by [`Scheduler::register_periodic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle(u8);

struct Task<C> {
    callback: TaskFn<C>,
    interval: u16,
    remaining: u16,
    active: bool,
}

/// Cooperative fixed-slot scheduler.
pub struct Scheduler<C, const N: usize> {
    tasks: Vec<Task<C>, N>,
}

impl<C, const N: usize> Scheduler<C, N> {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Register a task to run every `interval` base ticks.
    ///
    /// An interval of 1 runs on every tick. Intervals of 0 are clamped
    /// to 1.
    pub fn register_periodic(
        &mut self,
        callback: TaskFn<C>,
        interval: u16,
    ) -> Result<TaskHandle, Error> {
        let interval = interval.max(1);
        let handle = TaskHandle(self.tasks.len() as u8);
        self.tasks
            .push(Task {
                callback,
                interval,
                remaining: interval,
                active: true,
            })
            .map_err(|_| Error::SchedulerFull)?;
        Ok(handle)
    }

    /// Deactivate a task. Its slot is retained so other handles stay valid.
    pub fn unregister(&mut self, handle: TaskHandle) {
        if let Some(task) = self.tasks.get_mut(handle.0 as usize) {
            task.active = false;
        }
    }

    /// Advance one base tick: run every task whose countdown expires.
    pub fn tick(&mut self, ctx: &mut C) {
        for task in self.tasks.iter_mut().filter(|t| t.active) {
            if task.remaining <= 1 {
                task.remaining = task.interval;
                (task.callback)(ctx);
            } else {
                task.remaining -= 1;
            }
        }
    }

    /// Run a task immediately, out of band, and restart its countdown.
    pub fn trigger_now(&mut self, handle: TaskHandle, ctx: &mut C) {
        if let Some(task) = self.tasks.get_mut(handle.0 as usize) {
            if task.active {
                task.remaining = task.interval;
                (task.callback)(ctx);
            }
        }
    }
}

impl<C, const N: usize> Default for Scheduler<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
