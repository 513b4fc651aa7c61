// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// FIFO handoff queue between the acceptor and the worker pool. Mirrors the
// mutex+condvar+quit-flag shape used elsewhere in this codebase for waking
// blocked threads, but uses plain std::sync primitives since the handoff is
// in-process rather than cross-process.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct State<T> {
    items: VecDeque<T>,
    shutting_down: bool,
}

/// A thread-safe FIFO queue with a blocking pop and a cooperative shutdown
/// that wakes every blocked waiter.
pub struct Queue<T> {
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Queue {
            state: Mutex::new(State {
                items: VecDeque::new(),
                shutting_down: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends `item` and wakes one blocked waiter.
    pub fn push(&self, item: T) {
        let mut state = self.state.lock().unwrap();
        state.items.push_back(item);
        self.available.notify_one();
    }

    /// Blocks until an item is available or the queue is shut down, in
    /// which case `None` is returned. A single push that transitions the
    /// queue from empty to non-empty is always eventually observed by some
    /// waiter.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.shutting_down {
                return None;
            }
            state = self.available.wait(state).unwrap();
        }
    }

    /// Marks the queue as shut down and wakes every blocked waiter. A
    /// single `notify_one` here would be a latent bug whenever more than
    /// one worker is blocked; `notify_all` guarantees every waiter wakes
    /// and observes the shutdown.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        state.shutting_down = true;
        self.available.notify_all();
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}
