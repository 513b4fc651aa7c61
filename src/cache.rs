// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Bounded LRU cache backed by an index-based arena: a Vec<Slot> allocated
// once at capacity, wired into a doubly-linked ring via Option<usize>
// indices. No raw pointers, no aliasing hazards, capacity fixed at init.

use std::sync::Mutex;

struct Slot {
    key: String,
    value: String,
    prev: Option<usize>,
    next: Option<usize>,
    occupied: bool,
}

struct Inner {
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    capacity: usize,
}

impl Inner {
    fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(Slot {
                key: String::new(),
                value: String::new(),
                prev: None,
                next: None,
                occupied: false,
            });
        }
        Inner {
            slots,
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        if let Some(h) = self.head {
            self.slots[h].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn find(&self, key: &str) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, s)| s.occupied && s.key == key)
            .map(|(i, _)| i)
    }

    fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.occupied)
    }
}

/// A fixed-capacity, thread-safe least-recently-used cache mapping request
/// text to its MD5 digest.
pub struct Cache {
    inner: Mutex<Inner>,
}

impl Cache {
    /// Allocates a cache holding up to `capacity` entries. `capacity` must
    /// be greater than zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be positive");
        Cache {
            inner: Mutex::new(Inner::new(capacity)),
        }
    }

    /// Looks up `key`. On a hit, the entry becomes most-recently-used and
    /// its value is returned.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        let idx = inner.find(key)?;
        if inner.head != Some(idx) {
            inner.unlink(idx);
            inner.push_front(idx);
        }
        Some(inner.slots[idx].value.clone())
    }

    /// Records `key -> value`. If the cache is full, the least-recently-used
    /// entry is overwritten; otherwise an unused slot is claimed. Intended
    /// to be called only after a `get` miss for `key` (not an upsert).
    pub fn put(&self, key: &str, value: &str) {
        let mut inner = self.inner.lock().unwrap();
        let idx = if inner.len < inner.capacity {
            let idx = inner.first_free().expect("len < capacity implies a free slot");
            inner.len += 1;
            idx
        } else {
            let tail = inner.tail.expect("full cache has a tail");
            inner.unlink(tail);
            tail
        };
        inner.slots[idx].key = key.to_string();
        inner.slots[idx].value = value.to_string();
        inner.slots[idx].occupied = true;
        inner.push_front(idx);
    }

    /// Returns all live entries ordered most-recently-used first.
    pub fn snapshot_and_drain(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::with_capacity(inner.len);
        let mut cur = inner.head;
        while let Some(idx) = cur {
            out.push((inner.slots[idx].key.clone(), inner.slots[idx].value.clone()));
            cur = inner.slots[idx].next;
        }
        out
    }

    /// Discards all entries and reinitializes the cache at its original
    /// capacity.
    pub fn clear_and_reinit(&self) {
        let mut inner = self.inner.lock().unwrap();
        let capacity = inner.capacity;
        *inner = Inner::new(capacity);
    }

    /// Number of live entries currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
