//! Bounded LIFO shared between its owning worker and thieves.

use crossbeam_utils::Backoff;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Fixed-capacity stack of continuations.
///
/// The owning worker pushes and drains it; any other worker may pop from it while stealing.
/// Every operation takes a short spin lock, except pops that observe an empty stack, which return without locking.
pub struct WorkStack<T: Copy, const CAPACITY: usize> {
    locked: AtomicBool,
    /// Number of occupied slots. Only written while the lock is held.
    count: AtomicUsize,
    items: UnsafeCell<[MaybeUninit<T>; CAPACITY]>,
}

// Safety: all access to `items` happens under the spin lock.
unsafe impl<T: Copy + Send, const CAPACITY: usize> Send for WorkStack<T, CAPACITY> {}
unsafe impl<T: Copy + Send, const CAPACITY: usize> Sync for WorkStack<T, CAPACITY> {}

struct WorkStackGuard<'a> {
    locked: &'a AtomicBool,
}

impl Drop for WorkStackGuard<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.locked.store(false, Ordering::Release);
    }
}

impl<T: Copy, const CAPACITY: usize> Default for WorkStack<T, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const CAPACITY: usize> WorkStack<T, CAPACITY> {
    pub fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            count: AtomicUsize::new(0),
            items: UnsafeCell::new([const { MaybeUninit::uninit() }; CAPACITY]),
        }
    }

    #[inline(always)]
    fn lock(&self) -> WorkStackGuard<'_> {
        let backoff = Backoff::new();
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return WorkStackGuard {
                    locked: &self.locked,
                };
            }
            while self.locked.load(Ordering::Relaxed) {
                backoff.snooze();
            }
        }
    }

    /// Maximum number of items the stack can hold.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Number of items at the time of the call. May be stale by the time it is used.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to push an item.
    ///
    /// Returns false and leaves the stack untouched if it is full.
    pub fn push(&self, item: T) -> bool {
        let _guard = self.lock();
        let count = self.count.load(Ordering::Relaxed);
        if count >= CAPACITY {
            return false;
        }
        // Safety: the lock is held and count < CAPACITY.
        unsafe {
            (*self.items.get())[count].write(item);
        }
        self.count.store(count + 1, Ordering::Release);
        true
    }

    /// Attempts to pop the most recently pushed item.
    pub fn pop(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let _guard = self.lock();
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return None;
        }
        let new_count = count - 1;
        // Safety: the lock is held and slot new_count was initialized by the push that raised count past it.
        let item = unsafe { (*self.items.get())[new_count].assume_init() };
        self.count.store(new_count, Ordering::Release);
        Some(item)
    }
}
