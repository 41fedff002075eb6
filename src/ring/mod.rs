//! Rolling 60-slot counters keyed by second-of-minute.
//!
//! The head tracks the current wall-clock second. A single driver moves it
//! forward with [`RingBuffer::tick`], which clears the slot that will become
//! the next head so counts from a minute ago never leak into a new window.
//! Every slot other than the head and the one right after it holds a frozen
//! count for that second within the last minute.

/// Number of slots, one per second of a minute.
pub const SLOTS: usize = 60;
const SLOTS_I64: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBuffer {
    slots: [i64; SLOTS],
    head: usize,
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RingBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [0; SLOTS],
            head: 0,
        }
    }

    /// Creates an empty buffer whose head already sits on `second`.
    #[must_use]
    pub const fn starting_at(second: u32) -> Self {
        Self {
            slots: [0; SLOTS],
            head: wrap_second(second),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        SLOTS
    }

    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    #[must_use]
    pub const fn as_slots(&self) -> &[i64; SLOTS] {
        &self.slots
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.value_at(self.head)
    }

    /// Value of slot `index mod 60`.
    #[must_use]
    pub fn value_at(&self, index: usize) -> i64 {
        self.slots.get(index % SLOTS).copied().unwrap_or(0)
    }

    /// Value `offset` slots away from the head; negative offsets look back.
    #[must_use]
    pub fn value_at_relative(&self, offset: i64) -> i64 {
        self.value_at(self.relative_index(offset))
    }

    #[must_use]
    pub fn previous_value(&self) -> i64 {
        self.value_at_relative(-1)
    }

    pub fn increment_head(&mut self) -> i64 {
        self.add_to_head(1)
    }

    pub fn add_to_head(&mut self, value: i64) -> i64 {
        self.add_at(self.head, value)
    }

    pub fn increment_at(&mut self, index: usize) -> i64 {
        self.add_at(index, 1)
    }

    /// Adds `value` to slot `index mod 60` and returns the new slot total.
    pub fn add_at(&mut self, index: usize, value: i64) -> i64 {
        match self.slots.get_mut(index % SLOTS) {
            Some(slot) => {
                *slot = slot.saturating_add(value);
                *slot
            }
            None => 0,
        }
    }

    /// Moves the head one slot forward without touching any counts.
    pub const fn advance_head(&mut self) {
        self.head = (self.head.wrapping_add(1)) % SLOTS;
    }

    /// Moves the head `delta` slots forward without touching any counts.
    pub const fn advance_head_by(&mut self, delta: usize) {
        self.head = (self.head.wrapping_add(delta % SLOTS)) % SLOTS;
    }

    /// Zeroes the slot right after the head.
    pub fn reset_next(&mut self) {
        let next = (self.head.wrapping_add(1)) % SLOTS;
        if let Some(slot) = self.slots.get_mut(next) {
            *slot = 0;
        }
    }

    /// One driver step: advance the head, then clear the slot ahead of it.
    pub fn tick(&mut self) {
        self.advance_head();
        self.reset_next();
    }

    /// Ticks until the head reaches `second`, returning the number of steps.
    ///
    /// A late timer still clears every slot it walks past.
    pub fn sync_to(&mut self, second: u32) -> usize {
        let target = wrap_second(second);
        let mut steps = 0usize;
        while self.head != target && steps < SLOTS {
            self.tick();
            steps = steps.saturating_add(1);
        }
        steps
    }

    /// Sum of the `n` slots preceding the head (the head itself excluded).
    ///
    /// `n` is clamped to 60; with `n == 60` the walk wraps back onto the head,
    /// so the result covers every slot.
    #[must_use]
    pub fn sum_of_previous_n(&self, n: usize) -> i64 {
        let n = i64::try_from(n.min(SLOTS)).unwrap_or(SLOTS_I64);
        (1..=n)
            .map(|back| self.value_at_relative(back.saturating_neg()))
            .fold(0i64, i64::saturating_add)
    }

    #[must_use]
    pub fn max(&self) -> i64 {
        self.slots.iter().copied().fold(0, i64::max)
    }

    fn relative_index(&self, offset: i64) -> usize {
        let head = i64::try_from(self.head).unwrap_or(0);
        let index = head
            .saturating_add(offset.rem_euclid(SLOTS_I64))
            .rem_euclid(SLOTS_I64);
        usize::try_from(index).unwrap_or(0)
    }
}

const fn wrap_second(second: u32) -> usize {
    (second % 60) as usize
}

#[cfg(test)]
mod tests;
