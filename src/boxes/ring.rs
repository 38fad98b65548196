use super::{StereoFrame, SynthBox};

/*
Circular Buffer Box
===================

A fixed ring of float slots fed by change events and drained by the mixer.
Each change event stores one (value, elem) pair; each mixed frame takes one
pair back out as (left, right). The host can therefore stream arbitrary
stereo audio (or value/envelope data) into a channel a block at a time.

  slots:  [ v0 e0 v1 e1 v2 e2 .. .. .. .. ]
            ^head             ^tail
            next read         next write

  occupied = size - free

Writes and reads always move two slots, so head and tail stay even and a
pair never straddles the wrap point.

Back-pressure
-------------
A write into a full ring is dropped. Nothing is reported; the host is
expected to check `free()` (or slow down) before writing more.

A read from an empty ring contributes nothing: the channel keeps whatever
pair it already had for this frame instead of being forced to zero.
*/

/// Ring capacity in float slots (1024 stereo pairs).
pub const CUSTOM_BUF: usize = 1024 * 2;

/// Fill state of a [`RingBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    Empty,
    Partial,
    Full,
}

#[derive(Debug, Clone)]
pub struct RingBox {
    data: Vec<f32>,
    head: usize,
    tail: usize,
    size: usize,
    free: usize,
}

impl RingBox {
    pub fn new() -> Self {
        Self {
            data: vec![0.0; CUSTOM_BUF],
            head: 0,
            tail: 0,
            size: CUSTOM_BUF,
            free: CUSTOM_BUF,
        }
    }

    /// Store one pair. Returns `false` when the ring was full and the pair
    /// was dropped.
    pub fn write(&mut self, value: f32, elem: f32) -> bool {
        if self.free == 0 {
            return false;
        }

        let pos = self.tail;
        self.data[pos % self.size] = value;
        self.data[(pos + 1) % self.size] = elem;
        self.tail = (pos + 2) % self.size;
        self.free -= 2;
        true
    }

    /// Take the oldest pair, if any.
    pub fn read(&mut self) -> Option<StereoFrame> {
        if self.occupied() == 0 {
            return None;
        }

        let left = self.data[self.head % self.size];
        let right = self.data[(self.head + 1) % self.size];
        self.head = (self.head + 2) % self.size;
        self.free += 2;
        Some((left, right))
    }

    pub fn state(&self) -> RingState {
        match self.free {
            0 => RingState::Full,
            free if free == self.size => RingState::Empty,
            _ => RingState::Partial,
        }
    }

    /// Free slots (two per pair).
    pub fn free(&self) -> usize {
        self.free
    }

    /// Pairs that can still be written before the ring is full.
    pub fn free_pairs(&self) -> usize {
        self.free / 2
    }

    pub fn occupied(&self) -> usize {
        self.size - self.free
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tail(&self) -> usize {
        self.tail
    }
}

impl Default for RingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthBox for RingBox {
    fn change(&mut self, _param: i32, elem: f32, value: f32) {
        self.write(value, elem);
    }

    fn next_stereo(&mut self) -> Option<StereoFrame> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ring = RingBox::new();
        assert_eq!(ring.state(), RingState::Empty);
        assert_eq!(ring.free(), CUSTOM_BUF);
        assert_eq!(ring.head(), 0);
        assert_eq!(ring.tail(), 0);
    }

    #[test]
    fn pairs_come_out_in_write_order() {
        let mut ring = RingBox::new();
        for i in 0..10 {
            ring.change(0, -(i as f32), i as f32);
        }
        assert_eq!(ring.state(), RingState::Partial);
        assert_eq!(ring.free(), CUSTOM_BUF - 20);

        for i in 0..10 {
            // value first, elem second
            assert_eq!(ring.next_stereo(), Some((i as f32, -(i as f32))));
        }
        assert_eq!(ring.free(), CUSTOM_BUF);
        assert_eq!(ring.state(), RingState::Empty);
    }

    #[test]
    fn write_when_full_is_dropped() {
        let mut ring = RingBox::new();
        for i in 0..CUSTOM_BUF / 2 {
            assert!(ring.write(i as f32, 0.0));
        }
        assert_eq!(ring.state(), RingState::Full);

        let tail = ring.tail();
        assert!(!ring.write(99.0, 99.0));
        assert_eq!(ring.free(), 0);
        assert_eq!(ring.tail(), tail);

        // Oldest pair is still the first one written
        assert_eq!(ring.read(), Some((0.0, 0.0)));
    }

    #[test]
    fn read_when_empty_contributes_nothing() {
        let mut ring = RingBox::new();
        assert_eq!(ring.next_stereo(), None);
        assert_eq!(ring.free(), CUSTOM_BUF);
        assert_eq!(ring.head(), 0);
    }

    #[test]
    fn indices_wrap_around() {
        let mut ring = RingBox::new();
        // Walk head and tail most of the way round
        for i in 0..CUSTOM_BUF / 2 - 1 {
            ring.write(i as f32, 0.0);
            ring.read();
        }
        assert_eq!(ring.tail(), CUSTOM_BUF - 2);

        ring.write(1.0, 2.0);
        ring.write(3.0, 4.0);
        assert_eq!(ring.tail(), 2);
        assert_eq!(ring.read(), Some((1.0, 2.0)));
        assert_eq!(ring.read(), Some((3.0, 4.0)));
        assert_eq!(ring.head(), 2);
        assert_eq!(ring.state(), RingState::Empty);
    }
}
