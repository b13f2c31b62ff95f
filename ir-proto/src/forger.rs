//! Waveform synthesis: the inverse of the analyzer.
//!
//! A [`Forger`] accumulates a sequence of mark/space durations into a
//! packed sample buffer, the same `100us`-per-bit layout the analyzer
//! reads. Unlike the reference implementation this never writes past
//! the end of the caller's buffer: once the buffer is full, further
//! `emit_*` calls are silently truncated rather than overrunning it.

use crate::bitbuf::set_bit;
use crate::TICK_US;

/// Builds a waveform into a caller-owned buffer, one mark/space run at
/// a time.
pub struct Forger<'a> {
    buf: &'a mut [u8],
    t: u32,
    t_flip: u32,
}

impl<'a> Forger<'a> {
    /// Zeroes `buf` and starts a new waveform at `t = 0`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        buf.fill(0);
        Forger { buf, t: 0, t_flip: 0 }
    }

    /// Current synthesis time, in microseconds since the start of the
    /// waveform. Useful for computing a cycle's padding target with
    /// [`Forger::emit_until`].
    pub fn elapsed_us(&self) -> u32 {
        self.t
    }

    /// Emits `duration` more microseconds at the given level (1 = mark,
    /// 0 = space).
    pub fn emit_dur(&mut self, level: u8, duration: u32) {
        self.t_flip = self.t_flip.saturating_add(duration);
        self.advance(level);
    }

    /// Emits at the given level until the waveform reaches absolute
    /// time `until` (not relative to the current position). Used to pad
    /// a cycle's trailing space out to a fixed cycle length.
    pub fn emit_until(&mut self, level: u8, until: u32) {
        self.t_flip = until;
        self.advance(level);
    }

    /// Emits a mark of `high_len` immediately followed by a space of
    /// `low_len`.
    pub fn emit_pulse(&mut self, high_len: u32, low_len: u32) {
        self.emit_dur(1, high_len);
        self.emit_dur(0, low_len);
    }

    fn advance(&mut self, level: u8) {
        let capacity_us = (self.buf.len() as u64) * 8 * (TICK_US as u64);
        while (self.t as u64) < (self.t_flip as u64).min(capacity_us) {
            if level == 1 {
                set_bit(self.buf, (self.t / TICK_US) as usize);
            }
            self.t += TICK_US;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_dur_marks_the_right_ticks() {
        let mut buf = [0u8; 2];
        let mut fger = Forger::new(&mut buf);
        fger.emit_dur(1, 300);
        fger.emit_dur(0, 200);
        // 3 ticks high, 2 ticks low: bits 0,1,2 set, bits 3,4 clear.
        assert_eq!(buf[0], 0b0000_0111);
    }

    #[test]
    fn emit_until_pads_to_an_absolute_time() {
        let mut buf = [0u8; 2];
        let mut fger = Forger::new(&mut buf);
        fger.emit_dur(1, 100);
        fger.emit_until(0, 500);
        assert_eq!(fger.elapsed_us(), 500);
        assert_eq!(buf[0], 0b0000_0001);
    }

    #[test]
    fn never_writes_past_the_buffer_end() {
        let mut buf = [0u8; 1];
        let mut fger = Forger::new(&mut buf);
        fger.emit_dur(1, 2000);
        assert_eq!(buf[0], 0xff);
    }
}
