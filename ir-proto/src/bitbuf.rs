//! Packed little-endian bit access on a byte buffer.
//!
//! Byte `b[i]` holds samples `8i..8i+7`, bit 0 of each byte being the
//! earliest sample. This is the wire layout described in the waveform
//! format: one bit per 100us tick, least-significant bit first.

use bitvec::prelude::*;

/// Returns bit `idx` of `buf`.
///
/// `idx` must be within `buf.len() * 8`; out-of-bounds access is a
/// programming error, not a recoverable condition.
pub(crate) fn get_bit(buf: &[u8], idx: usize) -> u8 {
    buf.view_bits::<Lsb0>()[idx] as u8
}

/// Sets bit `idx` of `buf` to 1. Never clears; the forger always starts
/// from a zeroed buffer and has no need to unset a bit.
pub(crate) fn set_bit(buf: &mut [u8], idx: usize) {
    buf.view_bits_mut::<Lsb0>().set(idx, true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_individual_bits() {
        let mut buf = [0u8; 4];
        set_bit(&mut buf, 0);
        set_bit(&mut buf, 7);
        set_bit(&mut buf, 8);
        set_bit(&mut buf, 31);

        assert_eq!(buf, [0b1000_0001, 0b0000_0001, 0, 0b1000_0000]);
        assert_eq!(get_bit(&buf, 0), 1);
        assert_eq!(get_bit(&buf, 1), 0);
        assert_eq!(get_bit(&buf, 7), 1);
        assert_eq!(get_bit(&buf, 8), 1);
        assert_eq!(get_bit(&buf, 31), 1);
        assert_eq!(get_bit(&buf, 30), 0);
    }

    #[test]
    fn byte_pair_is_read_low_bit_first_high_byte_first() {
        // Mirrors how NEC packs a 16-bit custom code: custom_bytes[0] is
        // the high byte, custom_bytes[1] is the low byte, and bits are
        // read LSB-first within each byte before moving to the next.
        let custom: u16 = 0x1234;
        let custom_bytes = [(custom >> 8) as u8, (custom & 0xff) as u8];
        let mut rebuilt = 0u16;
        for idx in 0..16 {
            if get_bit(&custom_bytes, idx) != 0 {
                rebuilt |= 1 << idx;
            }
        }
        // bit 0 of custom_bytes[0] (0x12's LSB) lands in rebuilt's bit 0,
        // bit 7 of custom_bytes[1] (0x34's MSB) lands in rebuilt's bit 15.
        assert_eq!(rebuilt, 0x1234);
    }
}
