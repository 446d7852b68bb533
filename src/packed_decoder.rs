//! Unpacking of transfer words into samples.

use crate::packed_mode::PackedMode;
use std::ops::Deref;

/// Most samples one transfer word can carry (1-bit samples in a long).
pub const MAX_SAMPLES_PER_WORD: usize = 32;

/// Samples unpacked from one transfer word, stored inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSamples {
    values: [i64; MAX_SAMPLES_PER_WORD],
    len: usize,
}

impl DecodedSamples {
    fn empty() -> Self {
        Self {
            values: [0; MAX_SAMPLES_PER_WORD],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, value: i64) {
        self.values[self.len] = value;
        self.len += 1;
    }
}

impl Deref for DecodedSamples {
    type Target = [i64];

    fn deref(&self) -> &[i64] {
        &self.values[..self.len]
    }
}

impl<'a> IntoIterator for &'a DecodedSamples {
    type Item = &'a i64;
    type IntoIter = std::slice::Iter<'a, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Unpack `word` according to `mode`.
///
/// Standard order puts sample 0 in the lowest `bits_per_sample` bits; the
/// alternate order reads the same groups starting from the highest one.
/// Bits above the container width are ignored.
pub fn decode(word: u32, mode: &PackedMode) -> DecodedSamples {
    let bits = mode.bits_per_sample();
    let count = mode.samples_per_word();
    let group_mask: u64 = (1u64 << bits) - 1;

    let mut samples = DecodedSamples::empty();
    for i in 0..count {
        let group = if mode.is_alternate() { count - 1 - i } else { i };
        let raw = (u64::from(word) >> (group as u32 * bits)) & group_mask;
        samples.push(extend(raw, bits, mode.is_signed()));
    }
    samples
}

#[inline]
fn extend(raw: u64, bits: u32, signed: bool) -> i64 {
    let value = raw as i64;
    if signed && raw & (1u64 << (bits - 1)) != 0 {
        value - (1i64 << bits)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed_mode::ContainerWidth;

    const WIDTHS: [ContainerWidth; 3] = [
        ContainerWidth::Byte,
        ContainerWidth::Word,
        ContainerWidth::Long,
    ];

    /// Inverse of the documented layout, used to build words from samples.
    fn pack(samples: &[i64], mode: &PackedMode) -> u32 {
        let bits = mode.bits_per_sample();
        let count = samples.len();
        let mask = (1u64 << bits) - 1;
        let mut word = 0u64;
        for (i, &sample) in samples.iter().enumerate() {
            let group = if mode.is_alternate() { count - 1 - i } else { i };
            word |= (sample as u64 & mask) << (group as u32 * bits);
        }
        word as u32
    }

    fn sample_values(count: usize, bits: u32, signed: bool) -> Vec<i64> {
        let span = 1i64 << bits;
        (0..count as i64)
            .map(|i| {
                let raw = (i * 0x9e37_79b9 + 7).rem_euclid(span);
                if signed && raw >= span / 2 {
                    raw - span
                } else {
                    raw
                }
            })
            .collect()
    }

    #[test]
    fn test_decode_round_trip_all_modes() {
        for container in WIDTHS {
            for bits in [1, 2, 4, 8, 16, 32] {
                for alternate in [false, true] {
                    for signed in [false, true] {
                        let Ok(mode) = PackedMode::new(bits, container, alternate, signed) else {
                            continue;
                        };
                        let expected = sample_values(mode.samples_per_word(), bits, signed);
                        let word = pack(&expected, &mode);
                        assert_eq!(&*decode(word, &mode), expected.as_slice(), "mode {}", mode);
                    }
                }
            }
        }
    }

    #[test]
    fn test_four_bit_sign_extension() {
        let mode = PackedMode::new(4, ContainerWidth::Byte, false, true).unwrap();
        assert_eq!(&*decode(0b0111_1000, &mode), &[-8, 7]);

        let unsigned = PackedMode::new(4, ContainerWidth::Byte, false, false).unwrap();
        assert_eq!(&*decode(0b0111_1000, &unsigned), &[8, 7]);
    }

    #[test]
    fn test_bytes_in_long() {
        let mode = PackedMode::new(8, ContainerWidth::Long, false, false).unwrap();
        assert_eq!(&*decode(0x0403_0201, &mode), &[0x01, 0x02, 0x03, 0x04]);

        let alternate = PackedMode::new(8, ContainerWidth::Long, true, false).unwrap();
        assert_eq!(&*decode(0x0403_0201, &alternate), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_unpacked_word() {
        assert_eq!(&*decode(0xdead_beef, &PackedMode::UNPACKED), &[0xdead_beef]);

        let signed = PackedMode::new(32, ContainerWidth::Long, false, true).unwrap();
        let decoded = decode(0xffff_ffff, &signed);
        assert_eq!(&*decoded, &[-1]);
        // The bit pattern is preserved for the capture buffer.
        assert_eq!(decoded[0] as u32, 0xffff_ffff);
    }

    #[test]
    fn test_container_ignores_upper_bits() {
        let mode = PackedMode::new(1, ContainerWidth::Byte, false, false).unwrap();
        let decoded = decode(0xffff_ff05, &mode);
        assert_eq!(&*decoded, &[1, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_one_bit_long_fills_capacity() {
        let mode = PackedMode::new(1, ContainerWidth::Long, true, false).unwrap();
        let decoded = decode(0x8000_0001, &mode);
        assert_eq!(decoded.len(), MAX_SAMPLES_PER_WORD);
        assert_eq!(decoded[0], 1);
        assert_eq!(decoded[31], 1);
        assert_eq!(decoded.iter().sum::<i64>(), 2);
    }
}
