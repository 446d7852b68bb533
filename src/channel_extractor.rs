//! Per-channel views of a captured window.
//!
//! Extraction only reads the buffer, so several channels can be pulled from
//! the same window concurrently once its end pointer is fixed.

use crate::capture_buffer::CaptureBuffer;
use polars::prelude::*;

const SAMPLE_COLUMN_NAME: &str = "sample";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrder {
    OldestFirst,
    NewestFirst,
}

/// The `k`-th sample index for position `i` of a window of `len` samples.
#[inline]
fn lookback_for(order: SampleOrder, len: usize, i: usize) -> usize {
    match order {
        SampleOrder::OldestFirst => len - i,
        SampleOrder::NewestFirst => i + 1,
    }
}

/// Channel `channel` of the last `window_size` samples written before
/// `end_pointer`, oldest first.
///
/// With partial history the result holds only `valid_count` samples.
pub fn extract(
    buffer: &CaptureBuffer,
    end_pointer: usize,
    window_size: usize,
    channel: u32,
) -> Vec<bool> {
    extract_ordered(buffer, end_pointer, window_size, channel, SampleOrder::OldestFirst)
}

/// Same window as [`extract`], newest sample first.
pub fn extract_newest_first(
    buffer: &CaptureBuffer,
    end_pointer: usize,
    window_size: usize,
    channel: u32,
) -> Vec<bool> {
    extract_ordered(buffer, end_pointer, window_size, channel, SampleOrder::NewestFirst)
}

pub fn extract_ordered(
    buffer: &CaptureBuffer,
    end_pointer: usize,
    window_size: usize,
    channel: u32,
    order: SampleOrder,
) -> Vec<bool> {
    debug_assert!(channel < u32::BITS, "channel {} out of range", channel);
    let len = window_size.min(buffer.valid_count());
    (0..len)
        .map(|i| {
            let sample = buffer.sample_before(end_pointer, lookback_for(order, len, i));
            (sample >> channel) & 1 == 1
        })
        .collect()
}

/// One oldest-first sequence per channel in `channels`.
pub fn extract_all(
    buffer: &CaptureBuffer,
    end_pointer: usize,
    window_size: usize,
    channels: impl IntoIterator<Item = u32>,
) -> Vec<Vec<bool>> {
    channels
        .into_iter()
        .map(|channel| extract(buffer, end_pointer, window_size, channel))
        .collect()
}

/// A window of samples ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    pub end_pointer: usize,
    pub len: usize,
    pub triggered: bool,
}

impl CaptureWindow {
    pub fn channel(&self, buffer: &CaptureBuffer, channel: u32, order: SampleOrder) -> Vec<bool> {
        extract_ordered(buffer, self.end_pointer, self.len, channel, order)
    }

    /// Whole samples of the window, oldest first.
    pub fn samples(&self, buffer: &CaptureBuffer) -> Vec<u32> {
        let len = self.len.min(buffer.valid_count());
        (0..len)
            .map(|i| buffer.sample_before(self.end_pointer, len - i))
            .collect()
    }

    /// Tabular view with a `sample` index column and one `bit_<n>` column per
    /// channel, oldest sample in the first row.
    pub fn to_dataframe(&self, buffer: &CaptureBuffer, channels: u32) -> PolarsResult<DataFrame> {
        let len = self.len.min(buffer.valid_count());
        let index: Vec<u32> = (0..len as u32).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(channels as usize + 1);
        columns.push(Series::new(SAMPLE_COLUMN_NAME.into(), index).into());
        for channel in 0..channels {
            let values = self.channel(buffer, channel, SampleOrder::OldestFirst);
            columns.push(Series::new(format!("bit_{}", channel).into(), values).into());
        }

        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(window: usize, samples: &[u32]) -> CaptureBuffer {
        let mut buffer = CaptureBuffer::with_capacity(window, 16);
        for &sample in samples {
            buffer.push(sample);
        }
        buffer
    }

    #[test]
    fn test_extract_oldest_first() {
        let buffer = filled(4, &[0b00, 0b01, 0b10, 0b11, 0b01]);
        let end = buffer.write_pointer();
        assert_eq!(extract(&buffer, end, 4, 0), vec![true, false, true, true]);
        assert_eq!(extract(&buffer, end, 4, 1), vec![false, true, true, false]);
        assert_eq!(
            extract_newest_first(&buffer, end, 4, 0),
            vec![true, true, false, true]
        );
        assert_eq!(
            extract_ordered(&buffer, end, 4, 1, SampleOrder::NewestFirst),
            vec![false, true, true, false]
        );
    }

    #[test]
    fn test_partial_history() {
        let buffer = filled(8, &[0x1, 0x0, 0x1]);
        let bits = extract(&buffer, buffer.write_pointer(), 8, 0);
        assert_eq!(bits, vec![true, false, true]);
    }

    #[test]
    fn test_extract_all_channels() {
        let buffer = filled(2, &[0b101, 0b010]);
        let all = extract_all(&buffer, buffer.write_pointer(), 2, 0..3);
        assert_eq!(
            all,
            vec![vec![true, false], vec![false, true], vec![true, false]]
        );
    }

    #[test]
    fn test_extract_from_frozen_pointer() {
        let mut buffer = filled(2, &[0x1, 0x1]);
        let frozen = buffer.write_pointer();
        buffer.push(0x0);
        buffer.push(0x0);
        assert_eq!(extract(&buffer, frozen, 2, 0), vec![true, true]);
        assert_eq!(
            extract(&buffer, buffer.write_pointer(), 2, 0),
            vec![false, false]
        );
    }

    #[test]
    fn test_window_to_dataframe() {
        let buffer = filled(3, &[0b01, 0b10, 0b11]);
        let window = CaptureWindow {
            end_pointer: buffer.write_pointer(),
            len: 3,
            triggered: false,
        };
        assert_eq!(window.samples(&buffer), vec![0b01, 0b10, 0b11]);

        let df = window.to_dataframe(&buffer, 2).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        let bit1: Vec<bool> = df
            .column("bit_1")
            .unwrap()
            .bool()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(bit1, vec![false, true, true]);
    }
}
