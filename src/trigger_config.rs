use std::fmt;

/// Number of channel bits a sample carries.
pub const MAX_CHANNELS: usize = 32;

/// Configuration that was out of range and has been pulled back into range.
///
/// These are never fatal: the capture keeps running with the clamped value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    #[error("Window size {requested} out of range, using {clamped}")]
    WindowSizeClamped { requested: usize, clamped: usize },

    #[error("Channel count {requested} out of range, using {clamped}")]
    ChannelCountClamped { requested: usize, clamped: usize },

    #[error("Trigger offset {requested} must be below the window size, using {clamped}")]
    LookbackClamped { requested: usize, clamped: usize },

    #[error("Trigger holdoff {requested} exceeds the buffer headroom, using {clamped}")]
    HoldoffClamped { requested: usize, clamped: usize },

    #[error("Trigger enabled with an empty mask, capturing untriggered")]
    EmptyMask,

    #[error("Match bits 0x{ignored:08x} lie outside the trigger mask and are ignored")]
    MatchOutsideMask { ignored: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BitState {
    High,
    Low,
    DontCare,
}

/// Builds a mask/match pair one channel at a time.
#[derive(Debug)]
pub struct BitTriggerBuilder {
    bit_states: [BitState; MAX_CHANNELS],
}

impl BitTriggerBuilder {
    pub fn new() -> Self {
        Self {
            bit_states: [BitState::DontCare; MAX_CHANNELS],
        }
    }

    pub fn bit(mut self, channel: usize, state: BitState) -> Self {
        assert!(
            channel < MAX_CHANNELS,
            "Channel {} out of range, must be between 0 and {}",
            channel,
            MAX_CHANNELS - 1
        );
        self.bit_states[channel] = state;
        self
    }

    pub fn high(self, channel: usize) -> Self {
        self.bit(channel, BitState::High)
    }

    pub fn low(self, channel: usize) -> Self {
        self.bit(channel, BitState::Low)
    }

    /// Fire when the configured channels match.
    pub fn matches(self) -> TriggerSpec {
        let mut mask = 0u32;
        let mut match_bits = 0u32;
        for (i, state) in self.bit_states.iter().enumerate() {
            if *state != BitState::DontCare {
                mask |= 1 << i;
            }
            if *state == BitState::High {
                match_bits |= 1 << i;
            }
        }
        TriggerSpec::new(mask, match_bits)
    }
}

impl Default for BitTriggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger configuration as supplied by the caller.
///
/// Offsets left as `None` take their defaults when resolved against a window:
/// half the window for the look-back offset and a full window for holdoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    pub enabled: bool,
    pub mask: u32,
    pub match_bits: u32,
    pub lookback_offset: Option<usize>,
    pub holdoff: Option<usize>,
}

impl TriggerSpec {
    pub fn new(mask: u32, match_bits: u32) -> Self {
        Self {
            enabled: true,
            mask,
            match_bits,
            lookback_offset: None,
            holdoff: None,
        }
    }

    /// Untriggered capture: every pushed sample is eligible for drawing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            mask: 0,
            match_bits: 0,
            lookback_offset: None,
            holdoff: None,
        }
    }

    pub fn when() -> BitTriggerBuilder {
        BitTriggerBuilder::new()
    }

    pub fn with_lookback_offset(mut self, offset: usize) -> Self {
        self.lookback_offset = Some(offset);
        self
    }

    pub fn with_holdoff(mut self, holdoff: usize) -> Self {
        self.holdoff = Some(holdoff);
        self
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.mask != 0
    }

    /// Pull the trigger settings into range for a buffer with the given window and headroom.
    ///
    /// Every adjustment is logged and returned; none of them is an error.
    pub fn resolve(
        &self,
        window_size: usize,
        headroom: usize,
    ) -> (ResolvedTrigger, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        if self.enabled && self.mask == 0 {
            warnings.push(ConfigWarning::EmptyMask);
        }
        let ignored = self.match_bits & !self.mask;
        if self.is_active() && ignored != 0 {
            warnings.push(ConfigWarning::MatchOutsideMask { ignored });
        }

        let max_lookback = window_size.saturating_sub(1);
        let requested = self.lookback_offset.unwrap_or(window_size / 2);
        let lookback_offset = requested.min(max_lookback);
        if lookback_offset != requested {
            warnings.push(ConfigWarning::LookbackClamped {
                requested,
                clamped: lookback_offset,
            });
        }

        let requested = self.holdoff.unwrap_or(window_size);
        let holdoff = requested.min(headroom);
        if holdoff != requested {
            warnings.push(ConfigWarning::HoldoffClamped {
                requested,
                clamped: holdoff,
            });
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        let resolved = ResolvedTrigger {
            active: self.is_active(),
            mask: self.mask,
            match_bits: self.match_bits & self.mask,
            lookback_offset,
            holdoff,
        };
        log::debug!("Trigger configured: {}", resolved);
        (resolved, warnings)
    }
}

impl Default for TriggerSpec {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Trigger settings with every value inside the range the engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTrigger {
    pub active: bool,
    pub mask: u32,
    pub match_bits: u32,
    pub lookback_offset: usize,
    pub holdoff: usize,
}

impl ResolvedTrigger {
    #[inline]
    pub fn condition_met(&self, sample: u32) -> bool {
        (sample ^ self.match_bits) & self.mask == 0
    }
}

impl fmt::Display for ResolvedTrigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.active {
            return write!(f, "off");
        }
        write!(
            f,
            "mask 0x{:08x} match 0x{:08x} offset {} holdoff {}",
            self.mask, self.match_bits, self.lookback_offset, self.holdoff
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_builder_mask_and_match() {
        let spec = TriggerSpec::when()
            .high(0)
            .low(1)
            .bit(7, BitState::High)
            .bit(3, BitState::DontCare)
            .matches();
        assert_eq!(spec.mask, 0b1000_0011);
        assert_eq!(spec.match_bits, 0b1000_0001);
        assert!(spec.is_active());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bit_builder_rejects_channel() {
        let _ = TriggerSpec::when().high(MAX_CHANNELS);
    }

    #[test]
    fn test_resolve_defaults() {
        let (resolved, warnings) = TriggerSpec::new(0xff, 0x80).resolve(32, 2016);
        assert!(warnings.is_empty());
        assert_eq!(resolved.lookback_offset, 16);
        assert_eq!(resolved.holdoff, 32);
        assert!(resolved.active);
    }

    #[test]
    fn test_resolve_clamps() {
        let spec = TriggerSpec::new(0x0f, 0xf1)
            .with_lookback_offset(8)
            .with_holdoff(100);
        let (resolved, warnings) = spec.resolve(8, 24);
        assert_eq!(resolved.lookback_offset, 7);
        assert_eq!(resolved.holdoff, 24);
        assert_eq!(resolved.match_bits, 0x01);
        assert_eq!(
            warnings,
            vec![
                ConfigWarning::MatchOutsideMask { ignored: 0xf0 },
                ConfigWarning::LookbackClamped {
                    requested: 8,
                    clamped: 7
                },
                ConfigWarning::HoldoffClamped {
                    requested: 100,
                    clamped: 24
                },
            ]
        );
    }

    #[test]
    fn test_empty_mask_is_inactive() {
        let (resolved, warnings) = TriggerSpec::new(0, 0).resolve(8, 8);
        assert!(!resolved.active);
        assert_eq!(warnings, vec![ConfigWarning::EmptyMask]);

        let (resolved, warnings) = TriggerSpec::disabled().resolve(8, 8);
        assert!(!resolved.active);
        assert!(warnings.is_empty());
        assert_eq!(resolved.to_string(), "off");
    }

    #[test]
    fn test_condition_met() {
        let (resolved, _) = TriggerSpec::new(0xff, 0x80).resolve(8, 8);
        assert!(resolved.condition_met(0x80));
        assert!(resolved.condition_met(0x1_0080));
        assert!(!resolved.condition_met(0x81));
        assert!(!resolved.condition_met(0x00));
    }
}
