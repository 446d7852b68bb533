//! Packed transfer-word formats.
//!
//! A [`PackedMode`] says how one transfer word coming off the serial link is
//! split into samples. Modes are plain values: switching format means building
//! a new one, never mutating the one a decoder is currently using.

use std::fmt;

/// Width of one transfer word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerWidth {
    Byte,
    Word,
    Long,
}

impl ContainerWidth {
    pub fn bits(&self) -> u32 {
        match self {
            ContainerWidth::Byte => 8,
            ContainerWidth::Word => 16,
            ContainerWidth::Long => 32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerWidth::Byte => "BYTES",
            ContainerWidth::Word => "WORDS",
            ContainerWidth::Long => "LONGS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("Unsupported sample width of {0} bits (expected 1, 2, 4, 8, 16 or 32)")]
    UnsupportedBitWidth(u32),

    #[error("{bits}-bit samples do not pack into a {container}-bit container")]
    ContainerMismatch { bits: u32, container: u32 },

    #[error("Unknown packed mode token '{0}'")]
    UnknownToken(String),

    #[error("Packed mode selection needs a size token such as LONGS_8BIT")]
    MissingSizeToken,

    #[error("Packed mode size given twice ('{0}')")]
    DuplicateSizeToken(String),
}

/// Describes how a transfer word unpacks into samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedMode {
    bits_per_sample: u32,
    container: ContainerWidth,
    alternate: bool,
    signed: bool,
}

impl PackedMode {
    /// One 32-bit sample per transfer word.
    pub const UNPACKED: PackedMode = PackedMode {
        bits_per_sample: 32,
        container: ContainerWidth::Long,
        alternate: false,
        signed: false,
    };

    /// Validate and build a mode.
    ///
    /// This is the only place the bit-width/container combination is checked;
    /// decoding assumes a mode built here is well formed.
    pub fn new(
        bits_per_sample: u32,
        container: ContainerWidth,
        alternate: bool,
        signed: bool,
    ) -> Result<Self, ModeError> {
        if !matches!(bits_per_sample, 1 | 2 | 4 | 8 | 16 | 32) {
            return Err(ModeError::UnsupportedBitWidth(bits_per_sample));
        }
        if bits_per_sample > container.bits() || container.bits() % bits_per_sample != 0 {
            return Err(ModeError::ContainerMismatch {
                bits: bits_per_sample,
                container: container.bits(),
            });
        }

        Ok(Self {
            bits_per_sample,
            container,
            alternate,
            signed,
        })
    }

    /// Select a mode from configuration tokens, e.g. `["LONGS_4BIT", "ALT"]`.
    ///
    /// Exactly one size token (`LONGS_1BIT` .. `BYTES_4BIT`) is required; `ALT`
    /// and `SIGNED` may follow in any order. Matching is case-insensitive.
    pub fn from_tokens<'a, I>(tokens: I) -> Result<Self, ModeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut size: Option<(ContainerWidth, u32)> = None;
        let mut alternate = false;
        let mut signed = false;

        for token in tokens {
            let upper = token.trim().to_ascii_uppercase();
            match upper.as_str() {
                "" => continue,
                "ALT" => alternate = true,
                "SIGNED" => signed = true,
                other => {
                    let parsed = Self::parse_size_token(other)
                        .ok_or_else(|| ModeError::UnknownToken(token.to_string()))?;
                    if size.is_some() {
                        return Err(ModeError::DuplicateSizeToken(token.to_string()));
                    }
                    size = Some(parsed);
                }
            }
        }

        let (container, bits) = size.ok_or(ModeError::MissingSizeToken)?;
        let mode = Self::new(bits, container, alternate, signed)?;
        log::debug!("Selected packed mode {}", mode);
        Ok(mode)
    }

    fn parse_size_token(token: &str) -> Option<(ContainerWidth, u32)> {
        let (container, rest) = token.split_once('_')?;
        let container = match container {
            "BYTES" => ContainerWidth::Byte,
            "WORDS" => ContainerWidth::Word,
            "LONGS" => ContainerWidth::Long,
            _ => return None,
        };
        let bits: u32 = rest.strip_suffix("BIT")?.parse().ok()?;

        // A size token always packs more than one sample into the container.
        if !matches!(bits, 1 | 2 | 4 | 8 | 16) || bits >= container.bits() {
            return None;
        }
        Some((container, bits))
    }

    pub fn bits_per_sample(&self) -> u32 {
        self.bits_per_sample
    }

    pub fn container(&self) -> ContainerWidth {
        self.container
    }

    pub fn is_alternate(&self) -> bool {
        self.alternate
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Number of samples carried by one transfer word.
    pub fn samples_per_word(&self) -> usize {
        (self.container.bits() / self.bits_per_sample) as usize
    }

    /// True for the one-sample-per-word mode.
    pub fn is_unpacked(&self) -> bool {
        self.bits_per_sample == self.container.bits()
    }
}

impl Default for PackedMode {
    fn default() -> Self {
        Self::UNPACKED
    }
}

impl fmt::Display for PackedMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_unpacked() {
            write!(f, "{} (unpacked)", self.container.as_str())?;
        } else {
            write!(f, "{}_{}BIT", self.container.as_str(), self.bits_per_sample)?;
        }
        if self.alternate {
            write!(f, " ALT")?;
        }
        if self.signed {
            write!(f, " SIGNED")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_bits() {
        assert_eq!(ContainerWidth::Byte.bits(), 8);
        assert_eq!(ContainerWidth::Word.bits(), 16);
        assert_eq!(ContainerWidth::Long.bits(), 32);
    }

    #[test]
    fn test_new_rejects_bad_widths() {
        assert_eq!(
            PackedMode::new(3, ContainerWidth::Long, false, false),
            Err(ModeError::UnsupportedBitWidth(3))
        );
        assert_eq!(
            PackedMode::new(16, ContainerWidth::Byte, false, false),
            Err(ModeError::ContainerMismatch {
                bits: 16,
                container: 8
            })
        );
        assert!(PackedMode::new(8, ContainerWidth::Byte, false, false).is_ok());
    }

    #[test]
    fn test_samples_per_word() {
        let mode = PackedMode::new(2, ContainerWidth::Word, false, false).unwrap();
        assert_eq!(mode.samples_per_word(), 8);
        assert_eq!(PackedMode::UNPACKED.samples_per_word(), 1);
        assert!(PackedMode::default().is_unpacked());
    }

    #[test]
    fn test_from_tokens() {
        let mode = PackedMode::from_tokens(["longs_4bit", "SIGNED", "alt"]).unwrap();
        assert_eq!(mode.bits_per_sample(), 4);
        assert_eq!(mode.container(), ContainerWidth::Long);
        assert!(mode.is_alternate());
        assert!(mode.is_signed());

        let mode = PackedMode::from_tokens(["BYTES_2BIT"]).unwrap();
        assert_eq!(mode.samples_per_word(), 4);
        assert!(!mode.is_alternate());
        assert!(!mode.is_signed());
    }

    #[test]
    fn test_from_tokens_errors() {
        assert_eq!(
            PackedMode::from_tokens(["ALT"]),
            Err(ModeError::MissingSizeToken)
        );
        assert_eq!(
            PackedMode::from_tokens(["BYTES_8BIT"]),
            Err(ModeError::UnknownToken("BYTES_8BIT".to_string()))
        );
        assert_eq!(
            PackedMode::from_tokens(["WORDS_3BIT"]),
            Err(ModeError::UnknownToken("WORDS_3BIT".to_string()))
        );
        assert_eq!(
            PackedMode::from_tokens(["LONGS_8BIT", "WORDS_8BIT"]),
            Err(ModeError::DuplicateSizeToken("WORDS_8BIT".to_string()))
        );
    }

    #[test]
    fn test_display() {
        let mode = PackedMode::from_tokens(["WORDS_4BIT", "ALT"]).unwrap();
        assert_eq!(mode.to_string(), "WORDS_4BIT ALT");
        assert_eq!(PackedMode::UNPACKED.to_string(), "LONGS (unpacked)");
    }
}
