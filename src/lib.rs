//! # Logic Capture RS
//!
//! A Rust library for turning logic-analyzer telemetry streamed from a
//! microcontroller into triggered, display-ready captures.
//!
//! Transfer words arriving from the device are unpacked according to a
//! negotiated packed mode, pushed into a circular capture buffer and checked
//! against a mask/match trigger that decides which window of history is frozen
//! for display.
//!
//! ## Features
//!
//! - **Packed modes**: 1, 2, 4, 8, 16 or 32-bit samples in byte, word or long
//!   transfer words, with alternate ordering and sign extension
//! - **Capture buffer**: fixed power-of-two ring with headroom behind the display window
//! - **Trigger engine**: arm / fire / holdoff cycle with a configurable look-back offset
//! - **Channel extraction**: per-channel traces and `polars` DataFrames of a captured window
//! - **No runtime failures**: bad configuration is clamped and reported as warnings
//!
//! ## Examples
//!
//! ### Decoding a Packed Word
//!
//! ```rust
//! use logic_capture::{decode, PackedMode};
//!
//! let mode = PackedMode::from_tokens(["LONGS_8BIT"])?;
//! assert_eq!(&*decode(0x0403_0201, &mode), &[0x01, 0x02, 0x03, 0x04]);
//!
//! let alternate = PackedMode::from_tokens(["LONGS_8BIT", "ALT"])?;
//! assert_eq!(&*decode(0x0403_0201, &alternate), &[0x04, 0x03, 0x02, 0x01]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Triggered Capture
//!
//! ```rust
//! use logic_capture::{LogicConfig, LogicSession, TriggerSpec};
//!
//! let trigger = TriggerSpec::when()
//!     .high(7)
//!     .matches()
//!     .with_lookback_offset(0)
//!     .with_holdoff(4);
//!
//! let (mut session, warnings) = LogicSession::new(
//!     LogicConfig::new()
//!         .with_window_size(8)
//!         .with_channels(8)
//!         .with_trigger(trigger),
//! );
//! assert!(warnings.is_empty());
//!
//! for _ in 0..8 {
//!     session.push_sample(0x00);
//! }
//! assert!(session.push_sample(0x80).is_redraw());
//!
//! let traces = session.channel_traces();
//! assert_eq!(traces[7].last(), Some(&true));
//! ```
//!
//! ### Reading a Buffer Directly
//!
//! ```rust
//! use logic_capture::{extract, CaptureBuffer};
//!
//! let mut buffer = CaptureBuffer::new(4);
//! for sample in [0b01, 0b10, 0b11] {
//!     buffer.push(sample);
//! }
//!
//! // Partial history: only the three valid samples come back.
//! let bit0 = extract(&buffer, buffer.write_pointer(), 4, 0);
//! assert_eq!(bit0, vec![true, false, true]);
//! ```

pub mod capture_buffer;
pub mod channel_extractor;
pub mod logic_session;
pub mod packed_decoder;
pub mod packed_mode;
pub mod trigger_config;
pub mod trigger_engine;

// Re-export the main types for convenience
pub use packed_decoder::{decode, DecodedSamples, MAX_SAMPLES_PER_WORD};
pub use packed_mode::{ContainerWidth, ModeError, PackedMode};

pub use capture_buffer::{CaptureBuffer, DEFAULT_CAPACITY};

pub use trigger_config::{
    BitState, BitTriggerBuilder, ConfigWarning, ResolvedTrigger, TriggerSpec, MAX_CHANNELS,
};
pub use trigger_engine::{DrawDecision, TriggerEngine, TriggerState};

pub use channel_extractor::{
    extract, extract_all, extract_newest_first, extract_ordered, CaptureWindow, SampleOrder,
};

pub use logic_session::{LogicConfig, LogicSession, SessionStats};
