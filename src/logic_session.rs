use crate::capture_buffer::CaptureBuffer;
use crate::channel_extractor::{CaptureWindow, SampleOrder};
use crate::packed_decoder::decode;
use crate::packed_mode::PackedMode;
use crate::trigger_config::{ConfigWarning, TriggerSpec, MAX_CHANNELS};
use crate::trigger_engine::{DrawDecision, TriggerEngine, TriggerState};
use polars::prelude::{DataFrame, PolarsResult};

/// Session-wide settings, fixed until the session is reconfigured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicConfig {
    pub window_size: usize,
    pub channels: usize,
    pub mode: PackedMode,
    pub trigger: TriggerSpec,
}

impl LogicConfig {
    const DEFAULT_WINDOW_SIZE: usize = 32;
    pub const MAX_WINDOW_SIZE: usize = 2048;

    pub fn new() -> Self {
        Self {
            window_size: Self::DEFAULT_WINDOW_SIZE,
            channels: MAX_CHANNELS,
            mode: PackedMode::UNPACKED,
            trigger: TriggerSpec::disabled(),
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_mode(mut self, mode: PackedMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = trigger;
        self
    }

    fn clamped(mut self, warnings: &mut Vec<ConfigWarning>) -> Self {
        let window_size = self.window_size.clamp(1, Self::MAX_WINDOW_SIZE);
        if window_size != self.window_size {
            warnings.push(ConfigWarning::WindowSizeClamped {
                requested: self.window_size,
                clamped: window_size,
            });
            self.window_size = window_size;
        }

        let channels = self.channels.clamp(1, MAX_CHANNELS);
        if channels != self.channels {
            warnings.push(ConfigWarning::ChannelCountClamped {
                requested: self.channels,
                clamped: channels,
            });
            self.channels = channels;
        }

        for warning in warnings.iter() {
            log::warn!("{}", warning);
        }
        self
    }
}

impl Default for LogicConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub words_pushed: u64,
    pub samples_pushed: u64,
    pub captures: u64,
}

/// One logic-analyzer capture session: the current packed mode, the sample
/// ring and the trigger engine evaluating it.
#[derive(Debug)]
pub struct LogicSession {
    config: LogicConfig,
    buffer: CaptureBuffer,
    engine: TriggerEngine,
    draw_window: Option<CaptureWindow>,
    stats: SessionStats,
}

impl LogicSession {
    /// Create a session, pulling out-of-range settings back into range.
    pub fn new(config: LogicConfig) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let config = config.clamped(&mut warnings);

        let buffer = CaptureBuffer::new(config.window_size);
        let (trigger, trigger_warnings) = config
            .trigger
            .resolve(config.window_size, buffer.headroom());
        warnings.extend(trigger_warnings);

        log::debug!(
            "Logic session: window {} channels {} capacity {} mode {}",
            config.window_size,
            config.channels,
            buffer.capacity(),
            config.mode
        );

        let session = Self {
            config,
            buffer,
            engine: TriggerEngine::new(trigger),
            draw_window: None,
            stats: SessionStats::default(),
        };
        (session, warnings)
    }

    /// Apply a new configuration. The capture starts over.
    pub fn reconfigure(&mut self, config: LogicConfig) -> Vec<ConfigWarning> {
        let captures = self.stats.captures;
        let (session, warnings) = Self::new(config);
        *self = session;
        self.stats.captures = captures;
        warnings
    }

    /// Switch the transfer-word format for subsequent words.
    pub fn set_mode(&mut self, mode: PackedMode) {
        if mode != self.config.mode {
            log::debug!("Packed mode {} -> {}", self.config.mode, mode);
        }
        self.config.mode = mode;
    }

    /// Replace the trigger. Buffered history is kept but the engine restarts.
    pub fn set_trigger(&mut self, trigger: TriggerSpec) -> Vec<ConfigWarning> {
        let (resolved, warnings) =
            trigger.resolve(self.config.window_size, self.buffer.headroom());
        self.config.trigger = trigger;
        self.engine.reconfigure(resolved);
        self.draw_window = None;
        warnings
    }

    /// Decode a transfer word and push every sample it carries.
    ///
    /// Returns the last redraw released while pushing the word's samples.
    pub fn push_word(&mut self, word: u32) -> DrawDecision {
        self.stats.words_pushed += 1;
        let samples = decode(word, &self.config.mode);
        let mut decision = DrawDecision::Hold;
        for &sample in &samples {
            // Samples keep their bit pattern; only the low 32 bits are channels.
            if let redraw @ DrawDecision::Redraw { .. } = self.push_sample(sample as u32) {
                decision = redraw;
            }
        }
        decision
    }

    /// Push one already unpacked sample.
    pub fn push_sample(&mut self, sample: u32) -> DrawDecision {
        self.buffer.push(sample);
        self.stats.samples_pushed += 1;

        let fired_before = self.engine.captures();
        let decision = self.engine.evaluate(&self.buffer);
        self.stats.captures += self.engine.captures() - fired_before;

        if let DrawDecision::Redraw { end_pointer } = decision {
            self.draw_window = Some(CaptureWindow {
                end_pointer,
                len: self.buffer.valid_count(),
                triggered: self.engine.config().active,
            });
        }
        decision
    }

    /// Drop all history and restart the trigger. Calling it twice is the same
    /// as calling it once.
    pub fn clear(&mut self) {
        log::debug!("Clearing logic capture");
        self.buffer.clear();
        self.engine.reset();
        self.draw_window = None;
    }

    /// The window released by the most recent redraw, if it is still readable.
    pub fn draw_window(&self) -> Option<CaptureWindow> {
        let window = self.draw_window?;
        if window.triggered && self.engine.last_capture(&self.buffer).is_none() {
            return None;
        }
        Some(window)
    }

    /// Oldest-first traces for every configured channel of the draw window.
    pub fn channel_traces(&self) -> Vec<Vec<bool>> {
        match self.draw_window() {
            Some(window) => (0..self.config.channels as u32)
                .map(|channel| window.channel(&self.buffer, channel, SampleOrder::OldestFirst))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn draw_dataframe(&self) -> Option<PolarsResult<DataFrame>> {
        self.draw_window()
            .map(|window| window.to_dataframe(&self.buffer, self.config.channels as u32))
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.engine.state()
    }

    pub fn config(&self) -> &LogicConfig {
        &self.config
    }

    pub fn mode(&self) -> &PackedMode {
        &self.config.mode
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}
