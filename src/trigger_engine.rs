//! Arm / fire / holdoff evaluation over a [`CaptureBuffer`].
//!
//! The engine is stepped once per pushed sample. It never allocates and has
//! no failure path, so it can keep up with the incoming sample rate.
//!
//! Every armed-to-fired transition freezes the window at the current write
//! pointer and reloads the holdoff countdown. Two independent gates then
//! decide what happens next:
//!
//! * re-arm: after firing, the pattern must disappear from the checked sample
//!   before the engine looks for it again;
//! * holdoff: the frozen window is only released for drawing while the engine
//!   is fired and the countdown is at zero. A fire with no holdoff pending is
//!   drawn on the spot; a fire during holdoff is drawn on the sample that
//!   brings the countdown to zero, if the engine is still fired by then.

use crate::capture_buffer::CaptureBuffer;
use crate::trigger_config::ResolvedTrigger;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Trigger off, every sample is drawable.
    Disarmed,
    /// Watching for the pattern.
    Armed,
    /// Pattern seen, waiting for it to go away.
    Fired,
}

/// What the renderer should do after a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawDecision {
    /// Keep showing whatever is on screen.
    Hold,
    /// Redraw the window ending just before `end_pointer`.
    Redraw { end_pointer: usize },
}

impl DrawDecision {
    pub fn is_redraw(&self) -> bool {
        matches!(self, DrawDecision::Redraw { .. })
    }
}

#[derive(Debug, Clone)]
pub struct TriggerEngine {
    config: ResolvedTrigger,
    state: TriggerState,
    holdoff_remaining: usize,
    frozen_pointer: Option<usize>,
    since_capture: usize,
    captures: u64,
}

impl TriggerEngine {
    pub fn new(config: ResolvedTrigger) -> Self {
        Self {
            config,
            state: Self::initial_state(&config),
            holdoff_remaining: 0,
            frozen_pointer: None,
            since_capture: 0,
            captures: 0,
        }
    }

    fn initial_state(config: &ResolvedTrigger) -> TriggerState {
        if config.active {
            TriggerState::Armed
        } else {
            TriggerState::Disarmed
        }
    }

    /// Replace the configuration and start over from the initial state.
    pub fn reconfigure(&mut self, config: ResolvedTrigger) {
        self.config = config;
        self.reset();
    }

    /// Back to the initial state; the capture counter is kept.
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.config);
        self.holdoff_remaining = 0;
        self.frozen_pointer = None;
        self.since_capture = 0;
    }

    /// Step the engine for the sample just pushed into `buffer`.
    pub fn evaluate(&mut self, buffer: &CaptureBuffer) -> DrawDecision {
        if !self.config.active {
            return if buffer.is_empty() {
                DrawDecision::Hold
            } else {
                DrawDecision::Redraw {
                    end_pointer: buffer.write_pointer(),
                }
            };
        }

        if self.frozen_pointer.is_some() {
            self.since_capture += 1;
        }

        if !buffer.is_full() {
            return DrawDecision::Hold;
        }

        if self.holdoff_remaining > 0 {
            self.holdoff_remaining -= 1;
            if self.holdoff_remaining == 0 {
                trace!("trigger holdoff elapsed");
            }
        }
        // Holdoff as seen by this sample, before a fire reloads it.
        let released = self.holdoff_remaining == 0;

        let checked = buffer.sample_at(self.config.lookback_offset + 1);
        let condition_met = self.config.condition_met(checked);

        match self.state {
            TriggerState::Armed if condition_met => self.fire(buffer),
            TriggerState::Fired if !condition_met => {
                self.state = TriggerState::Armed;
                trace!("trigger re-armed");
            }
            _ => {}
        }

        match self.frozen_pointer {
            Some(end_pointer)
                if released
                    && self.state == TriggerState::Fired
                    && self.since_capture <= buffer.headroom() =>
            {
                DrawDecision::Redraw { end_pointer }
            }
            _ => DrawDecision::Hold,
        }
    }

    fn fire(&mut self, buffer: &CaptureBuffer) {
        let end_pointer = buffer.write_pointer();
        self.state = TriggerState::Fired;
        self.frozen_pointer = Some(end_pointer);
        self.holdoff_remaining = self.config.holdoff;
        self.since_capture = 0;
        self.captures += 1;
        trace!(end_pointer, captures = self.captures, "trigger fired");
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn holdoff_remaining(&self) -> usize {
        self.holdoff_remaining
    }

    /// End pointer of the frozen window.
    ///
    /// Reported while the engine is fired or holding off, and only as long as
    /// the window has not been overwritten by newer samples.
    pub fn frozen_pointer(&self, buffer: &CaptureBuffer) -> Option<usize> {
        let held = self.state == TriggerState::Fired || self.holdoff_remaining > 0;
        match self.frozen_pointer {
            Some(pointer) if held && self.since_capture <= buffer.headroom() => Some(pointer),
            _ => None,
        }
    }

    /// End pointer of the last captured window, whatever the current state,
    /// as long as newer samples have not overwritten it.
    pub fn last_capture(&self, buffer: &CaptureBuffer) -> Option<usize> {
        self.frozen_pointer
            .filter(|_| self.since_capture <= buffer.headroom())
    }

    /// Number of windows frozen since the engine was created.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn config(&self) -> &ResolvedTrigger {
        &self.config
    }
}
