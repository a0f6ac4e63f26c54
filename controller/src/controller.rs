//! Frame-by-frame driver tying the classifier to the sequencer.
//!
//! One frame at a time runs to completion, including every scheduled
//! key delay. Frames whose delivery time passed while the controller
//! was busy are dropped; frames inside the mode-toggle debounce window
//! are skipped without classification.

use tracing::{debug, info};

use crate::commands::sequence_for;
use crate::dispatch::{play, Clock, KeySink};
use crate::gesture::{ControlState, Gesture, GestureClassifier, Mode};
use crate::keys::{CommandSequence, Key, KeyBindings, KeyDirection, SequenceBuilder};
use crate::skeleton::SensorFrame;
use crate::stats::RuntimeStats;

/// What happened to one sensor frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Arrived while a previous frame's sequences were still playing.
    Dropped,
    /// Inside the debounce window after a mode toggle.
    Suppressed,
    /// No fully tracked skeleton in the frame.
    Idle,
    /// Classified; gestures from every tracked skeleton, in order.
    Classified(Vec<Gesture>),
}

/// Drives gesture classification and key playback for a frame stream.
pub struct Controller<S: KeySink, C: Clock> {
    classifier: GestureClassifier,
    state: ControlState,
    bindings: KeyBindings,
    pub sink: S,
    pub clock: C,
    /// Scheduler time before which frames are skipped.
    suppress_until_ms: Option<u64>,
    /// First frame timestamp and the scheduler time it was mapped to.
    epoch: Option<(u64, u64)>,
    /// Keys currently pressed, in press order.
    held: Vec<Key>,
    pub stats: RuntimeStats,
}

impl<S: KeySink, C: Clock> Controller<S, C> {
    pub fn new(
        classifier: GestureClassifier,
        bindings: KeyBindings,
        mode: Mode,
        sink: S,
        clock: C,
    ) -> Self {
        let state = classifier.initial_state(mode);
        Self {
            classifier,
            state,
            bindings,
            sink,
            clock,
            suppress_until_ms: None,
            epoch: None,
            held: Vec::new(),
            stats: RuntimeStats::default(),
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    #[cfg(test)]
    pub fn held_keys(&self) -> &[Key] {
        &self.held
    }

    /// Scheduler time at which a frame stamped `timestamp_ms` is due.
    fn due_ms(&mut self, timestamp_ms: u64) -> u64 {
        let now = self.clock.now_ms();
        let (t0, c0) = *self.epoch.get_or_insert((timestamp_ms, now));
        c0 + timestamp_ms.saturating_sub(t0)
    }

    /// Process one sensor frame to completion.
    pub fn process_frame(&mut self, frame: &SensorFrame) -> FrameOutcome {
        self.stats.frames_seen += 1;

        let due = self.due_ms(frame.timestamp_ms);
        let now = self.clock.now_ms();
        if now > due {
            debug!(
                "Dropping frame t={}ms: arrived {}ms into busy period",
                frame.timestamp_ms,
                now - due
            );
            self.stats.frames_dropped += 1;
            return FrameOutcome::Dropped;
        }
        self.clock.sleep_until(due);

        if let Some(until) = self.suppress_until_ms {
            if due < until {
                self.stats.frames_suppressed += 1;
                return FrameOutcome::Suppressed;
            }
            self.suppress_until_ms = None;
        }

        let mut fired = Vec::new();
        let mut any_tracked = false;
        for skeleton in frame.tracked() {
            any_tracked = true;
            let result = self.classifier.classify(skeleton, &self.state);
            self.state = result.state;
            if result.punch_latched {
                debug!("Haymaker latched, forward special skipped this frame");
            }

            if let Some(mode) = result.toggled_to() {
                info!(
                    "Facing {} (dominant side {}, baseline {:.3}), pausing {}ms",
                    mode.as_str(),
                    mode.dominant().as_str(),
                    self.state.baseline,
                    self.classifier.config.debounce_ms
                );
                self.stats.mode_toggles += 1;
                self.stats.record_gesture("mode-toggle");
                self.suppress_until_ms = Some(due + self.classifier.config.debounce_ms);
                fired.extend(result.gestures);
                break;
            }

            for gesture in result.gestures {
                self.fire(&gesture);
                fired.push(gesture);
            }
        }

        if !any_tracked {
            return FrameOutcome::Idle;
        }
        let busy = self.clock.now_ms().saturating_sub(due);
        self.stats.record_busy(busy as f64);
        FrameOutcome::Classified(fired)
    }

    /// Play the command sequence for one gesture in the current mode.
    fn fire(&mut self, gesture: &Gesture) {
        self.stats.record_gesture(gesture.as_str());
        let seq = sequence_for(gesture, self.state.mode);
        if !gesture.is_level() {
            debug!(
                "Gesture {} ({}), {} keys over {}ms",
                gesture.as_str(),
                self.state.mode.as_str(),
                seq.actions.len(),
                seq.span_ms()
            );
        }
        if seq.is_empty() {
            return;
        }
        self.run(&seq);
    }

    fn run(&mut self, seq: &CommandSequence) {
        let outcome = play(seq, &self.bindings, &mut self.sink, &mut self.clock);
        self.stats.key_events += outcome.emitted;
        self.stats.sink_failures += outcome.failures;
        // Held keys follow what the sink accepted, not what was attempted.
        for (action, _) in seq
            .actions
            .iter()
            .zip(&outcome.accepted)
            .filter(|(_, ok)| **ok)
        {
            match action.direction {
                KeyDirection::Down => {
                    if !self.held.contains(&action.key) {
                        self.held.push(action.key);
                    }
                }
                KeyDirection::Up => self.held.retain(|k| *k != action.key),
            }
        }
    }

    /// Release every key still held (lateral and crouch keys).
    pub fn release_all(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let keys = self.held.clone();
        info!(
            "Releasing held keys: {}",
            keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(" ")
        );
        let seq = keys
            .into_iter()
            .fold(SequenceBuilder::new(), |b, k| b.release(k))
            .build();
        self.run(&seq);
    }

    /// Generate s-expression for the controller's runtime status.
    pub fn status_sexp(&self) -> String {
        let held = self
            .held
            .iter()
            .map(|k| format!(":{}", k.as_str()))
            .collect::<Vec<_>>()
            .join(" ");
        let suppressed = match self.suppress_until_ms {
            Some(t) => t.to_string(),
            None => "nil".to_string(),
        };
        format!(
            "(:mode :{} :baseline {:.3} :suppress-until {} :held ({}) :bindings {} :stats {})",
            self.state.mode.as_str(),
            self.state.baseline,
            suppressed,
            held,
            self.bindings.bindings_sexp(),
            self.stats.stats_sexp(),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
