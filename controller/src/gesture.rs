//! Gesture classification from full-body skeleton frames.
//!
//! Detects lateral movement, jump, crouch, critical combo, haymaker
//! punch, forward specials, and kicks from `Frame` joint positions.
//! Classification is pure: the carried-over `ControlState` goes in,
//! the next one comes out with the triggered gestures.

use tracing::debug;

use crate::keys::Key;
use crate::skeleton::{Frame, Joint, Limb, Side};

// ── Facing mode ────────────────────────────────────────────

/// Which way the player faces; selects the dominant body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    FacingRight,
    FacingLeft,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FacingRight => "facing-right",
            Self::FacingLeft => "facing-left",
        }
    }

    pub fn from_name(s: &str) -> Option<Mode> {
        match s {
            "right" | "facing-right" => Some(Self::FacingRight),
            "left" | "facing-left" => Some(Self::FacingLeft),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Mode {
        match self {
            Self::FacingRight => Self::FacingLeft,
            Self::FacingLeft => Self::FacingRight,
        }
    }

    /// Side whose joints drive the mirrored detectors.
    pub fn dominant(&self) -> Side {
        match self {
            Self::FacingRight => Side::Right,
            Self::FacingLeft => Side::Left,
        }
    }

    /// +1 when forward is +x, -1 when forward is -x.
    pub fn forward_sign(&self) -> f32 {
        match self {
            Self::FacingRight => 1.0,
            Self::FacingLeft => -1.0,
        }
    }

    /// Direction key pointing toward the opponent.
    pub fn forward_key(&self) -> Key {
        match self {
            Self::FacingRight => Key::Right,
            Self::FacingLeft => Key::Left,
        }
    }

    /// Direction key pointing away from the opponent.
    pub fn back_key(&self) -> Key {
        match self {
            Self::FacingRight => Key::Left,
            Self::FacingLeft => Key::Right,
        }
    }
}

// ── Carried-over state ─────────────────────────────────────

/// State persisting across frames: facing mode and calibrated baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub mode: Mode,
    /// Shoulder-center height captured at the last mode toggle.
    pub baseline: f32,
}

impl ControlState {
    pub fn new(mode: Mode, baseline: f32) -> Self {
        Self { mode, baseline }
    }
}

// ── Gesture types ──────────────────────────────────────────

/// Level-triggered lateral movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lateral {
    Right,
    Left,
    /// Neither threshold crossed: release both lateral keys.
    Neutral,
}

/// Forward special variants, chosen by the off-hand pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialVariant {
    /// Both hands thrust forward: down, down-forward, forward, heavy punch.
    DoubleForward,
    /// Off-hand elbow pulled back: forward + heavy punch together.
    ForwardPunch,
    /// Single light punch.
    Jab,
}

/// Recognized gestures for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Surrender pose flipped the facing mode to `mode`.
    ModeToggle { mode: Mode },
    Lateral(Lateral),
    Jump,
    /// Level-triggered crouch key: held while low, released otherwise.
    Crouch { held: bool },
    CriticalCombo,
    HaymakerPunch,
    ForwardSpecial(SpecialVariant),
    HighKick,
    LowKickCombo,
}

impl Gesture {
    /// String representation for logs and statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModeToggle { .. } => "mode-toggle",
            Self::Lateral(Lateral::Right) => "move-right",
            Self::Lateral(Lateral::Left) => "move-left",
            Self::Lateral(Lateral::Neutral) => "lateral-release",
            Self::Jump => "jump",
            Self::Crouch { held: true } => "crouch",
            Self::Crouch { held: false } => "stand",
            Self::CriticalCombo => "critical-combo",
            Self::HaymakerPunch => "haymaker-punch",
            Self::ForwardSpecial(SpecialVariant::DoubleForward) => "double-forward",
            Self::ForwardSpecial(SpecialVariant::ForwardPunch) => "forward-punch",
            Self::ForwardSpecial(SpecialVariant::Jab) => "jab",
            Self::HighKick => "high-kick",
            Self::LowKickCombo => "low-kick-combo",
        }
    }

    /// Level-triggered gestures are re-asserted every classified frame.
    pub fn is_level(&self) -> bool {
        matches!(self, Self::Lateral(_) | Self::Crouch { .. })
    }
}

// ── Config ─────────────────────────────────────────────────

/// Thresholds for gesture classification (normalized sensor units).
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Shoulder-over-hip lean to the right that presses the right key.
    pub lateral_right: f32,
    /// Shoulder-over-hip lean to the left that presses the left key.
    pub lateral_left: f32,
    /// Rise above baseline that fires a jump.
    pub jump: f32,
    /// Drop below baseline that holds crouch.
    pub crouch: f32,
    /// Dominant wrist height above shoulder center for a haymaker.
    pub haymaker_rise: f32,
    /// Dominant wrist forward reach for a forward special.
    pub special_reach: f32,
    /// Off-hand wrist forward reach selecting the double-forward variant.
    pub offhand_reach: f32,
    /// Off-hand elbow backward reach selecting the forward-punch variant.
    pub elbow_pullback: f32,
    /// Dominant ankle forward reach for a high kick.
    pub high_kick_reach: f32,
    /// Dominant knee height above hip center for a low kick.
    pub knee_rise: f32,
    /// Classification pause after a mode toggle (ms).
    pub debounce_ms: u64,
    /// Baseline used before the first mode toggle.
    pub initial_baseline: f32,
    /// Only fire detectors whose joints are all fully tracked.
    pub require_tracked: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            lateral_right: 0.12,
            lateral_left: 0.13,
            jump: 0.2,
            crouch: 0.2,
            haymaker_rise: 0.1,
            special_reach: 0.5,
            offhand_reach: 0.3,
            elbow_pullback: 0.3,
            high_kick_reach: 0.6,
            knee_rise: 0.1,
            debounce_ms: 1000,
            initial_baseline: 0.5,
            require_tracked: false,
        }
    }
}

impl GestureConfig {
    /// Generate s-expression for the active configuration.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:lateral-right {:.2} :lateral-left {:.2} :jump {:.2} :crouch {:.2} :haymaker-rise {:.2} :special-reach {:.2} :offhand-reach {:.2} :elbow-pullback {:.2} :high-kick-reach {:.2} :knee-rise {:.2} :debounce-ms {} :initial-baseline {:.2} :require-tracked {})",
            self.lateral_right,
            self.lateral_left,
            self.jump,
            self.crouch,
            self.haymaker_rise,
            self.special_reach,
            self.offhand_reach,
            self.elbow_pullback,
            self.high_kick_reach,
            self.knee_rise,
            self.debounce_ms,
            self.initial_baseline,
            if self.require_tracked { "t" } else { "nil" },
        )
    }
}

// ── Classification ─────────────────────────────────────────

/// Result of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Triggered gestures in detector order.
    pub gestures: Vec<Gesture>,
    /// State to carry into the next frame.
    pub state: ControlState,
    /// Whether a haymaker latched during this frame. Scoped to this call only.
    pub punch_latched: bool,
}

impl Classification {
    /// The new mode if this frame toggled facing.
    pub fn toggled_to(&self) -> Option<Mode> {
        self.gestures.iter().find_map(|g| match g {
            Gesture::ModeToggle { mode } => Some(*mode),
            _ => None,
        })
    }
}

/// Evaluates frames against the ordered detector set.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    pub config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// Initial carried-over state for a fresh session.
    pub fn initial_state(&self, mode: Mode) -> ControlState {
        ControlState::new(mode, self.config.initial_baseline)
    }

    /// Whether a detector reading `joints` may fire on this frame.
    fn usable(&self, frame: &Frame, joints: &[Joint]) -> bool {
        !self.config.require_tracked || joints.iter().all(|j| frame.is_tracked(*j))
    }

    /// Classify one frame against the carried-over state.
    pub fn classify(&self, frame: &Frame, state: &ControlState) -> Classification {
        if let Some(next) = self.detect_surrender(frame, state) {
            debug!(
                "Mode toggle: {} -> {}, baseline {:.3}",
                state.mode.as_str(),
                next.mode.as_str(),
                next.baseline,
            );
            return Classification {
                gestures: vec![Gesture::ModeToggle { mode: next.mode }],
                state: next,
                punch_latched: false,
            };
        }

        let mode = state.mode;
        let mut gestures = Vec::new();

        gestures.push(Gesture::Lateral(self.detect_lateral(frame)));

        let rise = frame.y(Joint::ShoulderCenter) - state.baseline;
        let height_usable = self.usable(frame, &[Joint::ShoulderCenter]);
        if height_usable && rise > self.config.jump {
            gestures.push(Gesture::Jump);
        }
        gestures.push(Gesture::Crouch {
            held: height_usable && rise < -self.config.crouch,
        });

        if self.detect_critical(frame) {
            gestures.push(Gesture::CriticalCombo);
        }

        // Latch lives for this call only.
        let punch_latched = self.detect_haymaker(frame, mode);
        if punch_latched {
            gestures.push(Gesture::HaymakerPunch);
        }

        if !punch_latched {
            if let Some(variant) = self.detect_forward_special(frame, mode) {
                gestures.push(Gesture::ForwardSpecial(variant));
            }
        }

        if self.detect_high_kick(frame, mode) {
            gestures.push(Gesture::HighKick);
        }

        if self.detect_low_kick(frame, mode) {
            gestures.push(Gesture::LowKickCombo);
        }

        debug!(
            "Classified frame ({}): {:?}",
            mode.as_str(),
            gestures.iter().map(|g| g.as_str()).collect::<Vec<_>>(),
        );

        Classification {
            gestures,
            state: *state,
            punch_latched,
        }
    }

    /// Both wrists above the head: flip mode and recalibrate.
    fn detect_surrender(&self, frame: &Frame, state: &ControlState) -> Option<ControlState> {
        let joints = [Joint::WristLeft, Joint::WristRight, Joint::Head, Joint::ShoulderCenter];
        if !self.usable(frame, &joints) {
            return None;
        }
        let head = frame.y(Joint::Head);
        if frame.y(Joint::WristLeft) > head && frame.y(Joint::WristRight) > head {
            Some(ControlState::new(
                state.mode.toggled(),
                frame.y(Joint::ShoulderCenter),
            ))
        } else {
            None
        }
    }

    /// Shoulder-over-hip lean. Not mirrored; thresholds are asymmetric.
    fn detect_lateral(&self, frame: &Frame) -> Lateral {
        if !self.usable(frame, &[Joint::ShoulderCenter, Joint::HipCenter]) {
            return Lateral::Neutral;
        }
        let delta = frame.x(Joint::ShoulderCenter) - frame.x(Joint::HipCenter);
        if delta > self.config.lateral_right {
            Lateral::Right
        } else if delta < -self.config.lateral_left {
            Lateral::Left
        } else {
            Lateral::Neutral
        }
    }

    /// Head dipped below the shoulder line.
    fn detect_critical(&self, frame: &Frame) -> bool {
        self.usable(frame, &[Joint::Head, Joint::ShoulderCenter])
            && frame.y(Joint::Head) < frame.y(Joint::ShoulderCenter)
    }

    fn detect_haymaker(&self, frame: &Frame, mode: Mode) -> bool {
        let wrist = Joint::sided(Limb::Wrist, mode.dominant());
        self.usable(frame, &[wrist, Joint::ShoulderCenter])
            && frame.y(wrist) - frame.y(Joint::ShoulderCenter) > self.config.haymaker_rise
    }

    fn detect_forward_special(&self, frame: &Frame, mode: Mode) -> Option<SpecialVariant> {
        let wrist = Joint::sided(Limb::Wrist, mode.dominant());
        if !self.usable(frame, &[wrist, Joint::ShoulderCenter])
            || self.forward_reach(frame, wrist, mode) <= self.config.special_reach
        {
            return None;
        }

        let off_wrist = Joint::sided(Limb::Wrist, mode.dominant().opposite());
        let off_elbow = Joint::sided(Limb::Elbow, mode.dominant().opposite());

        if self.usable(frame, &[off_wrist])
            && self.forward_reach(frame, off_wrist, mode) > self.config.offhand_reach
        {
            Some(SpecialVariant::DoubleForward)
        } else if self.usable(frame, &[off_elbow])
            && -self.forward_reach(frame, off_elbow, mode) > self.config.elbow_pullback
        {
            Some(SpecialVariant::ForwardPunch)
        } else {
            Some(SpecialVariant::Jab)
        }
    }

    fn detect_high_kick(&self, frame: &Frame, mode: Mode) -> bool {
        let ankle = Joint::sided(Limb::Ankle, mode.dominant());
        self.usable(frame, &[ankle, Joint::ShoulderCenter])
            && self.forward_reach(frame, ankle, mode) > self.config.high_kick_reach
    }

    fn detect_low_kick(&self, frame: &Frame, mode: Mode) -> bool {
        let knee = Joint::sided(Limb::Knee, mode.dominant());
        self.usable(frame, &[knee, Joint::HipCenter])
            && frame.y(knee) - frame.y(Joint::HipCenter) > self.config.knee_rise
    }

    /// Horizontal distance of `joint` ahead of the shoulder center, signed by facing.
    fn forward_reach(&self, frame: &Frame, joint: Joint, mode: Mode) -> f32 {
        mode.forward_sign() * (frame.x(joint) - frame.x(Joint::ShoulderCenter))
    }
}

// ── Test helpers ───────────────────────────────────────────

/// Neutral standing pose: every joint tracked, nothing triggered.
#[cfg(test)]
pub(crate) fn make_frame() -> Frame {
    use crate::skeleton::TrackingQuality;

    let mut frame = Frame::new();
    let pose = [
        (Joint::HipCenter, [0.0, 0.0, 2.0]),
        (Joint::Spine, [0.0, 0.2, 2.0]),
        (Joint::ShoulderCenter, [0.0, 0.5, 2.0]),
        (Joint::Head, [0.0, 0.7, 2.0]),
        (Joint::ShoulderLeft, [-0.15, 0.45, 2.0]),
        (Joint::ElbowLeft, [-0.2, 0.2, 2.0]),
        (Joint::WristLeft, [-0.2, 0.0, 2.0]),
        (Joint::HandLeft, [-0.2, -0.05, 2.0]),
        (Joint::ShoulderRight, [0.15, 0.45, 2.0]),
        (Joint::ElbowRight, [0.2, 0.2, 2.0]),
        (Joint::WristRight, [0.2, 0.0, 2.0]),
        (Joint::HandRight, [0.2, -0.05, 2.0]),
        (Joint::HipLeft, [-0.1, -0.05, 2.0]),
        (Joint::KneeLeft, [-0.1, -0.4, 2.0]),
        (Joint::AnkleLeft, [-0.1, -0.8, 2.0]),
        (Joint::FootLeft, [-0.1, -0.85, 1.9]),
        (Joint::HipRight, [0.1, -0.05, 2.0]),
        (Joint::KneeRight, [0.1, -0.4, 2.0]),
        (Joint::AnkleRight, [0.1, -0.8, 2.0]),
        (Joint::FootRight, [0.1, -0.85, 1.9]),
    ];
    for (joint, position) in pose {
        frame.set(joint, position, TrackingQuality::Tracked);
    }
    frame
}

#[cfg(test)]
pub(crate) fn set_joint(frame: &mut Frame, joint: Joint, x: f32, y: f32) {
    let z = frame.position(joint)[2];
    let quality = frame.joint(joint).quality;
    frame.set(joint, [x, y, z], quality);
}

// ── Tests ──────────────────────────────────────────────────
