//! Body skeleton data structures delivered by the tracking source.
//!
//! Models the 20-joint full-body skeleton reported per tracked user.
//! A `Frame` is one user's joint snapshot; a `SensorFrame` is everything
//! the source delivered at one sampling instant.

// ── Joint definitions ──────────────────────────────────────

/// The 20 skeleton joints reported by the tracking source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    HipCenter,
    Spine,
    ShoulderCenter,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
}

/// Total number of joints per skeleton.
pub const JOINT_COUNT: usize = 20;

impl Joint {
    /// Every joint, in index order.
    pub const ALL: [Joint; JOINT_COUNT] = [
        Self::HipCenter,
        Self::Spine,
        Self::ShoulderCenter,
        Self::Head,
        Self::ShoulderLeft,
        Self::ElbowLeft,
        Self::WristLeft,
        Self::HandLeft,
        Self::ShoulderRight,
        Self::ElbowRight,
        Self::WristRight,
        Self::HandRight,
        Self::HipLeft,
        Self::KneeLeft,
        Self::AnkleLeft,
        Self::FootLeft,
        Self::HipRight,
        Self::KneeRight,
        Self::AnkleRight,
        Self::FootRight,
    ];

    /// Convert joint enum to array index (0-19).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation used in recordings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HipCenter => "hip-center",
            Self::Spine => "spine",
            Self::ShoulderCenter => "shoulder-center",
            Self::Head => "head",
            Self::ShoulderLeft => "shoulder-left",
            Self::ElbowLeft => "elbow-left",
            Self::WristLeft => "wrist-left",
            Self::HandLeft => "hand-left",
            Self::ShoulderRight => "shoulder-right",
            Self::ElbowRight => "elbow-right",
            Self::WristRight => "wrist-right",
            Self::HandRight => "hand-right",
            Self::HipLeft => "hip-left",
            Self::KneeLeft => "knee-left",
            Self::AnkleLeft => "ankle-left",
            Self::FootLeft => "foot-left",
            Self::HipRight => "hip-right",
            Self::KneeRight => "knee-right",
            Self::AnkleRight => "ankle-right",
            Self::FootRight => "foot-right",
        }
    }

    /// Parse a joint name as written by `as_str`.
    pub fn from_name(s: &str) -> Option<Joint> {
        Self::ALL.iter().copied().find(|j| j.as_str() == s)
    }

    /// The joint of `limb` on the given body side.
    pub fn sided(limb: Limb, side: Side) -> Joint {
        match (limb, side) {
            (Limb::Shoulder, Side::Left) => Self::ShoulderLeft,
            (Limb::Shoulder, Side::Right) => Self::ShoulderRight,
            (Limb::Elbow, Side::Left) => Self::ElbowLeft,
            (Limb::Elbow, Side::Right) => Self::ElbowRight,
            (Limb::Wrist, Side::Left) => Self::WristLeft,
            (Limb::Wrist, Side::Right) => Self::WristRight,
            (Limb::Hand, Side::Left) => Self::HandLeft,
            (Limb::Hand, Side::Right) => Self::HandRight,
            (Limb::Hip, Side::Left) => Self::HipLeft,
            (Limb::Hip, Side::Right) => Self::HipRight,
            (Limb::Knee, Side::Left) => Self::KneeLeft,
            (Limb::Knee, Side::Right) => Self::KneeRight,
            (Limb::Ankle, Side::Left) => Self::AnkleLeft,
            (Limb::Ankle, Side::Right) => Self::AnkleRight,
            (Limb::Foot, Side::Left) => Self::FootLeft,
            (Limb::Foot, Side::Right) => Self::FootRight,
        }
    }

    /// The left/right counterpart of this joint. Center joints map to themselves.
    #[cfg(test)]
    pub fn mirrored(&self) -> Joint {
        match self {
            Self::ShoulderLeft => Self::ShoulderRight,
            Self::ShoulderRight => Self::ShoulderLeft,
            Self::ElbowLeft => Self::ElbowRight,
            Self::ElbowRight => Self::ElbowLeft,
            Self::WristLeft => Self::WristRight,
            Self::WristRight => Self::WristLeft,
            Self::HandLeft => Self::HandRight,
            Self::HandRight => Self::HandLeft,
            Self::HipLeft => Self::HipRight,
            Self::HipRight => Self::HipLeft,
            Self::KneeLeft => Self::KneeRight,
            Self::KneeRight => Self::KneeLeft,
            Self::AnkleLeft => Self::AnkleRight,
            Self::AnkleRight => Self::AnkleLeft,
            Self::FootLeft => Self::FootRight,
            Self::FootRight => Self::FootLeft,
            center => *center,
        }
    }
}

// ── Sides and limbs ────────────────────────────────────────

/// Body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Paired joints that exist once per body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limb {
    Shoulder,
    Elbow,
    Wrist,
    Hand,
    Hip,
    Knee,
    Ankle,
    Foot,
}

// ── Tracking quality ───────────────────────────────────────

/// Per-joint tracking quality reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackingQuality {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

impl TrackingQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotTracked => "not-tracked",
            Self::Inferred => "inferred",
            Self::Tracked => "tracked",
        }
    }

    pub fn from_name(s: &str) -> Option<TrackingQuality> {
        [Self::NotTracked, Self::Inferred, Self::Tracked]
            .into_iter()
            .find(|q| q.as_str() == s)
    }
}

// ── Joint sample ───────────────────────────────────────────

/// Position and quality for a single joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointSample {
    /// Position in normalized sensor space (x, y, z).
    pub position: [f32; 3],
    /// How confidently the source located this joint.
    pub quality: TrackingQuality,
}

// ── Frame ──────────────────────────────────────────────────

/// One user's joint snapshot at a single sampling instant.
///
/// Missing joints default to the origin with `NotTracked` quality.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    joints: [JointSample; JOINT_COUNT],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Create a frame with every joint untracked at the origin.
    pub fn new() -> Self {
        Self {
            joints: [JointSample::default(); JOINT_COUNT],
        }
    }

    /// Sample for a joint.
    pub fn joint(&self, joint: Joint) -> &JointSample {
        &self.joints[joint.index()]
    }

    /// Position of a joint.
    pub fn position(&self, joint: Joint) -> [f32; 3] {
        self.joints[joint.index()].position
    }

    pub fn x(&self, joint: Joint) -> f32 {
        self.joints[joint.index()].position[0]
    }

    pub fn y(&self, joint: Joint) -> f32 {
        self.joints[joint.index()].position[1]
    }

    /// Whether the source fully tracked this joint.
    pub fn is_tracked(&self, joint: Joint) -> bool {
        self.joints[joint.index()].quality == TrackingQuality::Tracked
    }

    /// Replace one joint's sample.
    pub fn set(&mut self, joint: Joint, position: [f32; 3], quality: TrackingQuality) {
        self.joints[joint.index()] = JointSample { position, quality };
    }

    /// Left-right mirror image: sides swapped and x negated.
    #[cfg(test)]
    pub fn mirrored(&self) -> Frame {
        let mut out = Frame::new();
        for joint in Joint::ALL {
            let sample = self.joint(joint);
            let [x, y, z] = sample.position;
            out.set(joint.mirrored(), [-x, y, z], sample.quality);
        }
        out
    }
}

// ── Sensor frame ───────────────────────────────────────────

/// Whole-skeleton tracking state for one detected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonTracking {
    NotTracked,
    /// Only the body center is known; joints are not usable.
    PositionOnly,
    Tracked,
}

impl SkeletonTracking {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotTracked => "not-tracked",
            Self::PositionOnly => "position-only",
            Self::Tracked => "tracked",
        }
    }

    pub fn from_name(s: &str) -> Option<SkeletonTracking> {
        [Self::NotTracked, Self::PositionOnly, Self::Tracked]
            .into_iter()
            .find(|t| t.as_str() == s)
    }
}

/// A user skeleton as reported in a sensor frame.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub tracking: SkeletonTracking,
    pub frame: Frame,
}

/// Everything the tracking source delivered at one sampling instant.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    /// Delivery time in milliseconds relative to the start of the stream.
    pub timestamp_ms: u64,
    pub skeletons: Vec<Skeleton>,
}

impl SensorFrame {
    /// Fully tracked skeletons, in reported order.
    pub fn tracked(&self) -> impl Iterator<Item = &Frame> {
        self.skeletons
            .iter()
            .filter(|s| s.tracking == SkeletonTracking::Tracked)
            .map(|s| &s.frame)
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_count() {
        assert_eq!(Joint::HipCenter.index(), 0);
        assert_eq!(Joint::FootRight.index(), 19);
        assert_eq!(Joint::ALL.len(), JOINT_COUNT);
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_joint_name_roundtrip() {
        for joint in Joint::ALL {
            assert_eq!(Joint::from_name(joint.as_str()), Some(joint));
        }
        assert_eq!(Joint::from_name("elbow"), None);
    }

    #[test]
    fn test_sided_joints() {
        assert_eq!(Joint::sided(Limb::Wrist, Side::Right), Joint::WristRight);
        assert_eq!(Joint::sided(Limb::Elbow, Side::Left), Joint::ElbowLeft);
        assert_eq!(Joint::sided(Limb::Knee, Side::Left), Joint::KneeLeft);
        assert_eq!(Joint::sided(Limb::Ankle, Side::Right), Joint::AnkleRight);
    }

    #[test]
    fn test_mirrored_joint_is_involution() {
        for joint in Joint::ALL {
            assert_eq!(joint.mirrored().mirrored(), joint);
        }
        assert_eq!(Joint::Head.mirrored(), Joint::Head);
        assert_eq!(Joint::WristLeft.mirrored(), Joint::WristRight);
    }

    #[test]
    fn test_new_frame_untracked() {
        let frame = Frame::new();
        for joint in Joint::ALL {
            assert_eq!(frame.position(joint), [0.0, 0.0, 0.0]);
            assert!(!frame.is_tracked(joint));
        }
    }

    #[test]
    fn test_frame_set_and_read() {
        let mut frame = Frame::new();
        frame.set(Joint::Head, [0.1, 0.9, 2.0], TrackingQuality::Inferred);
        assert_eq!(frame.x(Joint::Head), 0.1);
        assert_eq!(frame.y(Joint::Head), 0.9);
        assert_eq!(frame.joint(Joint::Head).quality, TrackingQuality::Inferred);
        assert!(!frame.is_tracked(Joint::Head));
    }

    #[test]
    fn test_frame_mirrored() {
        let mut frame = Frame::new();
        frame.set(Joint::WristRight, [0.6, 0.3, 2.0], TrackingQuality::Tracked);
        frame.set(Joint::ShoulderCenter, [0.1, 0.5, 2.0], TrackingQuality::Tracked);

        let mirrored = frame.mirrored();
        assert_eq!(mirrored.position(Joint::WristLeft), [-0.6, 0.3, 2.0]);
        assert_eq!(mirrored.position(Joint::ShoulderCenter), [-0.1, 0.5, 2.0]);
        assert!(mirrored.is_tracked(Joint::WristLeft));
        assert!(!mirrored.is_tracked(Joint::WristRight));
        assert_eq!(mirrored.mirrored(), frame);
    }

    #[test]
    fn test_sensor_frame_tracked_filter() {
        let frame = SensorFrame {
            timestamp_ms: 0,
            skeletons: vec![
                Skeleton {
                    tracking: SkeletonTracking::PositionOnly,
                    frame: Frame::new(),
                },
                Skeleton {
                    tracking: SkeletonTracking::Tracked,
                    frame: Frame::new(),
                },
                Skeleton {
                    tracking: SkeletonTracking::NotTracked,
                    frame: Frame::new(),
                },
            ],
        };
        assert_eq!(frame.tracked().count(), 1);
    }

    #[test]
    fn test_quality_names() {
        assert_eq!(TrackingQuality::from_name("tracked"), Some(TrackingQuality::Tracked));
        assert_eq!(TrackingQuality::from_name("inferred"), Some(TrackingQuality::Inferred));
        assert_eq!(TrackingQuality::NotTracked.as_str(), "not-tracked");
        assert_eq!(TrackingQuality::from_name("maybe"), None);
        assert_eq!(
            SkeletonTracking::from_name("position-only"),
            Some(SkeletonTracking::PositionOnly)
        );
    }
}
