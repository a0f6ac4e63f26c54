//! Game keys, virtual key codes, and timed key sequences.
//!
//! Gestures are expressed against abstract game keys; `KeyBindings`
//! resolves them to the virtual key codes handed to the output sink.
//! A `CommandSequence` is plain data: every key action carries its
//! offset from the start of the sequence.

// ── Keys ───────────────────────────────────────────────────

/// Abstract game keys driven by gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    LightPunch,
    HeavyPunch,
    LightKick,
    HeavyKick,
}

impl Key {
    /// Every key, in binding order.
    pub const ALL: [Key; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::LightPunch,
        Self::HeavyPunch,
        Self::LightKick,
        Self::HeavyKick,
    ];

    /// String representation for configuration and event output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::LightPunch => "light-punch",
            Self::HeavyPunch => "heavy-punch",
            Self::LightKick => "light-kick",
            Self::HeavyKick => "heavy-kick",
        }
    }

    pub fn from_name(s: &str) -> Option<Key> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDirection {
    Down,
    Up,
}

impl KeyDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

// ── Bindings ───────────────────────────────────────────────

/// Virtual key code for each game key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub up: u8,
    pub down: u8,
    pub left: u8,
    pub right: u8,
    pub light_punch: u8,
    pub heavy_punch: u8,
    pub light_kick: u8,
    pub heavy_kick: u8,
}

impl Default for KeyBindings {
    /// W, S, A, D, H, J, N, M.
    fn default() -> Self {
        Self {
            up: 0x57,
            down: 0x53,
            left: 0x41,
            right: 0x44,
            light_punch: 0x48,
            heavy_punch: 0x4A,
            light_kick: 0x4E,
            heavy_kick: 0x4D,
        }
    }
}

impl KeyBindings {
    /// Virtual key code bound to `key`.
    pub fn vk(&self, key: Key) -> u8 {
        match key {
            Key::Up => self.up,
            Key::Down => self.down,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::LightPunch => self.light_punch,
            Key::HeavyPunch => self.heavy_punch,
            Key::LightKick => self.light_kick,
            Key::HeavyKick => self.heavy_kick,
        }
    }

    /// Rebind one key.
    pub fn set(&mut self, key: Key, vk: u8) {
        let slot = match key {
            Key::Up => &mut self.up,
            Key::Down => &mut self.down,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::LightPunch => &mut self.light_punch,
            Key::HeavyPunch => &mut self.heavy_punch,
            Key::LightKick => &mut self.light_kick,
            Key::HeavyKick => &mut self.heavy_kick,
        };
        *slot = vk;
    }

    /// Generate s-expression listing all bindings.
    pub fn bindings_sexp(&self) -> String {
        let mut s = String::from("(");
        for (i, key) in Key::ALL.iter().enumerate() {
            if i > 0 {
                s.push(' ');
            }
            s.push_str(&format!(":{} {}", key.as_str(), self.vk(*key)));
        }
        s.push(')');
        s
    }
}

// ── Sequences ──────────────────────────────────────────────

/// One scheduled key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAction {
    pub key: Key,
    pub direction: KeyDirection,
    /// Milliseconds from the start of the sequence.
    pub offset_ms: u64,
}

/// Ordered, timed key actions produced for one gesture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSequence {
    pub actions: Vec<KeyAction>,
    /// Pause held after the last action before the sequencer moves on.
    pub settle_ms: u64,
}

impl CommandSequence {
    /// Offset of the last action.
    pub fn duration_ms(&self) -> u64 {
        self.actions.iter().map(|a| a.offset_ms).max().unwrap_or(0)
    }

    /// Time the sequencer is occupied: duration plus settle pause.
    pub fn span_ms(&self) -> u64 {
        self.duration_ms() + self.settle_ms
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// `(key, direction)` pairs in emission order, without timing.
    #[cfg(test)]
    pub fn events(&self) -> Vec<(Key, KeyDirection)> {
        self.actions.iter().map(|a| (a.key, a.direction)).collect()
    }
}

/// Cursor-based builder for literal key tables.
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    cursor_ms: u64,
    actions: Vec<KeyAction>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, key: Key, direction: KeyDirection) {
        self.actions.push(KeyAction {
            key,
            direction,
            offset_ms: self.cursor_ms,
        });
    }

    /// Advance the cursor without emitting.
    pub fn wait(mut self, ms: u64) -> Self {
        self.cursor_ms += ms;
        self
    }

    pub fn press(mut self, key: Key) -> Self {
        self.push(key, KeyDirection::Down);
        self
    }

    pub fn release(mut self, key: Key) -> Self {
        self.push(key, KeyDirection::Up);
        self
    }

    /// Press `key`, hold it for `hold_ms`, release it.
    pub fn tap(self, key: Key, hold_ms: u64) -> Self {
        self.chord(&[key], hold_ms)
    }

    /// Press every key in order, hold, release them in the same order.
    pub fn chord(mut self, keys: &[Key], hold_ms: u64) -> Self {
        for key in keys {
            self.push(*key, KeyDirection::Down);
        }
        self.cursor_ms += hold_ms;
        for key in keys {
            self.push(*key, KeyDirection::Up);
        }
        self
    }

    /// Finish with a settle pause after the last action.
    pub fn settle(self, settle_ms: u64) -> CommandSequence {
        CommandSequence {
            actions: self.actions,
            settle_ms,
        }
    }

    pub fn build(self) -> CommandSequence {
        self.settle(0)
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let b = KeyBindings::default();
        assert_eq!(b.vk(Key::Up), 0x57);
        assert_eq!(b.vk(Key::Down), 0x53);
        assert_eq!(b.vk(Key::Left), 0x41);
        assert_eq!(b.vk(Key::Right), 0x44);
        assert_eq!(b.vk(Key::LightPunch), 0x48);
        assert_eq!(b.vk(Key::HeavyPunch), 0x4A);
        assert_eq!(b.vk(Key::LightKick), 0x4E);
        assert_eq!(b.vk(Key::HeavyKick), 0x4D);
    }

    #[test]
    fn test_rebind() {
        let mut b = KeyBindings::default();
        b.set(Key::HeavyKick, 0x4C);
        assert_eq!(b.vk(Key::HeavyKick), 0x4C);
        assert_eq!(b.vk(Key::LightKick), 0x4E);
    }

    #[test]
    fn test_bindings_sexp() {
        let sexp = KeyBindings::default().bindings_sexp();
        assert!(sexp.starts_with("(:up 87"));
        assert!(sexp.contains(":heavy-punch 74"));
        assert!(sexp.ends_with(":heavy-kick 77)"));
    }

    #[test]
    fn test_key_names() {
        for key in Key::ALL {
            assert_eq!(Key::from_name(key.as_str()), Some(key));
        }
        assert_eq!(Key::from_name("jump"), None);
    }

    #[test]
    fn test_tap_offsets() {
        let seq = SequenceBuilder::new().tap(Key::Up, 100).build();
        assert_eq!(
            seq.actions,
            vec![
                KeyAction { key: Key::Up, direction: KeyDirection::Down, offset_ms: 0 },
                KeyAction { key: Key::Up, direction: KeyDirection::Up, offset_ms: 100 },
            ]
        );
        assert_eq!(seq.duration_ms(), 100);
        assert_eq!(seq.span_ms(), 100);
    }

    #[test]
    fn test_chord_releases_in_press_order() {
        let seq = SequenceBuilder::new()
            .wait(50)
            .chord(&[Key::Left, Key::HeavyKick], 100)
            .settle(200);
        assert_eq!(
            seq.events(),
            vec![
                (Key::Left, KeyDirection::Down),
                (Key::HeavyKick, KeyDirection::Down),
                (Key::Left, KeyDirection::Up),
                (Key::HeavyKick, KeyDirection::Up),
            ]
        );
        assert_eq!(seq.actions[0].offset_ms, 50);
        assert_eq!(seq.actions[3].offset_ms, 150);
        assert_eq!(seq.duration_ms(), 150);
        assert_eq!(seq.span_ms(), 350);
    }

    #[test]
    fn test_empty_sequence() {
        let seq = SequenceBuilder::new().wait(50).build();
        assert!(seq.is_empty());
        assert_eq!(seq.duration_ms(), 0);
    }

    #[test]
    fn test_level_press_has_zero_span() {
        let seq = SequenceBuilder::new().press(Key::Down).build();
        assert_eq!(seq.events(), vec![(Key::Down, KeyDirection::Down)]);
        assert_eq!(seq.span_ms(), 0);
    }
}
