//! Literal key tables for each gesture.
//!
//! Offsets and pauses are part of the input timing the game expects;
//! they must stay exactly as listed. Forward/back keys flip with the
//! facing mode, everything else is shared.

use crate::gesture::{Gesture, Lateral, Mode, SpecialVariant};
use crate::keys::{CommandSequence, Key, SequenceBuilder};

/// Standard tap length for combo inputs (ms).
const TAP_MS: u64 = 50;
/// Hold length for jump pulses and two-key chords (ms).
const HOLD_MS: u64 = 100;
/// Pause after a special or combo before the next gesture (ms).
const COMBO_SETTLE_MS: u64 = 200;
/// Pause after a haymaker (ms).
const HAYMAKER_SETTLE_MS: u64 = 500;
/// Pause after a high kick (ms).
const KICK_SETTLE_MS: u64 = 100;
/// Lead-in before reach-triggered moves (ms).
const LEAD_IN_MS: u64 = 50;

/// Build the command sequence for `gesture` in facing `mode`.
pub fn sequence_for(gesture: &Gesture, mode: Mode) -> CommandSequence {
    let fwd = mode.forward_key();
    let back = mode.back_key();

    match gesture {
        // Debounce is handled by the controller; the toggle emits nothing.
        Gesture::ModeToggle { .. } => CommandSequence::default(),
        Gesture::Lateral(Lateral::Right) => SequenceBuilder::new().press(Key::Right).build(),
        Gesture::Lateral(Lateral::Left) => SequenceBuilder::new().press(Key::Left).build(),
        Gesture::Lateral(Lateral::Neutral) => {
            SequenceBuilder::new().release(fwd).release(back).build()
        }
        Gesture::Jump => SequenceBuilder::new().tap(Key::Up, HOLD_MS).build(),
        Gesture::Crouch { held: true } => SequenceBuilder::new().press(Key::Down).build(),
        Gesture::Crouch { held: false } => SequenceBuilder::new().release(Key::Down).build(),
        Gesture::CriticalCombo => critical_combo(mode),
        Gesture::HaymakerPunch => SequenceBuilder::new()
            .wait(LEAD_IN_MS)
            .tap(fwd, TAP_MS)
            .tap(Key::Down, TAP_MS)
            .tap(fwd, TAP_MS)
            .tap(Key::HeavyPunch, TAP_MS)
            .settle(HAYMAKER_SETTLE_MS),
        Gesture::ForwardSpecial(SpecialVariant::DoubleForward) => SequenceBuilder::new()
            .wait(LEAD_IN_MS)
            .tap(Key::Down, TAP_MS)
            .chord(&[Key::Down, fwd], TAP_MS)
            .tap(fwd, TAP_MS)
            .tap(Key::HeavyPunch, TAP_MS)
            .settle(COMBO_SETTLE_MS),
        Gesture::ForwardSpecial(SpecialVariant::ForwardPunch) => SequenceBuilder::new()
            .wait(LEAD_IN_MS)
            .chord(&[fwd, Key::HeavyPunch], HOLD_MS)
            .settle(COMBO_SETTLE_MS),
        Gesture::ForwardSpecial(SpecialVariant::Jab) => SequenceBuilder::new()
            .wait(LEAD_IN_MS)
            .tap(Key::LightPunch, TAP_MS)
            .build(),
        Gesture::HighKick => SequenceBuilder::new()
            .tap(Key::LightKick, TAP_MS)
            .settle(KICK_SETTLE_MS),
        Gesture::LowKickCombo => SequenceBuilder::new()
            .wait(LEAD_IN_MS)
            .chord(&[back, Key::HeavyKick], HOLD_MS)
            .settle(COMBO_SETTLE_MS),
    }
}

/// Eight-input critical combo. Facing left starts after a short lead-in.
fn critical_combo(mode: Mode) -> CommandSequence {
    let fwd = mode.forward_key();
    let lead_in = match mode {
        Mode::FacingRight => 0,
        Mode::FacingLeft => LEAD_IN_MS,
    };
    SequenceBuilder::new()
        .wait(lead_in)
        .tap(Key::Down, TAP_MS)
        .chord(&[Key::Down, fwd], TAP_MS)
        .tap(fwd, TAP_MS)
        .chord(&[Key::Down, fwd], TAP_MS)
        .tap(Key::Down, TAP_MS)
        .chord(&[Key::Down, fwd], TAP_MS)
        .tap(fwd, TAP_MS)
        .tap(Key::HeavyPunch, TAP_MS)
        .settle(COMBO_SETTLE_MS)
}

// ── Tests ──────────────────────────────────────────────────
