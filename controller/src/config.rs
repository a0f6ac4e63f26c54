//! Configuration file loading.
//!
//! The file holds a single plist; every key is optional and unknown
//! keys are ignored with a warning:
//!
//! ```text
//! (:lateral-right 0.12 :jump 0.2 :debounce-ms 1000
//!  :require-tracked nil :mode right :key-up 87 :key-heavy-punch 74)
//! ```

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use lexpr::Value;
use tracing::warn;

use crate::gesture::{GestureConfig, Mode};
use crate::keys::{Key, KeyBindings};
use crate::sexp::{get_bool, get_float, get_int, get_keyword, plist_keys};

/// Threshold keys, in `GestureConfig` field order.
const THRESHOLD_KEYS: [&str; 11] = [
    "lateral-right",
    "lateral-left",
    "jump",
    "crouch",
    "haymaker-rise",
    "special-reach",
    "offhand-reach",
    "elbow-pullback",
    "high-kick-reach",
    "knee-rise",
    "initial-baseline",
];

/// Everything a config file can set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub gesture: GestureConfig,
    pub bindings: KeyBindings,
    /// Initial facing; `None` leaves the choice to the command line.
    pub mode: Option<Mode>,
}

impl Settings {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse config text, starting from defaults.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let value = lexpr::from_str(text).map_err(|e| anyhow!("{}", e))?;
        let mut settings = Settings::default();
        settings.apply(&value)?;
        Ok(settings)
    }

    fn apply(&mut self, value: &Value) -> anyhow::Result<()> {
        for key in plist_keys(value) {
            if !is_known_key(&key) {
                warn!("Ignoring unknown config key :{}", key);
            }
        }

        let g = &mut self.gesture;
        for key in THRESHOLD_KEYS {
            if get_keyword(value, key).is_some() {
                let v = get_float(value, key)
                    .ok_or_else(|| anyhow!(":{} must be a number", key))?;
                *threshold_slot(g, key)? = v as f32;
            }
        }
        if get_keyword(value, "debounce-ms").is_some() {
            let ms = get_int(value, "debounce-ms")
                .filter(|ms| *ms >= 0)
                .ok_or_else(|| anyhow!(":debounce-ms must be a non-negative integer"))?;
            g.debounce_ms = ms as u64;
        }
        if let Some(require) = get_bool(value, "require-tracked") {
            g.require_tracked = require;
        }
        if let Some(name) = get_keyword(value, "mode") {
            self.mode =
                Some(Mode::from_name(&name).ok_or_else(|| anyhow!("unknown mode {:?}", name))?);
        }

        for key in Key::ALL {
            let field = format!("key-{}", key.as_str());
            if get_keyword(value, &field).is_none() {
                continue;
            }
            let vk = get_int(value, &field)
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| anyhow!(":{} must be a virtual key code 0-255", field))?;
            self.bindings.set(key, vk);
        }
        Ok(())
    }
}

fn is_known_key(key: &str) -> bool {
    THRESHOLD_KEYS.contains(&key)
        || matches!(key, "debounce-ms" | "require-tracked" | "mode")
        || key
            .strip_prefix("key-")
            .and_then(Key::from_name)
            .is_some()
}

fn threshold_slot<'a>(g: &'a mut GestureConfig, key: &str) -> anyhow::Result<&'a mut f32> {
    Ok(match key {
        "lateral-right" => &mut g.lateral_right,
        "lateral-left" => &mut g.lateral_left,
        "jump" => &mut g.jump,
        "crouch" => &mut g.crouch,
        "haymaker-rise" => &mut g.haymaker_rise,
        "special-reach" => &mut g.special_reach,
        "offhand-reach" => &mut g.offhand_reach,
        "elbow-pullback" => &mut g.elbow_pullback,
        "high-kick-reach" => &mut g.high_kick_reach,
        "knee-rise" => &mut g.knee_rise,
        "initial-baseline" => &mut g.initial_baseline,
        other => bail!("no threshold named {}", other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let s = Settings::parse("()").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_thresholds_and_flags() {
        let s = Settings::parse(
            "(:lateral-right 0.15 :jump 0.3 :debounce-ms 750 :require-tracked t :initial-baseline 0.45)",
        )
        .unwrap();
        assert!((s.gesture.lateral_right - 0.15).abs() < 1e-6);
        assert!((s.gesture.jump - 0.3).abs() < 1e-6);
        assert!((s.gesture.initial_baseline - 0.45).abs() < 1e-6);
        assert_eq!(s.gesture.debounce_ms, 750);
        assert!(s.gesture.require_tracked);
        // Untouched values keep their defaults.
        assert!((s.gesture.lateral_left - 0.13).abs() < 1e-6);
        assert_eq!(s.mode, None);
    }

    #[test]
    fn test_integer_threshold_accepted() {
        let s = Settings::parse("(:special-reach 1)").unwrap();
        assert_eq!(s.gesture.special_reach, 1.0);
    }

    #[test]
    fn test_key_bindings() {
        let s = Settings::parse("(:key-up 38 :key-heavy-punch 74 :key-light-kick 75)").unwrap();
        assert_eq!(s.bindings.vk(Key::Up), 38);
        assert_eq!(s.bindings.vk(Key::HeavyPunch), 74);
        assert_eq!(s.bindings.vk(Key::LightKick), 75);
        assert_eq!(s.bindings.vk(Key::Down), 0x53);
    }

    #[test]
    fn test_mode() {
        let s = Settings::parse("(:mode left)").unwrap();
        assert_eq!(s.mode, Some(Mode::FacingLeft));
        let s = Settings::parse("(:mode :facing-right)").unwrap();
        assert_eq!(s.mode, Some(Mode::FacingRight));
        assert!(Settings::parse("(:mode up)").is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let s = Settings::parse("(:bogus 1 :key-start 13 :jump 0.25)").unwrap();
        assert!((s.gesture.jump - 0.25).abs() < 1e-6);
        assert_eq!(s.bindings, KeyBindings::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::parse("(:jump high)").is_err());
        assert!(Settings::parse("(:debounce-ms -1)").is_err());
        assert!(Settings::parse("(:debounce-ms 0.5)").is_err());
        assert!(Settings::parse("(:key-up 300)").is_err());
        assert!(Settings::parse("(:jump").is_err());
    }

    #[test]
    fn test_known_keys() {
        assert!(is_known_key("knee-rise"));
        assert!(is_known_key("key-heavy-kick"));
        assert!(!is_known_key("key-start"));
        assert!(!is_known_key("turbo"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/gesture-keys.el")).unwrap_err();
        assert!(format!("{:#}", err).contains("reading config"));
    }
}
