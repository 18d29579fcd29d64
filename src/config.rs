//! # Configuration
//!
//! Typed configuration carried by every pattern.
//!
//! ## Keys
//! | Key          | Type   | Default  |
//! |--------------|--------|----------|
//! | `BPM`        | int    | 130      |
//! | `DIV`        | int    | 8        |
//! | `DEF_LEN`    | int    | 8        |
//! | `VOL`        | int    | 80       |
//! | `BASE_PITCH` | float  | 440.0    |
//! | `TUNING`     | tuning | `12TET`  |
//!
//! Assignments never mutate a shared value: [`Config::with`] builds a new
//! configuration with one key replaced. The parser keeps one value as the
//! default for future patterns and hands each pattern its own copy, so a
//! change made mid-pattern only affects notes appended after it.

use serde::Serialize;

use crate::error::MonureError;

/// Step count used when a tuning label carries no usable number
pub const DEFAULT_STEPS: u32 = 12;

/// Equal-division tuning descriptor, e.g. `19TET` = 19 steps per octave
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tuning {
    pub steps: u32,
    pub label: String,
}

impl Tuning {
    /// Parse a tuning label such as "19TET", "31EDO" or "JUST".
    ///
    /// The first run of ASCII digits is the step count. Labels without one,
    /// or whose number is zero or too large, fall back to 12 steps.
    pub fn parse(label: &str) -> Self {
        let digits: String = label
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let steps = match digits.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => DEFAULT_STEPS,
        };
        Self {
            steps,
            label: label.to_string(),
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            label: "12TET".to_string(),
        }
    }
}

/// The fixed set of configuration keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigKey {
    Bpm,
    Div,
    DefLen,
    Vol,
    BasePitch,
    Tuning,
}

impl ConfigKey {
    /// Look up a key name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BPM" => Some(ConfigKey::Bpm),
            "DIV" => Some(ConfigKey::Div),
            "DEF_LEN" => Some(ConfigKey::DefLen),
            "VOL" => Some(ConfigKey::Vol),
            "BASE_PITCH" => Some(ConfigKey::BasePitch),
            "TUNING" => Some(ConfigKey::Tuning),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Bpm => "BPM",
            ConfigKey::Div => "DIV",
            ConfigKey::DefLen => "DEF_LEN",
            ConfigKey::Vol => "VOL",
            ConfigKey::BasePitch => "BASE_PITCH",
            ConfigKey::Tuning => "TUNING",
        }
    }
}

/// A single typed assignment, e.g. `BPM: 120`
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Bpm(u32),
    Div(u32),
    DefLen(u32),
    Vol(u32),
    BasePitch(f64),
    Tuning(Tuning),
}

impl Setting {
    /// Convert a raw value for `key`; `line` is only used for the error.
    pub fn parse(key: ConfigKey, value: &str, line: usize) -> Result<Self, MonureError> {
        let invalid = || MonureError::InvalidConfigValue {
            line,
            key: key.name().to_string(),
            value: value.to_string(),
        };
        let int = || value.trim().parse::<u32>().map_err(|_| invalid());

        Ok(match key {
            ConfigKey::Bpm => Setting::Bpm(int()?),
            ConfigKey::Div => Setting::Div(int()?),
            ConfigKey::DefLen => Setting::DefLen(int()?),
            ConfigKey::Vol => Setting::Vol(int()?),
            ConfigKey::BasePitch => {
                let hz: f64 = value.trim().parse().map_err(|_| invalid())?;
                if !hz.is_finite() || hz <= 0.0 {
                    return Err(invalid());
                }
                Setting::BasePitch(hz)
            }
            ConfigKey::Tuning => Setting::Tuning(Tuning::parse(value.trim())),
        })
    }
}

/// Playback configuration snapshot owned by a pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub bpm: u32,
    pub div: u32,
    pub def_len: u32,
    pub vol: u32,
    pub base_pitch: f64,
    pub tuning: Tuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: 130,
            div: 8,
            def_len: 8,
            vol: 80,
            base_pitch: 440.0,
            tuning: Tuning::default(),
        }
    }
}

impl Config {
    /// Return a copy of this configuration with one setting replaced
    pub fn with(&self, setting: &Setting) -> Self {
        let mut next = self.clone();
        match setting {
            Setting::Bpm(v) => next.bpm = *v,
            Setting::Div(v) => next.div = *v,
            Setting::DefLen(v) => next.def_len = *v,
            Setting::Vol(v) => next.vol = *v,
            Setting::BasePitch(v) => next.base_pitch = *v,
            Setting::Tuning(t) => next.tuning = t.clone(),
        }
        next
    }

    /// Default velocity clamped into 0..=100
    pub fn velocity(&self) -> u8 {
        self.vol.min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bpm, 130);
        assert_eq!(config.div, 8);
        assert_eq!(config.def_len, 8);
        assert_eq!(config.vol, 80);
        assert_eq!(config.base_pitch, 440.0);
        assert_eq!(config.tuning.steps, 12);
    }

    #[test]
    fn test_tuning_leading_digits() {
        assert_eq!(Tuning::parse("19TET").steps, 19);
        assert_eq!(Tuning::parse("31EDO").steps, 31);
        // First run of digits wins
        assert_eq!(Tuning::parse("19K12").steps, 19);
        assert_eq!(Tuning::parse("EDO24").steps, 24);
    }

    #[test]
    fn test_tuning_fallback() {
        assert_eq!(Tuning::parse("JUST").steps, 12);
        assert_eq!(Tuning::parse("").steps, 12);
        assert_eq!(Tuning::parse("0TET").steps, 12);
        assert_eq!(Tuning::parse("99999999999TET").steps, 12);
    }

    #[test]
    fn test_tuning_keeps_label() {
        let tuning = Tuning::parse("6TET");
        assert_eq!(tuning.label, "6TET");
    }

    #[test]
    fn test_key_lookup_ignores_case() {
        assert_eq!(ConfigKey::from_name("bpm"), Some(ConfigKey::Bpm));
        assert_eq!(ConfigKey::from_name("Def_Len"), Some(ConfigKey::DefLen));
        assert_eq!(ConfigKey::from_name("SWING"), None);
    }

    #[test]
    fn test_setting_parse() {
        assert_eq!(
            Setting::parse(ConfigKey::Bpm, "120", 1).unwrap(),
            Setting::Bpm(120)
        );
        assert_eq!(
            Setting::parse(ConfigKey::BasePitch, "432.5", 1).unwrap(),
            Setting::BasePitch(432.5)
        );
    }

    #[test]
    fn test_setting_parse_invalid() {
        let result = Setting::parse(ConfigKey::Bpm, "FAST", 7);
        match result {
            Err(MonureError::InvalidConfigValue { line, key, value }) => {
                assert_eq!(line, 7);
                assert_eq!(key, "BPM");
                assert_eq!(value, "FAST");
            }
            _ => panic!("Expected InvalidConfigValue"),
        }
        assert!(Setting::parse(ConfigKey::Div, "8.5", 1).is_err());
        assert!(Setting::parse(ConfigKey::BasePitch, "-440", 1).is_err());
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let base = Config::default();
        let changed = base.with(&Setting::Bpm(90));
        assert_eq!(base.bpm, 130);
        assert_eq!(changed.bpm, 90);
        assert_eq!(changed.div, base.div);
    }

    #[test]
    fn test_velocity_clamped() {
        let config = Config::default().with(&Setting::Vol(150));
        assert_eq!(config.velocity(), 100);
    }
}
