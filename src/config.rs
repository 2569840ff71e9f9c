//! Word-count thresholds for segment length warnings
//!
//! Precedence, lowest first: built-in defaults, the `[segments]` table of a
//! TOML file, `SEAMGUARD_*` environment variables, then CLI flags (applied by
//! the binary). These values only drive `SegmentLength` warnings and the
//! target-band summary; they never affect fidelity or coverage checks.

use crate::error::{Result, SeamError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_MIN_WORDS: &str = "SEAMGUARD_MIN_WORDS";
pub const ENV_TARGET_MIN: &str = "SEAMGUARD_TARGET_MIN";
pub const ENV_TARGET_MAX: &str = "SEAMGUARD_TARGET_MAX";
pub const ENV_HARD_MAX: &str = "SEAMGUARD_HARD_MAX";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentLimits {
    /// Below this a segment gets a length warning
    pub min_words: usize,
    /// Soft band producers should aim for
    pub target_min: usize,
    pub target_max: usize,
    /// Above this a segment gets a length warning
    pub hard_max: usize,
}

impl Default for SegmentLimits {
    fn default() -> Self {
        Self {
            min_words: 180,
            target_min: 200,
            target_max: 350,
            hard_max: 500,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    segments: SegmentLimits,
}

impl SegmentLimits {
    /// Reject bands that contradict each other
    pub fn check(&self) -> Result<()> {
        if self.min_words > self.hard_max {
            return Err(SeamError::Config(format!(
                "min_words ({}) exceeds hard_max ({})",
                self.min_words, self.hard_max
            )));
        }
        if self.target_min > self.target_max {
            return Err(SeamError::Config(format!(
                "target_min ({}) exceeds target_max ({})",
                self.target_min, self.target_max
            )));
        }
        if self.target_max > self.hard_max {
            return Err(SeamError::Config(format!(
                "target_max ({}) exceeds hard_max ({})",
                self.target_max, self.hard_max
            )));
        }
        Ok(())
    }

    pub fn in_target_band(&self, words: usize) -> bool {
        (self.target_min..=self.target_max).contains(&words)
    }

    /// Parse the `[segments]` table of a TOML document; absent keys keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| SeamError::Config(e.to_string()))?;
        Ok(file.segments)
    }

    /// Override from variables resolved through `lookup`
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut usize); 4] = [
            (ENV_MIN_WORDS, &mut self.min_words),
            (ENV_TARGET_MIN, &mut self.target_min),
            (ENV_TARGET_MAX, &mut self.target_max),
            (ENV_HARD_MAX, &mut self.hard_max),
        ];
        for (name, slot) in targets {
            if let Some(raw) = lookup(name) {
                *slot = raw.trim().parse().map_err(|_| {
                    SeamError::Config(format!("{name} must be a non-negative integer, got {raw:?}"))
                })?;
            }
        }
        Ok(self)
    }

    /// Defaults, then `path` if given, then variables resolved through `lookup`
    ///
    /// Unchecked, so callers can layer further overrides before calling [`check`](Self::check).
    pub fn from_sources<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let limits = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        limits.with_env_lookup(lookup)
    }

    /// Defaults, then `path` if given, then the process environment; checked
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let limits = Self::from_sources(path, |name| std::env::var(name).ok())?;
        limits.check()?;
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_consistent() {
        let limits = SegmentLimits::default();
        assert_eq!(limits.min_words, 180);
        assert_eq!(limits.hard_max, 500);
        assert!(limits.check().is_ok());
        assert!(limits.in_target_band(200));
        assert!(limits.in_target_band(350));
        assert!(!limits.in_target_band(351));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let limits = SegmentLimits::from_toml_str("[segments]\nmin_words = 50\n").unwrap();
        assert_eq!(limits.min_words, 50);
        assert_eq!(limits.target_max, 350);

        let empty = SegmentLimits::from_toml_str("").unwrap();
        assert_eq!(empty, SegmentLimits::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = SegmentLimits::from_toml_str("[segments]\nmin_words = \"many\"\n").unwrap_err();
        assert!(matches!(err, SeamError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_HARD_MAX, "800"), (ENV_MIN_WORDS, " 10 ")].into();
        let limits = SegmentLimits::default()
            .with_env_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(limits.hard_max, 800);
        assert_eq!(limits.min_words, 10);
        assert_eq!(limits.target_min, 200);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let result = SegmentLimits::default()
            .with_env_lookup(|name| (name == ENV_TARGET_MIN).then(|| "-3".to_string()));
        assert!(matches!(result, Err(SeamError::Config(_))));
    }

    #[test]
    fn test_check_rejects_inverted_bands() {
        let limits = SegmentLimits { min_words: 600, ..Default::default() };
        assert!(limits.check().is_err());
        let limits = SegmentLimits { target_min: 400, target_max: 300, ..Default::default() };
        assert!(limits.check().is_err());
        let limits = SegmentLimits { target_max: 900, ..Default::default() };
        assert!(limits.check().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("seamguard.toml");
        std::fs::write(&path, "[segments]\nmin_words = 20\ntarget_min = 30\ntarget_max = 60\nhard_max = 90\n").unwrap();
        // skipped when the environment carries overrides, which would make the result unpredictable
        if [ENV_MIN_WORDS, ENV_TARGET_MIN, ENV_TARGET_MAX, ENV_HARD_MAX]
            .iter()
            .any(|name| std::env::var(name).is_ok())
        {
            return;
        }
        let limits = SegmentLimits::load(Some(&path)).unwrap();
        assert_eq!(
            limits,
            SegmentLimits { min_words: 20, target_min: 30, target_max: 60, hard_max: 90 }
        );

        let missing = SegmentLimits::load(Some(&temp_dir.path().join("absent.toml")));
        assert!(matches!(missing, Err(SeamError::Io(_))));
    }

    #[test]
    fn test_from_sources_layers_without_checking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("seamguard.toml");
        std::fs::write(&path, "[segments]\nmin_words = 600\n").unwrap();

        let vars: HashMap<&str, &str> = [(ENV_TARGET_MAX, "400")].into();
        let limits =
            SegmentLimits::from_sources(Some(&path), |name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(limits.min_words, 600);
        assert_eq!(limits.target_max, 400);
        assert_eq!(limits.hard_max, 500);
        // inconsistent on its own; a later override can still repair it
        assert!(limits.check().is_err());
        let repaired = SegmentLimits { hard_max: 1000, ..limits };
        assert!(repaired.check().is_ok());

        let none = SegmentLimits::from_sources(None, |_| None).unwrap();
        assert_eq!(none, SegmentLimits::default());
    }
}
