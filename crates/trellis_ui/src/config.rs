//! Scene configuration.
//!
//! Loaded from TOML off the hot path. Every field has a default, so an
//! empty document is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Defaults applied to newly created animators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorDefaults {
    /// Cycle count. Negative means infinite.
    pub periods: f32,
    /// Waveform amplitude.
    pub amplitude: f32,
    /// Timer units per second.
    pub speed: f32,
}

impl Default for AnimatorDefaults {
    fn default() -> Self {
        Self {
            periods: 1.0,
            amplitude: 0.5,
            speed: 1.0,
        }
    }
}

/// Configuration for a [`Scene`](crate::Scene).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Resize deltas below this are ignored.
    pub epsilon: f32,
    /// Scales below this on either axis suppress drawing and hit testing.
    pub scale_epsilon: f32,
    /// Seed for the noise waveform. `None` seeds from the clock.
    pub noise_seed: Option<u64>,
    /// Defaults for new animators.
    pub animator: AnimatorDefaults,
    /// Log unresolved animator targets.
    pub warn_unresolved: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            scale_epsilon: 1e-4,
            noise_seed: None,
            animator: AnimatorDefaults::default(),
            warn_unresolved: true,
        }
    }
}

impl SceneConfig {
    /// Deterministic config for tests and replays: fixed noise seed.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            noise_seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the document does not parse or fails validation.
    pub fn from_toml_str(source: &str) -> SceneResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SceneError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SceneError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> SceneResult<()> {
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(SceneError::InvalidConfig("epsilon must be >= 0".into()));
        }
        if self.scale_epsilon.is_nan() || self.scale_epsilon < 0.0 {
            return Err(SceneError::InvalidConfig("scale_epsilon must be >= 0".into()));
        }
        if !self.animator.speed.is_finite() {
            return Err(SceneError::InvalidConfig("animator.speed must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = SceneConfig::from_toml_str("").expect("parse");
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = SceneConfig::from_toml_str(
            r"
            noise_seed = 42
            [animator]
            speed = 2.0
            ",
        )
        .expect("parse");

        assert_eq!(config.noise_seed, Some(42));
        assert!((config.animator.speed - 2.0).abs() < f32::EPSILON);
        assert!((config.animator.periods - 1.0).abs() < f32::EPSILON);
        assert!((config.epsilon - 1e-4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_negative_epsilon() {
        let err = SceneConfig::from_toml_str("epsilon = -1.0").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(SceneConfig::from_toml_str("epsilon = \"wide\"").is_err());
    }
}
