//! Service configuration supplied by the host.

use serde::Deserialize;

use crate::capture::Rgba8;

/// Environment variable consulted by [`ServiceConfig::from_env`].
pub const BUILD_MODE_ENV: &str = "EASEL_BUILD_MODE";

/// How the host was built. Release hosts run precompiled code and do not
/// expose the debug-only extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Profile,
    Release,
}

impl BuildMode {
    /// The mode matching how this crate was compiled.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub fn running_precompiled_code(self) -> bool {
        self == Self::Release
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "profile" => Some(Self::Profile),
            "release" => Some(Self::Release),
            _ => None,
        }
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::current()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub build_mode: BuildMode,
    /// Color the raster capture is cleared to before the frame is drawn.
    pub background: Rgba8,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            build_mode: BuildMode::current(),
            background: Rgba8([0, 0, 0, 255]),
        }
    }
}

impl ServiceConfig {
    /// Defaults, with the build mode overridden by `EASEL_BUILD_MODE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(BUILD_MODE_ENV) {
            match BuildMode::parse(&raw) {
                Some(mode) => config.build_mode = mode,
                None => tracing::warn!("ignoring unknown {BUILD_MODE_ENV} value {raw:?}"),
            }
        }
        config
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_build_mode(mut self, build_mode: BuildMode) -> Self {
        self.build_mode = build_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_release_runs_precompiled_code() {
        assert!(BuildMode::Release.running_precompiled_code());
        assert!(!BuildMode::Profile.running_precompiled_code());
        assert!(!BuildMode::Debug.running_precompiled_code());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(BuildMode::parse(" Release "), Some(BuildMode::Release));
        assert_eq!(BuildMode::parse("PROFILE"), Some(BuildMode::Profile));
        assert_eq!(BuildMode::parse("fast"), None);
    }

    #[test]
    fn json_fills_in_defaults() {
        let config = ServiceConfig::from_json(r#"{"build_mode":"profile"}"#).unwrap();
        assert_eq!(config.build_mode, BuildMode::Profile);
        assert_eq!(config.background, Rgba8([0, 0, 0, 255]));

        let config = ServiceConfig::from_json(r#"{"background":[255,255,255,255]}"#).unwrap();
        assert_eq!(config.build_mode, BuildMode::current());
        assert_eq!(config.background, Rgba8([255, 255, 255, 255]));
    }

    #[test]
    fn json_rejects_unknown_mode() {
        assert!(ServiceConfig::from_json(r#"{"build_mode":"turbo"}"#).is_err());
    }
}
