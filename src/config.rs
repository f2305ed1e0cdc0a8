use crate::constants::{DEFAULT_QUALITY, ENV_JOBS, ENV_OUTPUT_DIR, ENV_QUALITY};
use std::env;
use std::path::PathBuf;

/// Defaults for a compression run, overridable per invocation on the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub quality: f32,
    pub jobs: usize,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            jobs: num_cpus::get(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparsable values fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            quality: lookup(ENV_QUALITY)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.quality),
            jobs: lookup(ENV_JOBS)
                .and_then(|v| v.trim().parse().ok())
                .filter(|&jobs: &usize| jobs > 0)
                .unwrap_or(defaults.jobs),
            output_dir: lookup(ENV_OUTPUT_DIR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert!(config.jobs >= 1);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = AppConfig::from_lookup(lookup(&[
            ("IMGPRESS_QUALITY", "0.6"),
            ("IMGPRESS_JOBS", "3"),
            ("IMGPRESS_OUTPUT_DIR", "/tmp/out"),
        ]));
        assert_eq!(config.quality, 0.6);
        assert_eq!(config.jobs, 3);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("IMGPRESS_QUALITY", "best"),
            ("IMGPRESS_JOBS", "0"),
            ("IMGPRESS_OUTPUT_DIR", "  "),
        ]));
        assert_eq!(config, AppConfig::default());
    }
}
