use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct CoverageConfig {
    /// Key contigs by their name without a leading "chr".
    pub normalize_contig_names: bool,
    /// Retain per-position read bases so mismatches can be computed.
    pub track_mismatches: bool,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        CoverageConfig {
            normalize_contig_names: true,
            track_mismatches: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum CoverageConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl TryFrom<&Path> for CoverageConfig {
    type Error = CoverageConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_default_tracks_everything() {
        let config = CoverageConfig::default();
        assert_eq!(config.normalize_contig_names, true);
        assert_eq!(config.track_mismatches, true);
    }

    #[rstest]
    fn test_try_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coverage.toml");
        std::fs::write(&path, "track_mismatches = false\n").unwrap();

        let config = CoverageConfig::try_from(path.as_path()).unwrap();
        assert_eq!(
            config,
            CoverageConfig {
                normalize_contig_names: true,
                track_mismatches: false,
            }
        );
    }

    #[rstest]
    fn test_try_from_bad_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coverage.toml");
        std::fs::write(&path, "track_mismatches = \"sometimes\"\n").unwrap();

        let result = CoverageConfig::try_from(path.as_path());
        assert!(matches!(result, Err(CoverageConfigError::Toml(_))));
    }

    #[rstest]
    fn test_try_from_missing_file() {
        let result = CoverageConfig::try_from(Path::new("/no/such/coverage.toml"));
        assert!(matches!(result, Err(CoverageConfigError::Io(_))));
    }
}
