//! Grid configuration files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use refresh_components::MasonryGridArgs;
use thiserror::Error;
use tracing::debug;

/// Errors from loading a grid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid TOML in {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unsupported config extension for {0}, expected .json or .toml")]
    UnsupportedExtension(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Loads grid arguments from a `.json` or `.toml` file.
pub fn load(path: &Path) -> Result<MasonryGridArgs, ConfigError> {
    let format =
        Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedExtension(path.to_owned()))?;
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let args = parse(&text, format, path)?;
    debug!(path = %path.display(), ?format, "Loaded grid configuration");
    Ok(args)
}

fn parse(text: &str, format: Format, path: &Path) -> Result<MasonryGridArgs, ConfigError> {
    match format {
        Format::Json => serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: path.to_owned(),
            source,
        }),
        Format::Toml => toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use refresh_components::masonry_grid::{ColumnSpec, VirtualizationMode};
    use refresh_ui::Px;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("grid.json", Some(Format::Json))]
    #[case("grid.TOML", Some(Format::Toml))]
    #[case("grid.yaml", None)]
    #[case("grid", None)]
    fn test_format_from_extension(#[case] path: &str, #[case] expected: Option<Format>) {
        assert_eq!(Format::from_path(Path::new(path)), expected);
    }

    #[test]
    fn test_sample_config_parses() {
        let text = include_str!("../masonry.json");
        let args = parse(text, Format::Json, Path::new("masonry.json")).expect("sample config");
        assert_eq!(args.gap, Px(16));
        assert_eq!(args.virtualization.mode, VirtualizationMode::Threshold(50));
        assert!(matches!(args.columns, ColumnSpec::Breakpoints(_)));
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let err = parse("gap = [", Format::Toml, Path::new("broken.toml")).expect_err("invalid");
        assert_eq!(err.to_string(), "invalid TOML in broken.toml");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load(Path::new("grid.ini")).expect_err("unsupported");
        assert!(matches!(err, ConfigError::UnsupportedExtension(_)));
    }
}
