use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use scrambler_core::ScrambleOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

/// On-disk config: the run options live under `[scramble]`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    scramble: ScrambleOptions,
}

/// Options from `path`, or the defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> Result<ScrambleOptions, ConfigError> {
    let Some(path) = path else {
        return Ok(ScrambleOptions::default());
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_options(&content)
}

fn parse_options(content: &str) -> Result<ScrambleOptions, ConfigError> {
    let config: ConfigFile = toml::from_str(content)?;
    Ok(config.scramble)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_scramble_table() {
        let options = parse_options(
            r#"
            [scramble]
            table_prefix = "shop_"
            ignored_domains = "example.com"
            batch_size = 50
            "#,
        )
        .expect("parse");
        assert_eq!(options.table_prefix, "shop_");
        assert_eq!(options.ignored_domains.as_deref(), Some("example.com"));
        assert_eq!(options.batch_size, 50);
        assert_eq!(options.field, None);
    }

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(parse_options("").expect("parse"), ScrambleOptions::default());
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(parse_options("[scrambler]\ntable = \"x\"").is_err());
    }
}
