use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ContractError, Result};

/// Branding, output and font settings, read from an optional `config.toml`.
/// A missing file falls back to the defaults below; a broken file warns and
/// does the same.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub company_name: String,
    pub address_lines: Vec<String>,
    pub logo: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub filename_prefix: String,
    pub fonts_dir: PathBuf,
    pub body_font: String,
    pub bold_font: String,
    pub script_font: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        ContractConfig {
            company_name: "Acme, LLC".to_string(),
            address_lines: vec![
                "123 Main Street · Chicago, IL 60611".to_string(),
                "support@example.com · (555) 555-5555".to_string(),
            ],
            logo: None,
            output_dir: PathBuf::from("."),
            filename_prefix: "test".to_string(),
            fonts_dir: PathBuf::from("fonts"),
            body_font: "DejaVuSans.ttf".to_string(),
            bold_font: "DejaVuSans-Bold.ttf".to_string(),
            script_font: "DejaVuSans-Oblique.ttf".to_string(),
        }
    }
}

impl ContractConfig {
    pub fn load(path: &Path) -> Result<ContractConfig> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ContractError::Config(e.to_string()))
    }

    pub fn load_or_default(path: &Path) -> ContractConfig {
        match Self::load(path) {
            Ok(config) => config,
            Err(ContractError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                ContractConfig::default()
            }
            Err(e) => {
                warn!(
                    "could not load {}: {}; using built-in defaults",
                    path.display(),
                    e
                );
                ContractConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_bundled_fonts() {
        let config = ContractConfig::default();
        assert_eq!(config.filename_prefix, "test");
        assert_eq!(config.fonts_dir, PathBuf::from("fonts"));
        assert_eq!(config.body_font, "DejaVuSans.ttf");
        assert!(config.logo.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ContractConfig =
            toml::from_str("company_name = \"Globex\"\nfilename_prefix = \"contract\"\n").unwrap();
        assert_eq!(config.company_name, "Globex");
        assert_eq!(config.filename_prefix, "contract");
        assert_eq!(config.body_font, "DejaVuSans.ttf");
    }
}
