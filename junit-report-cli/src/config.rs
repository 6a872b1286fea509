//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use junit_report::ReportConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Directory scanned for JUnit `*.xml` files
    pub junit_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// HTML report to write
    pub file: Option<PathBuf>,
    /// Optional JSON file with per-suite summary numbers
    pub summary_json: Option<PathBuf>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Check that referenced asset files exist before any work is done
fn validate(config: &AppConfig) -> Result<()> {
    let assets = [
        ("stylesheet", &config.report.stylesheet),
        ("script", &config.report.script),
    ];
    for (what, path) in assets {
        if let Some(path) = path {
            if !path.is_file() {
                bail!("{} file not found: {:?}", what, path);
            }
        }
    }
    if config.report.title.trim().is_empty() {
        bail!("report title must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            junit_dir = "reports"

            [output]
            file = "index.html"
            summary_json = "summary.json"

            [report]
            title = "Nightly"
            steps_column = false
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.junit_dir, Some(PathBuf::from("reports")));
        assert_eq!(config.output.file, Some(PathBuf::from("index.html")));
        assert_eq!(config.report.title, "Nightly");
        assert!(!config.report.steps_column);
        assert!(config.report.decorate);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.junit_dir.is_none());
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn test_load_config_rejects_missing_stylesheet() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nstylesheet = \"no/such/file.css\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("stylesheet file not found"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[input]\njunit_dir = \"out\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.input.junit_dir, Some(PathBuf::from("out")));
    }
}
