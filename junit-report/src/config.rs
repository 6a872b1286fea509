//! Report configuration types
//!
//! This module defines the options that shape a generated report. Inputs and
//! outputs are chosen by the application layer; the library only needs to
//! know what goes into the page.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for report building and decoration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Page `<title>`
    #[serde(default = "default_title")]
    pub title: String,

    /// Stylesheet embedded in `<style>` (built-in stylesheet if unset)
    #[serde(default)]
    pub stylesheet: Option<PathBuf>,

    /// Script embedded in `<script type="text/javascript">`
    #[serde(default)]
    pub script: Option<PathBuf>,

    /// Whether feature tables get a trailing Steps column with `<system-out>`
    #[serde(default = "default_true")]
    pub steps_column: bool,

    /// Whether to decorate the built report
    #[serde(default = "default_true")]
    pub decorate: bool,

    /// Whether summary rows link to their suite's section
    #[serde(default = "default_true")]
    pub summary_links: bool,
}

fn default_title() -> String {
    "Test Results".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            stylesheet: None,
            script: None,
            steps_column: true,
            decorate: true,
            summary_links: true,
        }
    }
}

impl ReportConfig {
    /// Create a report configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder method: embed a stylesheet file
    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.stylesheet = Some(path.into());
        self
    }

    /// Builder method: embed a script file
    pub fn with_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = Some(path.into());
        self
    }

    /// Builder method: enable or disable the Steps column
    pub fn with_steps_column(mut self, enabled: bool) -> Self {
        self.steps_column = enabled;
        self
    }

    /// Builder method: enable or disable decoration of the built report
    pub fn with_decoration(mut self, enabled: bool) -> Self {
        self.decorate = enabled;
        self
    }

    /// Builder method: enable or disable summary navigation links
    pub fn with_summary_links(mut self, enabled: bool) -> Self {
        self.summary_links = enabled;
        self
    }
}
