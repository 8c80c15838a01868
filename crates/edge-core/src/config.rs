//! Site configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::fragment::LoadRequest;

/// Site configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Component loader configuration.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Service page configuration.
    #[serde(default)]
    pub service_page: ServicePageConfig,

    /// Toast notification configuration.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SiteConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML config")
    }

    /// Parse config from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid JSON config")
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for component in &self.loader.components {
            if component.path.is_empty() {
                bail!("Component for target '{}' has an empty path", component.target);
            }
            if component.target.as_str().trim().is_empty() {
                bail!("Component '{}' has an empty target selector", component.path);
            }
        }
        if self.service_page.contact_fragment.trim().is_empty() {
            bail!("service_page.contact_fragment must not be empty");
        }
        Ok(())
    }
}

/// Component loader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Base URL joined in front of relative fragment paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Components loaded together on page-ready.
    #[serde(default)]
    pub components: Vec<LoadRequest>,
}

/// Service detail page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePageConfig {
    /// Body class that marks a service page.
    #[serde(default = "default_body_class")]
    pub body_class: String,

    /// Element whose presence also marks a service page.
    #[serde(default = "default_marker_selector")]
    pub marker_selector: String,

    /// Contact section fragment.
    #[serde(default = "default_contact_fragment")]
    pub contact_fragment: String,

    /// Placeholder that receives the contact section.
    #[serde(default = "default_contact_target")]
    pub contact_target: String,

    /// Contact form inside the contact section.
    #[serde(default = "default_form_selector")]
    pub form_selector: String,

    /// Simulated submission delay in milliseconds.
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Interval between counter animation frames in milliseconds.
    #[serde(default = "default_counter_tick_ms")]
    pub counter_tick_ms: u64,
}

fn default_body_class() -> String {
    "service-page".to_string()
}

fn default_marker_selector() -> String {
    ".service-hero".to_string()
}

fn default_contact_fragment() -> String {
    "components/contact-section.html".to_string()
}

fn default_contact_target() -> String {
    "#contact-placeholder".to_string()
}

fn default_form_selector() -> String {
    ".service-contact-form".to_string()
}

fn default_submit_delay_ms() -> u64 {
    2500
}

fn default_counter_tick_ms() -> u64 {
    25
}

impl Default for ServicePageConfig {
    fn default() -> Self {
        Self {
            body_class: default_body_class(),
            marker_selector: default_marker_selector(),
            contact_fragment: default_contact_fragment(),
            contact_target: default_contact_target(),
            form_selector: default_form_selector(),
            submit_delay_ms: default_submit_delay_ms(),
            counter_tick_ms: default_counter_tick_ms(),
        }
    }
}

/// Toast notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a toast stays before auto-dismissal, in milliseconds.
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

fn default_dismiss_after_ms() -> u64 {
    6000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: json or human.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}
