//! Configuration file support for listing-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/listing-qa/config.toml` (lowest priority)
//! - Project-local: `.listing-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".listing-qa.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Sharpness settings.
    pub blur: BlurConfig,
    /// Color clustering settings.
    pub color: ColorConfig,
    /// Subject classification settings.
    pub subject: SubjectConfig,
    /// OCR engine settings.
    pub ocr: OcrConfig,
    /// Remote reasoning backend settings.
    pub reasoning: ReasoningConfig,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Sharpness configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Laplacian variance below which an image is blurry.
    pub threshold: Option<f64>,
}

/// Color clustering configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Number of dominant colors.
    pub clusters: Option<usize>,
    /// Clustering seed.
    pub seed: Option<u64>,
}

/// Subject classification configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SubjectConfig {
    /// Number of labels kept.
    pub top_k: Option<usize>,
}

/// OCR configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable.
    pub command: Option<String>,
    /// Tesseract language code.
    pub language: Option<String>,
}

/// Reasoning backend configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// API root of the OpenAI-compatible service.
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Request deadline in seconds.
    pub timeout_secs: Option<u64>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for per-image report files.
    pub dir: Option<PathBuf>,
    /// Pretty-print JSON on stdout.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/listing-qa/config.toml`
    /// 2. Project-local: `.listing-qa.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.blur.threshold {
            if !t.is_finite() || t < 0.0 {
                return Err(format!(
                    "blur.threshold must be a non-negative number, got {t}"
                ));
            }
        }
        if let Some(k) = self.color.clusters {
            if !(1..=64).contains(&k) {
                return Err(format!("color.clusters must be 1-64, got {k}"));
            }
        }
        if self.subject.top_k == Some(0) {
            return Err("subject.top_k must be at least 1".to_string());
        }
        if self.reasoning.timeout_secs == Some(0) {
            return Err("reasoning.timeout_secs must be at least 1".to_string());
        }
        if self.ocr.command.as_deref().is_some_and(str::is_empty) {
            return Err("ocr.command must not be empty".to_string());
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    pub fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.blur.threshold = other.blur.threshold.or(self.blur.threshold);

        self.color.clusters = other.color.clusters.or(self.color.clusters);
        self.color.seed = other.color.seed.or(self.color.seed);

        self.subject.top_k = other.subject.top_k.or(self.subject.top_k);

        self.ocr.command = other.ocr.command.or_else(|| self.ocr.command.take());
        self.ocr.language = other.ocr.language.or_else(|| self.ocr.language.take());

        self.reasoning.base_url = other
            .reasoning
            .base_url
            .or_else(|| self.reasoning.base_url.take());
        self.reasoning.model = other
            .reasoning
            .model
            .or_else(|| self.reasoning.model.take());
        self.reasoning.timeout_secs = other
            .reasoning
            .timeout_secs
            .or(self.reasoning.timeout_secs);
        self.reasoning.api_key_env = other
            .reasoning
            .api_key_env
            .or_else(|| self.reasoning.api_key_env.take());

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());

        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("listing-qa").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.listing-qa.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
