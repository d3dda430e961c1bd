//! Model downloading and caching adapter.
//!
//! The subject classifier needs MobileNetV4 weights and the ImageNet class
//! list. Both are fetched once into a models directory and loaded from
//! there on every run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use listing_qa_core::inference::IMAGENET_CLASSES;
use safetensors::SafeTensors;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Placeholder checksum indicating verification should be skipped.
const PLACEHOLDER_CHECKSUM: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Name of the classifier weights entry.
pub const CLASSIFIER_WEIGHTS: &str = "mobilenetv4";
/// Name of the class label entry.
pub const CLASSIFIER_LABELS: &str = "imagenet-labels";

/// Layout a model file must have to be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Safetensors weights holding at least one tensor.
    Safetensors,
    /// UTF-8 text with one ImageNet class name per line.
    ClassLabels,
}

impl ModelFormat {
    /// Checks that `bytes` have this layout.
    ///
    /// # Errors
    ///
    /// Returns an error describing what is wrong with the payload.
    pub fn check(self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Safetensors => {
                let file = SafeTensors::deserialize(bytes).context("not a safetensors file")?;
                if file.names().is_empty() {
                    anyhow::bail!("safetensors file holds no tensors");
                }
            }
            Self::ClassLabels => {
                let text = std::str::from_utf8(bytes).context("label file is not UTF-8")?;
                let count = text.lines().filter(|l| !l.trim().is_empty()).count();
                if count != IMAGENET_CLASSES {
                    anyhow::bail!("expected {IMAGENET_CLASSES} class labels, found {count}");
                }
            }
        }
        Ok(())
    }
}

/// Model metadata.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name/identifier.
    pub name: &'static str,
    /// Download URL.
    pub url: &'static str,
    /// Expected SHA256 hash. All zeros skips the digest comparison.
    pub sha256: &'static str,
    /// Required file layout, checked on every install.
    pub format: ModelFormat,
    /// Filename in models directory.
    pub filename: &'static str,
}

/// Known model files.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: CLASSIFIER_WEIGHTS,
        url: "https://huggingface.co/timm/mobilenetv4_conv_small.e2400_r224_in1k/resolve/main/model.safetensors",
        sha256: PLACEHOLDER_CHECKSUM,
        format: ModelFormat::Safetensors,
        filename: "mobilenetv4_conv_small.safetensors",
    },
    ModelInfo {
        name: CLASSIFIER_LABELS,
        url: "https://raw.githubusercontent.com/pytorch/hub/master/imagenet_classes.txt",
        sha256: PLACEHOLDER_CHECKSUM,
        format: ModelFormat::ClassLabels,
        filename: "imagenet_classes.txt",
    },
];

/// Returns the default models directory.
///
/// Uses `XDG_DATA_HOME/listing-qa/models` or `~/.local/share/listing-qa/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listing-qa")
        .join("models")
}

/// A directory holding downloaded model files.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(models_dir())
    }
}

impl ModelStore {
    /// Creates a store rooted at `dir`. Nothing is created on disk yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store at `dir` if given, otherwise at [`models_dir`].
    #[must_use]
    pub fn from_override(dir: Option<PathBuf>) -> Self {
        dir.map_or_else(Self::default, Self::new)
    }

    /// Store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path to a specific model file.
    #[must_use]
    pub fn model_path(&self, name: &str) -> Option<PathBuf> {
        MODELS
            .iter()
            .find(|m| m.name == name)
            .map(|m| self.dir.join(m.filename))
    }

    /// Checks if all models are installed.
    #[must_use]
    pub fn all_installed(&self) -> bool {
        MODELS.iter().all(|m| self.dir.join(m.filename).exists())
    }

    /// Lists known models with their install status.
    #[must_use]
    pub fn list(&self) -> Vec<(String, bool)> {
        MODELS
            .iter()
            .map(|m| (m.name.to_string(), self.dir.join(m.filename).exists()))
            .collect()
    }

    /// Downloads every missing model, calling `on_download` before each
    /// transfer.
    ///
    /// Returns the number of files downloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, a download
    /// fails, or a checksum doesn't match.
    pub fn ensure(&self, mut on_download: impl FnMut(&ModelInfo)) -> Result<usize> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create models directory {}", self.dir.display())
        })?;

        let mut downloaded = 0;
        for model in MODELS {
            let path = self.dir.join(model.filename);
            if path.exists() {
                debug!("Model {} already exists", model.name);
                continue;
            }
            on_download(model);
            let bytes = download(model)?;
            self.install(model, &bytes)?;
            downloaded += 1;
        }

        Ok(downloaded)
    }

    /// Verifies `bytes` against the model layout and checksum and writes
    /// them into place atomically.
    ///
    /// # Errors
    ///
    /// Returns an error on a malformed payload, checksum mismatch or I/O
    /// failure.
    pub fn install(&self, model: &ModelInfo, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(model.filename);
        model
            .format
            .check(bytes)
            .with_context(|| format!("Downloaded {} is malformed", model.name))?;
        verify_checksum(model, bytes, &path)?;

        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create models directory {}", self.dir.display())
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("Failed to create temporary model file")?;
        tmp.write_all(bytes)
            .with_context(|| format!("Failed to write {}", model.name))?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to move {} into place", model.name))?;

        info!("Installed {} ({} bytes)", model.name, bytes.len());
        Ok(path)
    }
}

fn download(model: &ModelInfo) -> Result<Vec<u8>> {
    info!("Downloading model: {}", model.name);

    let response = reqwest::blocking::get(model.url)
        .with_context(|| format!("Failed to download {}", model.name))?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Download of {} failed with status: {}",
            model.name,
            response.status()
        );
    }

    let bytes = response
        .bytes()
        .with_context(|| format!("Failed to read response for {}", model.name))?;
    Ok(bytes.to_vec())
}

fn verify_checksum(model: &ModelInfo, bytes: &[u8], path: &Path) -> Result<()> {
    let hash = format!("{:x}", Sha256::digest(bytes));
    if model.sha256 == PLACEHOLDER_CHECKSUM {
        info!("{} has no pinned digest, sha256 {hash}", model.name);
        return Ok(());
    }

    if hash != model.sha256 {
        anyhow::bail!(
            "Checksum mismatch for {}: expected {}, got {}. \
             Try deleting {} and re-running to download a fresh copy.",
            model.name,
            model.sha256,
            hash,
            path.display()
        );
    }
    Ok(())
}
