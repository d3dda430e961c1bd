//! Check command - judge product photos for listing suitability.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use listing_qa_adapters::{
    openai, tesseract, DirectoryReportWriter, FsImageSource, ModelStore, OpenAiCompatibleClient,
    OpenAiConfig, TesseractRecognizer, CLASSIFIER_LABELS, CLASSIFIER_WEIGHTS,
};
use listing_qa_core::inference::MobileNetClassifier;
use listing_qa_core::{
    BatchSummary, ColorConfig, ColorExtractor, DecisionEngine, ImageSource, Pipeline,
    ReasoningBackend, ResultOutput, SharpnessConfig, SharpnessExtractor, SubjectClassifier,
    SubjectConfig, SubjectExtractor, TextExtractor, TextRecognizer,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Hardcoded default values.
mod defaults {
    pub const BLUR_THRESHOLD: f64 = 100.0;
    pub const CLUSTERS: usize = 3;
    pub const SEED: u64 = 0;
    pub const TOP_K: usize = 3;
    pub const API_KEY_ENV: &str = "GROQ_API_KEY";
}

/// Parse a non-negative blur threshold.
fn parse_blur_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a non-negative number"))
    }
}

/// Parse a cluster count in 1..=64.
fn parse_clusters(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid count"))?;
    if (1..=64).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 1..=64"))
    }
}

/// Parse a count of at least one.
fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("'{s}' is not a valid count")),
    }
}

/// Shared arguments for image analysis.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Image files or directories to analyze
    pub paths: Vec<PathBuf>,

    /// Write one `result_<name>.json` per image into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Laplacian variance below which an image is blurry
    #[arg(long, value_parser = parse_blur_threshold)]
    pub blur_threshold: Option<f64>,

    /// Number of dominant colors to extract (1-64)
    #[arg(long, value_parser = parse_clusters)]
    pub clusters: Option<usize>,

    /// Number of subject labels to keep
    #[arg(long, value_parser = parse_positive)]
    pub top_k: Option<usize>,

    /// Seed for color clustering
    #[arg(long)]
    pub seed: Option<u64>,

    /// API key for the reasoning backend (enables the remote decision path)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible reasoning service
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Reasoning model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Reasoning request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress per-image status lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Pretty-print reports written to stdout
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.blur_threshold = args.blur_threshold.or(config.blur.threshold);
        args.clusters = args.clusters.or(config.color.clusters);
        args.seed = args.seed.or(config.color.seed);
        args.top_k = args.top_k.or(config.subject.top_k);

        if args.backend_url.is_none() {
            args.backend_url.clone_from(&config.reasoning.base_url);
        }
        if args.model.is_none() {
            args.model.clone_from(&config.reasoning.model);
        }
        args.timeout = args.timeout.or(config.reasoning.timeout_secs);

        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }
        if args.output_dir.is_none() {
            args.output_dir.clone_from(&config.output.dir);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        // Kept for settings that have no CLI flag.
        args.config = Some(config.clone());

        args
    }

    fn blur_threshold(&self) -> f64 {
        self.blur_threshold.unwrap_or(defaults::BLUR_THRESHOLD)
    }

    fn clusters(&self) -> usize {
        self.clusters.unwrap_or(defaults::CLUSTERS)
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or(defaults::SEED)
    }

    fn top_k(&self) -> usize {
        self.top_k.unwrap_or(defaults::TOP_K)
    }

    fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(openai::DEFAULT_TIMEOUT_SECS)
    }

    fn ocr_command(&self) -> String {
        self.config
            .as_ref()
            .and_then(|c| c.ocr.command.clone())
            .unwrap_or_else(|| tesseract::DEFAULT_COMMAND.to_string())
    }

    fn ocr_language(&self) -> String {
        self.config
            .as_ref()
            .and_then(|c| c.ocr.language.clone())
            .unwrap_or_else(|| tesseract::DEFAULT_LANGUAGE.to_string())
    }

    fn api_key_env(&self) -> String {
        self.config
            .as_ref()
            .and_then(|c| c.reasoning.api_key_env.clone())
            .unwrap_or_else(|| defaults::API_KEY_ENV.to_string())
    }

    /// API key from the flag, else from the configured environment variable.
    fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.api_key_env()).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Batch counts.
    pub summary: BatchSummary,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Maps batch counts to the process exit code.
#[must_use]
pub const fn exit_code_for(summary: &BatchSummary) -> ExitCode {
    if summary.is_partial() {
        ExitCode::PartialFailure
    } else if summary.all_suitable() {
        ExitCode::Success
    } else {
        ExitCode::IssuesFound
    }
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();
    if total == Some(0) {
        warn!("No supported images found");
        eprintln!("warning: no .jpg, .jpeg, .png or .webp images found");
        return Ok(CheckResult {
            summary: BatchSummary::default(),
            exit_code: ExitCode::Success,
        });
    }

    let pipeline = build_pipeline(args)?;

    let output: Box<dyn ResultOutput> = match &args.output_dir {
        Some(dir) => Box::new(DirectoryReportWriter::create(dir)?),
        None => Box::new(JsonOutput::stdout(args.pretty)),
    };

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let summary = pipeline.run_batch(&source, output.as_ref(), &progress)?;
    debug!("Batch summary: {summary:?}");

    Ok(CheckResult {
        summary,
        exit_code: exit_code_for(&summary),
    })
}

/// Build the analysis pipeline from merged args (CLI + config).
fn build_pipeline(args: &CheckArgs) -> Result<Pipeline> {
    let tesseract = TesseractRecognizer::new(args.ocr_command(), args.ocr_language());
    if !tesseract.is_available() {
        warn!("OCR command {} is not available", tesseract.command());
        eprintln!(
            "warning: OCR command `{}` could not be started; every image will fail text extraction",
            tesseract.command()
        );
    }

    let classifier = load_classifier(args)?;
    let recognizer: Arc<dyn TextRecognizer> = Arc::new(tesseract);

    let backend = build_backend(args)?;

    let pipeline = Pipeline::new(
        SharpnessExtractor::new(SharpnessConfig {
            threshold: args.blur_threshold(),
        }),
        ColorExtractor::new(ColorConfig {
            clusters: args.clusters(),
            seed: Some(args.seed()),
            ..ColorConfig::default()
        }),
        SubjectExtractor::new(
            classifier,
            SubjectConfig {
                top_k: args.top_k(),
            },
        ),
        TextExtractor::new(recognizer),
        DecisionEngine::select(backend),
    )
    .context("Invalid analysis settings")?;

    Ok(pipeline)
}

/// Loads the subject classifier; a missing model stops the run.
fn load_classifier(args: &CheckArgs) -> Result<Arc<dyn SubjectClassifier>> {
    let store = ModelStore::from_override(args.models_dir.clone());
    debug!("Using models directory: {}", store.dir().display());

    let (Some(weights), Some(labels)) = (
        store.model_path(CLASSIFIER_WEIGHTS),
        store.model_path(CLASSIFIER_LABELS),
    ) else {
        anyhow::bail!("subject classifier unavailable: unknown model configuration");
    };

    for path in [&weights, &labels] {
        if !path.exists() {
            anyhow::bail!(
                "subject classifier unavailable: {} not found. Run `listing-qa models fetch`.",
                path.display()
            );
        }
    }

    let classifier = MobileNetClassifier::load(&weights, &labels)
        .context("subject classifier unavailable")?;
    info!("Loaded subject classifier from {}", weights.display());
    Ok(Arc::new(classifier))
}

/// Builds the reasoning backend when an API key is available.
fn build_backend(args: &CheckArgs) -> Result<Option<Arc<dyn ReasoningBackend>>> {
    let Some(api_key) = args.api_key() else {
        info!(
            "No API key (--api-key or ${}); using heuristic decisions",
            args.api_key_env()
        );
        return Ok(None);
    };

    let mut config = OpenAiConfig::with_api_key(api_key);
    if let Some(url) = &args.backend_url {
        config.base_url.clone_from(url);
    }
    if let Some(model) = &args.model {
        config.model.clone_from(model);
    }
    config.timeout_secs = args.timeout();

    let client = OpenAiCompatibleClient::new(config)?;
    Ok(Some(Arc::new(client)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        check: CheckArgs,
    }

    fn parse(args: &[&str]) -> CheckArgs {
        let mut argv = vec!["listing-qa"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().check
    }

    fn config(toml: &str) -> AppConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let args = CheckArgs::with_config(parse(&["data"]), &AppConfig::default());
        assert!((args.blur_threshold() - 100.0).abs() < f64::EPSILON);
        assert_eq!(args.clusters(), 3);
        assert_eq!(args.seed(), 0);
        assert_eq!(args.top_k(), 3);
        assert_eq!(args.timeout(), 30);
        assert_eq!(args.ocr_command(), "tesseract");
        assert_eq!(args.ocr_language(), "eng");
        assert_eq!(args.api_key_env(), "GROQ_API_KEY");
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let cfg = config(
            r#"
[blur]
threshold = 150.0
[color]
clusters = 5
[reasoning]
model = "from-config"
timeout_secs = 9
[output]
dir = "reports"
pretty = true
"#,
        );
        let args = CheckArgs::with_config(parse(&["data"]), &cfg);
        assert!((args.blur_threshold() - 150.0).abs() < f64::EPSILON);
        assert_eq!(args.clusters(), 5);
        assert_eq!(args.model.as_deref(), Some("from-config"));
        assert_eq!(args.timeout(), 9);
        assert_eq!(args.output_dir, Some(PathBuf::from("reports")));
        assert!(args.pretty);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cfg = config(
            r#"
[blur]
threshold = 150.0
[color]
clusters = 5
seed = 11
[reasoning]
model = "from-config"
"#,
        );
        let args = CheckArgs::with_config(
            parse(&[
                "data",
                "--blur-threshold",
                "80",
                "--clusters",
                "2",
                "--seed",
                "3",
                "--model",
                "from-cli",
            ]),
            &cfg,
        );
        assert!((args.blur_threshold() - 80.0).abs() < f64::EPSILON);
        assert_eq!(args.clusters(), 2);
        assert_eq!(args.seed(), 3);
        assert_eq!(args.model.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_api_key_flag_wins_and_blank_is_ignored() {
        let cfg = config(
            r#"
[reasoning]
api_key_env = "LISTING_QA_TEST_UNSET_KEY_VAR"
"#,
        );
        let args = CheckArgs::with_config(parse(&["data", "--api-key", "sk-1"]), &cfg);
        assert_eq!(args.api_key().as_deref(), Some("sk-1"));

        let args = CheckArgs::with_config(parse(&["data", "--api-key", "  "]), &cfg);
        assert!(args.api_key().is_none());

        let args = CheckArgs::with_config(parse(&["data"]), &cfg);
        assert!(args.api_key().is_none());
    }

    #[test]
    fn test_backend_only_with_key() {
        let cfg = config(
            r#"
[reasoning]
api_key_env = "LISTING_QA_TEST_UNSET_KEY_VAR"
"#,
        );
        let args = CheckArgs::with_config(parse(&["data"]), &cfg);
        assert!(build_backend(&args).unwrap().is_none());

        let args = CheckArgs::with_config(
            parse(&["data", "--api-key", "sk-1", "--model", "m1"]),
            &cfg,
        );
        let backend = build_backend(&args).unwrap().unwrap();
        assert_eq!(backend.name(), "m1");
    }

    #[test]
    fn test_value_parsers() {
        assert!(parse_blur_threshold("-1").is_err());
        assert!(parse_blur_threshold("NaN").is_err());
        assert_eq!(parse_blur_threshold("0"), Ok(0.0));
        assert!(parse_clusters("0").is_err());
        assert!(parse_clusters("65").is_err());
        assert_eq!(parse_clusters("64"), Ok(64));
        assert!(parse_positive("0").is_err());
        assert_eq!(parse_positive("5"), Ok(5));
    }

    #[test]
    fn test_exit_codes() {
        let mut summary = BatchSummary {
            processed: 2,
            suitable: 2,
            ..BatchSummary::default()
        };
        assert_eq!(exit_code_for(&summary), ExitCode::Success);

        summary.unsuitable = 1;
        assert_eq!(exit_code_for(&summary), ExitCode::IssuesFound);

        summary.unsuitable = 0;
        summary.decision_failures = 1;
        assert_eq!(exit_code_for(&summary), ExitCode::IssuesFound);

        summary.skipped = 1;
        assert_eq!(exit_code_for(&summary), ExitCode::PartialFailure);
    }

    #[test]
    fn test_missing_models_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&[
            "data",
            "--models-dir",
            dir.path().to_str().unwrap(),
        ]);
        let err = load_classifier(&args).err().unwrap();
        let message = err.to_string();
        assert!(message.contains("subject classifier unavailable"));
        assert!(message.contains("listing-qa models fetch"));
    }
}
