//! Per-image orchestration and the sequential batch driver.

use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::decision::DecisionEngine;
use crate::domain::{
    Decision, FinalReport, ImageInfo, ReportMetadata, SignalBundle, SignalExtractor, SYSTEM_NAME,
};
use crate::error::PipelineError;
use crate::extractors::{ColorExtractor, SharpnessExtractor, SubjectExtractor, TextExtractor};
use crate::ports::{ImageSource, ProgressEvent, ProgressSink, ResultOutput};

/// Counts collected over a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Images that produced a report.
    pub processed: usize,
    /// Images that failed to load or analyze.
    pub skipped: usize,
    /// Reports with a suitable verdict.
    pub suitable: usize,
    /// Reports with an unsuitable verdict.
    pub unsuitable: usize,
    /// Reports whose decision failed.
    pub decision_failures: usize,
}

impl BatchSummary {
    /// Some images were skipped.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.skipped > 0
    }

    /// Every processed image was judged suitable.
    #[must_use]
    pub const fn all_suitable(&self) -> bool {
        self.unsuitable == 0 && self.decision_failures == 0
    }

    fn record(&mut self, decision: &Decision) {
        self.processed += 1;
        match decision {
            Decision::Verdict(v) if v.is_suitable => self.suitable += 1,
            Decision::Verdict(_) => self.unsuitable += 1,
            Decision::Failed { .. } => self.decision_failures += 1,
        }
    }
}

/// Runs the four extractors and the decision engine on images.
pub struct Pipeline {
    sharpness: SharpnessExtractor,
    color: ColorExtractor,
    subject: SubjectExtractor,
    text: TextExtractor,
    engine: DecisionEngine,
}

impl Pipeline {
    /// Assembles a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if an extractor configuration
    /// is unusable.
    pub fn new(
        sharpness: SharpnessExtractor,
        color: ColorExtractor,
        subject: SubjectExtractor,
        text: TextExtractor,
        engine: DecisionEngine,
    ) -> Result<Self, PipelineError> {
        sharpness.config().validate()?;
        color.config().validate()?;
        subject.config().validate()?;

        Ok(Self {
            sharpness,
            color,
            subject,
            text,
            engine,
        })
    }

    /// Returns the decision engine.
    #[must_use]
    pub const fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Computes the signal bundle for one image.
    ///
    /// # Errors
    ///
    /// Returns the first extractor error; no partial bundle is produced.
    pub fn extract(&self, image: &ImageInfo) -> Result<SignalBundle, PipelineError> {
        Ok(SignalBundle {
            blur: run_stage(&self.sharpness, image)?,
            color: run_stage(&self.color, image)?,
            object: run_stage(&self.subject, image)?,
            ocr: run_stage(&self.text, image)?,
        })
    }

    /// Analyzes one image end to end.
    ///
    /// A failed remote decision still yields a report, with an error decision.
    ///
    /// # Errors
    ///
    /// Returns an error if any extractor fails.
    pub fn analyze(&self, image: &ImageInfo) -> Result<FinalReport, PipelineError> {
        let span = info_span!("analyze", image = %image.path);
        let _guard = span.enter();

        let extracted_signals = self.extract(image)?;
        let final_decision = self.engine.decide(&extracted_signals);

        Ok(FinalReport {
            metadata: ReportMetadata {
                filename: image.file_name(),
                system: SYSTEM_NAME.to_string(),
                analyzed_at: iso_timestamp(),
            },
            extracted_signals,
            final_decision,
        })
    }

    /// Analyzes every image of a source, one at a time.
    ///
    /// Images that fail to load or analyze are reported as skipped and the
    /// batch continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing or flushing a report fails.
    pub fn run_batch(
        &self,
        source: &dyn ImageSource,
        output: &dyn ResultOutput,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<BatchSummary> {
        let total = source.count_hint();
        let mut summary = BatchSummary::default();

        info!("Processing {} images", total.map_or_else(|| "?".into(), |t| t.to_string()));

        for (index, item) in source.images().enumerate() {
            let (path, outcome) = match item {
                Ok(image) => {
                    progress.on_event(ProgressEvent::Started {
                        path: image.path.clone(),
                        index,
                        total,
                    });
                    let outcome = self.analyze(&image);
                    (image.path, outcome)
                }
                Err(e) => (
                    e.path().map_or_else(|| format!("image {index}"), str::to_string),
                    Err(e),
                ),
            };

            match outcome {
                Ok(report) => {
                    output.write(&report)?;
                    summary.record(&report.final_decision);
                    progress.on_event(ProgressEvent::Completed {
                        report: Box::new(report),
                    });
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path, e);
                    summary.skipped += 1;
                    progress.on_event(ProgressEvent::Skipped {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        output.flush()?;

        progress.on_event(ProgressEvent::Finished {
            processed: summary.processed,
            skipped: summary.skipped,
        });
        info!(
            "Batch finished: {} processed, {} skipped, {} suitable",
            summary.processed, summary.skipped, summary.suitable
        );

        Ok(summary)
    }
}

/// Runs one extractor with timing.
fn run_stage<E: SignalExtractor>(
    extractor: &E,
    image: &ImageInfo,
) -> Result<E::Signal, PipelineError> {
    let start = Instant::now();
    let result = extractor.extract(image);
    debug!(
        "Stage {} took {:.1} ms",
        extractor.name(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    result
}

/// Current UTC time as RFC 3339.
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
