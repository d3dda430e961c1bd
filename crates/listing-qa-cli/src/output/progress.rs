//! Per-image status lines and progress bar using indicatif.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use listing_qa_core::{Decision, FinalReport, ProgressEvent, ProgressSink};

/// Reports batch progress on stderr.
///
/// Every image gets one status line; the bar, when shown, stays below them.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of items, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, draw a progress bar under the status lines
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = show_bar.then(|| {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });

        Self { bar, quiet }
    }

    fn line(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.println(message),
            None => eprintln!("{message}"),
        }
    }
}

/// One-line summary of a finished image.
#[must_use]
pub fn status_line(report: &FinalReport) -> String {
    let name = &report.metadata.filename;
    match &report.final_decision {
        Decision::Verdict(v) => {
            let mark = if v.is_suitable { "OK" } else { "REJECT" };
            format!(
                "{mark} {name}: {} (score {})",
                v.final_verdict, v.quality_score
            )
        }
        Decision::Failed { error } => format!("FAIL {name}: decision failed: {error}"),
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { report } => {
                self.line(&status_line(&report));
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::Skipped { path, reason } => {
                self.line(&format!("FAIL {path}: {reason}"));
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {processed} processed, {skipped} skipped"
                    ));
                } else {
                    eprintln!("Done: {processed} processed, {skipped} skipped");
                }
            }
        }
    }
}
