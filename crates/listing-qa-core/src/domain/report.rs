//! Per-image report packaged by the pipeline.

use serde::{Deserialize, Serialize};

use super::{Decision, SignalBundle};

/// System name recorded in every report.
pub const SYSTEM_NAME: &str = "listing-qa";

/// Identifies the analyzed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// File name of the analyzed image.
    pub filename: String,
    /// Producing system.
    pub system: String,
    /// Timestamp of analysis (RFC 3339).
    pub analyzed_at: String,
}

/// Complete result for one image: the evidence and the decision taken on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    /// File identification.
    pub metadata: ReportMetadata,
    /// Signals computed by the extractors.
    pub extracted_signals: SignalBundle,
    /// Decision engine output.
    pub final_decision: Decision,
}

impl FinalReport {
    /// Returns the report file name for an image file name: `result_<stem>.json`.
    #[must_use]
    pub fn output_file_name(filename: &str) -> String {
        let stem = std::path::Path::new(filename)
            .file_stem()
            .map_or_else(|| filename.to_string(), |s| s.to_string_lossy().into_owned());
        format!("result_{stem}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            FinalReport::output_file_name("strawberry.jpeg"),
            "result_strawberry.json"
        );
        assert_eq!(
            FinalReport::output_file_name("shoe.front.png"),
            "result_shoe.front.json"
        );
        assert_eq!(FinalReport::output_file_name("mug"), "result_mug.json");
    }
}
