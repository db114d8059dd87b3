use thiserror::Error;

/// Errors raised while reading capture-QC inputs and running the coverage pipeline.
///
/// `Format` and `ExternalTool` abort a run. `TranscriptNotFound`, `GeneMismatch`
/// and `DuplicateTranscript` are recovered where they occur: they are logged and
/// surface as sentinel rows in the reports.
#[derive(Debug, Error)]
pub enum CapqcError {
    /// A malformed input row
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// A transcript referenced by an overlap record or the preferred list is not indexed
    #[error("transcript {0} not found in the reference index")]
    TranscriptNotFound(String),

    /// A preferred transcript belongs to another gene
    #[error("transcript {transcript} belongs to {found}, not {requested}")]
    GeneMismatch {
        transcript: String,
        requested: String,
        found: String,
    },

    /// The interval tool failed, timed out, or wrote something we can't parse
    #[error("interval tool: {0}")]
    ExternalTool(String),

    #[error("transcript {0} is listed more than once in the reference")]
    DuplicateTranscript(String),
}

impl CapqcError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        CapqcError::Format {
            line,
            message: message.into(),
        }
    }

    /// Recovered errors are logged and reported, never propagated.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CapqcError::Format { .. } | CapqcError::ExternalTool(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds() {
        assert!(CapqcError::format(3, "bad").is_fatal());
        assert!(CapqcError::ExternalTool("exit 1".to_string()).is_fatal());
        assert!(!CapqcError::TranscriptNotFound("NM_1".to_string()).is_fatal());
        assert!(!CapqcError::DuplicateTranscript("NM_1".to_string()).is_fatal());
    }

    #[test]
    fn messages() {
        let err = CapqcError::format(7, "exonStarts and exonEnds differ in length");
        assert_eq!(
            err.to_string(),
            "format error at line 7: exonStarts and exonEnds differ in length"
        );

        let err = CapqcError::GeneMismatch {
            transcript: "NM_001".to_string(),
            requested: "FAKE".to_string(),
            found: "RPL10".to_string(),
        };
        assert_eq!(err.to_string(), "transcript NM_001 belongs to RPL10, not FAKE");
    }
}
