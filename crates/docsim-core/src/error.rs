use thiserror::Error;

/// Failures surfaced by a similarity request.
///
/// Client-side variants are caller-fixable and carry an actionable message;
/// everything else is reported with enough detail to diagnose the stage that
/// broke.
#[derive(Debug, Error)]
pub enum Error {
    #[error("minimum 2 documents required, got {0}")]
    TooFewDocuments(usize),

    #[error("no usable text could be extracted from the documents; make sure the files are not empty and the format is supported")]
    NoUsableText,

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("failed to extract text from {path}: {reason}")]
    Extraction { path: String, reason: String },

    #[error("error in similarity analysis ({stage}): {kind}: {message}")]
    Internal {
        stage: &'static str,
        kind: String,
        message: String,
    },

    #[error("similarity analysis timed out during {stage}")]
    Timeout { stage: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn internal(stage: &'static str, kind: impl Into<String>, message: impl ToString) -> Self {
        Self::Internal { stage, kind: kind.into(), message: message.to_string() }
    }

    pub fn extraction(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Extraction { path: path.into(), reason: reason.to_string() }
    }

    /// True when the caller can fix the request (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TooFewDocuments(_) | Self::NoUsableText | Self::NotFound(_) | Self::Extraction { .. }
        )
    }

    /// HTTP-equivalent status for front ends that speak HTTP.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TooFewDocuments(_) | Self::NoUsableText | Self::Extraction { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Internal { .. } | Self::Timeout { .. } | Self::InvalidConfig(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
