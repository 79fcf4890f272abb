use serde::Serialize;

/// Convenience result type used across texttool.
pub type TextToolResult<T> = Result<T, TextToolError>;

/// One segment that failed inside a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SegmentFailure {
    /// Zero-based sequence index of the failed segment.
    pub index: usize,
    /// Segment text as it was handed to the renderer.
    pub text: String,
    /// Rendered error message.
    pub error: String,
}

/// Top-level error taxonomy used by the generation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum TextToolError {
    /// A recognized parameter carried a malformed or out-of-range value.
    #[error("parameter error: {key}:{value}: {reason}")]
    ParameterParse {
        /// Parameter key.
        key: String,
        /// Offending raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A parameter-shaped token whose key is a near miss of a recognized key.
    #[error("parameter error: unknown key '{key}' (did you mean '{suggestion}'?)")]
    UnknownParameter {
        /// The key as written.
        key: String,
        /// Closest recognized key.
        suggestion: String,
    },

    /// Font alias is not registered.
    #[error("font error: alias '{alias}' is not registered")]
    FontNotFound {
        /// Requested alias.
        alias: String,
    },

    /// Segmentation produced nothing to render.
    #[error("input error: mode '{mode}' produced no segments")]
    EmptyInput {
        /// Segmentation mode name.
        mode: String,
    },

    /// Glyph layout or canvas computation failed.
    #[error("render error{}: {message}", fmt_segment(.segment))]
    Render {
        /// Segment index, when the failure belongs to one segment of a batch.
        segment: Option<usize>,
        /// Failure description.
        message: String,
    },

    /// Archive assembly failed.
    #[error("packaging error: {0}")]
    Packaging(String),

    /// Every segment of a batch failed.
    #[error("batch error: all {} segments failed (first: {})", .failures.len(), first_failure(.failures))]
    BatchFailed {
        /// Per-segment failures in sequence order.
        failures: Vec<SegmentFailure>,
    },

    /// The batch was cancelled before all segments were attempted.
    #[error("batch cancelled")]
    Cancelled,

    /// The batch exceeded its configured time budget.
    #[error("batch timed out after {elapsed_ms} ms")]
    Timeout {
        /// Elapsed wall time when the timeout was observed.
        elapsed_ms: u64,
    },

    /// A configured request limit was exceeded.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// The command word of a raw message is not recognized.
    #[error("unknown command '{0}' (expected generate, font_list or task)")]
    UnknownCommand(String),

    /// Settings or font alias table problems.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_segment(segment: &Option<usize>) -> String {
    match segment {
        Some(i) => format!(" (segment {i})"),
        None => String::new(),
    }
}

fn first_failure(failures: &[SegmentFailure]) -> String {
    failures
        .first()
        .map(|f| format!("#{}: {}", f.index, f.error))
        .unwrap_or_else(|| "none".to_owned())
}

impl TextToolError {
    /// Build a [`TextToolError::ParameterParse`] value.
    pub fn parameter(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ParameterParse {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`TextToolError::Render`] value not tied to a segment.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            segment: None,
            message: msg.into(),
        }
    }

    /// Build a [`TextToolError::Packaging`] value.
    pub fn packaging(msg: impl Into<String>) -> Self {
        Self::Packaging(msg.into())
    }

    /// Build a [`TextToolError::Limit`] value.
    pub fn limit(msg: impl Into<String>) -> Self {
        Self::Limit(msg.into())
    }

    /// Build a [`TextToolError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach a segment index to render errors; other kinds pass through.
    pub fn at_segment(self, index: usize) -> Self {
        match self {
            Self::Render { message, .. } => Self::Render {
                segment: Some(index),
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
