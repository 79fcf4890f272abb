use crate::foundation::error::SegmentFailure;
use crate::params::GenerationConfig;
use crate::render::RenderedImage;
use crate::segment::Segment;

/// One multi-segment generation request.
#[derive(Clone, Debug)]
pub struct BatchJob {
    /// Segments in sequence order.
    pub segments: Vec<Segment>,
    /// Configuration shared by every segment.
    pub config: GenerationConfig,
    /// Unix seconds at job creation, used for file names.
    pub timestamp: u64,
}

impl BatchJob {
    /// Create a job stamped with `timestamp`.
    pub fn new(segments: Vec<Segment>, config: GenerationConfig, timestamp: u64) -> Self {
        Self {
            segments,
            config,
            timestamp,
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Return `true` when the job has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Outcome of one segment render attempt.
#[derive(Clone, Debug)]
pub enum SegmentResult {
    /// Rendered successfully.
    Rendered(RenderedImage),
    /// Rendering failed; the rest of the batch continues.
    Failed(SegmentFailure),
}

/// Per-segment results of a finished batch, in sequence order.
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    /// Timestamp of the job.
    pub timestamp: u64,
    /// One entry per segment, indexed by sequence index.
    pub results: Vec<SegmentResult>,
}

impl BatchOutcome {
    /// Failures in sequence order.
    pub fn failures(&self) -> Vec<SegmentFailure> {
        self.results
            .iter()
            .filter_map(|r| match r {
                SegmentResult::Failed(f) => Some(f.clone()),
                SegmentResult::Rendered(_) => None,
            })
            .collect()
    }

    /// Number of successfully rendered segments.
    pub fn rendered_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, SegmentResult::Rendered(_)))
            .count()
    }
}

/// File name of the image for segment `index`: `<timestamp>_texttool_<8-digit index>.png`.
pub fn image_file_name(timestamp: u64, index: usize) -> String {
    format!("{timestamp}_texttool_{index:08}.png")
}

/// File name of a batch archive.
pub fn archive_file_name(timestamp: u64) -> String {
    format!("{timestamp}_texttool.zip")
}

pub(crate) fn failure_manifest_name(timestamp: u64) -> String {
    format!("{timestamp}_texttool_failures.json")
}

#[cfg(test)]
#[path = "../../tests/unit/batch/job.rs"]
mod tests;
