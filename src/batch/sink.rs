use std::io::{Cursor, Write};

use serde::Serialize;
use zip::write::SimpleFileOptions;

use crate::batch::job::{
    BatchOutcome, SegmentResult, archive_file_name, failure_manifest_name, image_file_name,
};
use crate::foundation::error::{SegmentFailure, TextToolError, TextToolResult};
use crate::render::RenderedImage;

/// Batch-level facts handed to a [`BatchSink`] before any image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchInfo {
    /// Job timestamp, shared by every file name of the batch.
    pub timestamp: u64,
    /// Number of segments in the batch.
    pub total: usize,
}

/// Consumer of a finished batch.
///
/// Ordering contract: `push_image` and `push_failure` are called in strictly increasing segment
/// index order, each index exactly once.
pub trait BatchSink {
    /// Called once before any segment is pushed.
    fn begin(&mut self, info: BatchInfo) -> TextToolResult<()>;
    /// Push one rendered segment.
    fn push_image(&mut self, index: usize, image: &RenderedImage) -> TextToolResult<()>;
    /// Record one failed segment.
    fn push_failure(&mut self, failure: &SegmentFailure) -> TextToolResult<()>;
    /// Called once after the last segment.
    fn end(&mut self) -> TextToolResult<()>;
}

/// Feed `outcome` into `sink` in sequence order.
#[tracing::instrument(skip_all, fields(ts = outcome.timestamp, total = outcome.results.len()))]
pub fn package(outcome: &BatchOutcome, sink: &mut dyn BatchSink) -> TextToolResult<()> {
    sink.begin(BatchInfo {
        timestamp: outcome.timestamp,
        total: outcome.results.len(),
    })?;
    for (index, result) in outcome.results.iter().enumerate() {
        match result {
            SegmentResult::Rendered(image) => sink.push_image(index, image)?,
            SegmentResult::Failed(failure) => sink.push_failure(failure)?,
        }
    }
    sink.end()
}

/// In-memory sink for tests and library callers that want raw images.
#[derive(Debug, Default)]
pub struct InMemorySink {
    info: Option<BatchInfo>,
    images: Vec<(usize, RenderedImage)>,
    failures: Vec<SegmentFailure>,
    finished: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch info captured in `begin`, if any.
    pub fn info(&self) -> Option<&BatchInfo> {
        self.info.as_ref()
    }

    /// Captured images in sequence order.
    pub fn images(&self) -> &[(usize, RenderedImage)] {
        &self.images
    }

    /// Captured failures in sequence order.
    pub fn failures(&self) -> &[SegmentFailure] {
        &self.failures
    }

    /// Return `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl BatchSink for InMemorySink {
    fn begin(&mut self, info: BatchInfo) -> TextToolResult<()> {
        self.info = Some(info);
        self.images.clear();
        self.failures.clear();
        self.finished = false;
        Ok(())
    }

    fn push_image(&mut self, index: usize, image: &RenderedImage) -> TextToolResult<()> {
        self.images.push((index, image.clone()));
        Ok(())
    }

    fn push_failure(&mut self, failure: &SegmentFailure) -> TextToolResult<()> {
        self.failures.push(failure.clone());
        Ok(())
    }

    fn end(&mut self) -> TextToolResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[derive(Serialize)]
struct FailureManifest<'a> {
    timestamp: u64,
    total: usize,
    failed: &'a [SegmentFailure],
}

/// Sink that writes every image as a PNG entry of one zip archive.
///
/// Entries are named `<timestamp>_texttool_<index>.png` so lexical order equals sequence order.
/// When any segment failed, a `<timestamp>_texttool_failures.json` entry lists the failed indices.
#[derive(Default)]
pub struct ZipSink {
    info: Option<BatchInfo>,
    writer: Option<zip::ZipWriter<Cursor<Vec<u8>>>>,
    failures: Vec<SegmentFailure>,
    archive: Option<Vec<u8>>,
}

impl ZipSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive file name, known after `begin`.
    pub fn file_name(&self) -> Option<String> {
        self.info.as_ref().map(|i| archive_file_name(i.timestamp))
    }

    /// Take the finished archive bytes. `None` until `end` succeeded.
    pub fn take_archive(&mut self) -> Option<Vec<u8>> {
        self.archive.take()
    }

    fn writer(&mut self) -> TextToolResult<&mut zip::ZipWriter<Cursor<Vec<u8>>>> {
        self.writer
            .as_mut()
            .ok_or_else(|| TextToolError::packaging("zip sink used before begin"))
    }

    fn write_entry(&mut self, name: &str, bytes: &[u8]) -> TextToolResult<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let writer = self.writer()?;
        writer
            .start_file(name, options)
            .map_err(|e| TextToolError::packaging(format!("start entry '{name}': {e}")))?;
        writer
            .write_all(bytes)
            .map_err(|e| TextToolError::packaging(format!("write entry '{name}': {e}")))
    }
}

impl BatchSink for ZipSink {
    fn begin(&mut self, info: BatchInfo) -> TextToolResult<()> {
        self.writer = Some(zip::ZipWriter::new(Cursor::new(Vec::new())));
        self.info = Some(info);
        self.failures.clear();
        self.archive = None;
        Ok(())
    }

    fn push_image(&mut self, index: usize, image: &RenderedImage) -> TextToolResult<()> {
        let timestamp = self
            .info
            .as_ref()
            .map(|i| i.timestamp)
            .ok_or_else(|| TextToolError::packaging("zip sink used before begin"))?;
        let png = image
            .encode_png()
            .map_err(|e| TextToolError::packaging(format!("segment {index}: {e}")))?;
        self.write_entry(&image_file_name(timestamp, index), &png)
    }

    fn push_failure(&mut self, failure: &SegmentFailure) -> TextToolResult<()> {
        self.failures.push(failure.clone());
        Ok(())
    }

    fn end(&mut self) -> TextToolResult<()> {
        let info = self
            .info
            .clone()
            .ok_or_else(|| TextToolError::packaging("zip sink ended before begin"))?;
        if !self.failures.is_empty() {
            let manifest = FailureManifest {
                timestamp: info.timestamp,
                total: info.total,
                failed: &self.failures,
            };
            let json = serde_json::to_vec_pretty(&manifest)
                .map_err(|e| TextToolError::packaging(format!("failure manifest: {e}")))?;
            self.write_entry(&failure_manifest_name(info.timestamp), &json)?;
        }

        let writer = self
            .writer
            .take()
            .ok_or_else(|| TextToolError::packaging("zip sink ended twice"))?;
        let cursor = writer
            .finish()
            .map_err(|e| TextToolError::packaging(format!("finish archive: {e}")))?;
        self.archive = Some(cursor.into_inner());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/sink.rs"]
mod tests;
