//! Multi-segment generation: fan-out rendering, deterministic naming and packaging.

mod job;
mod scheduler;
mod sink;

pub use job::{BatchJob, BatchOutcome, SegmentResult, archive_file_name, image_file_name};
pub use scheduler::{BatchOpts, CancelToken, render_batch};
pub use sink::{BatchInfo, BatchSink, InMemorySink, ZipSink, package};
