use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::batch::job::{BatchJob, BatchOutcome, SegmentResult};
use crate::fonts::FontRegistry;
use crate::foundation::error::{SegmentFailure, TextToolError, TextToolResult};
use crate::params::GenerationConfig;
use crate::render::{RenderedImage, TextRenderer};

/// Execution options for [`render_batch`].
#[derive(Clone, Debug, Default)]
pub struct BatchOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Whole-batch time budget. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Cooperative cancellation flag, checked between segments.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Segments already rendering finish; no new segment starts.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Anything that can render one segment; one instance lives on each worker thread.
pub(crate) trait SegmentRenderer {
    fn render_segment(
        &mut self,
        text: &str,
        config: &GenerationConfig,
    ) -> TextToolResult<RenderedImage>;
}

impl SegmentRenderer for TextRenderer {
    fn render_segment(
        &mut self,
        text: &str,
        config: &GenerationConfig,
    ) -> TextToolResult<RenderedImage> {
        self.render(text, config)
    }
}

enum Attempt {
    Done(SegmentResult),
    Skipped,
}

/// Render every segment of `job` on a dedicated rayon pool.
///
/// Results come back in sequence order regardless of completion order. A failing segment is
/// recorded and the rest continue; only when every segment fails does the batch fail with
/// [`TextToolError::BatchFailed`]. Cancellation and the time budget are checked before each
/// segment starts and abort the whole batch with no partial outcome.
#[tracing::instrument(skip_all, fields(segments = job.len(), ts = job.timestamp))]
pub fn render_batch(
    job: &BatchJob,
    fonts: &Arc<FontRegistry>,
    opts: &BatchOpts,
    cancel: &CancelToken,
) -> TextToolResult<BatchOutcome> {
    render_batch_with(job, opts, cancel, || TextRenderer::new(Arc::clone(fonts)))
}

pub(crate) fn render_batch_with<R, F>(
    job: &BatchJob,
    opts: &BatchOpts,
    cancel: &CancelToken,
    make_renderer: F,
) -> TextToolResult<BatchOutcome>
where
    R: SegmentRenderer,
    F: Fn() -> R + Sync + Send,
{
    if job.is_empty() {
        return Err(TextToolError::EmptyInput {
            mode: job.config.mode.to_string(),
        });
    }

    let pool = build_thread_pool(opts.threads)?;
    let started = Instant::now();
    let deadline = opts.timeout.map(|t| started + t);
    let config = &job.config;

    let attempts = pool.install(|| {
        job.segments
            .par_iter()
            .map_init(&make_renderer, |renderer, segment| {
                if cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d) {
                    return Attempt::Skipped;
                }
                match renderer.render_segment(&segment.text, config) {
                    Ok(image) => Attempt::Done(SegmentResult::Rendered(image)),
                    Err(err) => {
                        let err = err.at_segment(segment.index);
                        tracing::warn!(index = segment.index, error = %err, "segment failed");
                        Attempt::Done(SegmentResult::Failed(SegmentFailure {
                            index: segment.index,
                            text: segment.text.clone(),
                            error: err.to_string(),
                        }))
                    }
                }
            })
            .collect::<Vec<_>>()
    });

    if cancel.is_cancelled() {
        tracing::info!("batch cancelled");
        return Err(TextToolError::Cancelled);
    }

    let mut results = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        match attempt {
            Attempt::Done(r) => results.push(r),
            Attempt::Skipped => {
                return Err(TextToolError::Timeout {
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }
        }
    }

    let outcome = BatchOutcome {
        timestamp: job.timestamp,
        results,
    };
    if outcome.rendered_count() == 0 {
        return Err(TextToolError::BatchFailed {
            failures: outcome.failures(),
        });
    }
    tracing::debug!(
        rendered = outcome.rendered_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch rendered"
    );
    Ok(outcome)
}

fn build_thread_pool(threads: Option<usize>) -> TextToolResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TextToolError::config("render 'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TextToolError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/scheduler.rs"]
mod tests;
