use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::batch::{BatchJob, CancelToken};
use crate::foundation::error::{TextToolError, TextToolResult};
use crate::session::tool::Delivery;

struct QueuedJob {
    job: BatchJob,
    cancel: CancelToken,
    reply: mpsc::Sender<TextToolResult<Delivery>>,
}

/// Bounded FIFO of batch jobs served by one dedicated worker thread.
///
/// A job counts against the capacity from submission until its result is sent.
pub struct JobQueue {
    tx: Option<mpsc::Sender<QueuedJob>>,
    worker: Option<JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
    capacity: usize,
}

impl JobQueue {
    /// Start the worker thread. `run` executes one job at a time, in submission order.
    pub(crate) fn spawn<F>(capacity: usize, mut run: F) -> TextToolResult<Self>
    where
        F: FnMut(&BatchJob, &CancelToken) -> TextToolResult<Delivery> + Send + 'static,
    {
        if capacity == 0 {
            return Err(TextToolError::config("job queue capacity must be >= 1"));
        }

        let (tx, rx) = mpsc::channel::<QueuedJob>();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = Arc::clone(&pending);
        let worker = std::thread::Builder::new()
            .name("texttool-queue".to_owned())
            .spawn(move || {
                for queued in rx {
                    let result = if queued.cancel.is_cancelled() {
                        Err(TextToolError::Cancelled)
                    } else {
                        run(&queued.job, &queued.cancel)
                    };
                    if let Err(e) = &result {
                        tracing::warn!(ts = queued.job.timestamp, error = %e, "queued job failed");
                    }
                    worker_pending.fetch_sub(1, Ordering::AcqRel);
                    // The submitter may have stopped waiting.
                    let _ = queued.reply.send(result);
                }
                tracing::debug!("job queue worker stopped");
            })
            .map_err(|e| anyhow::anyhow!("failed to spawn job queue worker: {e}"))?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            pending,
            capacity,
        })
    }

    /// Jobs submitted and not yet finished.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Return `true` when no job is waiting or running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of unfinished jobs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueue `job`, or fail with [`TextToolError::Limit`] when the queue is full.
    pub fn submit(&self, job: BatchJob) -> TextToolResult<JobTicket> {
        let cap = self.capacity;
        let reserved = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < cap).then_some(n + 1));
        let position = match reserved {
            Ok(before) => before + 1,
            Err(_) => {
                return Err(TextToolError::limit(format!(
                    "job queue is full ({cap} jobs), try again later"
                )));
            }
        };

        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| TextToolError::Other(anyhow::anyhow!("job queue is shut down")))?;
        let cancel = CancelToken::new();
        let (reply, rx) = mpsc::channel();
        let queued = QueuedJob {
            job,
            cancel: cancel.clone(),
            reply,
        };
        if tx.send(queued).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(TextToolError::Other(anyhow::anyhow!(
                "job queue worker is not running"
            )));
        }
        tracing::debug!(position, capacity = cap, "job queued");
        Ok(JobTicket {
            position,
            cancel,
            rx,
        })
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Handle to one queued job.
#[derive(Debug)]
pub struct JobTicket {
    position: usize,
    cancel: CancelToken,
    rx: mpsc::Receiver<TextToolResult<Delivery>>,
}

impl JobTicket {
    /// Queue length right after this job was accepted, this job included.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Ask the worker to abandon this job at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the job finished.
    pub fn wait(self) -> TextToolResult<Delivery> {
        self.rx.recv().map_err(|_| worker_gone())?
    }

    /// Block for at most `timeout`. On expiry the job is cancelled and
    /// [`TextToolError::Timeout`] is returned.
    pub fn wait_timeout(self, timeout: Duration) -> TextToolResult<Delivery> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.cancel.cancel();
                Err(TextToolError::Timeout {
                    elapsed_ms: timeout.as_millis() as u64,
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(worker_gone()),
        }
    }
}

fn worker_gone() -> TextToolError {
    TextToolError::Other(anyhow::anyhow!("job queue worker stopped before replying"))
}

#[cfg(test)]
#[path = "../../tests/unit/session/queue.rs"]
mod tests;
