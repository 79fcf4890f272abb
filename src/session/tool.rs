use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::batch::{
    BatchJob, BatchOpts, CancelToken, ZipSink, archive_file_name, image_file_name,
    package, render_batch,
};
use crate::fonts::FontRegistry;
use crate::foundation::error::{SegmentFailure, TextToolError, TextToolResult};
use crate::params::parse_generate_args;
use crate::render::TextRenderer;
use crate::segment::segment_text;
use crate::session::queue::{JobQueue, JobTicket};
use crate::session::settings::TextToolSettings;

const COMMAND_PREFIX: &str = "texttool";

/// A finished generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// One PNG, for requests with exactly one segment.
    Image {
        /// `<timestamp>_texttool_00000000.png`.
        file_name: String,
        /// PNG bytes.
        png: Vec<u8>,
    },
    /// One zip archive of PNGs, for requests with several segments.
    Archive {
        /// `<timestamp>_texttool.zip`.
        file_name: String,
        /// Zip bytes.
        zip: Vec<u8>,
        /// Segments that failed and have no image in the archive.
        failures: Vec<SegmentFailure>,
    },
}

impl Delivery {
    /// Suggested file name of the payload.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Image { file_name, .. } | Self::Archive { file_name, .. } => file_name,
        }
    }

    /// Payload bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Image { png, .. } => png,
            Self::Archive { zip, .. } => zip,
        }
    }
}

/// Response to one raw command.
#[derive(Debug)]
pub enum Reply {
    /// A single-segment request, rendered synchronously.
    Delivered(Delivery),
    /// A multi-segment request accepted by the job queue.
    Queued(JobTicket),
    /// Plain text answer (`font_list`, `task`).
    Text(String),
}

/// Command surface over an immutable font registry and a bounded job queue.
pub struct TextTool {
    settings: TextToolSettings,
    fonts: Arc<FontRegistry>,
    queue: JobQueue,
}

impl TextTool {
    /// Load the alias table named by `settings` and start the job queue.
    pub fn new(settings: TextToolSettings) -> TextToolResult<Self> {
        settings.validate()?;
        let fonts = FontRegistry::load(
            &settings.data_dir,
            &settings.fonts_path(),
            settings.default_font.clone(),
        )?;
        Self::with_registry(settings, Arc::new(fonts))
    }

    /// Start over an already loaded registry.
    pub fn with_registry(
        settings: TextToolSettings,
        fonts: Arc<FontRegistry>,
    ) -> TextToolResult<Self> {
        let worker_fonts = Arc::clone(&fonts);
        let opts = settings.render.batch_opts();
        let queue = JobQueue::spawn(settings.limits.max_task, move |job, cancel| {
            run_archive_job(job, &worker_fonts, &opts, cancel)
        })?;
        tracing::info!(fonts = fonts.len(), queue = settings.limits.max_task, "texttool ready");
        Ok(Self {
            settings,
            fonts,
            queue,
        })
    }

    /// Settings this instance was built from.
    pub fn settings(&self) -> &TextToolSettings {
        &self.settings
    }

    /// Shared font registry.
    pub fn fonts(&self) -> &Arc<FontRegistry> {
        &self.fonts
    }

    /// Batch job queue.
    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Route one raw message: `[texttool] <generate|font_list|task> [args]`.
    pub fn handle(&self, raw: &str) -> TextToolResult<Reply> {
        let msg = strip_prefix_word(raw.trim_start(), COMMAND_PREFIX)
            .unwrap_or(raw)
            .trim_start();
        let (command, rest) = match msg.find(char::is_whitespace) {
            Some(at) => (&msg[..at], &msg[at..]),
            None => (msg, ""),
        };
        match command {
            "generate" => self.generate(rest),
            "font_list" | "font-list" => Ok(Reply::Text(self.font_list())),
            "task" => Ok(Reply::Text(self.task())),
            other => Err(TextToolError::UnknownCommand(other.to_owned())),
        }
    }

    /// Parse, segment and render a `generate` argument string.
    ///
    /// One segment is rendered on the calling thread. Several segments become a job on the
    /// queue; wait on the returned ticket for the archive.
    #[tracing::instrument(skip_all, fields(len = args.len()))]
    pub fn generate(&self, args: &str) -> TextToolResult<Reply> {
        let job = self.prepare(args)?;
        if job.len() == 1 {
            return render_single(&job, &self.fonts).map(Reply::Delivered);
        }
        let ticket = self.queue.submit(job)?;
        tracing::info!(position = ticket.position(), "batch queued");
        Ok(Reply::Queued(ticket))
    }

    /// Parse and segment `args` and apply request limits, without rendering.
    pub fn prepare(&self, args: &str) -> TextToolResult<BatchJob> {
        if args.trim().is_empty() {
            return Err(TextToolError::EmptyInput {
                mode: "single".to_owned(),
            });
        }
        let parsed = parse_generate_args(args, &self.settings.default_font)?;
        let limits = &self.settings.limits;

        let chars = parsed.text.chars().count();
        if chars > limits.max_chars_per_task {
            return Err(TextToolError::limit(format!(
                "text has {chars} chars, at most {} allowed",
                limits.max_chars_per_task
            )));
        }

        let segments = segment_text(parsed.config.mode, &parsed.text)?;
        if segments.len() > limits.max_images_per_task {
            return Err(TextToolError::limit(format!(
                "request yields {} images, at most {} allowed",
                segments.len(),
                limits.max_images_per_task
            )));
        }
        tracing::debug!(mode = %parsed.config.mode, segments = segments.len(), "request prepared");
        Ok(BatchJob::new(segments, parsed.config, unix_timestamp()))
    }

    /// Registered aliases, one `- alias` line each.
    pub fn font_list(&self) -> String {
        if self.fonts.is_empty() {
            return "no fonts configured".to_owned();
        }
        self.fonts
            .aliases()
            .map(|a| format!("- {a}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Current queue length.
    pub fn task(&self) -> String {
        format!(
            "queue length: {}/{}",
            self.queue.len(),
            self.queue.capacity()
        )
    }
}

/// Render a one-segment job into a single PNG.
pub(crate) fn render_single(job: &BatchJob, fonts: &Arc<FontRegistry>) -> TextToolResult<Delivery> {
    let segment = job.segments.first().ok_or_else(|| TextToolError::EmptyInput {
        mode: job.config.mode.to_string(),
    })?;
    let image = TextRenderer::new(Arc::clone(fonts)).render(&segment.text, &job.config)?;
    Ok(Delivery::Image {
        file_name: image_file_name(job.timestamp, segment.index),
        png: image.encode_png()?,
    })
}

/// Render and package a multi-segment job into one archive.
pub(crate) fn run_archive_job(
    job: &BatchJob,
    fonts: &Arc<FontRegistry>,
    opts: &BatchOpts,
    cancel: &CancelToken,
) -> TextToolResult<Delivery> {
    let outcome = render_batch(job, fonts, opts, cancel)?;
    let mut sink = ZipSink::new();
    package(&outcome, &mut sink)?;
    let zip = sink
        .take_archive()
        .ok_or_else(|| TextToolError::packaging("archive missing after packaging"))?;
    let failures = outcome.failures();
    tracing::info!(
        ts = job.timestamp,
        rendered = outcome.rendered_count(),
        failed = failures.len(),
        bytes = zip.len(),
        "batch archived"
    );
    Ok(Delivery::Archive {
        file_name: archive_file_name(job.timestamp),
        zip,
        failures,
    })
}

/// Seconds since the unix epoch; 0 when the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn strip_prefix_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(word)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

#[cfg(test)]
#[path = "../../tests/unit/session/tool.rs"]
mod tests;
