//! Command surface: settings, the bounded job queue and request routing.

mod queue;
mod settings;
mod tool;

pub use queue::{JobQueue, JobTicket};
pub use settings::{LimitSettings, RenderSettings, TextToolSettings};
pub use tool::{Delivery, Reply, TextTool, unix_timestamp};
