pub mod cli;
pub mod commands;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod notify;
pub mod report;
pub mod state;

pub use notify::{DispatchError, Dispatcher};
pub use report::{to_chat_blocks, to_html_report};
pub use state::{ResultAccumulator, RunSummary, TestOutcome, TestStatus};
