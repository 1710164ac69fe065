mod approve;
mod report;
mod run;
pub mod ui;

pub use approve::approve_command;
pub use report::OutputFormat;
pub use run::{run_command, RunOptions};
