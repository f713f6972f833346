mod engine;
mod pipeline;

pub use engine::{execute_line, run, Executor};
pub use pipeline::run_pipeline;
