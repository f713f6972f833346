use log::debug;

use super::pipeline::run_pipeline;
use crate::shell::error::ShellError;
use crate::shell::parser::{parse, Pipeline};
use crate::shell::session::Session;

/// Walks a conditional chain: `&&` edges are taken on success, `||` edges on
/// failure. The result is that of the last segment that actually ran.
pub fn run(session: &mut Session, pipeline: &Pipeline) -> Result<(), ShellError> {
    let mut current = pipeline;

    loop {
        let result = run_pipeline(session, current);
        let next = match &result {
            Ok(()) => current.and_next(),
            Err(err) => {
                debug!("segment failed: {}", err);
                current.or_next()
            }
        };

        match next {
            Some(next) => current = next,
            None => return result,
        }
    }
}

/// Parses and runs one line. Nothing runs if the line does not parse.
pub fn execute_line(session: &mut Session, line: &str) -> Result<(), ShellError> {
    let pipeline = parse(line)?;
    debug!("parsed {} segment(s) from {:?}", pipeline.chain_len(), line);
    run(session, &pipeline)
}

/// Owns the session a front-end executes lines against.
pub struct Executor {
    session: Session,
}

impl Executor {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn execute(&mut self, line: &str) -> Result<(), ShellError> {
        execute_line(&mut self.session, line)
    }
}
