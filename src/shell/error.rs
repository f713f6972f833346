use std::io;

use nix::sys::signal::Signal;
use thiserror::Error;

use super::builtins::BuiltinError;
use super::parser::ParseError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error("syntax error: empty command in pipeline")]
    EmptyCommand,
    #[error("{path}: {source}")]
    OpenInput {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    CreateOutput {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program}: wait failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: nix::Error,
    },
    #[error("{program}: exit status {code}")]
    Exit { program: String, code: i32 },
    #[error("{program}: terminated by {signal}")]
    Signaled { program: String, signal: Signal },
    #[error("cannot install SIGINT handler: {0}")]
    Signal(#[source] nix::Error),
}

impl ShellError {
    /// True when a pipeline ended because the user pressed Ctrl-C.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            ShellError::Signaled {
                signal: Signal::SIGINT,
                ..
            }
        )
    }
}
