use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use super::session::Session;

mod cd;
mod echo;
mod kill;
mod ps;
mod pwd;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("unknown builtin `{0}'")]
    Unknown(String),
    #[error("{builtin}: too many arguments")]
    TooManyArguments { builtin: &'static str },
    #[error("cd: HOME not set")]
    NoHome,
    #[error("cd: OLDPWD not set")]
    OldPwdNotSet,
    #[error("cd: {}: not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("kill: missed PID")]
    MissingPid,
    #[error("kill: invalid PID: {0}")]
    InvalidPid(String),
    #[error("kill: invalid signal: {0}")]
    InvalidSignal(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("{context}: {source}")]
    Sys {
        context: String,
        #[source]
        source: nix::Error,
    },
}

impl BuiltinError {
    fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let context = context.into();
        move |source| BuiltinError::Io { context, source }
    }
}

/// Commands that run inside the shell process instead of being spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Pwd,
    Echo,
    Kill,
    Ps,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Cd,
        Builtin::Pwd,
        Builtin::Echo,
        Builtin::Kill,
        Builtin::Ps,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
            Builtin::Echo => "echo",
            Builtin::Kill => "kill",
            Builtin::Ps => "ps",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn run(
        self,
        session: &mut Session,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<(), BuiltinError> {
        match self {
            Builtin::Cd => cd::run(session, args, out),
            Builtin::Pwd => pwd::run(session, out),
            Builtin::Echo => echo::run(session, args, out),
            Builtin::Kill => kill::run(args),
            Builtin::Ps => ps::run(out),
        }
    }
}

pub fn is_builtin(name: &str) -> bool {
    Builtin::from_name(name).is_some()
}

/// Runs a builtin in the caller's process, writing to stdout or to `output`
/// (created or truncated, relative to the session directory).
pub fn run_builtin(
    session: &mut Session,
    name: &str,
    args: &[String],
    output: Option<&str>,
) -> Result<(), BuiltinError> {
    let builtin = Builtin::from_name(name).ok_or_else(|| BuiltinError::Unknown(name.to_string()))?;
    debug!("running builtin {} {:?} > {:?}", name, args, output);

    match output {
        Some(path) => {
            let mut file = File::create(session.resolve(path)).map_err(BuiltinError::io(path))?;
            builtin.run(session, args, &mut file)?;
            file.flush().map_err(BuiltinError::io(path))
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            builtin.run(session, args, &mut out)?;
            out.flush().map_err(BuiltinError::io(name))
        }
    }
}
