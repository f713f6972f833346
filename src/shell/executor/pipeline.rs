use std::fs::File;
use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{pipe2, Pid};

use crate::shell::builtins::{is_builtin, run_builtin};
use crate::shell::error::ShellError;
use crate::shell::parser::{Command as ShellCommand, Pipeline};
use crate::shell::session::Session;
use crate::shell::signals::{self, SigintForwarder};

struct Running<'a> {
    program: &'a str,
    pid: Pid,
}

/// Runs one segment of a conditional chain: a lone builtin in-process, anything
/// else as one process per stage, all in a fresh process group.
pub fn run_pipeline(session: &mut Session, pipeline: &Pipeline) -> Result<(), ShellError> {
    let commands = pipeline.commands.as_slice();

    if let [command] = commands {
        if is_builtin(&command.name) {
            run_builtin(session, &command.name, &command.args, command.output.as_deref())?;
            return Ok(());
        }
    }

    if commands.is_empty() || commands.iter().any(|command| command.name.is_empty()) {
        return Err(ShellError::EmptyCommand);
    }

    let mut prepared = prepare(session, commands)?;
    signals::discard_pending();

    let mut running = Vec::with_capacity(commands.len());
    let mut pgid: Option<Pid> = None;
    let mut spawn_error = None;

    for (process, command) in prepared.iter_mut().zip(commands) {
        process.process_group(pgid.map_or(0, Pid::as_raw));
        match process.spawn() {
            Ok(child) => {
                let pid = Pid::from_raw(child.id() as i32);
                debug!("started {} as pid {}", command.name, pid);
                pgid.get_or_insert(pid);
                running.push(Running {
                    program: &command.name,
                    pid,
                });
            }
            Err(source) => {
                spawn_error = Some(ShellError::Spawn {
                    program: command.name.clone(),
                    source,
                });
                break;
            }
        }
    }

    // closes the parent's copies of every pipe end and redirection file
    drop(prepared);

    let Some(pgid) = pgid else {
        return spawn_error.map_or(Ok(()), Err);
    };

    if let Some(err) = spawn_error {
        abort(pgid, &running);
        return Err(err);
    }

    let forwarder = match SigintForwarder::start(pgid) {
        Ok(forwarder) => Some(forwarder),
        Err(err) => {
            warn!("SIGINT will not reach process group {}: {}", pgid, err);
            None
        }
    };

    let mut result = Ok(());
    for child in &running {
        let outcome = match wait_for(child.pid) {
            Ok(status) => check_status(child.program, status),
            Err(source) => Err(ShellError::Wait {
                program: child.program.to_string(),
                source,
            }),
        };
        if let Err(err) = outcome {
            debug!("pid {} failed: {}", child.pid, err);
            if result.is_ok() {
                result = Err(err);
            }
        }
    }

    if let Some(forwarder) = forwarder {
        forwarder.stop();
    }

    result
}

/// Builds one process description per stage with its stdin and stdout already
/// bound. On error everything opened so far is closed again.
fn prepare(session: &Session, commands: &[ShellCommand]) -> Result<Vec<Command>, ShellError> {
    let last = commands.len() - 1;
    let mut prepared = Vec::with_capacity(commands.len());
    let mut upstream: Option<OwnedFd> = None;

    for (i, command) in commands.iter().enumerate() {
        let mut process = Command::new(&command.name);
        process
            .args(&command.args)
            .current_dir(session.cwd())
            .env_clear()
            .envs(session.vars())
            .stderr(Stdio::inherit());

        if let Some(reader) = upstream.take() {
            process.stdin(reader);
        } else if let Some(path) = &command.input {
            let file = File::open(session.resolve(path)).map_err(|source| ShellError::OpenInput {
                path: path.clone(),
                source,
            })?;
            process.stdin(file);
        }

        if i < last {
            let (reader, writer) = pipe2(OFlag::O_CLOEXEC).map_err(ShellError::Pipe)?;
            process.stdout(writer);
            upstream = Some(reader);
        } else if let Some(path) = &command.output {
            let file = File::create(session.resolve(path)).map_err(|source| ShellError::CreateOutput {
                path: path.clone(),
                source,
            })?;
            process.stdout(file);
        }

        prepared.push(process);
    }

    Ok(prepared)
}

/// Kills and reaps stages that already started when a later one could not.
fn abort(pgid: Pid, running: &[Running<'_>]) {
    if let Err(err) = killpg(pgid, Signal::SIGKILL) {
        warn!("failed to kill process group {}: {}", pgid, err);
    }
    for child in running {
        if let Err(err) = wait_for(child.pid) {
            warn!("failed to reap {} ({}): {}", child.program, child.pid, err);
        }
    }
}

fn wait_for(pid: Pid) -> nix::Result<WaitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => return Ok(status),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(err) => return Err(err),
        }
    }
}

fn check_status(program: &str, status: WaitStatus) -> Result<(), ShellError> {
    match status {
        WaitStatus::Exited(_, 0) => Ok(()),
        WaitStatus::Exited(_, code) => Err(ShellError::Exit {
            program: program.to_string(),
            code,
        }),
        WaitStatus::Signaled(_, signal, _) => Err(ShellError::Signaled {
            program: program.to_string(),
            signal,
        }),
        _ => Ok(()),
    }
}
