use std::str::FromStr;

use log::debug;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use super::BuiltinError;

/// `kill [-SIGNAL] PID...`, SIGTERM by default.
pub(super) fn run(args: &[String]) -> Result<(), BuiltinError> {
    let (signal, pids) = match args.split_first() {
        Some((spec, rest)) if spec.starts_with('-') && spec.len() > 1 => {
            (parse_signal(&spec[1..])?, rest)
        }
        _ => (Signal::SIGTERM, args),
    };

    if pids.is_empty() {
        return Err(BuiltinError::MissingPid);
    }

    for raw in pids {
        let pid = parse_pid(raw)?;
        debug!("kill: sending {} to {}", signal, pid);
        signal::kill(pid, signal).map_err(|source| BuiltinError::Sys {
            context: format!("kill: ({})", pid),
            source,
        })?;
    }
    Ok(())
}

fn parse_pid(raw: &str) -> Result<Pid, BuiltinError> {
    match raw.parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(Pid::from_raw(pid)),
        Ok(_) => Err(BuiltinError::InvalidPid(raw.to_string())),
        Err(err) => Err(BuiltinError::InvalidPid(format!("{}: {}", raw, err))),
    }
}

/// Accepts `9`, `KILL` or `SIGKILL`.
fn parse_signal(spec: &str) -> Result<Signal, BuiltinError> {
    let invalid = || BuiltinError::InvalidSignal(spec.to_string());

    if let Ok(number) = spec.parse::<i32>() {
        return Signal::try_from(number).map_err(|_| invalid());
    }

    let name = spec.to_ascii_uppercase();
    let name = if name.starts_with("SIG") {
        name
    } else {
        format!("SIG{}", name)
    };
    Signal::from_str(&name).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_argument_errors() {
        assert!(matches!(run(&[]), Err(BuiltinError::MissingPid)));
        assert!(matches!(run(&args(&["-9"])), Err(BuiltinError::MissingPid)));
        assert!(matches!(run(&args(&["abc"])), Err(BuiltinError::InvalidPid(_))));
        assert!(matches!(run(&args(&["0"])), Err(BuiltinError::InvalidPid(_))));
        assert!(matches!(
            run(&args(&["-NOPE", "1"])),
            Err(BuiltinError::InvalidSignal(_))
        ));
    }

    #[test]
    fn test_parse_signal() {
        assert!(matches!(parse_signal("9"), Ok(Signal::SIGKILL)));
        assert!(matches!(parse_signal("int"), Ok(Signal::SIGINT)));
        assert!(matches!(parse_signal("SIGHUP"), Ok(Signal::SIGHUP)));
        assert!(parse_signal("999").is_err());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_kill_terminates_process() {
        let mut child = Command::new("sleep").arg("10").spawn().unwrap();

        run(&[child.id().to_string()]).unwrap();

        let status = child.wait().unwrap();
        assert!(!status.success());
        assert_eq!(
            std::os::unix::process::ExitStatusExt::signal(&status),
            Some(Signal::SIGTERM as i32)
        );
    }
}
