use std::io::Write;

use sysinfo::{PidExt, ProcessExt, System, SystemExt};

use super::BuiltinError;

/// Prints a `PID CMD` table of every visible process, ordered by pid.
pub(super) fn run(out: &mut dyn Write) -> Result<(), BuiltinError> {
    let mut system = System::new();
    system.refresh_processes();

    let mut processes: Vec<(u32, &str)> = system
        .processes()
        .iter()
        .map(|(pid, process)| (pid.as_u32(), process.name()))
        .collect();
    processes.sort_unstable_by_key(|(pid, _)| *pid);

    let mut table = format!("{:>6} {}\n", "PID", "CMD");
    for (pid, name) in processes {
        table.push_str(&format!("{:>6} {}\n", pid, name));
    }
    out.write_all(table.as_bytes()).map_err(BuiltinError::io("ps"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_lists_own_process() {
        let mut out = Vec::new();
        run(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("   PID CMD"));

        let me = std::process::id().to_string();
        assert!(lines.any(|line| line.split_whitespace().next() == Some(me.as_str())));
    }
}
