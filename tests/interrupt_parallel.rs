use std::thread;
use std::time::{Duration, Instant};

use minish::shell::executor::execute_line;
use minish::shell::signals::catch_interrupts;
use minish::shell::{Session, ShellError};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

fn run_in_own_session() -> (Result<(), ShellError>, Duration) {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let mut session = Session::with_vars(dir.path(), std::env::vars());
    let started = Instant::now();
    let result = execute_line(&mut session, "sleep 30");
    (result, started.elapsed())
}

// SIGINT is process-wide, so this binary holds exactly one test.
#[allow(clippy::unwrap_used)]
#[test]
fn test_one_ctrl_c_reaches_every_running_session() {
    catch_interrupts().unwrap();

    let a = thread::spawn(run_in_own_session);
    let b = thread::spawn(run_in_own_session);

    thread::sleep(Duration::from_millis(500));
    kill(Pid::this(), Signal::SIGINT).unwrap();

    for (name, handle) in [("a", a), ("b", b)] {
        let (result, elapsed) = handle.join().unwrap();
        let err = result.unwrap_err();
        assert!(err.is_interrupt(), "session {name}: {err}");
        assert!(elapsed < Duration::from_secs(10), "session {name} took {elapsed:?}");
    }

    // the handler survives both groups unregistering
    let (result, _) = {
        let sender = thread::spawn(|| {
            thread::sleep(Duration::from_millis(300));
            kill(Pid::this(), Signal::SIGINT).unwrap();
        });
        let outcome = run_in_own_session();
        sender.join().unwrap();
        outcome
    };
    assert!(matches!(
        result,
        Err(ShellError::Signaled {
            signal: Signal::SIGINT,
            ..
        })
    ));
}
