use std::fs;

use minish::shell::executor::run_pipeline;
use minish::shell::parser::parse;
use minish::shell::{Session, ShellError};

fn open_fds() -> usize {
    fs::read_dir("/proc/self/fd")
        .map(|entries| entries.count())
        .unwrap_or_else(|err| panic!("cannot list /proc/self/fd: {err}"))
}

fn run(session: &mut Session, line: &str) -> Result<(), ShellError> {
    let pipeline = parse(line).unwrap_or_else(|err| panic!("{line}: {err}"));
    run_pipeline(session, &pipeline)
}

// Kept as a single test so nothing else in this process opens or closes
// descriptors while we count.
#[allow(clippy::unwrap_used)]
#[test]
fn test_pipeline_leaves_no_descriptors_open() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("input.txt"), "b\na\nc\n").unwrap();
    let mut session = Session::with_vars(dir.path(), std::env::vars());

    let before = open_fds();

    run(&mut session, "cat < input.txt | sort | uniq | wc -l > count").unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("count")).unwrap().trim(), "3");
    assert_eq!(open_fds(), before, "after a successful pipeline");

    let err = run(&mut session, "cat < missing.txt | sort | wc -l").unwrap_err();
    assert!(matches!(err, ShellError::OpenInput { .. }));
    assert_eq!(open_fds(), before, "after a missing input file");

    let err = run(&mut session, "cat input.txt | sort | no-such-program-minish").unwrap_err();
    assert!(matches!(err, ShellError::Spawn { .. }));
    assert_eq!(open_fds(), before, "after a failed start");

    run(&mut session, "sort input.txt | false").unwrap_err();
    assert_eq!(open_fds(), before, "after a failing stage");

    run(&mut session, "echo in-process > builtin.txt").unwrap();
    assert_eq!(open_fds(), before, "after a builtin with redirection");
}
