use std::io::Write;
use std::path::PathBuf;

use log::debug;

use super::BuiltinError;
use crate::shell::session::Session;

pub(super) fn run(
    session: &mut Session,
    args: &[String],
    out: &mut dyn Write,
) -> Result<(), BuiltinError> {
    if args.len() > 1 {
        return Err(BuiltinError::TooManyArguments { builtin: "cd" });
    }

    match args.first().map(String::as_str) {
        None | Some("~") => {
            let home = session.home().ok_or(BuiltinError::NoHome)?.to_string();
            change_dir(session, &home)
        }
        Some("-") => {
            let previous = session
                .var("OLDPWD")
                .ok_or(BuiltinError::OldPwdNotSet)?
                .to_string();
            change_dir(session, &previous)?;
            writeln!(out, "{}", previous).map_err(BuiltinError::io("cd"))
        }
        Some(path) => {
            let path = shellexpand::tilde_with_context(path, || session.home()).into_owned();
            change_dir(session, &path)
        }
    }
}

fn change_dir(session: &mut Session, path: &str) -> Result<(), BuiltinError> {
    let target = session
        .resolve(path)
        .canonicalize()
        .map_err(BuiltinError::io(format!("cd: {}", path)))?;
    if !target.is_dir() {
        return Err(BuiltinError::NotADirectory(PathBuf::from(path)));
    }

    let previous = session.cwd().to_string_lossy().into_owned();
    debug!("cd: {} -> {}", previous, target.display());
    session.set_var("OLDPWD", previous);
    session.set_cwd(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn session(cwd: &Path, home: &Path) -> Session {
        Session::with_vars(
            cwd,
            vec![("HOME".to_string(), home.to_string_lossy().into_owned())],
        )
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_cd_relative_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        let mut session = session(&root, &root);
        let mut out = Vec::new();

        run(&mut session, &args(&["sub"]), &mut out).unwrap();
        assert_eq!(session.cwd(), root.join("sub"));
        assert_eq!(session.var("OLDPWD"), Some(root.to_str().unwrap()));

        run(&mut session, &args(&["-"]), &mut out).unwrap();
        assert_eq!(session.cwd(), root);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", root.display()));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_cd_home_and_tilde() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().canonicalize().unwrap();
        fs::create_dir(home.join("docs")).unwrap();
        let mut session = session(Path::new("/"), &home);
        let mut out = Vec::new();

        run(&mut session, &[], &mut out).unwrap();
        assert_eq!(session.cwd(), home);

        run(&mut session, &args(&["/"]), &mut out).unwrap();
        run(&mut session, &args(&["~/docs"]), &mut out).unwrap();
        assert_eq!(session.cwd(), home.join("docs"));
        assert!(out.is_empty());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_cd_errors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("file"), "").unwrap();
        let mut session = session(&root, &root);
        let mut out = Vec::new();

        assert!(matches!(
            run(&mut session, &args(&["a", "b"]), &mut out),
            Err(BuiltinError::TooManyArguments { .. })
        ));
        assert!(matches!(
            run(&mut session, &args(&["-"]), &mut out),
            Err(BuiltinError::OldPwdNotSet)
        ));
        assert!(matches!(
            run(&mut session, &args(&["missing"]), &mut out),
            Err(BuiltinError::Io { .. })
        ));
        assert!(matches!(
            run(&mut session, &args(&["file"]), &mut out),
            Err(BuiltinError::NotADirectory(_))
        ));
        assert_eq!(session.cwd(), root);
        assert_eq!(session.var("OLDPWD"), None);
    }
}
