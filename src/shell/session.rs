use std::collections::HashMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Per-shell state that builtins mutate and child processes inherit.
///
/// Nothing here touches the process-wide working directory or environment, so
/// several sessions can live side by side (tests rely on that).
#[derive(Debug, Clone)]
pub struct Session {
    cwd: PathBuf,
    vars: HashMap<String, String>,
}

impl Session {
    /// Captures the current process working directory and environment.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_vars(env::current_dir()?, env::vars()))
    }

    pub fn with_vars<I>(cwd: impl Into<PathBuf>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            cwd: cwd.into(),
            vars: vars.into_iter().collect(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn set_cwd(&mut self, dir: PathBuf) {
        self.set_var("PWD", dir.to_string_lossy().into_owned());
        self.cwd = dir;
    }

    /// Resolves `path` against the session directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(path)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    pub fn home(&self) -> Option<&str> {
        self.var("HOME").filter(|home| !home.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_var() {
        let mut session = Session::with_vars("/", Vec::new());
        assert_eq!(session.var("KEY"), None);

        session.set_var("KEY", "VALUE");
        assert_eq!(session.var("KEY"), Some("VALUE"));
    }

    #[test]
    fn test_set_cwd_updates_pwd() {
        let mut session = Session::with_vars("/", Vec::new());
        session.set_cwd(PathBuf::from("/tmp"));

        assert_eq!(session.cwd(), Path::new("/tmp"));
        assert_eq!(session.var("PWD"), Some("/tmp"));
        assert_eq!(session.resolve("a/b"), PathBuf::from("/tmp/a/b"));
        assert_eq!(session.resolve("/abs"), PathBuf::from("/abs"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_new_reads_process_env() {
        let session = Session::new().unwrap();
        assert!(session.var("PATH").is_some());
    }
}
