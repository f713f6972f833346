use log::{debug, error, warn};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::ops::ControlFlow;
use std::path::Path;

use crate::shell::error::ShellError;
use crate::shell::executor::Executor;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::shell::session::Session;
use crate::shell::signals;
use crate::utils::config::Config;
use crate::utils::theme::{load_theme, Theme};

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    executor: Executor,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, session: Session) -> Self {
        Self {
            config,
            theme: load_theme(&config.theme),
            executor: Executor::new(session),
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("starting minish...");
        signals::catch_interrupts().map_err(ShellError::Signal)?;

        let stdin = io::stdin();
        if stdin.is_terminal() {
            self.run_interactive()?;
        } else {
            self.run_script(stdin.lock())?;
        }

        debug!("leaving minish...");
        Ok(())
    }

    fn run_interactive(&mut self) -> Result<(), Box<dyn Error>> {
        let mut readline = ReadlineManager::new(self.config)?;
        readline.load_history();

        let outcome = loop {
            io::stdout().flush()?;
            match readline.readline(&self.prompt()) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Err(err) = readline.add_history(line) {
                        warn!("cannot add history entry: {}", err);
                    }
                    if self.handle_line(line).is_break() {
                        break Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("interrupted at prompt");
                }
                Err(ReadlineError::Eof) => {
                    debug!("EOF at prompt");
                    break Ok(());
                }
                Err(err) => {
                    error!("readline failed: {}", err);
                    break Err(err);
                }
            }
        };

        readline.save_history();
        outcome.map_err(Into::into)
    }

    /// Runs lines from a non-terminal input, without prompting.
    pub fn run_script(&mut self, input: impl BufRead) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.handle_line(line).is_break() {
                break;
            }
        }
        Ok(())
    }

    pub fn session(&self) -> &Session {
        self.executor.session()
    }

    fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        if line == "exit" {
            debug!("exit requested");
            return ControlFlow::Break(());
        }

        match self.executor.execute(line) {
            Ok(()) => {}
            Err(err) if err.is_interrupt() => {
                debug!("{:?} interrupted", line);
                eprintln!();
            }
            Err(err) => {
                debug!("{:?} failed: {}", line, err);
                eprintln!("{}", self.theme.error(&err));
            }
        }
        ControlFlow::Continue(())
    }

    fn prompt(&self) -> String {
        let session = self.session();
        let user = session
            .var("USER")
            .or_else(|| session.var("LOGNAME"))
            .unwrap_or("user");
        let host = nix::unistd::gethostname()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("localhost"));
        let dir = display_dir(session.cwd(), session.home());

        self.theme.prompt(user, &host, &dir)
    }
}

/// Shortens a directory under `home` to `~/...`.
fn display_dir(dir: &Path, home: Option<&str>) -> String {
    match home.and_then(|home| dir.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => String::from("~"),
        Some(rest) => format!("~/{}", rest.display()),
        None => dir.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_display_dir() {
        let home = Some("/home/ada");
        assert_eq!(display_dir(Path::new("/home/ada"), home), "~");
        assert_eq!(display_dir(Path::new("/home/ada/src/minish"), home), "~/src/minish");
        assert_eq!(display_dir(Path::new("/home/adamant"), home), "/home/adamant");
        assert_eq!(display_dir(Path::new("/tmp"), None), "/tmp");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_script_runs_until_exit() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let config = Config {
            theme: String::from("plain"),
            ..Config::default()
        };
        let mut shell = Shell::new(&config, Session::with_vars(dir.path(), std::env::vars()));

        let script = "\n  cd sub  \nfalse\nprintf x > before\nexit\nprintf y > after\n";
        shell.run_script(script.as_bytes()).unwrap();

        let sub = dir.path().join("sub").canonicalize().unwrap();
        assert_eq!(shell.session().cwd(), sub);
        assert!(sub.join("before").exists());
        assert!(!sub.join("after").exists());
    }
}
