use dotenv::dotenv;
use log::warn;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub theme: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub logger_stderr: bool,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        match env::var("HOME") {
            Ok(home) if !home.is_empty() => PathBuf::from(home).join(".config/minish"),
            _ => env::temp_dir().join("minish"),
        }
    }

    pub fn new() -> Self {
        // .env files only fill in what the environment does not already set
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();
        config.apply_env(|key| env::var(key).ok());

        if let Some(parent) = config.history_file.parent() {
            ensure_dir(parent);
        }
        ensure_dir(&config.logger_dir);

        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(theme) = var("MINISH_THEME") {
            self.theme = theme;
        }
        if let Some(editor) = var("MINISH_EDITOR") {
            self.editor_mode = editor;
        }
        if let Some(history) = var("MINISH_HISTORY") {
            self.history_file = PathBuf::from(history);
        }
        if let Some(level) = var("MINISH_LOG_LEVEL") {
            self.logger_level = level;
        }
        if let Some(dir) = var("MINISH_LOG_DIR") {
            self.logger_dir = PathBuf::from(dir);
        }
        if let Some(flag) = var("MINISH_LOG_STDERR") {
            self.logger_stderr = !matches!(flag.to_lowercase().as_str(), "" | "0" | "false" | "no");
        }
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = Config::get_config_dir();
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            theme: String::from("default"),
            history_file: config_dir.join(".minish_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            logger_stderr: false,
            config_dir,
        }
    }
}

fn ensure_dir(dir: &Path) {
    if let Err(err) = fs::create_dir_all(dir) {
        warn!("cannot create {}: {}", dir.display(), err);
    }
}
