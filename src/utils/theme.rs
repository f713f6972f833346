use colored::Colorize;

type Style = Box<dyn Fn(&str) -> String>;

pub struct Theme {
    pub user_style: Style,
    pub dir_style: Style,
    pub error_style: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            user_style: Box::new(|s| s.bright_green().bold().to_string()),
            dir_style: Box::new(|s| s.bright_blue().bold().to_string()),
            error_style: Box::new(|s| s.bright_red().to_string()),
        }
    }
}

impl Theme {
    pub fn plain() -> Self {
        Theme {
            user_style: Box::new(str::to_string),
            dir_style: Box::new(str::to_string),
            error_style: Box::new(str::to_string),
        }
    }

    /// `user@host:dir$ `
    pub fn prompt(&self, user: &str, host: &str, dir: &str) -> String {
        format!(
            "{}:{}$ ",
            (self.user_style)(&format!("{}@{}", user, host)),
            (self.dir_style)(dir)
        )
    }

    pub fn error(&self, message: impl std::fmt::Display) -> String {
        format!("{}: {}", (self.error_style)(env!("CARGO_PKG_NAME")), message)
    }
}

pub fn load_theme(theme_name: &str) -> Theme {
    match theme_name {
        "plain" => Theme::plain(),
        _ => Theme::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prompt() {
        let theme = load_theme("plain");
        assert_eq!(theme.prompt("ada", "box", "~/src"), "ada@box:~/src$ ");
        assert_eq!(theme.error("cd: HOME not set"), "minish: cd: HOME not set");
    }

    #[test]
    fn test_default_prompt_keeps_text() {
        colored::control::set_override(false);
        let theme = load_theme("unknown");
        assert_eq!(theme.prompt("a", "b", "/"), "a@b:/$ ");
    }
}
