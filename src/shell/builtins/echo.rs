use std::io::Write;

use super::BuiltinError;
use crate::shell::session::Session;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct EchoFlags {
    escape: bool,
    no_newline: bool,
}

pub(super) fn run(session: &Session, args: &[String], out: &mut dyn Write) -> Result<(), BuiltinError> {
    let (flags, rest) = parse_flags(args);
    let text = render(session, flags, rest);

    if flags.no_newline {
        write!(out, "{}", text)
    } else {
        writeln!(out, "{}", text)
    }
    .map_err(BuiltinError::io("echo"))
}

/// Leading words like `-n`, `-e` or `-ne` are flags; the first word that is
/// anything else ends flag parsing.
fn parse_flags(args: &[String]) -> (EchoFlags, &[String]) {
    let mut flags = EchoFlags::default();

    for (i, arg) in args.iter().enumerate() {
        let letters = match arg.strip_prefix('-') {
            Some(letters) if !letters.is_empty() && letters.chars().all(|c| c == 'e' || c == 'n') => {
                letters
            }
            _ => return (flags, &args[i..]),
        };
        flags.escape |= letters.contains('e');
        flags.no_newline |= letters.contains('n');
    }

    (flags, &[])
}

fn render(session: &Session, flags: EchoFlags, args: &[String]) -> String {
    let (Some(first), Some(last)) = (args.first(), args.last()) else {
        return String::new();
    };

    let single_quoted = first.starts_with('\'') && last.ends_with('\'');
    let double_quoted = first.starts_with('"') && last.ends_with('"');

    let mut text = args.join(" ");
    if flags.escape {
        text = unescape(&text, single_quoted || double_quoted);
    }

    // single quotes: literal text, no variable expansion
    if single_quoted {
        return text.trim_matches('\'').to_string();
    }
    if double_quoted {
        text = text.trim_matches('"').to_string();
    }

    shellexpand::env_with_context_no_errors(&text, |name| Some(session.var(name).unwrap_or("")))
        .into_owned()
}

/// Outside quotes a backslash just protects the next character; inside quotes
/// the usual C-style escapes are interpreted.
fn unescape(text: &str, quoted: bool) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let Some(&next) = chars.peek() else {
            result.push(c);
            break;
        };

        if !quoted {
            result.push(next);
            chars.next();
            continue;
        }

        let replacement = match next {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            _ => None,
        };

        match replacement {
            Some(replacement) => {
                result.push(replacement);
                chars.next();
            }
            None if text_follows(&chars, "033") => {
                result.push('\u{1b}');
                for _ in 0..3 {
                    chars.next();
                }
            }
            None => result.push(c),
        }
    }

    result
}

fn text_follows(chars: &std::iter::Peekable<std::str::Chars<'_>>, expected: &str) -> bool {
    chars.clone().take(expected.len()).eq(expected.chars())
}
