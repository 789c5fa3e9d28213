/*!
format.rs

Terminal formatting for human output paths.

Public API:
  - StyleOptions::detect(&EnvLookup) / StyleOptions::from_env(&EnvLookup, is_tty)
  - color(role, text, &StyleOptions) -> String
  - table(headers, rows, &StyleOptions) -> String

Color is disabled when NO_COLOR is set or stdout is not a terminal.
Nothing here prints; callers write the returned strings.
*/

use std::borrow::Cow;
use std::io::IsTerminal;

use crate::config::{EnvLookup, NO_COLOR_VAR};

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
}

impl StyleOptions {
    /// Style for the real stdout.
    pub fn detect(env: &EnvLookup<'_>) -> Self {
        Self::from_env(env, std::io::stdout().is_terminal())
    }

    pub fn from_env(env: &EnvLookup<'_>, is_tty: bool) -> Self {
        let no_color = env(NO_COLOR_VAR).is_some_and(|v| !v.is_empty());
        StyleOptions {
            use_color: is_tty && !no_color,
        }
    }

    /// No ANSI. Used for captured output.
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions { use_color: false }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Accent,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Accent => "38;5;213",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                            */
/* -------------------------------------------------------------------------- */

/// Render rows under a header line and a dashed separator.
/// Columns are padded to their widest cell; row order is kept as given.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header = headers
        .iter()
        .enumerate()
        .map(|(i, h)| color(Role::Accent, pad(h, widths[i]), style))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(header);

    let sep = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(color(Role::Dim, sep, style));

    for row in rows {
        let line = (0..col_count)
            .map(|c| pad(row.get(c).map(|s| s.as_str()).unwrap_or(""), widths[c]))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line);
    }

    // Trailing pad on the last column is noise
    lines
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn pad(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - len))
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    // Scans for ESC '[' ... final letter
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
