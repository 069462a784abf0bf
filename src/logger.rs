//! Colored `[module]` logging.
//!
//! `warn` and `error` lines go to stderr, everything else to stdout.
//! Single-line messages are cut at the terminal width so a busy watch
//! session stays one line per event.
//!
//! # Example
//!
//! ```ignore
//! log!("collection"; "creating {} pages from {}", count, path);
//! log!("error"; "{err}");
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stderr, stdout},
    sync::OnceLock,
};

static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// `[`, `]` and the space after the prefix.
const PREFIX_OVERHEAD: usize = 3;

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Out,
    Err,
}

pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = paint(module, &module_lower);

    let line = if message.contains('\n') {
        message
    } else {
        let width = terminal_width() as usize;
        truncate_str(message, width.saturating_sub(module.len() + PREFIX_OVERHEAD))
    };

    match stream_for(&module_lower) {
        Stream::Out => emit(&mut stdout().lock(), &prefix, line),
        Stream::Err => emit(&mut stderr().lock(), &prefix, line),
    }
}

fn emit<W: Write>(out: &mut W, prefix: &ColoredString, line: &str) {
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{prefix} {line}").ok();
    out.flush().ok();
}

/// Falls back to 120 columns when the width cannot be detected.
fn terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

fn stream_for(module_lower: &str) -> Stream {
    match module_lower {
        "warn" | "error" => Stream::Err,
        _ => Stream::Out,
    }
}

fn paint(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "collection" => prefix.bright_cyan().bold(),
        "watch" => prefix.bright_green().bold(),
        "query" => prefix.bright_blue().bold(),
        "warn" => prefix.bright_magenta().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Cut `s` to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
