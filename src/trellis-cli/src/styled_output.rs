//! Styled CLI output.
//!
//! Status lines get a colored marker when the stream is a terminal and
//! `NO_COLOR` is unset; otherwise plain text.

use std::io::IsTerminal;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}

fn stdout_styled() -> bool {
    std::io::stdout().is_terminal() && !colors_disabled()
}

fn stderr_styled() -> bool {
    std::io::stderr().is_terminal() && !colors_disabled()
}

pub fn print_success(message: &str) {
    if stdout_styled() {
        println!("{GREEN}✓{RESET} {message}");
    } else {
        println!("✓ {message}");
    }
}

pub fn print_info(message: &str) {
    if stdout_styled() {
        println!("{CYAN}·{RESET} {message}");
    } else {
        println!("· {message}");
    }
}

pub fn print_error(message: &str) {
    if stderr_styled() {
        eprintln!("{RED}✗{RESET} {message}");
    } else {
        eprintln!("✗ {message}");
    }
}

/// Bold `text` for stdout.
pub fn bold(text: &str) -> String {
    if stdout_styled() {
        format!("{BOLD}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Dim `text` for stdout.
pub fn dim(text: &str) -> String {
    if stdout_styled() {
        format!("{DIM}{text}{RESET}")
    } else {
        text.to_string()
    }
}
