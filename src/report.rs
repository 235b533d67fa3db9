//! Leveled console reporting for pipeline progress.
//!
//! Status lines go to stderr so that commands emitting data on stdout
//! (`parse`) stay pipeable. `--quiet` suppresses everything below error.

use std::sync::atomic::{AtomicBool, Ordering};

/// Severity of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress everything below [`Level::Error`].
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn emit(level: Level, message: &str) {
    if QUIET.load(Ordering::Relaxed) && level != Level::Error {
        return;
    }
    let prefix = match level {
        Level::Info => "   ",
        Level::Success => " ✓ ",
        Level::Warning => " ⚠ ",
        Level::Error => " ✗ ",
    };
    eprintln!("{prefix}{message}");
}

pub fn info(message: impl Into<String>) {
    emit(Level::Info, &message.into());
}

pub fn success(message: impl Into<String>) {
    emit(Level::Success, &message.into());
}

pub fn warning(message: impl Into<String>) {
    emit(Level::Warning, &message.into());
}

pub fn error(message: impl Into<String>) {
    emit(Level::Error, &message.into());
}
