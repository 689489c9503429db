//! Build environment variable handling.

use std::env;

// Returns the variable only when it is set to something non-empty
fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

/// Interpreter used to run the source generator and probe headers (`PYTHON`).
pub fn python() -> Option<String> {
    non_empty("PYTHON")
}

/// C compiler override (`CC`).
pub fn cc() -> Option<String> {
    non_empty("CC")
}

/// C++ compiler override (`CXX`).
pub fn cxx() -> Option<String> {
    non_empty("CXX")
}

/// Extra C compiler flags (`CFLAGS`), split on whitespace.
pub fn cflags() -> Vec<String> {
    split_flags(non_empty("CFLAGS"))
}

/// Extra C++ compiler flags (`CXXFLAGS`), split on whitespace.
pub fn cxxflags() -> Vec<String> {
    split_flags(non_empty("CXXFLAGS"))
}

/// Extra linker flags (`LDFLAGS`), split on whitespace.
pub fn ldflags() -> Vec<String> {
    split_flags(non_empty("LDFLAGS"))
}

/// Parallel compile jobs (`CAER_BUILD_JOBS`); ignored unless a positive integer.
pub fn jobs() -> Option<usize> {
    non_empty("CAER_BUILD_JOBS")
        .and_then(|s| s.trim().parse().ok())
        .filter(|&n: &usize| n > 0)
}

fn split_flags(value: Option<String>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
