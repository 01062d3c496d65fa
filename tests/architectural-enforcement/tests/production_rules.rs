//! Integration Test: Production Code Rules
//!
//! Scans the Keepsake crates for patterns that break the architecture.

use architectural_enforcement::{assert_clean, crate_src, scan};

const CORE: &str = "keepsake/core/src";
const CLI: &str = "keepsake/cli/src";

// =============================================================================
// Timing
// =============================================================================

/// Rituals sleep until absolute deadlines; relative sleeps drift
#[test]
fn test_no_relative_sleep_in_production_code() {
    let mut violations = scan(&crate_src(CORE), &[], |code| {
        code.contains("::sleep(") || code.contains("thread::sleep")
    });
    violations.extend(scan(&crate_src(CLI), &[], |code| {
        code.contains("thread::sleep")
    }));
    assert_clean("Relative sleep in production code", &violations);
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn test_no_unwrap_in_core() {
    let violations = scan(&crate_src(CORE), &[], |code| {
        code.contains(".unwrap()") || code.contains(".expect(")
    });
    assert_clean("unwrap/expect in core library", &violations);
}

// =============================================================================
// Global State
// =============================================================================

#[test]
fn test_no_global_mutable_state() {
    let rule = |code: &str| {
        code.contains("static mut")
            || code.contains("lazy_static!")
            || (code.trim_start().starts_with("static ")
                && (code.contains("Mutex") || code.contains("OnceLock") || code.contains("RwLock")))
    };
    let mut violations = scan(&crate_src(CORE), &[], rule);
    violations.extend(scan(&crate_src(CLI), &[], rule));
    assert_clean("Global mutable state", &violations);
}

// =============================================================================
// Blocking I/O
// =============================================================================

/// Only configuration loading may touch the filesystem synchronously
#[test]
fn test_no_blocking_fs_in_core() {
    let violations = scan(&crate_src(CORE), &["config/mod.rs"], |code| {
        code.contains("std::fs::") || code.contains("File::open")
    });
    assert_clean("Blocking filesystem call in core", &violations);
}

#[test]
fn test_cli_uses_async_fs() {
    let violations = scan(&crate_src(CLI), &[], |code| code.contains("std::fs::"));
    assert_clean("Blocking filesystem call in CLI", &violations);
}
