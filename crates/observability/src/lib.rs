//! Tracing/logging setup shared by storefront binaries and tests.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize logging for test binaries (compact output, captured per test).
pub fn init_for_tests() {
    tracing::init_for_tests();
}

/// Subscriber configuration (filters, layers).
pub mod tracing;
