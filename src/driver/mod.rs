//! Driver implementations for the RailDriver vendor library.
//!
//! [`NativeDriver`] wraps the runtime-loaded DLL; [`SimDriver`] is the
//! built-in backend for machines without a simulator install, and doubles as
//! the test double.

pub mod native;
pub mod sim;

pub use native::NativeDriver;
pub use sim::SimDriver;

/// Splits the vendor library's `"::"`-delimited controller-name blob.
///
/// Empty entries are dropped, so an empty or missing blob yields an empty
/// list rather than a list of empty names.
pub fn split_controller_list(blob: &str) -> Vec<String> {
    blob.split("::")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
