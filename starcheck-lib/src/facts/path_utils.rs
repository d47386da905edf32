//! Path utilities for safe filesystem operations.

use core::fmt::Write;

/// Sanitize a string for use as a path component
///
/// Removes path traversal sequences and dangerous characters to prevent
/// directory traversal attacks and filesystem issues. Used for the owner and
/// repository directories of the cache, whose names GitHub already restricts.
///
/// # Examples
///
/// ```ignore
/// // This is an internal utility function
/// assert_eq!(sanitize_path_component("rust-lang"), "rust-lang");
/// assert_eq!(sanitize_path_component("../../etc/passwd"), "______etc_passwd");
/// ```
#[must_use]
pub fn sanitize_path_component(s: &str) -> String {
    // Replace ".." but allow single "." so names like "socket.io" survive
    let s = s.replace("..", "__");
    s.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// Escape an arbitrary string into a file-name-safe form.
///
/// ASCII letters and digits are kept as-is; every other byte of the UTF-8 encoding
/// becomes `_XX` with `XX` its uppercase hex value. The mapping is injective and
/// the output never contains `-`, which leaves that character free to delimit the
/// parts of a cache file name.
#[must_use]
pub fn escape_file_name(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() {
            escaped.push(char::from(byte));
        } else {
            let _ = write!(escaped, "_{byte:02X}");
        }
    }

    escaped
}
