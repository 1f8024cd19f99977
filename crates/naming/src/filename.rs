use crate::error::{ErrorKind, Result};

/// Characters no mainstream filesystem accepts in a filename.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\', '/', '\0'];
/// Separators that template tokens are usually joined with.
const SEPARATORS: &[char] = &['_', '-', '.', ' '];
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1",
    "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Splits `name` into stem and extension (including the dot) at the last dot.
///
/// A leading dot is part of the stem, so `.hidden` has no extension.
///
/// ```
/// use snapname_naming::split_extension;
///
/// assert_eq!(split_extension("photo.tar.gz"), ("photo.tar", ".gz"));
/// assert_eq!(split_extension(".hidden"), (".hidden", ""));
/// assert_eq!(split_extension("README"), ("README", ""));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        None | Some(0) => (name, ""),
        Some(index) => name.split_at(index),
    }
}

/// Removes whitespace and characters that are invalid in filenames, for
/// values substituted into a template.
pub(crate) fn sanitize_token(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace() && !c.is_control() && !INVALID_CHARS.contains(c)).collect()
}

/// Collapses runs of the same separator and trims separators from both ends,
/// cleaning up after template tokens that rendered empty.
pub(crate) fn collapse_separators(name: &str) -> String {
    let mut collapsed = String::with_capacity(name.len());
    let mut previous = None;
    for c in name.trim().chars() {
        if SEPARATORS.contains(&c) && previous == Some(c) {
            continue;
        }
        collapsed.push(c);
        previous = Some(c);
    }
    collapsed.trim_matches(SEPARATORS).to_string()
}

/// Rejects names that cannot be created as a plain file in a directory.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    if name.chars().any(|c| c.is_control() || INVALID_CHARS.contains(&c)) {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    let device = name.split('.').next().unwrap_or(name);
    if RESERVED_NAMES.iter().any(|reserved| device.eq_ignore_ascii_case(reserved)) {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    Ok(())
}
