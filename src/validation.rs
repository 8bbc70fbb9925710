use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Check whether `s` is a hex colour: optional `#`, then 3, 4, 6 or 8 hex digits
pub fn is_valid_hex_colour(s: &str) -> bool {
    let digits = s.strip_prefix('#').unwrap_or(s);
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalise a background colour for the transform command
pub fn validate_background(value: &str) -> Result<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        bail!("transform: empty transformation type passed");
    }
    if value == "white" || value == "black" || is_valid_hex_colour(&value) {
        return Ok(value);
    }
    bail!("background colour: invalid hex value {:?}", value)
}

/// Make sure results can be saved before spending a compression on them
///
/// Returns the directory that was checked.
pub fn validate_output_path(path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("cannot determine current directory")?,
    };

    tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("cannot save to {:?}", path))?;

    Ok(dir)
}

/// Treat inputs containing a scheme separator as remote URLs
pub fn is_remote_url(input: &str) -> bool {
    input.contains("://")
}
