pub mod json;
pub mod markdown;
pub mod rejects_csv;

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Create the parent directory of an output path if it does not exist yet.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
