use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::RejectRecord;
use crate::error::Result;
use crate::export::ensure_parent_dir;
use crate::observability::metrics;

/// Write the reject ledger as a flat CSV audit table.
///
/// Columns are `source_site,source_url,reason`. Nothing is written when there
/// are no rejects.
pub fn write_rejects(rejects: &[RejectRecord], path: &Path) -> Result<()> {
    if rejects.is_empty() {
        return Ok(());
    }

    let mut lines = vec!["source_site,source_url,reason".to_string()];
    for reject in rejects {
        lines.push(format!(
            "{},{},{}",
            csv_field(&reject.source_site.to_string()),
            csv_field(&reject.source_url),
            csv_field(&reject.reason),
        ));
    }

    ensure_parent_dir(path)?;
    fs::write(path, lines.join("\n") + "\n")?;
    metrics::export::write_success();
    info!(count = rejects.len(), path = %path.display(), "wrote reject ledger");
    Ok(())
}

/// Quote a field only when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
