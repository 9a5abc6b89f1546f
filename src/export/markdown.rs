use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::ListingRecord;
use crate::error::Result;
use crate::export::ensure_parent_dir;
use crate::observability::metrics;

/// Write the daily results report.
///
/// Leads with a "New Today" section containing records whose `source_url` was
/// absent from the previous run's accepted set, followed by the full table in
/// pipeline (price-sorted) order.
pub fn write_markdown(
    records: &[ListingRecord],
    path: &Path,
    previous_urls: &HashSet<String>,
) -> Result<()> {
    let mut out: Vec<String> = Vec::new();
    out.push("# Daily Results\n".to_string());

    let new_records: Vec<&ListingRecord> = records
        .iter()
        .filter(|r| !r.source_url.is_empty() && !previous_urls.contains(&r.source_url))
        .collect();
    if !new_records.is_empty() {
        out.push("## New Today\n".to_string());
        for record in &new_records {
            out.push(format!(
                "- **{}** — {} — {} — [{}]({})",
                record.name,
                format_price(record.price),
                record.reason_for_sale,
                record.source_site,
                best_url(record),
            ));
        }
        out.push("\n".to_string());
    }

    out.push("## All (sorted by price)\n".to_string());
    out.push("| Name | Price | Multiple | Reason | URL |".to_string());
    out.push("|---|---:|---:|---|---|".to_string());
    for record in records {
        out.push(format!(
            "| {} | {} | {} | {} | [link]({}) |",
            record.name,
            format_price(record.price),
            format_multiple(record.earnings_multiple),
            record.reason_for_sale,
            best_url(record),
        ));
    }

    ensure_parent_dir(path)?;
    fs::write(path, out.join("\n") + "\n")?;
    metrics::export::write_success();
    info!(
        total = records.len(),
        new = new_records.len(),
        path = %path.display(),
        "wrote markdown report"
    );
    Ok(())
}

fn best_url(record: &ListingRecord) -> &str {
    record.final_url.as_deref().unwrap_or(&record.source_url)
}

/// `$1,250,000` style, cents only when present.
fn format_price(price: Option<f64>) -> String {
    let price = match price {
        Some(price) => price,
        None => return String::new(),
    };
    let whole = price.trunc() as i64;
    let cents = ((price - price.trunc()) * 100.0).round() as i64;

    let mut grouped = String::new();
    for (index, digit) in whole.to_string().chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let grouped: String = grouped.chars().rev().collect();

    if cents > 0 {
        format!("${}.{:02}", grouped, cents)
    } else {
        format!("${}", grouped)
    }
}

fn format_multiple(multiple: Option<f64>) -> String {
    multiple.map(|m| format!("{:.2}", m)).unwrap_or_default()
}
