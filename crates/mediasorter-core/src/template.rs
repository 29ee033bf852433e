use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

pub const DEFAULT_FORMAT: &str = "%Y/%B/%Y_%m_%d";

fn parse_items(format: &str) -> anyhow::Result<Vec<Item<'_>>> {
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        bail!("invalid date specifier in format {:?}", format);
    }
    Ok(items)
}

/// Expand the strftime-style template against a timestamp.
pub fn format_timestamp(format: &str, timestamp: &NaiveDateTime) -> anyhow::Result<String> {
    let items = parse_items(format)?;
    let mut out = String::new();
    // timezone specifiers have nothing to print for a naive timestamp
    write!(out, "{}", timestamp.format_with_items(items.iter()))
        .map_err(|_| anyhow!("format {:?} needs a timezone, which media dates do not carry", format))?;
    Ok(out)
}

/// Split a formatted string into directory names. `/` wins over `\`;
/// empty names between separators are dropped.
pub fn split_segments(formatted: &str) -> Vec<&str> {
    let separator = if formatted.contains('/') {
        '/'
    } else if formatted.contains('\\') {
        '\\'
    } else {
        return vec![formatted];
    };
    formatted.split(separator).filter(|s| !s.is_empty()).collect()
}

/// Destination directory for a timestamp, rooted under `target` when given.
pub fn build_path(
    format: &str,
    timestamp: &NaiveDateTime,
    target: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let formatted = format_timestamp(format, timestamp)?;
    let segments = split_segments(&formatted);

    if segments.iter().all(|s| s.is_empty()) {
        bail!("format {:?} produces an empty directory name", format);
    }
    if segments.iter().any(|s| *s == "..") {
        bail!("format {:?} produces a parent directory reference", format);
    }

    let mut path = target.map(Path::to_path_buf).unwrap_or_default();
    for segment in segments {
        path.push(segment);
    }
    Ok(path)
}

/// Reject a template before any file is touched.
pub fn validate_template(format: &str) -> anyhow::Result<()> {
    if format.is_empty() {
        bail!("format must not be empty");
    }
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("invalid sample date"))?;
    build_path(format, &sample, None).map(|_| ())
}
