use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::{Error, Result};
use crate::input::open::open_maybe_gz;

/// First tab-separated field of every non-blank row.
pub fn parse_names(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(open_maybe_gz(path)?);

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        match record.get(0) {
            Some(name) if !name.is_empty() => names.push(name.to_string()),
            _ => {}
        }
    }
    Ok(names)
}

/// Cell barcodes in file order; an empty file is an error.
pub fn parse_barcodes(path: &Path) -> Result<Vec<String>> {
    let barcodes = parse_names(path)?;
    if barcodes.is_empty() {
        return Err(Error::Parse(format!("{} lists no barcodes", path.display())));
    }
    Ok(barcodes)
}
