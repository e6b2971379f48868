use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::{Error, Result};
use crate::input::open::open_maybe_gz;

#[derive(Debug, Clone)]
pub struct Feature {
    pub id: String,
    pub symbol: String,
    pub feature_type: Option<String>,
}

/// Parses a 10x `features.tsv` (v3: id, symbol, type) or `genes.tsv` (v2: id, symbol).
/// The column count of the first row decides the expected layout.
pub fn parse_features(path: &Path) -> Result<Vec<Feature>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(open_maybe_gz(path)?);

    let mut features = Vec::new();
    let mut layout: Option<usize> = None;
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let (Some(id), Some(symbol)) = (record.get(0), record.get(1)) else {
            return Err(Error::Parse(format!(
                "{}: feature row {} needs an id and a symbol",
                path.display(),
                idx + 1
            )));
        };
        let width = *layout.get_or_insert(record.len());
        if width == 2 && record.len() >= 3 {
            tracing::warn!(
                "{}: row {} carries a feature type but the first row did not",
                path.display(),
                idx + 1
            );
        }
        features.push(Feature {
            id: id.to_string(),
            symbol: symbol.to_string(),
            feature_type: record.get(2).map(str::to_string),
        });
    }

    if features.is_empty() {
        return Err(Error::Parse(format!("{} lists no features", path.display())));
    }
    Ok(features)
}
