use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::adata::AnnData;
use crate::error::{Error, Result};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes `obs` as a TSV with a leading `barcode` column. `columns` picks and
/// orders the obs columns; `None` writes all of them.
pub fn write_obs_tsv(path: &Path, adata: &AnnData, columns: Option<&[&str]>) -> Result<()> {
    let selected: Vec<&str> = match columns {
        Some(names) => {
            for name in names {
                if !adata.obs.contains(name) {
                    return Err(Error::MissingKey(format!("obs column '{name}'")));
                }
            }
            names.to_vec()
        }
        None => adata.obs.names().collect(),
    };

    ensure_parent(path)?;
    let mut w = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(File::create(path)?));

    let mut header = Vec::with_capacity(selected.len() + 1);
    header.push("barcode");
    header.extend(selected.iter().copied());
    w.write_record(&header)?;

    let cols: Vec<_> = selected
        .iter()
        .filter_map(|name| adata.obs.get(name))
        .collect();
    let mut record = Vec::with_capacity(cols.len() + 1);
    for (row, name) in adata.obs_names.iter().enumerate() {
        record.clear();
        record.push(name.clone());
        record.extend(cols.iter().map(|c| c.value_string(row)));
        w.write_record(&record)?;
    }
    w.flush()?;
    tracing::debug!("wrote {} rows to {}", adata.n_obs(), path.display());
    Ok(())
}

/// `dir/name.tsv` -> `dir/name.summary.json`.
pub fn summary_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    out.with_file_name(format!("{stem}.summary.json"))
}

pub fn write_summary_json<T: Serialize>(path: &Path, summary: &T) -> Result<()> {
    ensure_parent(path)?;
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, summary)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
