use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::adata::{AnnData, RankGenesGroups, UnsValue};
use crate::error::{Error, Result};

/// How long-form group blocks are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcatAxis {
    /// One block per group, stacked under a single header.
    #[default]
    Vertical,
    /// Group blocks side by side, rows aligned by rank.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DgeaLayout {
    Long { axis: ConcatAxis },
    Wide,
}

impl Default for DgeaLayout {
    fn default() -> Self {
        DgeaLayout::Long {
            axis: ConcatAxis::Vertical,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DgeaExport {
    pub key: String,
    pub n_features: usize,
    pub path: PathBuf,
    pub layout: DgeaLayout,
}

impl Default for DgeaExport {
    fn default() -> Self {
        Self {
            key: "rank_genes_groups".to_string(),
            n_features: 100,
            path: PathBuf::from("dgea.csv"),
            layout: DgeaLayout::default(),
        }
    }
}

const LONG_COLUMNS: [&str; 6] = [
    "names",
    "scores",
    "logfoldchanges",
    "pvals",
    "pvals_adj",
    "celltypes",
];

pub fn rank_genes_groups<'a>(adata: &'a AnnData, key: &str) -> Result<&'a RankGenesGroups> {
    match adata.uns.get(key) {
        Some(UnsValue::RankGenesGroups(r)) => Ok(r),
        None => Err(Error::MissingKey(format!("uns['{key}']"))),
    }
}

/// Writes the top `n_features` ranks of every group to a CSV file.
pub fn export_dgea(adata: &AnnData, export: &DgeaExport) -> Result<()> {
    let result = rank_genes_groups(adata, &export.key)?;
    result.validate()?;
    let rows = dgea_rows(result, export.n_features, export.layout);
    write_rows(&export.path, &rows)?;
    tracing::info!(
        "wrote {} rows for {} groups to {}",
        rows.len().saturating_sub(1),
        result.groups.len(),
        export.path.display()
    );
    Ok(())
}

/// Header plus data rows for the requested layout.
pub fn dgea_rows(result: &RankGenesGroups, n_features: usize, layout: DgeaLayout) -> Vec<Vec<String>> {
    match layout {
        DgeaLayout::Long {
            axis: ConcatAxis::Vertical,
        } => {
            let mut rows = vec![LONG_COLUMNS.iter().map(|s| s.to_string()).collect()];
            for g in 0..result.groups.len() {
                for rank in 0..n_features.min(result.group_len(g)) {
                    rows.push(long_cells(result, g, rank));
                }
            }
            rows
        }
        DgeaLayout::Long {
            axis: ConcatAxis::Horizontal,
        } => {
            let n_groups = result.groups.len();
            let mut header = Vec::with_capacity(n_groups * LONG_COLUMNS.len());
            for _ in 0..n_groups {
                header.extend(LONG_COLUMNS.iter().map(|s| s.to_string()));
            }
            let mut rows = vec![header];
            for rank in 0..block_height(result, n_features) {
                let mut row = Vec::with_capacity(n_groups * LONG_COLUMNS.len());
                for g in 0..n_groups {
                    if rank < result.group_len(g) {
                        row.extend(long_cells(result, g, rank));
                    } else {
                        row.extend(std::iter::repeat_n(String::new(), LONG_COLUMNS.len()));
                    }
                }
                rows.push(row);
            }
            rows
        }
        DgeaLayout::Wide => {
            let mut header = Vec::with_capacity(result.groups.len() * 3);
            for group in &result.groups {
                header.push(format!("{group}_name"));
                header.push(format!("{group}_logfoldchange"));
                header.push(format!("{group}_pval"));
            }
            let mut rows = vec![header];
            for rank in 0..block_height(result, n_features) {
                let mut row = Vec::with_capacity(result.groups.len() * 3);
                for g in 0..result.groups.len() {
                    if rank < result.group_len(g) {
                        row.push(result.names[g][rank].clone());
                        row.push(format_float(result.logfoldchanges[g][rank]));
                        row.push(format_float(result.pvals[g][rank]));
                    } else {
                        row.extend(std::iter::repeat_n(String::new(), 3));
                    }
                }
                rows.push(row);
            }
            rows
        }
    }
}

fn block_height(result: &RankGenesGroups, n_features: usize) -> usize {
    (0..result.groups.len())
        .map(|g| result.group_len(g))
        .max()
        .unwrap_or(0)
        .min(n_features)
}

fn long_cells(result: &RankGenesGroups, g: usize, rank: usize) -> Vec<String> {
    vec![
        result.names[g][rank].clone(),
        format_float(result.scores[g][rank]),
        format_float(result.logfoldchanges[g][rank]),
        format_float(result.pvals[g][rank]),
        format_float(result.pvals_adj[g][rank]),
        result.groups[g].clone(),
    ]
}

fn format_float(v: f64) -> String {
    if v.is_nan() { String::new() } else { v.to_string() }
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/dgea.rs"]
mod tests;
