use std::path::{Path, PathBuf};

pub mod barcodes;
pub mod features;
pub mod mtx;
pub mod open;
pub mod table;

use barcodes::parse_barcodes;
use features::parse_features;
use mtx::read_mtx;

use crate::adata::{AnnData, Column, CsrMatrix, Matrix};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TenxPaths {
    pub mtx: PathBuf,
    pub features: PathBuf,
    pub barcodes: PathBuf,
}

/// Loads a Cell Ranger matrix directory as cells x genes. Gene symbols become
/// var names (made unique); ids and feature types go to `var`.
pub fn load_tenx(input_dir: &Path) -> Result<AnnData> {
    let paths = find_tenx_paths(input_dir)?;
    tracing::info!(
        "discovered input files: mtx={}, features={}, barcodes={}",
        paths.mtx.display(),
        paths.features.display(),
        paths.barcodes.display()
    );

    let features = parse_features(&paths.features)?;
    let barcodes = parse_barcodes(&paths.barcodes)?;
    let triplets = read_mtx(&paths.mtx)?;
    tracing::debug!(
        "matrix field {:?}, {} stored entries",
        triplets.field,
        triplets.entries.len()
    );

    if triplets.n_rows != features.len() {
        return Err(Error::ShapeMismatch(format!(
            "matrix row count {} does not match features {}",
            triplets.n_rows,
            features.len()
        )));
    }
    if triplets.n_cols != barcodes.len() {
        return Err(Error::ShapeMismatch(format!(
            "matrix column count {} does not match barcodes {}",
            triplets.n_cols,
            barcodes.len()
        )));
    }

    let cells_by_genes = triplets.transposed();
    let x = CsrMatrix::from_triplets(
        cells_by_genes.n_rows,
        cells_by_genes.n_cols,
        &cells_by_genes.entries,
    )?;

    let symbols: Vec<String> = features.iter().map(|f| f.symbol.clone()).collect();
    let mut adata = AnnData::new(Matrix::Sparse(x), barcodes, symbols)?;
    let n_unique = {
        let mut seen = std::collections::HashSet::new();
        adata.var_names.iter().filter(|n| seen.insert(*n)).count()
    };
    if n_unique != adata.n_vars() {
        tracing::warn!(
            "{} duplicate gene symbols; making var names unique",
            adata.n_vars() - n_unique
        );
        adata.make_var_names_unique();
    }

    adata.var.insert(
        "gene_ids",
        Column::Str(features.iter().map(|f| f.id.clone()).collect()),
    )?;
    if features.iter().all(|f| f.feature_type.is_some()) {
        adata.var.insert(
            "feature_types",
            Column::Str(
                features
                    .iter()
                    .map(|f| f.feature_type.clone().unwrap_or_default())
                    .collect(),
            ),
        )?;
    }

    tracing::info!(
        "loaded {} cells x {} genes ({} non-zero)",
        adata.n_obs(),
        adata.n_vars(),
        match &adata.x {
            Matrix::Sparse(m) => m.nnz(),
            Matrix::Dense(m) => m.data.len(),
        }
    );
    Ok(adata)
}

pub fn find_tenx_paths(input_dir: &Path) -> Result<TenxPaths> {
    let prefix = detect_prefix(input_dir)?;
    Ok(TenxPaths {
        mtx: find_first(
            input_dir,
            prefix.as_deref(),
            &["matrix.mtx", "matrix.mtx.gz"],
        )
        .ok_or_else(|| Error::MissingInput("missing matrix.mtx or matrix.mtx.gz".to_string()))?,
        features: find_first(
            input_dir,
            prefix.as_deref(),
            &[
                "features.tsv",
                "features.tsv.gz",
                "genes.tsv",
                "genes.tsv.gz",
            ],
        )
        .ok_or_else(|| {
            Error::MissingInput("missing features.tsv(.gz) or genes.tsv".to_string())
        })?,
        barcodes: find_first(
            input_dir,
            prefix.as_deref(),
            &["barcodes.tsv", "barcodes.tsv.gz"],
        )
        .ok_or_else(|| {
            Error::MissingInput("missing barcodes.tsv or barcodes.tsv.gz".to_string())
        })?,
    })
}

fn find_first(input_dir: &Path, prefix: Option<&str>, candidates: &[&str]) -> Option<PathBuf> {
    for name in candidates {
        let path = input_dir.join(name);
        if path.exists() {
            return Some(path);
        }
        if let Some(p) = prefix {
            let path = input_dir.join(format!("{}_{}", p, name));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Finds a `<prefix>_matrix.mtx`-style prefix; the lexicographically first one wins.
pub fn detect_prefix(input_dir: &Path) -> Result<Option<String>> {
    if !input_dir.is_dir() {
        return Err(Error::MissingInput(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }
    let mut prefixes = std::collections::BTreeSet::new();
    for entry in std::fs::read_dir(input_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        for suffix in [
            "_matrix.mtx",
            "_matrix.mtx.gz",
            "_features.tsv",
            "_features.tsv.gz",
            "_barcodes.tsv",
            "_barcodes.tsv.gz",
        ] {
            if let Some(prefix) = name.strip_suffix(suffix) {
                if !prefix.is_empty() {
                    prefixes.insert(prefix.to_string());
                }
            }
        }
    }
    Ok(prefixes.into_iter().next())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
