use std::collections::HashMap;
use std::path::PathBuf;

use crate::adata::{AnnData, CsrMatrix, Matrix, apply_inplace};
use crate::error::{Error, Result};
use crate::input::mtx::read_mtx;

/// A MatrixMarket file in 10x orientation: rows are features named by
/// `row_names`, columns are observations named by `col_names`.
#[derive(Debug, Clone)]
pub struct LayerImport {
    pub path: PathBuf,
    pub row_names: Vec<String>,
    pub col_names: Vec<String>,
    pub layer_name: String,
    /// Keep only observations present in both; otherwise keep every existing
    /// observation and leave the ones missing from the file at zero.
    pub intersect: bool,
}

/// Installs the file as `layers[layer_name]`, aligned to the container's
/// observations and features by name.
pub fn add_mtx_as_layer(
    adata: &mut AnnData,
    import: &LayerImport,
    inplace: bool,
) -> Result<Option<AnnData>> {
    let triplets = read_mtx(&import.path)?;
    if triplets.n_rows != import.row_names.len() || triplets.n_cols != import.col_names.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} is {}x{} but got {} row names and {} column names",
            import.path.display(),
            triplets.n_rows,
            triplets.n_cols,
            import.row_names.len(),
            import.col_names.len()
        )));
    }

    apply_inplace(adata, inplace, |a| {
        let mut file_obs: HashMap<&str, usize> = HashMap::with_capacity(import.col_names.len());
        for (idx, name) in import.col_names.iter().enumerate() {
            file_obs.entry(name.as_str()).or_insert(idx);
        }

        if import.intersect {
            let keep: Vec<usize> = a
                .obs_names
                .iter()
                .enumerate()
                .filter(|(_, name)| file_obs.contains_key(name.as_str()))
                .map(|(idx, _)| idx)
                .collect();
            if keep.len() < a.n_obs() {
                tracing::info!(
                    "keeping {} of {} observations shared with {}",
                    keep.len(),
                    a.n_obs(),
                    import.path.display()
                );
                a.subset_obs(&keep);
            }
        } else {
            let absent = a
                .obs_names
                .iter()
                .filter(|name| !file_obs.contains_key(name.as_str()))
                .count();
            if absent > 0 {
                tracing::warn!(
                    "{} observations are absent from {}; their layer rows stay zero",
                    absent,
                    import.path.display()
                );
            }
        }

        let var_index = a.var_index();
        let feature_to_var: Vec<Option<usize>> = import
            .row_names
            .iter()
            .map(|name| var_index.get(name.as_str()).copied())
            .collect();
        let unmatched = feature_to_var.iter().filter(|v| v.is_none()).count();
        if unmatched > 0 {
            tracing::warn!(
                "{} features in {} are not in var names and were skipped",
                unmatched,
                import.path.display()
            );
        }

        let obs_index = a.obs_index();
        let col_to_obs: Vec<Option<usize>> = import
            .col_names
            .iter()
            .map(|name| obs_index.get(name.as_str()).copied())
            .collect();

        let mut entries = Vec::with_capacity(triplets.entries.len());
        for &(feature, col, value) in &triplets.entries {
            if let (Some(var), Some(obs)) = (feature_to_var[feature], col_to_obs[col]) {
                entries.push((obs, var, value));
            }
        }
        let layer = CsrMatrix::from_triplets(a.n_obs(), a.n_vars(), &entries)?;
        tracing::debug!(
            "layer '{}' holds {} non-zero values",
            import.layer_name,
            layer.nnz()
        );
        a.insert_layer(import.layer_name.clone(), Matrix::Sparse(layer))
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/layers.rs"]
mod tests;
