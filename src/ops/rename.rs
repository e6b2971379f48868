use std::collections::{HashMap, HashSet};

use crate::adata::{AnnData, Column, Frame, apply_inplace};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ConvertParams {
    pub from_col: String,
    pub to_col: String,
    pub inplace: bool,
    pub verbose: bool,
}

impl Default for ConvertParams {
    fn default() -> Self {
        Self {
            from_col: "GENEID".to_string(),
            to_col: "GeneSymbol".to_string(),
            inplace: true,
            verbose: true,
        }
    }
}

/// Renames features through `table[from_col] -> table[to_col]`. Features
/// without a (non-empty) mapping are dropped; resulting names are made unique.
/// When a key repeats in the table its last row wins.
pub fn convert_feature_names(
    adata: &mut AnnData,
    table: &Frame,
    params: &ConvertParams,
) -> Result<Option<AnnData>> {
    for col in [&params.from_col, &params.to_col] {
        if !table.contains(col) {
            return Err(Error::InvalidArgument(format!(
                "Column {col} not found in lookup table"
            )));
        }
    }
    let keys = table.str_values(&params.from_col)?;
    let values = table.str_values(&params.to_col)?;

    apply_inplace(adata, params.inplace, |a| {
        if params.verbose {
            let present: HashSet<&str> = a.var_names.iter().map(String::as_str).collect();
            let found = keys.iter().filter(|k| present.contains(k.as_str())).count();
            tracing::info!(
                "Fraction of var names found in table[{}]: {} out of {}",
                params.from_col,
                found,
                a.n_vars()
            );
        }

        let mapping: HashMap<&str, &str> = keys
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(String::as_str))
            .collect();

        let mapped: Vec<Option<String>> = a
            .var_names
            .iter()
            .map(|name| {
                mapping
                    .get(name.as_str())
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string())
            })
            .collect();

        a.var
            .insert(params.from_col.clone(), Column::Str(a.var_names.clone()))?;
        a.var.insert(
            params.to_col.clone(),
            Column::Str(mapped.iter().map(|m| m.clone().unwrap_or_default()).collect()),
        )?;

        let keep: Vec<usize> = mapped
            .iter()
            .enumerate()
            .filter_map(|(idx, m)| m.as_ref().map(|_| idx))
            .collect();
        let dropped = a.n_vars() - keep.len();
        a.subset_vars(&keep);
        a.var_names = keep
            .iter()
            .filter_map(|&idx| mapped[idx].clone())
            .collect();
        a.make_var_names_unique();

        if params.verbose && dropped > 0 {
            tracing::info!("dropped {} features without a mapping", dropped);
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/rename.rs"]
mod tests;
