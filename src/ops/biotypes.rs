use std::collections::HashSet;

use crate::adata::{AnnData, Column, Frame};
use crate::error::{Error, Result};

/// Where per-biotype percentages are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddAs {
    #[default]
    Obs,
    /// Accepted but not implemented; the container is left unchanged.
    Var,
}

#[derive(Debug, Clone)]
pub struct BiotypeParams {
    pub gene_col: String,
    pub biotype_col: String,
    pub add_as: AddAs,
    pub prefix: String,
    /// 100 for percentages, 1 for fractions. Other values fall back to 100.
    pub scale: u32,
    pub verbose: bool,
}

impl Default for BiotypeParams {
    fn default() -> Self {
        Self {
            gene_col: "GeneSymbol".to_string(),
            biotype_col: "Biotype".to_string(),
            add_as: AddAs::Obs,
            prefix: "pct.".to_string(),
            scale: 100,
            verbose: true,
        }
    }
}

/// Adds `obs[prefix + biotype]` with each cell's share of total expression
/// coming from genes of that biotype. Returns the columns written.
pub fn add_biotypes_pct(
    adata: &mut AnnData,
    biomart: Option<&Frame>,
    params: &BiotypeParams,
) -> Result<Vec<String>> {
    let Some(biomart) = biomart else {
        if params.verbose {
            tracing::warn!("Need a list of gene biotypes! Nothing done.");
        }
        return Ok(Vec::new());
    };
    if params.add_as == AddAs::Var {
        if params.verbose {
            tracing::warn!("add_as='var' is not yet implemented");
        }
        return Ok(Vec::new());
    }
    for col in [&params.gene_col, &params.biotype_col] {
        if !biomart.contains(col) {
            return Err(Error::InvalidArgument(format!(
                "column '{col}' not found in biotype table"
            )));
        }
    }

    let scale = match params.scale {
        1 => 1.0,
        100 => 100.0,
        other => {
            if params.verbose {
                tracing::warn!("Given scale {} was not found. Scaling to 100...", other);
            }
            100.0
        }
    };
    if params.verbose {
        tracing::info!("Adding gene biotype percentage values as obs ...");
    }

    let genes = biomart.str_values(&params.gene_col)?;
    let biotypes = biomart.str_values(&params.biotype_col)?;
    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for b in &biotypes {
        if seen.insert(b.as_str()) {
            order.push(b.as_str());
        }
    }

    let var_index = adata.var_index();
    let totals = adata.x.row_sums();
    let mut written = Vec::new();

    for biotype in order {
        let mut mask = vec![false; adata.n_vars()];
        let mut n_found = 0usize;
        for (gene, b) in genes.iter().zip(&biotypes) {
            if b != biotype {
                continue;
            }
            if let Some(&idx) = var_index.get(gene.as_str()) {
                if !mask[idx] {
                    mask[idx] = true;
                    n_found += 1;
                }
            }
        }
        if n_found == 0 {
            if params.verbose {
                tracing::info!("  No {} genes found...", biotype);
            }
            continue;
        }

        let sums = adata.x.row_sums_masked(&mask);
        let values: Vec<f64> = sums
            .iter()
            .zip(&totals)
            .map(|(&part, &total)| if total > 0.0 { scale * part / total } else { 0.0 })
            .collect();
        written.push((format!("{}{}", params.prefix, biotype), values));
    }

    for (name, values) in &written {
        adata.obs.insert(name.clone(), Column::Float(values.clone()))?;
    }
    Ok(written.into_iter().map(|(name, _)| name).collect())
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/biotypes.rs"]
mod tests;
