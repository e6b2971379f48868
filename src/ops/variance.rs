use crate::adata::AnnData;

/// Number of leading dimensions of `reduction` (in stored order) whose
/// cumulative variance reaches `var_perc` of the total, capped at `k - 1`.
/// Returns `None` when the reduction is absent.
pub fn npcs(adata: &AnnData, var_perc: f64, reduction: &str) -> Option<usize> {
    let Some(emb) = adata.obsm.get(reduction) else {
        tracing::warn!("Reduction '{}', not found!", reduction);
        return None;
    };
    Some(coverage_count(&emb.dim_variances(), var_perc))
}

pub fn coverage_count(variances: &[f64], var_perc: f64) -> usize {
    let cut = var_perc * variances.iter().sum::<f64>();
    let cap = variances.len().saturating_sub(1);
    let mut n = 0usize;
    let mut acc = 0.0;
    while acc < cut && n < cap {
        acc += variances[n];
        n += 1;
    }
    n
}

/// Reorders the dimensions of `reduction` by decreasing variance, in place.
/// Ties keep their stored order. Returns `false` when the reduction is absent.
pub fn reorder_reduction(adata: &mut AnnData, reduction: &str, verbose: bool) -> bool {
    let Some(emb) = adata.obsm.get_mut(reduction) else {
        tracing::warn!("The reduction '{}' was not found...", reduction);
        return false;
    };
    let variances = emb.dim_variances();
    if verbose {
        tracing::info!("Reduction variance by dimension: {:?}", variances);
    }

    let mut order: Vec<usize> = (0..variances.len()).collect();
    order.sort_by(|&a, &b| variances[b].total_cmp(&variances[a]));
    if let Err(err) = emb.permute_dims(&order) {
        tracing::error!("could not reorder '{}': {}", reduction, err);
        return false;
    }
    true
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/variance.rs"]
mod tests;
