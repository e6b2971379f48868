use crate::adata::AnnData;

/// Names of the `n` features with the largest total expression, highest first.
/// Ties keep var order; `n` past the feature count returns them all.
pub fn top_n_genes(adata: &AnnData, n: usize) -> Vec<String> {
    let totals = adata.x.col_sums();
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]));
    order
        .into_iter()
        .take(n)
        .map(|idx| adata.var_names[idx].clone())
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/top_genes.rs"]
mod tests;
