//! Spatial neighbor counts and removal of isolated observations.

use crate::adata::embedding::euclidean;
use crate::adata::{AnnData, Column};
use crate::error::{Error, Result};

fn check_radius(radius: f64) -> Result<()> {
    if radius.is_nan() || radius < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "radius must be non-negative, got {radius}"
        )));
    }
    Ok(())
}

/// Per observation, how many observations (itself included) lie strictly
/// closer than `radius` in `obsm[basis]`. Stored as `obs["{basis}_neighbors_{radius}"]`.
pub fn count_spatial_neighbors(adata: &mut AnnData, basis: &str, radius: f64) -> Result<Vec<usize>> {
    check_radius(radius)?;
    let coords = adata.embedding(basis)?;
    let n = coords.n_rows();
    let counts: Vec<usize> = (0..n)
        .map(|i| {
            let p = coords.row(i);
            (0..n)
                .filter(|&j| euclidean(p, coords.row(j)) < radius)
                .count()
        })
        .collect();
    adata.obs.insert(
        format!("{}_neighbors_{}", basis, radius),
        Column::Int(counts.iter().map(|&c| c as i64).collect()),
    )?;
    Ok(counts)
}

/// Drops observations with at most `min_neighbors` neighbors within `radius`.
/// Returns the number removed.
pub fn filter_spatial_singlets(
    adata: &mut AnnData,
    basis: &str,
    radius: f64,
    min_neighbors: usize,
) -> Result<usize> {
    let counts = count_spatial_neighbors(adata, basis, radius)?;
    let keep: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > min_neighbors)
        .map(|(idx, _)| idx)
        .collect();
    let removed = counts.len() - keep.len();
    if removed > 0 {
        adata.subset_obs(&keep);
    }
    tracing::info!(
        "removed {} of {} observations with <= {} neighbors within {}",
        removed,
        counts.len(),
        min_neighbors,
        radius
    );
    Ok(removed)
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/neighbors.rs"]
mod tests;
