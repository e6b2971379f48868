//! Distance-threshold tissue segmentation.
//!
//! Labels are propagated in a single pass: observation `i` hands its current
//! label to every observation within the threshold, later pivots overwrite
//! earlier ones. The result depends on index order and is not a transitive
//! closure of the "within threshold" relation; two ends of a chain can end up
//! in different groups when no single pivot reaches both. Cost is O(n^2)
//! distance evaluations with no spatial index.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::adata::embedding::euclidean;
use crate::adata::{AnnData, Column, Embedding, apply_inplace};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// `num_tissues` times the mean distance to the centroid.
    Auto,
    Fixed(f64),
}

impl FromStr for Threshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Threshold::Auto);
        }
        let v: f64 = s.parse().map_err(|_| {
            Error::InvalidArgument(format!("threshold must be 'auto' or a number, got '{s}'"))
        })?;
        if v.is_nan() || v < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "threshold must be non-negative, got {v}"
            )));
        }
        Ok(Threshold::Fixed(v))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Auto => write!(f, "auto"),
            Threshold::Fixed(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmentParams {
    pub threshold: Threshold,
    /// Expected number of tissues; required for `Threshold::Auto`, advisory only.
    pub num_tissues: Option<usize>,
    pub basis: String,
    pub inplace: bool,
    pub verbose: bool,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            threshold: Threshold::Auto,
            num_tissues: None,
            basis: "spatial".to_string(),
            inplace: true,
            verbose: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub column: String,
    pub threshold: f64,
    pub n_tissues: usize,
    pub tissue_sizes: Vec<usize>,
}

/// Mean Euclidean distance of every point to the centroid of all points.
pub fn mean_centroid_distance(coords: &Embedding) -> f64 {
    let n = coords.n_rows();
    if n == 0 {
        return 0.0;
    }
    let dims = coords.n_dims();
    let mut centroid = vec![0.0; dims];
    for r in 0..n {
        for (c, v) in coords.row(r).iter().enumerate() {
            centroid[c] += v;
        }
    }
    for c in centroid.iter_mut() {
        *c /= n as f64;
    }
    (0..n)
        .map(|r| euclidean(coords.row(r), &centroid))
        .sum::<f64>()
        / n as f64
}

/// Numeric threshold for `coords`.
pub fn resolve_threshold(
    coords: &Embedding,
    threshold: Threshold,
    num_tissues: Option<usize>,
) -> Result<f64> {
    match threshold {
        Threshold::Fixed(v) => Ok(v),
        Threshold::Auto => {
            let Some(k) = num_tissues else {
                return Err(Error::InvalidArgument(
                    "num_tissues must be provided when threshold='auto'".to_string(),
                ));
            };
            Ok(k as f64 * mean_centroid_distance(coords))
        }
    }
}

/// Single-pass propagation; returns compact labels `0..k`, ordered by the
/// smallest surviving raw label.
pub fn propagate_labels(coords: &Embedding, threshold: f64, verbose: bool) -> Vec<usize> {
    let n = coords.n_rows();
    let mut labels: Vec<usize> = (0..n).collect();
    let progress_step = (n / 4).max(1);

    for i in 0..n {
        if verbose && i % progress_step == 0 {
            tracing::info!("Processing cell {}/{}", i + 1, n);
        }
        let pivot = coords.row(i);
        let label = labels[i];
        for j in 0..n {
            if euclidean(pivot, coords.row(j)) <= threshold {
                labels[j] = label;
            }
        }
    }

    let mut distinct = labels.clone();
    distinct.sort_unstable();
    distinct.dedup();
    labels
        .iter()
        .map(|l| distinct.binary_search(l).unwrap_or_default())
        .collect()
}

/// String labels `"0".."k-1"` for `coords` at a fixed threshold.
pub fn segment_labels(coords: &Embedding, threshold: f64) -> Vec<String> {
    propagate_labels(coords, threshold, false)
        .into_iter()
        .map(|l| l.to_string())
        .collect()
}

/// Writes a categorical `segment_{threshold}` column to `obs`.
pub fn segment_tissues(adata: &mut AnnData, params: &SegmentParams) -> Result<Option<AnnData>> {
    apply_inplace(adata, params.inplace, |a| {
        segment_in_place(a, params).map(|_| ())
    })
}

/// Same as [`segment_tissues`] on the given container, returning the summary.
pub fn segment_in_place(adata: &mut AnnData, params: &SegmentParams) -> Result<SegmentSummary> {
    let coords = adata.embedding(&params.basis)?;
    let threshold = resolve_threshold(coords, params.threshold, params.num_tissues)?;
    let codes = propagate_labels(coords, threshold, params.verbose);

    let n_tissues = codes.iter().max().map(|m| m + 1).unwrap_or(0);
    let mut tissue_sizes = vec![0usize; n_tissues];
    for &c in &codes {
        tissue_sizes[c] += 1;
    }

    let column = format!("segment_{}", threshold);
    adata.obs.insert(
        column.clone(),
        Column::Categorical {
            codes: codes.iter().map(|&c| c as u32).collect(),
            categories: (0..n_tissues).map(|c| c.to_string()).collect(),
        },
    )?;

    if params.verbose {
        tracing::info!("Segmentation completed using threshold={}", threshold);
        tracing::info!("Number of identified tissues: {}", n_tissues);
        for (label, count) in tissue_sizes.iter().enumerate() {
            tracing::info!("Tissue {}: {} cells", label, count);
        }
    }

    Ok(SegmentSummary {
        column,
        threshold,
        n_tissues,
        tissue_sizes,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/segment.rs"]
mod tests;
