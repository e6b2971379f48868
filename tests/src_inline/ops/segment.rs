use super::*;
use crate::adata::{DenseMatrix, Matrix};

fn coords(points: &[(f64, f64)]) -> Embedding {
    Embedding::from_rows(&points.iter().map(|&(x, y)| vec![x, y]).collect::<Vec<_>>()).unwrap()
}

fn adata_with(points: &[(f64, f64)]) -> AnnData {
    let n = points.len();
    let mut adata = AnnData::new(
        Matrix::Dense(DenseMatrix::zeros(n, 1)),
        (0..n).map(|i| format!("cell{}", i)).collect(),
        vec!["g".to_string()],
    )
    .unwrap();
    adata.insert_obsm("spatial", coords(points)).unwrap();
    adata
}

fn quiet(threshold: Threshold) -> SegmentParams {
    SegmentParams {
        threshold,
        verbose: false,
        ..SegmentParams::default()
    }
}

#[test]
fn test_two_clusters_example() {
    let mut adata = adata_with(&[(0.0, 0.0), (1.0, 0.0), (10.0, 10.0), (11.0, 10.0)]);
    let summary = segment_in_place(&mut adata, &quiet(Threshold::Fixed(2.0))).unwrap();
    assert_eq!(summary.column, "segment_2");
    assert_eq!(summary.n_tissues, 2);
    assert_eq!(summary.tissue_sizes, vec![2, 2]);

    let labels = adata.obs.str_values("segment_2").unwrap();
    assert_eq!(labels, vec!["0", "0", "1", "1"]);
}

#[test]
fn test_zero_threshold_distinct_points() {
    let c = coords(&[(0.0, 0.0), (0.5, 0.0), (3.0, 1.0)]);
    assert_eq!(segment_labels(&c, 0.0), vec!["0", "1", "2"]);
}

#[test]
fn test_infinite_threshold_collapses() {
    let c = coords(&[(0.0, 0.0), (100.0, 0.0), (-50.0, 3.0), (7.0, 7.0)]);
    let labels = segment_labels(&c, f64::INFINITY);
    assert!(labels.iter().all(|l| l == "0"));
}

#[test]
fn test_labels_are_contiguous_from_zero() {
    let pts: Vec<(f64, f64)> = (0..12)
        .map(|i| ((i % 4) as f64 * 5.0, (i / 4) as f64 * 0.7))
        .collect();
    let codes = propagate_labels(&coords(&pts), 1.0, false);
    assert_eq!(codes.len(), pts.len());
    let max = *codes.iter().max().unwrap();
    for k in 0..=max {
        assert!(codes.contains(&k));
    }
}

#[test]
fn test_chain_is_order_dependent() {
    // 0 - 1 - 2 spaced 1 apart: pivot 1 reaches both ends, so all share a label.
    let c = coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    assert_eq!(segment_labels(&c, 1.0), vec!["0", "0", "0"]);

    // Same points with the middle one visited last: it still reaches both ends.
    let c = coords(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)]);
    assert_eq!(segment_labels(&c, 1.0), vec!["0", "0", "0"]);

    // Points 0 and 1 are within the threshold, yet the last pivot (x = 2)
    // relabels point 1 without reaching point 0, splitting them.
    let c = coords(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (2.0, 0.0)]);
    let labels = segment_labels(&c, 1.0);
    assert_eq!(labels, vec!["0", "1", "1", "1"]);
}

#[test]
fn test_auto_threshold_requires_count() {
    let mut adata = adata_with(&[(0.0, 0.0), (1.0, 0.0)]);
    let err = segment_in_place(&mut adata, &quiet(Threshold::Auto)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_auto_threshold_value() {
    let c = coords(&[(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)]);
    assert!((mean_centroid_distance(&c) - 1.0).abs() < 1e-12);
    let t = resolve_threshold(&c, Threshold::Auto, Some(3)).unwrap();
    assert!((t - 3.0).abs() < 1e-12);
}

#[test]
fn test_copy_mode_leaves_input() {
    let mut adata = adata_with(&[(0.0, 0.0), (5.0, 5.0)]);
    let params = SegmentParams {
        inplace: false,
        ..quiet(Threshold::Fixed(1.5))
    };
    let copy = segment_tissues(&mut adata, &params).unwrap().unwrap();
    assert!(copy.obs.contains("segment_1.5"));
    assert_eq!(adata.obs.n_cols(), 0);
}

#[test]
fn test_missing_basis() {
    let mut adata = adata_with(&[(0.0, 0.0)]);
    let params = SegmentParams {
        basis: "umap".to_string(),
        ..quiet(Threshold::Fixed(1.0))
    };
    assert!(matches!(
        segment_in_place(&mut adata, &params),
        Err(Error::MissingKey(_))
    ));
}

#[test]
fn test_threshold_parsing() {
    assert_eq!("auto".parse::<Threshold>().unwrap(), Threshold::Auto);
    assert_eq!("2.5".parse::<Threshold>().unwrap(), Threshold::Fixed(2.5));
    assert!("-1".parse::<Threshold>().is_err());
    assert!("wide".parse::<Threshold>().is_err());
}

#[test]
fn test_determinism() {
    let pts: Vec<(f64, f64)> = (0..20)
        .map(|i| (((i * 7) % 11) as f64, ((i * 3) % 5) as f64))
        .collect();
    let c = coords(&pts);
    assert_eq!(segment_labels(&c, 1.5), segment_labels(&c, 1.5));
}

#[test]
fn test_three_dimensional_coordinates() {
    let c = Embedding::from_rows(&[
        vec![0.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![5.0, 5.0, 5.0],
        vec![5.0, 5.0, 6.0],
    ])
    .unwrap();
    assert_eq!(segment_labels(&c, 1.5), vec!["0", "0", "1", "1"]);
    // close in x and y, far apart in z
    let c = Embedding::from_rows(&[vec![0.0, 0.0, 0.0], vec![0.0, 0.0, 10.0]]).unwrap();
    assert_eq!(segment_labels(&c, 1.5), vec!["0", "1"]);
}
