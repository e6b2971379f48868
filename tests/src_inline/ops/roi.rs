use super::*;
use crate::adata::{DenseMatrix, Embedding, Matrix};

fn square() -> Polygon {
    Polygon::new(vec![0.0, 4.0, 4.0, 0.0], vec![0.0, 0.0, 4.0, 4.0]).unwrap()
}

fn adata_at(points: &[(f64, f64)]) -> AnnData {
    let n = points.len();
    let mut adata = AnnData::new(
        Matrix::Dense(DenseMatrix::zeros(n, 1)),
        (0..n).map(|i| format!("c{}", i)).collect(),
        vec!["g".to_string()],
    )
    .unwrap();
    let rows: Vec<Vec<f64>> = points.iter().map(|&(x, y)| vec![x, y]).collect();
    adata
        .insert_obsm("spatial", Embedding::from_rows(&rows).unwrap())
        .unwrap();
    adata
}

#[test]
fn test_inside_outside() {
    let sq = square();
    assert!(sq.contains(2.0, 2.0));
    assert!(!sq.contains(5.0, 2.0));
    assert!(!sq.contains(-0.1, 2.0));
    assert!(!sq.contains(2.0, 4.5));
}

#[test]
fn test_concave_polygon() {
    // U shape open at the top between x = 1 and x = 3
    let u = Polygon::new(
        vec![0.0, 4.0, 4.0, 3.0, 3.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 4.0, 4.0, 1.0, 1.0, 4.0, 4.0],
    )
    .unwrap();
    assert!(u.contains(0.5, 3.0));
    assert!(u.contains(3.5, 3.0));
    assert!(!u.contains(2.0, 3.0));
    assert!(u.contains(2.0, 0.5));
}

#[test]
fn test_boundary_is_deterministic() {
    let sq = square();
    for &(x, y) in &[(0.0, 0.0), (4.0, 2.0), (2.0, 0.0), (0.0, 4.0)] {
        let first = sq.contains(x, y);
        for _ in 0..5 {
            assert_eq!(sq.contains(x, y), first);
        }
    }
}

#[test]
fn test_label_bool_and_string() {
    let mut adata = adata_at(&[(1.0, 1.0), (10.0, 10.0), (3.0, 2.0)]);
    let n = label_roi_polygon(&mut adata, &square(), "roi", false).unwrap();
    assert_eq!(n, 2);
    assert_eq!(
        adata.obs.get("roi"),
        Some(&Column::Bool(vec![true, false, true]))
    );

    label_roi_polygon(&mut adata, &square(), "roi_str", true).unwrap();
    assert_eq!(
        adata.obs.str_values("roi_str").unwrap(),
        vec!["True", "False", "True"]
    );
}

#[test]
fn test_invalid_polygons() {
    assert!(Polygon::new(vec![0.0, 1.0], vec![0.0, 1.0]).is_err());
    assert!(Polygon::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0]).is_err());
}
