use crate::adata::{AnnData, Column};
use crate::error::{Error, Result};

/// Closed polygon given by its vertices; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Polygon {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::InvalidArgument(format!(
                "polygon has {} x and {} y values",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 3 {
            return Err(Error::InvalidArgument(
                "polygon needs at least 3 vertices".to_string(),
            ));
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Even-odd crossing test. Edges are half-open in y, so points on the
    /// boundary get the same answer every call.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let n = self.x.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.x[i], self.y[i]);
            let (xj, yj) = (self.x[j], self.y[j]);
            if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Writes `obs[column]`: whether each observation's first two `spatial`
/// coordinates fall inside `polygon`. `as_string` stores `"True"`/`"False"`.
pub fn label_roi_polygon(
    adata: &mut AnnData,
    polygon: &Polygon,
    column: &str,
    as_string: bool,
) -> Result<usize> {
    let coords = adata.embedding("spatial")?;
    if coords.n_dims() < 2 {
        return Err(Error::ShapeMismatch(format!(
            "spatial coordinates have {} dims, need 2",
            coords.n_dims()
        )));
    }
    let mask: Vec<bool> = (0..coords.n_rows())
        .map(|r| {
            let p = coords.row(r);
            polygon.contains(p[0], p[1])
        })
        .collect();
    let n_inside = mask.iter().filter(|&&m| m).count();

    let values = if as_string {
        Column::Str(
            mask.iter()
                .map(|&m| if m { "True" } else { "False" }.to_string())
                .collect(),
        )
    } else {
        Column::Bool(mask)
    };
    adata.obs.insert(column, values)?;
    tracing::debug!("{} of {} observations inside ROI", n_inside, adata.n_obs());
    Ok(n_inside)
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/roi.rs"]
mod tests;
