use crate::error::{Error, Result};

/// Observation-aligned array (one row per observation, `n_dims` columns), row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    n_rows: usize,
    n_dims: usize,
    values: Vec<f64>,
}

impl Embedding {
    pub fn new(n_rows: usize, n_dims: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != n_rows * n_dims {
            return Err(Error::ShapeMismatch(format!(
                "embedding has {} values, expected {}x{}",
                values.len(),
                n_rows,
                n_dims
            )));
        }
        Ok(Self {
            n_rows,
            n_dims,
            values,
        })
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_dims = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * n_dims);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != n_dims {
                return Err(Error::ShapeMismatch(format!(
                    "embedding row {} has {} dims, expected {}",
                    idx,
                    row.len(),
                    n_dims
                )));
            }
            values.extend_from_slice(row);
        }
        Self::new(rows.len(), n_dims, values)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.n_dims..(row + 1) * self.n_dims]
    }

    pub fn column(&self, dim: usize) -> Vec<f64> {
        (0..self.n_rows)
            .map(|r| self.values[r * self.n_dims + dim])
            .collect()
    }

    /// Population variance (ddof = 0) of every dimension, in stored order.
    pub fn dim_variances(&self) -> Vec<f64> {
        (0..self.n_dims)
            .map(|d| population_variance(&self.column(d)))
            .collect()
    }

    /// Reorders dimensions so that new dimension `i` is old dimension `order[i]`.
    pub fn permute_dims(&mut self, order: &[usize]) -> Result<()> {
        let mut seen = vec![false; self.n_dims];
        if order.len() != self.n_dims {
            return Err(Error::InvalidArgument(format!(
                "permutation has {} entries, embedding has {} dims",
                order.len(),
                self.n_dims
            )));
        }
        for &d in order {
            if d >= self.n_dims || seen[d] {
                return Err(Error::InvalidArgument(
                    "dimension order is not a permutation".to_string(),
                ));
            }
            seen[d] = true;
        }

        let mut values = Vec::with_capacity(self.values.len());
        for r in 0..self.n_rows {
            let row = self.row(r);
            for &d in order {
                values.push(row[d]);
            }
        }
        self.values = values;
        Ok(())
    }

    pub fn select_rows(&self, rows: &[usize]) -> Embedding {
        let mut values = Vec::with_capacity(rows.len() * self.n_dims);
        for &r in rows {
            values.extend_from_slice(self.row(r));
        }
        Embedding {
            n_rows: rows.len(),
            n_dims: self.n_dims,
            values,
        }
    }
}

pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
