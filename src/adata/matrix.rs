use crate::error::{Error, Result};

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    pub n_rows: usize,
    pub n_cols: usize,
    pub data: Vec<f64>,
}

impl DenseMatrix {
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0.0; n_rows * n_cols],
        }
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(Error::ShapeMismatch(format!(
                    "row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    n_cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n_cols..(row + 1) * self.n_cols]
    }
}

/// Compressed sparse row matrix with sorted, duplicate-free column indices per row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    pub n_rows: usize,
    pub n_cols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<u32>,
    pub data: Vec<f64>,
}

impl CsrMatrix {
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            indptr: vec![0; n_rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Builds from `(row, col, value)` triplets; duplicates are summed and zeros dropped.
    pub fn from_triplets(
        n_rows: usize,
        n_cols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> Result<Self> {
        let mut per_row: Vec<Vec<(u32, f64)>> = vec![Vec::new(); n_rows];
        for &(r, c, v) in triplets {
            if r >= n_rows || c >= n_cols {
                return Err(Error::ShapeMismatch(format!(
                    "entry ({}, {}) outside {}x{}",
                    r, c, n_rows, n_cols
                )));
            }
            per_row[r].push((c as u32, v));
        }

        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for mut row in per_row {
            row.sort_by_key(|&(c, _)| c);
            let mut last: Option<u32> = None;
            for (c, v) in row {
                if last == Some(c) {
                    if let Some(acc) = data.last_mut() {
                        *acc += v;
                    }
                } else {
                    indices.push(c);
                    data.push(v);
                    last = Some(c);
                }
            }
            // drop entries that summed to zero
            let start = *indptr.last().unwrap_or(&0);
            let mut write = start;
            for read in start..indices.len() {
                if data[read] != 0.0 {
                    indices[write] = indices[read];
                    data[write] = data[read];
                    write += 1;
                }
            }
            indices.truncate(write);
            data.truncate(write);
            indptr.push(indices.len());
        }

        Ok(Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        })
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    Dense(DenseMatrix),
    Sparse(CsrMatrix),
}

impl Matrix {
    pub fn n_rows(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.n_rows,
            Matrix::Sparse(m) => m.n_rows,
        }
    }

    pub fn n_cols(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.n_cols,
            Matrix::Sparse(m) => m.n_cols,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    /// Visits the stored values of one row. Dense rows report every column.
    pub fn for_row(&self, row: usize, f: &mut dyn FnMut(usize, f64)) {
        match self {
            Matrix::Dense(m) => {
                for (col, &v) in m.row(row).iter().enumerate() {
                    f(col, v);
                }
            }
            Matrix::Sparse(m) => {
                for k in m.indptr[row]..m.indptr[row + 1] {
                    f(m.indices[k] as usize, m.data[k]);
                }
            }
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            Matrix::Dense(m) => m.data[row * m.n_cols + col],
            Matrix::Sparse(m) => {
                let range = m.indptr[row]..m.indptr[row + 1];
                match m.indices[range.clone()].binary_search(&(col as u32)) {
                    Ok(pos) => m.data[range.start + pos],
                    Err(_) => 0.0,
                }
            }
        }
    }

    pub fn row_sums(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.n_rows()];
        for (row, total) in out.iter_mut().enumerate() {
            self.for_row(row, &mut |_, v| *total += v);
        }
        out
    }

    pub fn col_sums(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.n_cols()];
        for row in 0..self.n_rows() {
            self.for_row(row, &mut |col, v| out[col] += v);
        }
        out
    }

    /// Per-row sums restricted to the columns flagged in `mask`.
    pub fn row_sums_masked(&self, mask: &[bool]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_rows()];
        for (row, total) in out.iter_mut().enumerate() {
            self.for_row(row, &mut |col, v| {
                if mask[col] {
                    *total += v;
                }
            });
        }
        out
    }

    pub fn select_rows(&self, rows: &[usize]) -> Matrix {
        match self {
            Matrix::Dense(m) => {
                let mut data = Vec::with_capacity(rows.len() * m.n_cols);
                for &r in rows {
                    data.extend_from_slice(m.row(r));
                }
                Matrix::Dense(DenseMatrix {
                    n_rows: rows.len(),
                    n_cols: m.n_cols,
                    data,
                })
            }
            Matrix::Sparse(m) => {
                let mut indptr = Vec::with_capacity(rows.len() + 1);
                let mut indices = Vec::new();
                let mut data = Vec::new();
                indptr.push(0);
                for &r in rows {
                    let range = m.indptr[r]..m.indptr[r + 1];
                    indices.extend_from_slice(&m.indices[range.clone()]);
                    data.extend_from_slice(&m.data[range]);
                    indptr.push(indices.len());
                }
                Matrix::Sparse(CsrMatrix {
                    n_rows: rows.len(),
                    n_cols: m.n_cols,
                    indptr,
                    indices,
                    data,
                })
            }
        }
    }

    /// Keeps `cols` in the given order. Column indices must be distinct.
    pub fn select_cols(&self, cols: &[usize]) -> Matrix {
        match self {
            Matrix::Dense(m) => {
                let mut data = Vec::with_capacity(m.n_rows * cols.len());
                for r in 0..m.n_rows {
                    let row = m.row(r);
                    for &c in cols {
                        data.push(row[c]);
                    }
                }
                Matrix::Dense(DenseMatrix {
                    n_rows: m.n_rows,
                    n_cols: cols.len(),
                    data,
                })
            }
            Matrix::Sparse(m) => {
                let mut remap: Vec<Option<u32>> = vec![None; m.n_cols];
                for (new_idx, &c) in cols.iter().enumerate() {
                    remap[c] = Some(new_idx as u32);
                }
                let mut indptr = Vec::with_capacity(m.n_rows + 1);
                let mut indices = Vec::new();
                let mut data = Vec::new();
                indptr.push(0);
                for r in 0..m.n_rows {
                    let mut row: Vec<(u32, f64)> = Vec::new();
                    for k in m.indptr[r]..m.indptr[r + 1] {
                        if let Some(new_c) = remap[m.indices[k] as usize] {
                            row.push((new_c, m.data[k]));
                        }
                    }
                    row.sort_by_key(|&(c, _)| c);
                    for (c, v) in row {
                        indices.push(c);
                        data.push(v);
                    }
                    indptr.push(indices.len());
                }
                Matrix::Sparse(CsrMatrix {
                    n_rows: m.n_rows,
                    n_cols: cols.len(),
                    indptr,
                    indices,
                    data,
                })
            }
        }
    }
}
