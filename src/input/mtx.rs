use std::path::Path;

use crate::error::{Error, Result};
use crate::input::open::open_maybe_gz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtxField {
    Real,
    Integer,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtxSymmetry {
    General,
    Symmetric,
}

/// Coordinate entries of a MatrixMarket file, converted to 0-based indices.
#[derive(Debug, Clone)]
pub struct MtxTriplets {
    pub n_rows: usize,
    pub n_cols: usize,
    pub field: MtxField,
    pub entries: Vec<(usize, usize, f64)>,
}

impl MtxTriplets {
    pub fn transposed(self) -> MtxTriplets {
        MtxTriplets {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            field: self.field,
            entries: self.entries.into_iter().map(|(r, c, v)| (c, r, v)).collect(),
        }
    }
}

pub fn read_mtx(path: &Path) -> Result<MtxTriplets> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Err(Error::Parse(format!("{} is empty", path.display())));
    }
    let (field, symmetry) = parse_banner(buf.trim_end())?;

    let (rows, cols, nnz) = loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            return Err(Error::Parse("missing matrix size line".to_string()));
        }
        let line = buf.trim_end();
        if line.starts_with('%') || line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(r), Some(c), Some(z)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Parse("invalid matrix size line".to_string()));
        };
        break (
            parse_usize(r, "row count")?,
            parse_usize(c, "column count")?,
            parse_usize(z, "nnz count")?,
        );
    };

    // header counts are untrusted; cap the reservation
    let mut entries = Vec::with_capacity(nnz.min(rows.saturating_mul(cols)).min(1 << 20));
    let mut line_no = 0usize;
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(r), Some(c)) = (parts.next(), parts.next()) else {
            return Err(Error::Parse(format!(
                "invalid matrix entry at line {}",
                line_no
            )));
        };
        let row = parse_usize(r, "row index")?;
        let col = parse_usize(c, "col index")?;
        let val = match field {
            MtxField::Pattern => 1.0,
            _ => {
                let Some(v) = parts.next() else {
                    return Err(Error::Parse(format!(
                        "missing value at entry line {}",
                        line_no
                    )));
                };
                v.parse::<f64>()
                    .map_err(|_| Error::Parse(format!("invalid value at entry line {}", line_no)))?
            }
        };
        if row == 0 || row > rows || col == 0 || col > cols {
            return Err(Error::Parse(format!(
                "matrix entry out of bounds at entry line {}",
                line_no
            )));
        }
        if val == 0.0 {
            continue;
        }
        entries.push((row - 1, col - 1, val));
        if symmetry == MtxSymmetry::Symmetric && row != col {
            entries.push((col - 1, row - 1, val));
        }
    }

    if symmetry == MtxSymmetry::General && entries.len() > nnz {
        tracing::warn!(
            "{} declares {} entries but contains {}",
            path.display(),
            nnz,
            entries.len()
        );
    }

    Ok(MtxTriplets {
        n_rows: rows,
        n_cols: cols,
        field,
        entries,
    })
}

fn parse_banner(header: &str) -> Result<(MtxField, MtxSymmetry)> {
    if !header.starts_with("%%MatrixMarket") {
        return Err(Error::Parse("missing MatrixMarket header".to_string()));
    }
    let tokens: Vec<String> = header
        .split_whitespace()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    if tokens.get(2).map(String::as_str) != Some("coordinate") {
        return Err(Error::Parse(
            "only coordinate MatrixMarket files are supported".to_string(),
        ));
    }
    let field = match tokens.get(3).map(String::as_str) {
        Some("real") | Some("double") => MtxField::Real,
        Some("integer") => MtxField::Integer,
        Some("pattern") => MtxField::Pattern,
        other => {
            return Err(Error::Parse(format!(
                "unsupported MatrixMarket field: {:?}",
                other
            )));
        }
    };
    let symmetry = match tokens.get(4).map(String::as_str) {
        None | Some("general") => MtxSymmetry::General,
        Some("symmetric") => MtxSymmetry::Symmetric,
        Some(other) => {
            return Err(Error::Parse(format!(
                "unsupported MatrixMarket symmetry: {}",
                other
            )));
        }
    };
    Ok((field, symmetry))
}

fn parse_usize(raw: &str, what: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| Error::Parse(format!("invalid {}: {}", what, raw)))
}
