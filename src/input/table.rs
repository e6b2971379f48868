use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::adata::{Column, Embedding, Frame};
use crate::error::{Error, Result};
use crate::input::open::{delimiter_for, open_maybe_gz};
use crate::ops::roi::Polygon;

/// Reads a headed delimited table into string columns. The delimiter follows
/// the extension unless given.
pub fn read_table(path: &Path, delimiter: Option<u8>) -> Result<Frame> {
    let delimiter = delimiter.unwrap_or_else(|| delimiter_for(path));
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(open_maybe_gz(path)?);

    let header: Vec<String> = reader.headers()?.iter().map(|s| s.trim().to_string()).collect();
    let mut columns: Vec<Vec<String>> = vec![Vec::new(); header.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, col) in columns.iter_mut().enumerate() {
            col.push(record.get(idx).unwrap_or("").trim().to_string());
        }
    }

    let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
    let mut frame = Frame::new(n_rows);
    for (name, values) in header.into_iter().zip(columns) {
        if frame.contains(&name) {
            tracing::warn!(
                "duplicate column '{}' in {}; keeping the last",
                name,
                path.display()
            );
        }
        frame.insert(name, Column::Str(values))?;
    }
    Ok(frame)
}

/// Reads `id,dim1,dim2,...` rows and aligns them to `obs_names`.
pub fn read_embedding(path: &Path, obs_names: &[String]) -> Result<Embedding> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .from_reader(open_maybe_gz(path)?);

    let n_dims = reader.headers()?.len().saturating_sub(1);
    if n_dims == 0 {
        return Err(Error::Parse(format!(
            "{} needs an id column and at least one coordinate column",
            path.display()
        )));
    }

    let mut rows: HashMap<String, Vec<f64>> = HashMap::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let id = record.get(0).unwrap_or("").trim().to_string();
        let mut values = Vec::with_capacity(n_dims);
        for field in record.iter().skip(1) {
            let v: f64 = field.trim().parse().map_err(|_| {
                Error::Parse(format!(
                    "invalid coordinate '{}' on data row {}",
                    field,
                    line + 1
                ))
            })?;
            values.push(v);
        }
        if rows.insert(id.clone(), values).is_some() {
            tracing::warn!("duplicate embedding row for '{}'; keeping the last", id);
        }
    }

    let mut values = Vec::with_capacity(obs_names.len() * n_dims);
    for name in obs_names {
        let row = rows
            .get(name)
            .ok_or_else(|| Error::MissingKey(format!("no coordinates for observation '{name}'")))?;
        values.extend_from_slice(row);
    }
    Embedding::new(obs_names.len(), n_dims, values)
}

/// Reads polygon vertices from a table with `x` and `y` columns.
pub fn read_polygon(path: &Path) -> Result<Polygon> {
    let frame = read_table(path, None)?;
    let parse = |name: &str| -> Result<Vec<f64>> {
        frame
            .str_values(name)?
            .iter()
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| Error::Parse(format!("invalid polygon {} value '{}'", name, v)))
            })
            .collect()
    };
    Polygon::new(parse("x")?, parse("y")?)
}
