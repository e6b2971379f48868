use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Str(Vec<String>),
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Categorical {
        codes: Vec<u32>,
        categories: Vec<String>,
    },
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Str(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Categorical { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell value rendered as text; booleans use `True`/`False`, NaN renders empty.
    pub fn value_string(&self, row: usize) -> String {
        match self {
            Column::Str(v) => v[row].clone(),
            Column::Float(v) => {
                if v[row].is_nan() {
                    String::new()
                } else {
                    v[row].to_string()
                }
            }
            Column::Int(v) => v[row].to_string(),
            Column::Bool(v) => if v[row] { "True" } else { "False" }.to_string(),
            Column::Categorical { codes, categories } => categories[codes[row] as usize].clone(),
        }
    }

    pub fn to_strings(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.value_string(i)).collect()
    }

    pub fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Str(v) => Column::Str(rows.iter().map(|&r| v[r].clone()).collect()),
            Column::Float(v) => Column::Float(rows.iter().map(|&r| v[r]).collect()),
            Column::Int(v) => Column::Int(rows.iter().map(|&r| v[r]).collect()),
            Column::Bool(v) => Column::Bool(rows.iter().map(|&r| v[r]).collect()),
            Column::Categorical { codes, categories } => Column::Categorical {
                codes: rows.iter().map(|&r| codes[r]).collect(),
                categories: categories.clone(),
            },
        }
    }
}

/// Ordered, column-typed table with a fixed row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    n_rows: usize,
    columns: Vec<(String, Column)>,
}

impl Frame {
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Adds a column, replacing any existing column of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if column.len() != self.n_rows {
            return Err(Error::ShapeMismatch(format!(
                "column '{}' has {} values, frame has {} rows",
                name,
                column.len(),
                self.n_rows
            )));
        }
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = column;
        } else {
            self.columns.push((name, column));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    /// Column values as text, or `MissingKey` when absent.
    pub fn str_values(&self, name: &str) -> Result<Vec<String>> {
        self.get(name)
            .map(Column::to_strings)
            .ok_or_else(|| Error::MissingKey(format!("column '{name}'")))
    }

    pub fn select_rows(&self, rows: &[usize]) -> Frame {
        Frame {
            n_rows: rows.len(),
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.select(rows)))
                .collect(),
        }
    }
}
