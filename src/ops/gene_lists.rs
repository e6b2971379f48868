use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::input::open::{delimiter_for, open_maybe_gz};

/// Named gene lists in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneLists {
    lists: Vec<(String, Vec<String>)>,
}

impl GeneLists {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.lists
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, genes)| genes.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.lists.iter().map(|(n, g)| (n.as_str(), g.as_slice()))
    }

    fn slot(&mut self, name: &str) -> usize {
        if let Some(pos) = self.lists.iter().position(|(n, _)| n == name) {
            return pos;
        }
        self.lists.push((name.to_string(), Vec::new()));
        self.lists.len() - 1
    }
}

impl Serialize for GeneLists {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lists.len()))?;
        for (name, genes) in &self.lists {
            map.serialize_entry(name, genes)?;
        }
        map.end()
    }
}

/// Reads a table whose columns are gene lists: the header names the lists,
/// each cell below adds one gene. Empty cells are skipped and repeated header
/// names feed the same list. When `allow` is given only its genes are kept.
pub fn read_gene_lists(path: &Path, allow: Option<&HashSet<String>>) -> Result<GeneLists> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .flexible(true)
        .from_reader(open_maybe_gz(path)?);

    let mut lists = GeneLists::default();
    let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let header: Vec<usize> = names.iter().map(|h| lists.slot(h)).collect();

    for record in reader.records() {
        let record = record?;
        for (value, &slot) in record.iter().zip(&header) {
            if value.is_empty() {
                continue;
            }
            if allow.is_some_and(|set| !set.contains(value)) {
                continue;
            }
            lists.lists[slot].1.push(value.to_string());
        }
    }

    tracing::debug!(
        "read {} gene lists from {}",
        lists.len(),
        path.display()
    );
    Ok(lists)
}

#[cfg(test)]
#[path = "../../tests/src_inline/ops/gene_lists.rs"]
mod tests;
