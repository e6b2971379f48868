use std::collections::{BTreeMap, HashMap, HashSet};

pub mod embedding;
pub mod frame;
pub mod matrix;
pub mod uns;

pub use embedding::Embedding;
pub use frame::{Column, Frame};
pub use matrix::{CsrMatrix, DenseMatrix, Matrix};
pub use uns::{RankGenesGroups, UnsValue};

use crate::error::{Error, Result};

/// Annotated matrix: observations (cells) by features (genes) plus aligned metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnData {
    pub x: Matrix,
    pub obs_names: Vec<String>,
    pub var_names: Vec<String>,
    pub obs: Frame,
    pub var: Frame,
    pub obsm: BTreeMap<String, Embedding>,
    pub layers: BTreeMap<String, Matrix>,
    pub uns: BTreeMap<String, UnsValue>,
}

impl AnnData {
    pub fn new(x: Matrix, obs_names: Vec<String>, var_names: Vec<String>) -> Result<Self> {
        if x.n_rows() != obs_names.len() || x.n_cols() != var_names.len() {
            return Err(Error::ShapeMismatch(format!(
                "matrix is {}x{} but got {} obs names and {} var names",
                x.n_rows(),
                x.n_cols(),
                obs_names.len(),
                var_names.len()
            )));
        }
        let obs = Frame::new(obs_names.len());
        let var = Frame::new(var_names.len());
        Ok(Self {
            x,
            obs_names,
            var_names,
            obs,
            var,
            obsm: BTreeMap::new(),
            layers: BTreeMap::new(),
            uns: BTreeMap::new(),
        })
    }

    pub fn n_obs(&self) -> usize {
        self.obs_names.len()
    }

    pub fn n_vars(&self) -> usize {
        self.var_names.len()
    }

    pub fn validate(&self) -> Result<()> {
        let (n_obs, n_vars) = (self.n_obs(), self.n_vars());
        if self.x.shape() != (n_obs, n_vars) {
            return Err(Error::ShapeMismatch(format!(
                "X is {:?}, expected ({}, {})",
                self.x.shape(),
                n_obs,
                n_vars
            )));
        }
        if self.obs.n_rows() != n_obs || self.var.n_rows() != n_vars {
            return Err(Error::ShapeMismatch(
                "obs/var tables do not match matrix shape".to_string(),
            ));
        }
        for (name, emb) in &self.obsm {
            if emb.n_rows() != n_obs {
                return Err(Error::ShapeMismatch(format!(
                    "obsm['{}'] has {} rows, expected {}",
                    name,
                    emb.n_rows(),
                    n_obs
                )));
            }
        }
        for (name, layer) in &self.layers {
            if layer.shape() != (n_obs, n_vars) {
                return Err(Error::ShapeMismatch(format!(
                    "layers['{}'] is {:?}, expected ({}, {})",
                    name,
                    layer.shape(),
                    n_obs,
                    n_vars
                )));
            }
        }
        Ok(())
    }

    pub fn insert_obsm(&mut self, name: impl Into<String>, embedding: Embedding) -> Result<()> {
        let name = name.into();
        if embedding.n_rows() != self.n_obs() {
            return Err(Error::ShapeMismatch(format!(
                "obsm['{}'] has {} rows, expected {}",
                name,
                embedding.n_rows(),
                self.n_obs()
            )));
        }
        self.obsm.insert(name, embedding);
        Ok(())
    }

    pub fn insert_layer(&mut self, name: impl Into<String>, layer: Matrix) -> Result<()> {
        let name = name.into();
        if layer.shape() != (self.n_obs(), self.n_vars()) {
            return Err(Error::ShapeMismatch(format!(
                "layer '{}' is {:?}, expected ({}, {})",
                name,
                layer.shape(),
                self.n_obs(),
                self.n_vars()
            )));
        }
        self.layers.insert(name, layer);
        Ok(())
    }

    pub fn embedding(&self, name: &str) -> Result<&Embedding> {
        self.obsm
            .get(name)
            .ok_or_else(|| Error::MissingKey(format!("obsm['{name}']")))
    }

    pub fn obs_index(&self) -> HashMap<&str, usize> {
        index_of(&self.obs_names)
    }

    pub fn var_index(&self) -> HashMap<&str, usize> {
        index_of(&self.var_names)
    }

    /// Keeps the given observations, in the given order, across every obs-aligned slot.
    pub fn subset_obs(&mut self, rows: &[usize]) {
        self.x = self.x.select_rows(rows);
        self.obs_names = rows.iter().map(|&r| self.obs_names[r].clone()).collect();
        self.obs = self.obs.select_rows(rows);
        for emb in self.obsm.values_mut() {
            *emb = emb.select_rows(rows);
        }
        for layer in self.layers.values_mut() {
            *layer = layer.select_rows(rows);
        }
    }

    /// Keeps the given features, in the given order, across every var-aligned slot.
    pub fn subset_vars(&mut self, cols: &[usize]) {
        self.x = self.x.select_cols(cols);
        self.var_names = cols.iter().map(|&c| self.var_names[c].clone()).collect();
        self.var = self.var.select_rows(cols);
        for layer in self.layers.values_mut() {
            *layer = layer.select_cols(cols);
        }
    }

    pub fn make_var_names_unique(&mut self) {
        make_unique(&mut self.var_names);
    }
}

fn index_of(names: &[String]) -> HashMap<&str, usize> {
    let mut map = HashMap::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        map.entry(name.as_str()).or_insert(idx);
    }
    map
}

/// Suffixes repeated names `-1`, `-2`, ... in order of appearance, skipping taken names.
pub fn make_unique(names: &mut [String]) {
    let taken: HashSet<String> = names.iter().cloned().collect();
    let mut issued: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counters: HashMap<String, usize> = HashMap::new();

    for name in names.iter_mut() {
        if issued.insert(name.clone()) {
            continue;
        }
        let base = name.clone();
        let counter = counters.entry(base.clone()).or_insert(0);
        let candidate = loop {
            *counter += 1;
            let candidate = format!("{}-{}", base, counter);
            if !taken.contains(&candidate) && !issued.contains(&candidate) {
                break candidate;
            }
        };
        issued.insert(candidate.clone());
        *name = candidate;
    }
}

/// Runs `op` on `adata` itself when `inplace`, otherwise on a copy that is returned.
pub fn apply_inplace<F>(adata: &mut AnnData, inplace: bool, op: F) -> Result<Option<AnnData>>
where
    F: FnOnce(&mut AnnData) -> Result<()>,
{
    if inplace {
        op(adata)?;
        Ok(None)
    } else {
        let mut copy = adata.clone();
        op(&mut copy)?;
        Ok(Some(copy))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/adata/tests.rs"]
mod tests;
