use crate::error::{Error, Result};

/// Ranked per-group marker statistics, as produced by a rank-genes-groups test.
/// Every per-group vector is in rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankGenesGroups {
    pub groups: Vec<String>,
    pub names: Vec<Vec<String>>,
    pub scores: Vec<Vec<f64>>,
    pub logfoldchanges: Vec<Vec<f64>>,
    pub pvals: Vec<Vec<f64>>,
    pub pvals_adj: Vec<Vec<f64>>,
}

impl RankGenesGroups {
    pub fn validate(&self) -> Result<()> {
        let n_groups = self.groups.len();
        for (field, len) in [
            ("names", self.names.len()),
            ("scores", self.scores.len()),
            ("logfoldchanges", self.logfoldchanges.len()),
            ("pvals", self.pvals.len()),
            ("pvals_adj", self.pvals_adj.len()),
        ] {
            if len != n_groups {
                return Err(Error::ShapeMismatch(format!(
                    "{} has {} groups, expected {}",
                    field, len, n_groups
                )));
            }
        }
        for g in 0..n_groups {
            let n = self.names[g].len();
            if self.scores[g].len() != n
                || self.logfoldchanges[g].len() != n
                || self.pvals[g].len() != n
                || self.pvals_adj[g].len() != n
            {
                return Err(Error::ShapeMismatch(format!(
                    "group '{}' has ragged statistics",
                    self.groups[g]
                )));
            }
        }
        Ok(())
    }

    pub fn group_len(&self, group: usize) -> usize {
        self.names[group].len()
    }
}

/// Entries of the unstructured results mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum UnsValue {
    RankGenesGroups(RankGenesGroups),
}
