use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Branch name → type string, in the order the input tree stores them.
pub type TreeSchema = IndexMap<String, String>;

/// Branch layout of every tree in an input file.
///
/// Produced once by an external dump (`{tree: {branch: type}}` as YAML or
/// JSON) and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BranchSchema {
    trees: IndexMap<String, TreeSchema>,
}

impl BranchSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a tree with the given branches, keeping their order.
    pub fn with_tree<I, B, T>(mut self, tree: &str, branches: I) -> Self
    where
        I: IntoIterator<Item = (B, T)>,
        B: Into<String>,
        T: Into<String>,
    {
        let branches = branches
            .into_iter()
            .map(|(b, t)| (b.into(), t.into()))
            .collect();
        self.trees.insert(tree.to_string(), branches);
        self
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = super::read_source(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn tree(&self, name: &str) -> Option<&TreeSchema> {
        self.trees.get(name)
    }

    pub fn datatype(&self, tree: &str, branch: &str) -> Option<&str> {
        self.trees
            .get(tree)
            .and_then(|t| t.get(branch))
            .map(String::as_str)
    }

    pub fn trees(&self) -> impl Iterator<Item = (&String, &TreeSchema)> {
        self.trees.iter()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
