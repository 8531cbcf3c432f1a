use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::matcher::PatternSet;

/// One output tree as written in the YAML file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawOutputSpec {
    /// Input trees feeding this output tree.
    pub input: Vec<String>,
    pub keep: Vec<String>,
    pub drop: Vec<String>,
    /// Input branch → output branch name.
    pub rename: IndexMap<String, String>,
    /// Input branch → condition applied to its value, e.g. `"> 1000"`.
    pub selection: IndexMap<String, String>,
    /// Output branch → `functor(arg, ...)`.
    pub calculation: IndexMap<String, String>,
    /// Extra `#include <...>` names.
    pub headers: Vec<String>,
    /// Extra `#include "..."` names.
    pub user_headers: Vec<String>,
    pub force_lowercase: bool,
}

/// A resolved output tree: patterns compiled, ready for the IR builder.
#[derive(Clone, Debug)]
pub struct OutputSpec {
    pub input: Vec<String>,
    pub keep: PatternSet,
    pub drop: PatternSet,
    pub rename: IndexMap<String, String>,
    pub selection: IndexMap<String, String>,
    pub calculation: IndexMap<String, String>,
    pub headers: Vec<String>,
    pub user_headers: Vec<String>,
    pub force_lowercase: bool,
}

impl OutputSpec {
    pub fn resolve(output_tree: &str, raw: RawOutputSpec) -> Result<Self, ConfigError> {
        let compile = |field: &'static str, patterns: &[String]| {
            PatternSet::new(patterns).map_err(|(pattern, source)| ConfigError::InvalidPattern {
                output_tree: output_tree.to_string(),
                field,
                pattern,
                source,
            })
        };
        Ok(Self {
            keep: compile("keep", &raw.keep)?,
            drop: compile("drop", &raw.drop)?,
            input: raw.input,
            rename: raw.rename,
            selection: raw.selection,
            calculation: raw.calculation,
            headers: raw.headers,
            user_headers: raw.user_headers,
            force_lowercase: raw.force_lowercase,
        })
    }

    /// Apply the case normalization of this tree.
    pub fn normalize(&self, name: &str) -> String {
        if self.force_lowercase {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Final output name of a retained input branch: rename, then normalize.
    pub fn output_name(&self, input_branch: &str) -> String {
        let renamed = self
            .rename
            .get(input_branch)
            .map(String::as_str)
            .unwrap_or(input_branch);
        self.normalize(renamed)
    }
}

/// The whole configuration: output tree name → its spec, in file order.
#[derive(Clone, Debug, Default)]
pub struct GeneratorConfig {
    trees: IndexMap<String, OutputSpec>,
}

impl GeneratorConfig {
    pub fn from_raw(raw: IndexMap<String, RawOutputSpec>) -> Result<Self, ConfigError> {
        let mut trees = IndexMap::with_capacity(raw.len());
        for (name, spec) in raw {
            let resolved = OutputSpec::resolve(&name, spec)?;
            trees.insert(name, resolved);
        }
        Ok(Self { trees })
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: IndexMap<String, RawOutputSpec> = serde_yaml::from_str(source)?;
        Self::from_raw(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = super::read_source(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn get(&self, output_tree: &str) -> Option<&OutputSpec> {
        self.trees.get(output_tree)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputSpec)> {
        self.trees.iter()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
