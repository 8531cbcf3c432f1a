//! Shared resolution pipeline.
//!
//! Runs the IR builder over every output tree and gathers both results and
//! errors, so `generate`, `check` and `plan` all see the same IR.

use crate::config::{BranchSchema, GeneratorConfig};
use crate::diagnostic::Diagnostic;
use crate::error::{ConfigError, GenerateError};
use crate::ir::{GenerationUnit, IRBuilder, TreeIr};

/// Every output tree resolved against the schema, in configuration order.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub trees: Vec<TreeIr>,
}

impl Resolved {
    /// Resolve all output trees. Configuration errors from every tree are
    /// collected before giving up, so one run reports them all.
    pub fn build(schema: &BranchSchema, config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let builder = IRBuilder::new(schema);
        let mut trees = Vec::with_capacity(config.len());
        let mut errors: Vec<ConfigError> = Vec::new();

        for (output_tree, spec) in config.iter() {
            match builder.build(output_tree, spec) {
                Ok(tree) => trees.push(tree),
                Err(e) => {
                    log::debug!("output tree '{}' failed: {}", output_tree, e);
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(Self { trees })
        } else {
            Err(GenerateError::Config(errors))
        }
    }

    /// All units, output tree by output tree.
    pub fn units(&self) -> impl Iterator<Item = &GenerationUnit> {
        self.trees.iter().flat_map(|t| t.units.iter())
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.trees.iter().flat_map(|t| t.diagnostics.iter())
    }
}
