//! IRBuilder: resolves one output tree's configuration against the branch
//! schema into `GenerationUnit`s.
//!
//! Per input tree, branches are visited in schema order and sorted into
//! drop / keep / excluded. Calculations are then resolved in configuration
//! order; any argument that no earlier directive reads gets exactly one
//! fresh read binding for the whole unit.

mod call;

use std::collections::HashSet;

use crate::config::{BranchSchema, OutputSpec, TreeSchema};
use crate::diagnostic::Diagnostic;
use crate::error::ConfigError;
use crate::matcher::Retention;
use crate::span::Span;

use super::{ComputedDirective, FreshBinding, GenerationUnit, SelectionDirective, TreeIr};

pub use call::{parse_call, Call};

/// Builds IR for output trees against a shared, read-only schema.
pub struct IRBuilder<'a> {
    schema: &'a BranchSchema,
}

impl<'a> IRBuilder<'a> {
    pub fn new(schema: &'a BranchSchema) -> Self {
        Self { schema }
    }

    /// Resolve every input tree of `spec` into a unit.
    ///
    /// Input trees missing from the schema produce a warning and no unit.
    pub fn build(&self, output_tree: &str, spec: &OutputSpec) -> Result<TreeIr, ConfigError> {
        let mut units = Vec::with_capacity(spec.input.len());
        let mut diagnostics = Vec::new();

        for input_tree in &spec.input {
            let branches = match self.schema.tree(input_tree) {
                Some(b) => b,
                None => {
                    log::warn!("tree '{}' not found in input schema", input_tree);
                    diagnostics.push(
                        Diagnostic::warning(
                            format!("tree '{}' not found in input schema", input_tree),
                            Span::dummy(),
                        )
                        .with_note(format!(
                            "output tree '{}' gets no routine for this input",
                            output_tree
                        )),
                    );
                    continue;
                }
            };
            let unit = UnitBuilder::new(output_tree, input_tree, spec, branches)
                .build(&mut diagnostics)?;
            log::debug!(
                "{} <- {}: {} kept, {} computed, {} dropped",
                output_tree,
                input_tree,
                unit.selections.len(),
                unit.computed.len(),
                unit.dropped.len()
            );
            units.push(unit);
        }

        Ok(TreeIr {
            output_tree: output_tree.to_string(),
            units,
            diagnostics,
        })
    }
}

/// State for one (output tree, input tree) pair.
struct UnitBuilder<'s> {
    spec: &'s OutputSpec,
    branches: &'s TreeSchema,
    unit: GenerationUnit,
    /// Input branches that already have a read binding in this unit.
    bound: HashSet<&'s str>,
    outputs: HashSet<String>,
}

impl<'s> UnitBuilder<'s> {
    fn new(
        output_tree: &str,
        input_tree: &str,
        spec: &'s OutputSpec,
        branches: &'s TreeSchema,
    ) -> Self {
        Self {
            spec,
            branches,
            unit: GenerationUnit::new(output_tree, input_tree),
            bound: HashSet::new(),
            outputs: HashSet::new(),
        }
    }

    fn build(mut self, diagnostics: &mut Vec<Diagnostic>) -> Result<GenerationUnit, ConfigError> {
        self.select_branches()?;
        self.check_selections(diagnostics);
        self.resolve_calculations()?;
        Ok(self.unit)
    }

    fn select_branches(&mut self) -> Result<(), ConfigError> {
        let spec = self.spec;
        for (branch, datatype) in self.branches {
            match Retention::decide(&spec.keep, &spec.drop, branch) {
                Retention::Drop => {
                    log::debug!("dropping branch: {}", branch);
                    self.unit.dropped.push(branch.clone());
                }
                Retention::Keep => {
                    let output_branch = spec.output_name(branch);
                    self.claim_output(&output_branch)?;
                    self.bound.insert(branch.as_str());
                    self.unit.selections.push(SelectionDirective {
                        input_branch: branch.clone(),
                        output_branch,
                        datatype: datatype.clone(),
                        selection: spec.selection.get(branch).cloned(),
                    });
                }
                Retention::Excluded => {}
            }
        }
        Ok(())
    }

    /// A selection only applies to a retained branch; flag the others.
    fn check_selections(&self, diagnostics: &mut Vec<Diagnostic>) {
        for (branch, expr) in &self.spec.selection {
            if self.bound.contains(branch.as_str()) {
                continue;
            }
            let reason = if self.branches.contains_key(branch) {
                "is not retained"
            } else {
                "does not exist"
            };
            diagnostics.push(
                Diagnostic::warning(
                    format!(
                        "selection '{}' on branch '{}' is ignored: the branch {} in '{}'",
                        expr, branch, reason, self.unit.input_tree
                    ),
                    Span::dummy(),
                )
                .with_help("selections only apply to kept branches".to_string()),
            );
        }
    }

    fn resolve_calculations(&mut self) -> Result<(), ConfigError> {
        let spec = self.spec;
        for (out_name, instruction) in &spec.calculation {
            let call = parse_call(instruction).ok_or_else(|| ConfigError::MalformedInstruction {
                output_tree: self.unit.output_tree.clone(),
                branch: out_name.clone(),
                instruction: instruction.clone(),
            })?;

            // parse_call guarantees at least one argument.
            let first = call.arguments[0];
            let datatype = self
                .branches
                .get(first)
                .ok_or_else(|| ConfigError::UnknownFirstArgument {
                    output_tree: self.unit.output_tree.clone(),
                    input_tree: self.unit.input_tree.clone(),
                    branch: first.to_string(),
                    instruction: instruction.clone(),
                })?
                .clone();

            let mut fresh = Vec::new();
            for arg in &call.arguments {
                let (name, arg_type) = self.branches.get_key_value(*arg).ok_or_else(|| {
                    ConfigError::UnknownArgument {
                        output_tree: self.unit.output_tree.clone(),
                        input_tree: self.unit.input_tree.clone(),
                        branch: arg.to_string(),
                        instruction: instruction.clone(),
                    }
                })?;
                if self.bound.insert(name.as_str()) {
                    fresh.push(FreshBinding {
                        branch: name.clone(),
                        datatype: arg_type.clone(),
                    });
                }
            }

            let output_branch = spec.normalize(out_name);
            self.claim_output(&output_branch)?;
            self.unit.computed.push(ComputedDirective {
                output_branch,
                functor: call.functor.to_string(),
                arguments: call.arguments.iter().map(|a| a.to_string()).collect(),
                datatype,
                fresh,
            });
        }
        Ok(())
    }

    fn claim_output(&mut self, output_branch: &str) -> Result<(), ConfigError> {
        if self.outputs.insert(output_branch.to_string()) {
            Ok(())
        } else {
            Err(ConfigError::DuplicateOutputBranch {
                output_tree: self.unit.output_tree.clone(),
                input_tree: self.unit.input_tree.clone(),
                branch: output_branch.to_string(),
            })
        }
    }
}
