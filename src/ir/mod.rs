//! Intermediate representation between the configuration and emitted C++.
//!
//! One `GenerationUnit` per (output tree, input tree) pair. Each carries the
//! retained branches as `SelectionDirective`s and the derived columns as
//! `ComputedDirective`s, in the order they will be emitted.

pub mod builder;

use std::fmt;

use crate::diagnostic::Diagnostic;

pub use builder::IRBuilder;

// ─── Directives ───────────────────────────────────────────────────

/// A retained input branch copied into the output tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionDirective {
    pub input_branch: String,
    pub output_branch: String,
    pub datatype: String,
    /// Condition on this branch's value, e.g. `"> 1000"`.
    pub selection: Option<String>,
}

/// A read binding created only because a computation needs the branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreshBinding {
    pub branch: String,
    pub datatype: String,
}

/// A derived output branch: `output_branch = functor(arguments...)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputedDirective {
    pub output_branch: String,
    pub functor: String,
    pub arguments: Vec<String>,
    /// Always the type of `arguments[0]`.
    pub datatype: String,
    /// Arguments not bound by any earlier directive of the unit.
    pub fresh: Vec<FreshBinding>,
}

/// Everything needed to emit one routine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationUnit {
    pub output_tree: String,
    pub input_tree: String,
    pub selections: Vec<SelectionDirective>,
    pub computed: Vec<ComputedDirective>,
    /// Branches removed by a drop pattern. Informational only.
    pub dropped: Vec<String>,
}

impl GenerationUnit {
    pub fn new(output_tree: &str, input_tree: &str) -> Self {
        Self {
            output_tree: output_tree.to_string(),
            input_tree: input_tree.to_string(),
            selections: Vec::new(),
            computed: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Every input branch the routine reads, with its type, in binding order.
    pub fn read_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        let selected = self
            .selections
            .iter()
            .map(|s| (s.input_branch.as_str(), s.datatype.as_str()));
        let fresh = self
            .computed
            .iter()
            .flat_map(|c| c.fresh.iter())
            .map(|f| (f.branch.as_str(), f.datatype.as_str()));
        selected.chain(fresh)
    }

    /// Every output branch name, selections first.
    pub fn output_branches(&self) -> impl Iterator<Item = &str> {
        self.selections
            .iter()
            .map(|s| s.output_branch.as_str())
            .chain(self.computed.iter().map(|c| c.output_branch.as_str()))
    }

    pub fn datatypes(&self) -> impl Iterator<Item = &str> {
        self.read_bindings()
            .map(|(_, ty)| ty)
            .chain(self.computed.iter().map(|c| c.datatype.as_str()))
    }
}

/// The units of one output tree plus the warnings raised building them.
#[derive(Clone, Debug)]
pub struct TreeIr {
    pub output_tree: String,
    pub units: Vec<GenerationUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

// ─── Display ──────────────────────────────────────────────────────

impl fmt::Display for SelectionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} : {}",
            self.input_branch, self.output_branch, self.datatype
        )?;
        if let Some(sel) = &self.selection {
            write!(f, " [{}]", sel)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComputedDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {}({}) : {}",
            self.output_branch,
            self.functor,
            self.arguments.join(", "),
            self.datatype
        )?;
        if !self.fresh.is_empty() {
            let fresh: Vec<&str> = self.fresh.iter().map(|b| b.branch.as_str()).collect();
            write!(f, " (reads {})", fresh.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for GenerationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} <- {}", self.output_tree, self.input_tree)?;
        for s in &self.selections {
            writeln!(f, "  keep    {}", s)?;
        }
        for c in &self.computed {
            writeln!(f, "  compute {}", c)?;
        }
        for d in &self.dropped {
            writeln!(f, "  drop    {}", d)?;
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────
