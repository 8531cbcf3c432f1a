//! RoutineBuilder: lays out one `GenerationUnit` as emission nodes.

use std::collections::HashMap;

use crate::error::GenerateError;
use crate::ident::{sanitize, IdentAllocator, INPUT_FILE, OUTPUT_FILE};
use crate::ir::GenerationUnit;

use super::{EmitOp, Predicate, Routine};

/// Default routine name for a unit: `generator_<output>_<input>`.
pub fn routine_name(unit: &GenerationUnit) -> String {
    sanitize(
        &format!("{}_{}", unit.output_tree, unit.input_tree),
        "generator_",
        "",
    )
}

/// Turns a unit into a validated `Routine`.
///
/// Functor names are reserved first. Identifiers are then allocated in
/// declaration order: output tree, reader, then each output variable
/// followed by its read binding.
pub struct RoutineBuilder<'u> {
    unit: &'u GenerationUnit,
    name: String,
    idents: IdentAllocator,
    /// Input branch → read binding identifier.
    bindings: HashMap<&'u str, String>,
}

impl<'u> RoutineBuilder<'u> {
    pub fn new(unit: &'u GenerationUnit) -> Self {
        Self::with_name(unit, routine_name(unit))
    }

    /// Use a caller-chosen routine name, e.g. one already made unique
    /// across the translation unit.
    pub fn with_name(unit: &'u GenerationUnit, name: String) -> Self {
        Self {
            unit,
            name,
            idents: IdentAllocator::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn build(mut self) -> Result<Routine, GenerateError> {
        let unit = self.unit;
        let mut ops = Vec::new();

        // Locals must not hide the functions the loop calls.
        for c in &unit.computed {
            self.idents.reserve(&c.functor);
        }

        // ── Declarations ──
        let tree = self.idents.alloc(&unit.output_tree, "", "");
        let reader = self.idents.alloc(&unit.input_tree, "", "");
        ops.push(EmitOp::FnStart {
            name: self.name.clone(),
        });
        ops.push(EmitOp::SelectFile {
            file: OUTPUT_FILE.to_string(),
        });
        ops.push(EmitOp::TreeDecl {
            var: tree.clone(),
            name: unit.output_tree.clone(),
        });
        ops.push(EmitOp::ReaderDecl {
            var: reader.clone(),
            tree: unit.input_tree.clone(),
            file: INPUT_FILE.to_string(),
        });
        ops.push(EmitOp::BlankLine);

        let mut assigns = Vec::with_capacity(unit.selections.len());
        let mut predicate = Predicate::default();
        for s in &unit.selections {
            let var = self.idents.alloc(&s.output_branch, "", "");
            ops.push(EmitOp::VarDecl {
                datatype: s.datatype.clone(),
                var: var.clone(),
            });
            ops.push(EmitOp::WriteBinding {
                tree: tree.clone(),
                branch: s.output_branch.clone(),
                var: var.clone(),
            });
            let binding = self.bind(&s.input_branch);
            ops.push(EmitOp::ReadBinding {
                datatype: s.datatype.clone(),
                var: binding.clone(),
                reader: reader.clone(),
                branch: s.input_branch.clone(),
            });
            ops.push(EmitOp::BlankLine);

            if let Some(condition) = &s.selection {
                predicate.terms.push((binding.clone(), condition.clone()));
            }
            assigns.push(EmitOp::Assign { var, binding });
        }

        let mut computes = Vec::with_capacity(unit.computed.len());
        for c in &unit.computed {
            let var = self.idents.alloc(&c.output_branch, "", "");
            ops.push(EmitOp::VarDecl {
                datatype: c.datatype.clone(),
                var: var.clone(),
            });
            ops.push(EmitOp::WriteBinding {
                tree: tree.clone(),
                branch: c.output_branch.clone(),
                var: var.clone(),
            });
            for fresh in &c.fresh {
                let binding = self.bind(&fresh.branch);
                ops.push(EmitOp::ReadBinding {
                    datatype: fresh.datatype.clone(),
                    var: binding,
                    reader: reader.clone(),
                    branch: fresh.branch.clone(),
                });
            }
            ops.push(EmitOp::BlankLine);

            let bindings = c
                .arguments
                .iter()
                .map(|arg| {
                    self.bindings.get(arg.as_str()).cloned().ok_or_else(|| {
                        GenerateError::Internal(format!(
                            "argument '{}' of '{}' in {} <- {} has no read binding",
                            arg, c.output_branch, unit.output_tree, unit.input_tree
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            computes.push(EmitOp::Compute {
                var,
                functor: c.functor.clone(),
                bindings,
            });
        }

        // ── Event loop ──
        let mut then_body = assigns;
        then_body.extend(computes);
        then_body.push(EmitOp::Fill { tree: tree.clone() });
        ops.push(EmitOp::EventLoop {
            reader,
            body: vec![EmitOp::IfOnly {
                predicate,
                then_body,
            }],
        });
        ops.push(EmitOp::BlankLine);
        ops.push(EmitOp::WriteTree { tree });
        ops.push(EmitOp::FnEnd);

        let routine = Routine {
            name: self.name,
            ops,
        };
        routine.validate()?;
        Ok(routine)
    }

    fn bind(&mut self, branch: &'u str) -> String {
        let ident = self.idents.alloc(branch, "", "_src");
        self.bindings.insert(branch, ident.clone());
        ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ComputedDirective, FreshBinding, SelectionDirective};

    fn selection(input: &str, output: &str, cond: Option<&str>) -> SelectionDirective {
        SelectionDirective {
            input_branch: input.into(),
            output_branch: output.into(),
            datatype: "float".into(),
            selection: cond.map(String::from),
        }
    }

    fn sample_unit() -> GenerationUnit {
        let mut unit = GenerationUnit::new("Out", "Dir/T");
        unit.selections.push(selection("A", "a", Some("> 0")));
        unit.computed.push(ComputedDirective {
            output_branch: "sum".into(),
            functor: "add".into(),
            arguments: vec!["A".into(), "B".into()],
            datatype: "float".into(),
            fresh: vec![FreshBinding {
                branch: "B".into(),
                datatype: "float".into(),
            }],
        });
        unit
    }

    fn find_loop(ops: &[EmitOp]) -> &[EmitOp] {
        for op in ops {
            if let EmitOp::EventLoop { body, .. } = op {
                if let [EmitOp::IfOnly { then_body, .. }] = body.as_slice() {
                    return then_body;
                }
            }
        }
        panic!("no event loop");
    }

    #[test]
    fn test_routine_name() {
        assert_eq!(routine_name(&sample_unit()), "generator_Out_Dir_T");
    }

    #[test]
    fn test_declaration_order() {
        let routine = RoutineBuilder::new(&sample_unit()).build().unwrap();
        let decls: Vec<String> = routine
            .ops
            .iter()
            .filter(|op| !matches!(op, EmitOp::BlankLine))
            .take(10)
            .map(|op| op.to_string())
            .collect();
        assert_eq!(
            decls,
            vec![
                "fn_start generator_Out_Dir_T",
                "select_file output_file",
                "tree Out = Out",
                "reader Dir_T = input_file:Dir/T",
                "var a: float",
                "write Out.a <- a",
                "read A_src: float <- Dir_T.A",
                "var sum: float",
                "write Out.sum <- sum",
                "read B_src: float <- Dir_T.B",
            ]
        );
    }

    #[test]
    fn test_loop_body() {
        let routine = RoutineBuilder::new(&sample_unit()).build().unwrap();
        let body: Vec<String> = find_loop(&routine.ops)
            .iter()
            .map(|op| op.to_string())
            .collect();
        assert_eq!(
            body,
            vec![
                "assign a <- *A_src",
                "compute sum <- add(A_src, B_src)",
                "fill Out",
            ]
        );
    }

    #[test]
    fn test_predicate_collects_selections() {
        let mut unit = sample_unit();
        unit.selections.push(selection("C", "c", Some("< 5")));
        unit.selections.push(selection("D", "d", None));
        let routine = RoutineBuilder::new(&unit).build().unwrap();
        let predicate = routine
            .ops
            .iter()
            .find_map(|op| match op {
                EmitOp::EventLoop { body, .. } => match body.first() {
                    Some(EmitOp::IfOnly { predicate, .. }) => Some(predicate.clone()),
                    _ => None,
                },
                _ => None,
            })
            .unwrap();
        assert_eq!(predicate.to_string(), "*A_src > 0 && *C_src < 5");
    }

    #[test]
    fn test_trivial_predicate_without_selections() {
        let mut unit = GenerationUnit::new("Out", "T");
        unit.selections.push(selection("A", "A", None));
        let routine = RoutineBuilder::new(&unit).build().unwrap();
        let has_true = routine.ops.iter().any(|op| match op {
            EmitOp::EventLoop { body, .. } => {
                matches!(body.first(), Some(EmitOp::IfOnly { predicate, .. }) if predicate.is_trivial())
            }
            _ => false,
        });
        assert!(has_true);
    }

    #[test]
    fn test_identifier_collisions_resolved() {
        // Output tree and input tree share a name; a branch is called like
        // the reader; two branches sanitize to the same identifier.
        let mut unit = GenerationUnit::new("T", "T");
        unit.selections.push(selection("T", "T", None));
        unit.selections.push(selection("x/y", "x/y", None));
        unit.selections.push(selection("x_y", "x_y", None));
        let routine = RoutineBuilder::new(&unit).build().unwrap();
        let vars: Vec<String> = routine
            .ops
            .iter()
            .filter_map(|op| match op {
                EmitOp::TreeDecl { var, .. }
                | EmitOp::ReaderDecl { var, .. }
                | EmitOp::VarDecl { var, .. }
                | EmitOp::ReadBinding { var, .. } => Some(var.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            vars,
            vec!["T", "T_1", "T_2", "T_src", "x_y", "x_y_src", "x_y_1", "x_y_src_1"]
        );
    }

    #[test]
    fn test_output_variable_does_not_shadow_functor() {
        let mut unit = GenerationUnit::new("Out", "T");
        unit.computed.push(ComputedDirective {
            output_branch: "add".into(),
            functor: "add".into(),
            arguments: vec!["A".into(), "B".into()],
            datatype: "float".into(),
            fresh: vec![
                FreshBinding {
                    branch: "A".into(),
                    datatype: "float".into(),
                },
                FreshBinding {
                    branch: "B".into(),
                    datatype: "float".into(),
                },
            ],
        });
        let routine = RoutineBuilder::new(&unit).build().unwrap();
        let decls: Vec<String> = routine
            .ops
            .iter()
            .filter(|op| matches!(op, EmitOp::VarDecl { .. } | EmitOp::WriteBinding { .. }))
            .map(|op| op.to_string())
            .collect();
        assert_eq!(decls, vec!["var add_1: float", "write Out.add <- add_1"]);
        let body: Vec<String> = find_loop(&routine.ops)
            .iter()
            .map(|op| op.to_string())
            .collect();
        assert_eq!(body[0], "compute add_1 <- add(A_src, B_src)");
    }

    #[test]
    fn test_missing_binding_is_internal_error() {
        let mut unit = GenerationUnit::new("Out", "T");
        unit.computed.push(ComputedDirective {
            output_branch: "x".into(),
            functor: "f".into(),
            arguments: vec!["A".into()],
            datatype: "float".into(),
            fresh: vec![],
        });
        let err = RoutineBuilder::new(&unit).build().unwrap_err();
        assert!(matches!(err, GenerateError::Internal(_)));
    }

    #[test]
    fn test_with_name_overrides() {
        let routine = RoutineBuilder::with_name(&sample_unit(), "generator_x".into())
            .build()
            .unwrap();
        assert_eq!(routine.name, "generator_x");
    }
}
