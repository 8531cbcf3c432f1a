use clap::Args;

use babymaker::api::Resolved;

use super::{load_inputs, InputArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Print every unit's directives without generating code.
pub fn cmd_plan(args: PlanArgs) {
    let inputs = load_inputs(&args.inputs);
    let resolved = match Resolved::build(&inputs.schema, &inputs.config) {
        Ok(r) => r,
        Err(e) => inputs.fail(e),
    };
    let warnings: Vec<_> = resolved.diagnostics().cloned().collect();
    inputs.render(&warnings);
    for (output_tree, spec) in inputs.config.iter() {
        if spec.keep.is_empty() && spec.drop.is_empty() {
            continue;
        }
        println!(
            "{}: keep [{}] drop [{}]",
            output_tree,
            spec.keep.sources().join(", "),
            spec.drop.sources().join(", ")
        );
    }
    println!();
    for unit in resolved.units() {
        println!("{}", unit);
    }
}
