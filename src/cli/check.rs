use clap::Args;

use babymaker::api::Resolved;

use super::{load_inputs, InputArgs};

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

pub fn cmd_check(args: CheckArgs) {
    let inputs = load_inputs(&args.inputs);
    let resolved = match Resolved::build(&inputs.schema, &inputs.config) {
        Ok(r) => r,
        Err(e) => inputs.fail(e),
    };
    let warnings: Vec<_> = resolved.diagnostics().cloned().collect();
    inputs.render(&warnings);
    eprintln!(
        "OK: {} ({} unit(s), {} warning(s))",
        args.inputs.config.display(),
        resolved.units().count(),
        warnings.len()
    );
}
