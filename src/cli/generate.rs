use std::path::PathBuf;

use clap::Args;

use babymaker::api::{generate, write_artifact, GenerateOptions};

use super::{build_timestamp, load_inputs, InputArgs};

#[derive(Args)]
pub struct GenArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    /// Output .cpp file (default: <config stem>.cpp)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Rewrite the output even if it is up to date
    #[arg(long)]
    pub force: bool,
    /// Leave the generation time out of the header
    #[arg(long)]
    pub no_timestamp: bool,
}

pub fn cmd_generate(args: GenArgs) {
    let inputs = load_inputs(&args.inputs);
    let options = if args.no_timestamp {
        GenerateOptions::default()
    } else {
        GenerateOptions::with_timestamp(build_timestamp())
    };

    let generated = match generate(&inputs.schema, &inputs.config, &options) {
        Ok(g) => g,
        Err(e) => inputs.fail(e),
    };
    inputs.render(&generated.diagnostics);

    let output = args
        .output
        .unwrap_or_else(|| inputs.config_path.with_extension("cpp"));
    match write_artifact(&output, &generated, args.force) {
        Ok(true) => eprintln!(
            "Generated {} ({} routine(s))",
            output.display(),
            generated.units.len()
        ),
        Ok(false) => eprintln!("Up to date: {}", output.display()),
        Err(e) => inputs.fail(e),
    }
}
