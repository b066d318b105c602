use anyhow::{Context, Result};
use clap::Args;

use garter::{ServerConfig, openapi, tree};

#[derive(Args, Debug)]
pub struct SpecArgs {
    /// Print JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// Print the description document `/swagger` would serve.
pub fn execute_spec(args: SpecArgs, root: clap::Command) -> Result<()> {
    let config = ServerConfig::from_command(&root)?;
    let doc = openapi::generate(&tree::build(&root), &config);
    let rendered = if args.json {
        doc.to_json_pretty()
    } else {
        doc.to_yaml()
    }
    .context("Failed to render description document")?;
    print!("{rendered}");
    if args.json {
        println!();
    }
    Ok(())
}
