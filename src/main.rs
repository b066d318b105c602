use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

mod cmd;

use cmd::{AddArgs, LongestArgs, SpecArgs};

/// Example CLI served over HTTP by garter.
///
/// Command layout:
///   example [--val N] [ARGS...]
///   example [--val N] add [--five[=BOOL]] [--ten[=BOOL]] [ARGS...]
///   example [--val N] longest [ARGS...]
///   example server [--port P] [--timeout SECS] [-v|-q]   (hidden)
///   example spec [--json]                                (hidden)
///
/// Over HTTP (after `example server`):
///   GET /swaggerui                          viewer
///   GET /swagger                            description document
///   GET /example/add?five=true&val=3        -> example add --val=3 --five=true
///   GET /example/longest?argv=a,bbb,cc      -> example longest a bbb cc
#[derive(Parser, Debug)]
#[command(
    name = "example",
    version,
    about = "Example CLI served over HTTP by garter",
    long_about = None,
    args_conflicts_with_subcommands = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Value used by other commands
    #[arg(long, global = true, value_name = "N")]
    val: Option<i64>,

    /// Positional arguments for the root command
    args: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add 5 and/or 10 to val
    Add(AddArgs),

    /// Print the longest argument
    Longest(LongestArgs),

    /// Print the generated description document
    #[command(hide = true)]
    Spec(SpecArgs),

    /// HTTP server for this command tree; use /swaggerui to see available commands
    #[command(hide = true)]
    Server(garter::ServeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Add(args)) => cmd::execute_add(args, cli.val),
        Some(Commands::Longest(args)) => cmd::execute_longest(args, cli.val),
        Some(Commands::Spec(args)) => cmd::execute_spec(args, Cli::command()),
        Some(Commands::Server(args)) => args.run(Cli::command()),
        None => {
            println!(
                "example {} {}",
                cli.val.unwrap_or(0),
                cmd::bracketed(&cli.args)
            );
            Ok(())
        }
    }
}
