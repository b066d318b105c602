//! Garter - serve a clap command tree over HTTP.
//!
//! The tree is snapshotted once ([`tree::build`]), described as a Swagger 2.0
//! document ([`openapi::generate`]) and exposed so that
//! `GET /<root>/<sub>?flag=v&argv=a,b` re-invokes the running executable as
//! `<exe> <sub> --flag=v a b` ([`mapper`], [`executor`], [`server`]).
//!
//! Embedding in a derive-based CLI:
//!
//! ```no_run
//! use clap::{CommandFactory, Parser, Subcommand};
//!
//! #[derive(Parser)]
//! #[command(name = "tool")]
//! struct Cli {
//!     #[command(subcommand)]
//!     command: Commands,
//! }
//!
//! #[derive(Subcommand)]
//! enum Commands {
//!     #[command(hide = true)]
//!     Server(garter::ServeArgs),
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     match Cli::parse().command {
//!         Commands::Server(args) => args.run(Cli::command()),
//!     }
//! }
//! ```

pub mod error;
pub mod executor;
pub mod mapper;
pub mod openapi;
pub mod server;
pub mod tree;
pub mod utils;

pub use error::{Error, Result};
pub use executor::{CapturedOutput, CommandExecutor, Overflow};
pub use mapper::{Invocation, RequestMapper};
pub use openapi::SpecDocument;
pub use server::{AppState, ServeArgs, ServeOptions, ServerConfig, build_router, serve};
pub use tree::{CommandNode, CommandSource, Flag, FlagKind};
