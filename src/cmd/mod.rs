/*!
Subcommands of the `example` demo CLI.

Layout:
  src/cmd/
    mod.rs      (this file)
    add.rs      (AddArgs     + execute_add)
    longest.rs  (LongestArgs + execute_longest)
    spec.rs     (SpecArgs    + execute_spec)

Conventions:
  - Each module exposes one `execute_*` function returning `anyhow::Result<()>`.
  - The inherited `--val` flag is resolved in main.rs and passed in.
  - `server` is not here; it is `garter::ServeArgs` from the library.
*/

pub mod add;
pub mod longest;
pub mod spec;

pub use add::{AddArgs, execute_add};
pub use longest::{LongestArgs, execute_longest};
pub use spec::{SpecArgs, execute_spec};

/// Render positional args the way the demo prints them: `[a b c]`.
pub fn bracketed(args: &[String]) -> String {
    format!("[{}]", args.join(" "))
}
