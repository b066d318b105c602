//! [`CommandSource`] for `clap::Command`.
//!
//! Mapping:
//!   global args      -> inheritable flags
//!   named args       -> own flags (by long name; short-only args cannot be spelled `--name=value`)
//!   positionals, hidden args, help / version actions -> ignored
//!   Append action or multi-value args -> FlagKind::Array

use clap::{Arg, ArgAction, Command};

use super::{CommandSource, Flag, FlagKind};

impl CommandSource for Command {
    fn name(&self) -> &str {
        self.get_name()
    }

    fn about(&self) -> Option<String> {
        self.get_about().map(|s| s.to_string())
    }

    fn is_hidden(&self) -> bool {
        self.is_hide_set()
    }

    fn own_flags(&self) -> Vec<Flag> {
        self.get_arguments().filter_map(to_flag).collect()
    }

    fn inheritable_flags(&self) -> Vec<Flag> {
        self.get_arguments()
            .filter(|a| a.is_global_set())
            .filter_map(to_flag)
            .collect()
    }

    fn children(&self) -> Vec<&Self> {
        self.get_subcommands().collect()
    }
}

fn to_flag(arg: &Arg) -> Option<Flag> {
    if arg.is_positional() || arg.is_hide_set() {
        return None;
    }
    if matches!(
        arg.get_action(),
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    ) {
        return None;
    }
    let long = arg.get_long()?;
    let flag = Flag::new(long, flag_kind(arg));
    Some(match arg.get_help() {
        Some(help) => flag.with_help(help.to_string()),
        None => flag,
    })
}

fn flag_kind(arg: &Arg) -> FlagKind {
    let multi = arg
        .get_num_args()
        .map(|range| range.max_values() > 1)
        .unwrap_or(false);
    if multi || matches!(arg.get_action(), ArgAction::Append) {
        FlagKind::Array
    } else {
        FlagKind::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree;

    fn demo() -> Command {
        Command::new("example")
            .about("Example CLI")
            .arg(
                Arg::new("val")
                    .long("val")
                    .global(true)
                    .help("Value used by other commands"),
            )
            .subcommand(
                Command::new("add")
                    .about("Add to val")
                    .arg(Arg::new("five").long("five").action(ArgAction::SetTrue))
                    .arg(Arg::new("ten").long("ten").action(ArgAction::SetTrue))
                    .arg(Arg::new("tags").long("tag").action(ArgAction::Append))
                    .arg(Arg::new("args").num_args(0..)),
            )
            .subcommand(Command::new("server").hide(true))
            .subcommand(Command::new("completions"))
    }

    #[test]
    fn clap_tree_matches_declaration() {
        let tree = tree::build(&demo());
        assert_eq!(tree.name(), "example");
        assert_eq!(tree.about(), Some("Example CLI"));
        let kids: Vec<_> = tree.children().map(|c| c.name()).collect();
        assert_eq!(kids, vec!["add"]);

        let add = tree.child("add").unwrap();
        let flags: Vec<_> = add.flags().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(flags, vec!["val", "five", "ten", "tag"]);
    }

    #[test]
    fn append_args_are_arrays() {
        let tree = tree::build(&demo());
        let add = tree.child("add").unwrap();
        let tag = add.flags().iter().find(|f| f.name == "tag").unwrap();
        assert_eq!(tag.kind, FlagKind::Array);
        let five = add.flags().iter().find(|f| f.name == "five").unwrap();
        assert_eq!(five.kind, FlagKind::String);
    }

    #[test]
    fn help_text_is_carried() {
        let tree = tree::build(&demo());
        assert_eq!(
            tree.flags()[0].help.as_deref(),
            Some("Value used by other commands")
        );
    }

    #[test]
    fn built_command_does_not_duplicate_globals() {
        let mut cmd = demo();
        cmd.build();
        let tree = tree::build(&cmd);
        let add = tree.child("add").unwrap();
        let vals = add.flags().iter().filter(|f| f.name == "val").count();
        assert_eq!(vals, 1);
        assert!(add.flags().iter().all(|f| f.name != "help"));
    }

    #[test]
    fn short_only_and_hidden_args_are_not_flags() {
        let cmd = Command::new("root")
            .arg(Arg::new("x").short('x').action(ArgAction::SetTrue))
            .arg(Arg::new("secret").long("secret").hide(true));
        let tree = tree::build(&cmd);
        assert!(tree.flags().is_empty());
    }
}
