/*!
Command tree snapshot.

A CLI definition (anything implementing [`CommandSource`]) is walked once at
startup and frozen into a [`CommandNode`] tree. The tree is never mutated
afterwards, so it can be shared behind an `Arc` and read from every request
without locking.

Rules applied while walking:
  - a node's flag list = flags inherited from all ancestors (in order) + the
    flags declared on the node itself; a name never appears twice
  - inheritable flags travel downward only (never to siblings)
  - hidden children and children whose name starts with `help` or
    `completion` are skipped together with their whole subtree
  - children keep declaration order; a name index gives O(1) lookup
*/

pub mod clap_source;

use std::collections::HashMap;
use std::fmt;

/// Name prefixes of generated documentation / shell-completion subcommands.
pub const RESERVED_PREFIXES: &[&str] = &["help", "completion"];

/* ---- Capability Interface ---- */

/// Value shape of a flag, as far as the description document cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Array,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::String => "string",
            FlagKind::Array => "array",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flag as exposed by a CLI definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub name: String,
    pub kind: FlagKind,
    pub help: Option<String>,
}

impl Flag {
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            kind,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Narrow view of a CLI framework's command object.
///
/// `own_flags` returns every flag declared on the node (local and
/// inheritable, declaration order). `inheritable_flags` returns the subset
/// that also applies to descendants.
pub trait CommandSource {
    fn name(&self) -> &str;

    fn about(&self) -> Option<String> {
        None
    }

    fn is_hidden(&self) -> bool;

    fn own_flags(&self) -> Vec<Flag>;

    fn inheritable_flags(&self) -> Vec<Flag>;

    fn children(&self) -> Vec<&Self>;
}

/* ---- Snapshot ---- */

#[derive(Debug, Clone)]
pub struct CommandNode {
    name: String,
    about: Option<String>,
    flags: Vec<Flag>,
    children: Vec<CommandNode>,
    index: HashMap<String, usize>,
}

impl CommandNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// Inherited flags followed by the node's own flags.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Children in declaration order.
    pub fn children(&self) -> impl Iterator<Item = &CommandNode> {
        self.children.iter()
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.index.get(name).map(|&i| &self.children[i])
    }

    /// Depth-first visit with the "/"-joined name chain of each node.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&str, &'a CommandNode)) {
        self.walk_from("", visit);
    }

    fn walk_from<'a>(&'a self, parent: &str, visit: &mut dyn FnMut(&str, &'a CommandNode)) {
        let path = format!("{parent}/{}", self.name);
        visit(&path, self);
        for child in &self.children {
            child.walk_from(&path, visit);
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.is_empty() && self.children.is_empty() {
            return f.write_str(&self.name);
        }
        let flags = self
            .flags
            .iter()
            .map(|fl| fl.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let children = self
            .children
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}: ({}) [{}]", self.name, flags, children)
    }
}

/* ---- Builder ---- */

/// Whether a child definition is left out of the tree.
pub fn is_excluded<S: CommandSource + ?Sized>(source: &S) -> bool {
    source.is_hidden()
        || RESERVED_PREFIXES
            .iter()
            .any(|prefix| source.name().starts_with(prefix))
}

/// Walk a CLI definition and freeze it into a [`CommandNode`] tree.
pub fn build<S: CommandSource>(root: &S) -> CommandNode {
    build_node(root, &[])
}

fn build_node<S: CommandSource>(source: &S, inherited: &[Flag]) -> CommandNode {
    let mut flags = inherited.to_vec();
    extend_unique(&mut flags, source.own_flags());

    let mut passdown = inherited.to_vec();
    extend_unique(&mut passdown, source.inheritable_flags());

    let mut children = Vec::new();
    let mut index = HashMap::new();
    for child in source.children() {
        if is_excluded(child) {
            tracing::trace!(parent = source.name(), child = child.name(), "skipping command");
            continue;
        }
        if index.contains_key(child.name()) {
            tracing::warn!(
                parent = source.name(),
                child = child.name(),
                "duplicate subcommand name, keeping the first declaration"
            );
            continue;
        }
        index.insert(child.name().to_string(), children.len());
        children.push(build_node(child, &passdown));
    }

    CommandNode {
        name: source.name().to_string(),
        about: source.about(),
        flags,
        children,
        index,
    }
}

fn extend_unique(into: &mut Vec<Flag>, more: Vec<Flag>) {
    for flag in more {
        if !into.iter().any(|f| f.name == flag.name) {
            into.push(flag);
        }
    }
}
