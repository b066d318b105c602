/*!
HTTP request -> command line.

  /<root>/<seg>/<seg>?<flag>=<value>&argv=a,b,c

becomes

  <exec> <seg> <seg> --<flag>=<value> a b c

Resolved path segments come first (they are the subcommand invocation),
then flags in the node's flag order (not query order), then the `argv`
pieces in their original order. Nothing is executed here.
*/

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::openapi::ARGV_PARAM;
use crate::tree::CommandNode;

/// A fully ordered invocation of the re-invocation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// Shell-quoted rendering for logs.
    pub fn command_line(&self) -> String {
        let program = self.program.to_string_lossy();
        let words = std::iter::once(program.as_ref()).chain(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

pub struct RequestMapper<'a> {
    tree: &'a CommandNode,
    exec_path: &'a Path,
}

impl<'a> RequestMapper<'a> {
    pub fn new(tree: &'a CommandNode, exec_path: &'a Path) -> Self {
        Self { tree, exec_path }
    }

    /// Map a request path (`/<root>/...`) and raw query string to an invocation.
    ///
    /// The first path segment is the root name and is not checked here; the
    /// router only forwards requests carrying the root prefix.
    pub fn map(&self, path: &str, query: Option<&str>) -> Result<Invocation> {
        let mut node = self.tree;
        let mut args = Vec::new();
        let mut resolved = format!("/{}", self.tree.name());

        for raw in path.split('/').skip(2) {
            let segment = decode_segment(raw);
            match node.child(&segment) {
                Some(child) => {
                    node = child;
                    resolved.push('/');
                    resolved.push_str(&segment);
                    args.push(segment.into_owned());
                }
                None => {
                    return Err(Error::UnknownPath {
                        segment: segment.into_owned(),
                        resolved,
                    });
                }
            }
        }

        let query = QueryParams::parse(query.unwrap_or_default());
        for flag in node.flags() {
            if let Some(value) = query.get(&flag.name) {
                args.push(format!("--{}={}", flag.name, value));
            }
        }
        if let Some(argv) = query.get(ARGV_PARAM) {
            args.extend(argv.split(',').map(str::to_string));
        }

        Ok(Invocation {
            program: self.exec_path.to_path_buf(),
            args,
        })
    }
}

fn decode_segment(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Decoded query pairs; lookups take the first value of a key and treat an
/// empty one as absent (later duplicates are never consulted).
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(raw: &str) -> Self {
        Self(form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}
