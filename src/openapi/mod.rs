/*!
Swagger 2.0 description of a command tree.

Every node becomes a `GET` operation keyed by the "/"-joined chain of names
from the root. Parameters are one `string` query parameter per flag (node
flag order) plus a trailing `argv` array for positional arguments. The
document is rebuilt from the live tree on every request and rendered in one
serializer pass, header included.
*/

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::error::Result;
use crate::server::ServerConfig;
use crate::tree::CommandNode;

pub const SWAGGER_VERSION: &str = "2.0";

/// Reserved query parameter carrying comma separated positional arguments.
pub const ARGV_PARAM: &str = "argv";

/* ---- Document Model ---- */

#[derive(Debug, Serialize)]
pub struct SpecDocument {
    pub swagger: &'static str,
    pub info: Info,
    pub paths: Paths,
}

#[derive(Debug, Serialize)]
pub struct Info {
    pub description: String,
    pub version: String,
    pub title: String,
}

/// Path table kept in depth-first declaration order.
#[derive(Debug, Default)]
pub struct Paths(Vec<(String, PathItem)>);

impl Paths {
    pub fn get(&self, path: &str) -> Option<&PathItem> {
        self.0.iter().find(|(p, _)| p == path).map(|(_, item)| item)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(p, _)| p.as_str())
    }
}

impl Serialize for Paths {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, item) in &self.0 {
            map.serialize_entry(path, item)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct PathItem {
    pub get: Operation,
}

#[derive(Debug, Serialize)]
pub struct Operation {
    pub summary: String,
    pub parameters: Vec<Parameter>,
    pub responses: BTreeMap<String, ResponseEntry>,
}

#[derive(Debug, Serialize)]
pub struct Parameter {
    #[serde(rename = "in")]
    pub location: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct Items {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResponseEntry {
    pub description: String,
}

/* ---- Generation ---- */

impl Operation {
    fn for_node(node: &CommandNode) -> Self {
        let mut parameters: Vec<Parameter> = node
            .flags()
            .iter()
            .map(|flag| Parameter {
                location: "query",
                kind: "string",
                name: flag.name.clone(),
                description: flag.help.clone(),
                items: None,
                collection_format: None,
            })
            .collect();
        parameters.push(Parameter {
            location: "query",
            kind: "array",
            name: ARGV_PARAM.to_string(),
            description: None,
            items: Some(Items { kind: "string" }),
            collection_format: Some("csv"),
        });

        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            ResponseEntry {
                description: "OK".to_string(),
            },
        );

        Operation {
            summary: node.about().unwrap_or_default().to_string(),
            parameters,
            responses,
        }
    }
}

/// Describe every node of `tree` as an addressable operation.
pub fn generate(tree: &CommandNode, config: &ServerConfig) -> SpecDocument {
    let mut paths = Vec::new();
    tree.walk(&mut |path, node| {
        paths.push((
            path.to_string(),
            PathItem {
                get: Operation::for_node(node),
            },
        ));
    });

    SpecDocument {
        swagger: SWAGGER_VERSION,
        info: Info {
            description: config.description().to_string(),
            version: config.version().to_string(),
            title: config.root_name().to_string(),
        },
        paths: Paths(paths),
    }
}

impl SpecDocument {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
