//! Import flattening (`spec.md` 4.2): a depth-first walk that splices each
//! imported file's nodes in at the `Import` node's position, skipping
//! (with a warning) any file already seen by canonical path.

use crate::error::{Error, Result};
use crate::ir::{build_nodes, Node};
use crate::parser::{Rule, VASMParser};
use pest::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub fn flatten(root: &Path, nodes: Vec<Node>) -> Result<Vec<Node>> {
    let mut seen = HashSet::new();
    if let Ok(canon) = root.canonicalize() {
        seen.insert(canon);
    }
    flatten_inner(root, nodes, &mut seen)
}

fn flatten_inner(current_dir: &Path, nodes: Vec<Node>, seen: &mut HashSet<PathBuf>) -> Result<Vec<Node>> {
    let base = current_dir.parent().unwrap_or_else(|| Path::new("."));
    let mut out = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::Import { filename, .. } => {
                let path = base.join(&filename);
                let canon = path.canonicalize().map_err(|err| Error::Import {
                    message: format!("cannot import \"{}\": {}", filename, err),
                })?;

                if !seen.insert(canon.clone()) {
                    log::warn!("duplicate or circular import of \"{}\", skipping", filename);
                    continue;
                }

                let source = std::fs::read_to_string(&path).map_err(|err| Error::Import {
                    message: format!("cannot import \"{}\": {}", filename, err),
                })?;
                let program = VASMParser::parse(Rule::program, &source)?.next().unwrap();
                let imported = build_nodes(program)?;
                let flattened = flatten_inner(&path, imported, seen)?;
                out.extend(flattened);
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
