//! Dependency-graph parser/validator (C3).
//!
//! Parses the restricted mermaid-flavored edge list stored at
//! `.mstl/dependency-graph.md`, validates every node against the manifest's
//! repo ids, and exposes forward/reverse adjacency for the PR body renderer.

use crate::errors::CoreError;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};

/// A validated dependency graph over manifest repo ids.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// `forward[x]` = the set of ids that `x` depends on.
    forward: HashMap<String, BTreeSet<String>>,
    /// `reverse[x]` = the set of ids that depend on `x`.
    reverse: HashMap<String, BTreeSet<String>>,
    /// Original edge list in source order, for rendering/round-tripping.
    edges: Vec<(String, String)>,
}

impl DependencyGraph {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Ids that `id` depends on, in stable (sorted) order.
    pub fn depends_on(&self, id: &str) -> Vec<&str> {
        self.forward
            .get(id)
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Ids that depend on `id`, in stable (sorted) order.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.reverse
            .get(id)
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }
}

/// Parse and validate a dependency-graph file's contents against the set of
/// known manifest ids.
pub fn parse_and_validate(text: &str, known_ids: &BTreeSet<String>) -> Result<DependencyGraph> {
    let body = extract_fenced_block(text);
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut lines = lines.into_iter().peekable();
    if let Some(first) = lines.peek() {
        if first.eq_ignore_ascii_case("graph td") || first.eq_ignore_ascii_case("graph lr") {
            lines.next();
        }
    }

    let mut graph = DependencyGraph::default();
    let mut seen_edges = BTreeSet::new();
    let mut bare_nodes = BTreeSet::new();

    for line in lines {
        if let Some((src, dst)) = parse_edge_line(line)? {
            if src == dst {
                return Err(CoreError::SelfLoop(src).into());
            }
            if !known_ids.contains(&src) {
                return Err(CoreError::UnknownNode(src).into());
            }
            if !known_ids.contains(&dst) {
                return Err(CoreError::UnknownNode(dst).into());
            }
            if seen_edges.insert((src.clone(), dst.clone())) {
                graph.edges.push((src.clone(), dst.clone()));
                graph
                    .forward
                    .entry(src.clone())
                    .or_default()
                    .insert(dst.clone());
                graph.reverse.entry(dst).or_default().insert(src);
            }
        } else {
            let node = parse_bare_node(line)?;
            if !known_ids.contains(&node) {
                return Err(CoreError::UnknownNode(node).into());
            }
            bare_nodes.insert(node);
        }
    }

    Ok(graph)
}

/// Returns the contents between a `` ```mermaid `` opener and its matching
/// `` ``` `` closer, or the entire input if no such fence is present (a file
/// that contains exactly an edge section, no fences at all).
fn extract_fenced_block(text: &str) -> String {
    let mut in_block = false;
    let mut out = String::new();
    let mut found_fence = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.to_ascii_lowercase().starts_with("```mermaid") {
            in_block = true;
            found_fence = true;
            continue;
        }
        if in_block && trimmed == "```" {
            break;
        }
        if in_block {
            out.push_str(line);
            out.push('\n');
        }
    }

    if found_fence {
        out
    } else {
        text.to_string()
    }
}

/// Parses `A --> B`, returning `None` if the line isn't an edge (so the
/// caller can try a bare-node parse instead).
fn parse_edge_line(line: &str) -> Result<Option<(String, String)>> {
    let Some(pos) = line.find("-->") else {
        return Ok(None);
    };
    let (left, right) = (line[..pos].trim(), line[pos + 3..].trim());
    let src = parse_id(left)?;
    let dst = parse_id(right)?;
    Ok(Some((src, dst)))
}

fn parse_bare_node(line: &str) -> Result<String> {
    parse_id(line)
}

/// An id is a bare identifier (`[A-Za-z0-9_-]+`) or a double-quoted string
/// with no internal double quote. Anything else is a `BadEdge`.
fn parse_id(token: &str) -> Result<String> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CoreError::BadEdge(token.to_string()).into());
    }
    if let Some(inner) = token.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        if inner.is_empty() || inner.contains('"') {
            return Err(CoreError::BadEdge(token.to_string()).into());
        }
        return Ok(inner.to_string());
    }
    let is_bare = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if is_bare {
        Ok(token.to_string())
    } else {
        Err(CoreError::BadEdge(token.to_string()).into())
    }
}
