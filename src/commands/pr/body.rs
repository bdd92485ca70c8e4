//! PR body rendering (C9 Phase E): the delimited block the orchestrator owns.

use crate::depgraph::DependencyGraph;
use crate::forge::PrInfo;
use crate::snapshot::Snapshot;
use anyhow::Result;
use std::collections::HashMap;

pub const BEGIN_MARKER: &str = "<!-- mistletoe:begin -->";
pub const END_MARKER: &str = "<!-- mistletoe:end -->";

/// Render the delimited block for `this_id`'s PR body.
pub fn render_block(
    this_id: &str,
    other_ids: &[String],
    related: &HashMap<String, Vec<PrInfo>>,
    depgraph: &DependencyGraph,
    snapshot: &Snapshot,
) -> Result<String> {
    let mut out = String::new();
    out.push_str(BEGIN_MARKER);
    out.push('\n');

    let mut any_related = false;
    let mut related_section = String::new();
    for id in other_ids {
        let prs = related.get(id).map(Vec::as_slice).unwrap_or(&[]);
        if prs.is_empty() {
            continue;
        }
        any_related = true;
        related_section.push_str(&format!("- **{id}**\n"));
        for state in ["OPEN", "MERGED", "CLOSED"] {
            let matching: Vec<&str> = prs
                .iter()
                .filter(|p| p.state.eq_ignore_ascii_case(state))
                .map(|p| p.url.as_str())
                .collect();
            if matching.is_empty() {
                continue;
            }
            related_section.push_str(&format!("  - {state}: {}\n", matching.join(", ")));
        }
    }
    if any_related {
        out.push_str("### Related Pull Requests\n\n");
        out.push_str(&related_section);
        out.push('\n');
    }

    if !depgraph.is_empty() {
        let depends = depgraph.depends_on(this_id);
        let dependents = depgraph.dependents_of(this_id);
        if !depends.is_empty() || !dependents.is_empty() {
            out.push_str("### Dependencies\n\n");
            if !depends.is_empty() {
                out.push_str(&format!("This repo depends on: {}\n", depends.join(", ")));
            }
            if !dependents.is_empty() {
                out.push_str(&format!(
                    "Dependents of this repo: {}\n",
                    dependents.join(", ")
                ));
            }
            out.push('\n');
        }
    }

    out.push_str(&snapshot.render()?);
    out.push_str(END_MARKER);
    Ok(out)
}

/// Replace the delimited block in `existing_body` in place, or append it when
/// no block is present. The only region this function writes is the block
/// itself; everything outside it is byte-identical.
pub fn apply_block(existing_body: &str, block: &str) -> String {
    match (existing_body.find(BEGIN_MARKER), existing_body.find(END_MARKER)) {
        (Some(start), Some(end)) if end > start => {
            let end_full = end + END_MARKER.len();
            format!(
                "{}{}{}",
                &existing_body[..start],
                block,
                &existing_body[end_full..]
            )
        }
        _ if existing_body.trim().is_empty() => block.to_string(),
        _ => format!("{}\n\n{}", existing_body.trim_end(), block),
    }
}

/// Whether `body` already contains a mistletoe block (used by the permission
/// check: replacement of another user's PR is only allowed when the
/// orchestrator already owns a region of it).
pub fn has_block(body: &str) -> bool {
    body.contains(BEGIN_MARKER) && body.contains(END_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotEntry;

    fn sample_snapshot() -> Snapshot {
        Snapshot(vec![SnapshotEntry {
            id: "repoA".to_string(),
            url: "https://example.com/org/repoa.git".to_string(),
            branch: "feature".to_string(),
            revision: "a".repeat(40),
        }])
    }

    #[test]
    fn omits_dependencies_section_when_graph_is_empty() {
        let block = render_block(
            "repoA",
            &[],
            &HashMap::new(),
            &DependencyGraph::default(),
            &sample_snapshot(),
        )
        .unwrap();
        assert!(!block.contains("Dependencies"));
    }

    #[test]
    fn appends_block_when_body_has_none() {
        let block = "<!-- mistletoe:begin -->x<!-- mistletoe:end -->";
        let result = apply_block("Hello", block);
        assert_eq!(result, "Hello\n\n<!-- mistletoe:begin -->x<!-- mistletoe:end -->");
    }

    #[test]
    fn replaces_existing_block_byte_identically_outside_it() {
        let original = "Hello\n\n<!-- mistletoe:begin -->old<!-- mistletoe:end -->";
        let replaced = apply_block(original, "<!-- mistletoe:begin -->new<!-- mistletoe:end -->");
        assert_eq!(
            replaced,
            "Hello\n\n<!-- mistletoe:begin -->new<!-- mistletoe:end -->"
        );
    }

    #[test]
    fn second_update_with_identical_state_is_idempotent() {
        let first = apply_block("Hello", "<!-- mistletoe:begin -->a<!-- mistletoe:end -->");
        let second = apply_block(&first, "<!-- mistletoe:begin -->a<!-- mistletoe:end -->");
        assert_eq!(first, second);
    }
}
