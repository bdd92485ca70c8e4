//! Snapshot format (C10): the embedded machine-readable record of exactly
//! what was pushed, used both as PR documentation and as the recipe for
//! `pr checkout`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const FENCE_LANG: &str = "mistletoe-snapshot";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub id: String,
    pub url: String,
    pub branch: String,
    pub revision: String,
}

/// An ordered list of snapshot entries, one per workspace repo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(pub Vec<SnapshotEntry>);

fn is_hex_sha(s: &str) -> bool {
    s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit())
}

impl Snapshot {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.0 {
            if entry.id.is_empty() || entry.url.is_empty() || entry.branch.is_empty() {
                bail!("snapshot entry for '{}' is missing a required field", entry.id);
            }
            if !is_hex_sha(&entry.revision) {
                bail!("snapshot entry for '{}' has a non-hex revision", entry.id);
            }
            if !seen.insert(entry.id.clone()) {
                bail!("snapshot has duplicate id: {}", entry.id);
            }
        }
        Ok(())
    }

    /// Render as a fenced `mistletoe-snapshot` block, e.g. for embedding in
    /// a PR body.
    pub fn render(&self) -> Result<String> {
        self.validate()?;
        let json = serde_json::to_string_pretty(&self.0).context("failed to serialize snapshot")?;
        Ok(format!("```{FENCE_LANG}\n{json}\n```\n"))
    }

    /// Parse a fenced `mistletoe-snapshot` block out of arbitrary text (e.g.
    /// a PR body) and validate it strictly.
    pub fn parse(text: &str) -> Result<Self> {
        let opener = format!("```{FENCE_LANG}");
        let start = text
            .find(&opener)
            .context("no mistletoe-snapshot block found")?;
        let after_opener = start + opener.len();
        let body_start = text[after_opener..]
            .find('\n')
            .map(|i| after_opener + i + 1)
            .unwrap_or(after_opener);
        let closer_rel = text[body_start..]
            .find("```")
            .context("mistletoe-snapshot block is not closed")?;
        let body = &text[body_start..body_start + closer_rel];

        let entries: Vec<SnapshotEntry> =
            serde_json::from_str(body.trim()).context("malformed mistletoe-snapshot JSON")?;
        let snapshot = Snapshot(entries);
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot(vec![
            SnapshotEntry {
                id: "repoA".to_string(),
                url: "https://example.com/org/repoa.git".to_string(),
                branch: "feature".to_string(),
                revision: "a".repeat(40),
            },
            SnapshotEntry {
                id: "repoB".to_string(),
                url: "https://example.com/org/repob.git".to_string(),
                branch: "feature".to_string(),
                revision: "b".repeat(40),
            },
        ])
    }

    #[test]
    fn round_trips_through_render_and_parse() {
        let original = sample();
        let rendered = original.render().unwrap();
        let parsed = Snapshot::parse(&rendered).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn parse_finds_block_inside_larger_body() {
        let rendered = sample().render().unwrap();
        let body = format!("Some PR text.\n\n<!-- mistletoe:begin -->\n{rendered}<!-- mistletoe:end -->\n");
        let parsed = Snapshot::parse(&body).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn rejects_non_hex_revision() {
        let mut bad = sample();
        bad.0[0].revision = "not-hex".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut bad = sample();
        bad.0[1].id = "repoA".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_missing_keys_in_json() {
        let text = format!(
            "```{FENCE_LANG}\n[{{\"id\": \"repoA\", \"url\": \"https://x\"}}]\n```\n"
        );
        assert!(Snapshot::parse(&text).is_err());
    }
}
