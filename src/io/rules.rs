//! Plain-text adjacency rule files
//!
//! One entry per line, `source: neighbour, neighbour, ...`. Terrain names are
//! case-insensitive, neighbours may be separated by commas or whitespace, and
//! `#` starts a comment. Every terrain needs exactly one entry.
//!
//! ```text
//! # grass borders almost anything
//! grass:    grass, forest, desert, water
//! water:    water grass desert
//! ```

use crate::algorithm::bitset::TerrainSet;
use crate::io::error::{GenerationError, Result};
use crate::terrain::{AdjacencyRules, Terrain};
use std::fmt::Write as _;
use std::path::Path;

/// Parse a rule table from text
///
/// `origin` only labels errors.
///
/// # Errors
///
/// Returns [`GenerationError::RuleFile`] for a malformed line or unknown
/// terrain, and [`GenerationError::InvalidRules`] if the entries do not form
/// a complete table.
pub fn parse_rules(text: &str, origin: &Path) -> Result<AdjacencyRules> {
    let mut entries = Vec::new();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let fail = |reason: String| GenerationError::RuleFile {
            path: origin.to_path_buf(),
            line: number + 1,
            reason,
        };

        let (source, neighbours) = line
            .split_once(':')
            .ok_or_else(|| fail("expected 'terrain: neighbours'".to_string()))?;
        let source: Terrain = source
            .parse()
            .map_err(|e: GenerationError| fail(e.to_string()))?;

        let mut allowed = TerrainSet::empty();
        for name in neighbours
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
        {
            let terrain: Terrain = name
                .parse()
                .map_err(|e: GenerationError| fail(e.to_string()))?;
            allowed.insert(terrain);
        }
        entries.push((source, allowed));
    }

    AdjacencyRules::from_entries(entries)
}

/// Load a rule table from a file
///
/// # Errors
///
/// Returns [`GenerationError::FileSystem`] if the file cannot be read, or
/// any error of [`parse_rules`].
pub fn load_rules(path: &Path) -> Result<AdjacencyRules> {
    let text = std::fs::read_to_string(path).map_err(|e| GenerationError::FileSystem {
        path: path.to_path_buf(),
        operation: "read rule file",
        source: e,
    })?;
    parse_rules(&text, path)
}

/// Render a rule table in the format [`parse_rules`] reads
pub fn format_rules(rules: &AdjacencyRules) -> String {
    let mut out = String::new();
    for (source, allowed) in rules.entries() {
        let names: Vec<&str> = allowed.iter().map(Terrain::name).collect();
        let _ = writeln!(out, "{source}: {}", names.join(", "));
    }
    out
}
