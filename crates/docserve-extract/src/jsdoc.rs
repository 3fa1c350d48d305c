//! JSDoc comment lookup and cleanup

use tree_sitter::Node;

/// The `/** */` block directly preceding `node`, cleaned of comment syntax.
///
/// Only a comment separated from the node by whitespace counts; any other
/// statement in between breaks the association.
pub fn preceding(node: Node, source: &str) -> Option<String> {
    let comment = node.prev_sibling()?;
    if comment.kind() != "comment" {
        return None;
    }
    let gap = source.get(comment.end_byte()..node.start_byte())?;
    if !gap.trim().is_empty() {
        return None;
    }
    let text = comment.utf8_text(source.as_bytes()).ok()?;
    clean(text)
}

/// Strip `/**`, `*/` and leading `*` gutters. Returns `None` for anything
/// that is not a JSDoc block or has no text.
pub fn clean(text: &str) -> Option<String> {
    let body = text.strip_prefix("/**")?.strip_suffix("*/")?;
    if body.starts_with('*') {
        // `/***` banners are not documentation.
        return None;
    }
    let lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();

    let start = lines.iter().position(|l| !l.is_empty())?;
    let end = lines.iter().rposition(|l| !l.is_empty())?;
    Some(lines[start..=end].join("\n"))
}
