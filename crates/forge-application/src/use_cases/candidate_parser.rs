//! Parses a `ModelRunner`'s raw generation output into `FileChange[]`
//! (§4.2.e).
//!
//! Expects one `FileChange` per block, delimited by a `--- FILE: <path>`
//! marker and closed with `--- END`:
//!
//! ```text
//! --- FILE: src/main.rs
//! --- TYPE: add
//! fn main() { println!("Hello"); }
//! --- END
//! ```
//!
//! `--- TYPE:` defaults to `modify` when omitted. A block with an empty
//! body and `--- TYPE: delete` is a deletion.

use forge_domain::entities::{ChangeType, FileChange};
use forge_domain::error::Error;

/// Parse `raw_output` into file changes.
///
/// # Errors
/// Returns [`Error::parser`] if the output is empty/whitespace-only, or
/// contains no well-formed `--- FILE:` block.
pub fn parse(raw_output: &str) -> forge_domain::Result<Vec<FileChange>> {
    if raw_output.trim().is_empty() {
        return Err(Error::parser("generation output was empty"));
    }

    let mut changes = Vec::new();
    let mut lines = raw_output.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(path) = line.trim().strip_prefix("--- FILE:").map(str::trim) else {
            continue;
        };

        let mut change_type = ChangeType::Modify;
        let mut body_lines = Vec::new();

        while let Some(&next) = lines.peek() {
            let trimmed = next.trim();
            if let Some(kind) = trimmed.strip_prefix("--- TYPE:") {
                change_type = parse_change_type(kind.trim());
                lines.next();
                continue;
            }
            if trimmed == "--- END" {
                lines.next();
                break;
            }
            body_lines.push(next);
            lines.next();
        }

        let content = if change_type == ChangeType::Delete { String::new() } else { body_lines.join("\n") };
        let change = FileChange::new(path, content, change_type, None)
            .map_err(|message| Error::parser(format!("malformed file change for '{path}': {message}")))?;
        changes.push(change);
    }

    if changes.is_empty() {
        return Err(Error::parser("no '--- FILE:' blocks found in generation output"));
    }
    Ok(changes)
}

fn parse_change_type(raw: &str) -> ChangeType {
    match raw.to_lowercase().as_str() {
        "add" => ChangeType::Add,
        "delete" => ChangeType::Delete,
        _ => ChangeType::Modify,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_file_block() {
        let raw = "--- FILE: src/main.rs\n--- TYPE: add\nfn main() {}\n--- END\n";
        let changes = parse(raw).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "src/main.rs");
        assert_eq!(changes[0].change_type, ChangeType::Add);
        assert_eq!(changes[0].content, "fn main() {}");
    }

    #[test]
    fn parses_multiple_blocks() {
        let raw = "--- FILE: a.txt\n--- TYPE: add\nhello\n--- END\n--- FILE: b.txt\n--- TYPE: delete\n--- END\n";
        let changes = parse(raw).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].change_type, ChangeType::Delete);
        assert_eq!(changes[1].content, "");
    }

    #[test]
    fn rejects_empty_output() {
        assert!(parse("   \n\t").is_err());
    }

    #[test]
    fn rejects_output_with_no_file_blocks() {
        assert!(parse("just some prose with no markers").is_err());
    }
}
