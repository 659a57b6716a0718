//! Parse collapsed-stack output back into stacks.
//!
//! Each line is `segment(;segment)* weight`. Segments may contain
//! spaces, so the weight is always the last space-separated token.

use crate::aggregator::stack_builder::{sort_by_weight, CollapsedStack};
use crate::utils::config::COMPRESSED_EXTENSION;
use crate::utils::error::ParseError;
use flate2::read::GzDecoder;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse a single collapsed-stack line
pub fn parse_collapsed_line(line: &str) -> Result<CollapsedStack, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let (stack, weight) = line
        .rsplit_once(' ')
        .ok_or_else(|| ParseError::InvalidFormat(format!("missing weight in '{}'", line)))?;

    if stack.is_empty() || stack.starts_with(';') || stack.ends_with(';') {
        return Err(ParseError::InvalidFormat(format!("malformed stack in '{}'", line)));
    }

    let weight = weight
        .parse::<u64>()
        .map_err(|e| ParseError::InvalidFormat(format!("bad weight in '{}': {}", line, e)))?;

    Ok(CollapsedStack::new(stack.to_string(), weight))
}

/// Parse every non-blank line of `reader`, heaviest stack first
pub fn parse_collapsed<R: BufRead>(reader: R) -> Result<Vec<CollapsedStack>, ParseError> {
    let mut stacks = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        stacks.push(parse_collapsed_line(&line)?);
    }

    sort_by_weight(&mut stacks);
    Ok(stacks)
}

/// Read a collapsed trace file, decompressing `.gz` files
///
/// **Public** - used by the report and flamegraph commands
pub fn read_collapsed(path: impl AsRef<Path>) -> Result<Vec<CollapsedStack>, ParseError> {
    let path = path.as_ref();

    debug!("Reading collapsed stacks from: {}", path.display());

    let file = File::open(path)?;
    let compressed = path
        .extension()
        .is_some_and(|ext| ext == COMPRESSED_EXTENSION);

    let stacks = if compressed {
        parse_collapsed(BufReader::new(GzDecoder::new(file)))?
    } else {
        parse_collapsed(BufReader::new(file))?
    };

    debug!("Read {} collapsed stacks", stacks.len());

    Ok(stacks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let stack = parse_collapsed_line("{main};foo;bar 100").unwrap();
        assert_eq!(stack.stack, "{main};foo;bar");
        assert_eq!(stack.weight, 100);
    }

    #[test]
    fn test_parse_line_with_spaces_in_name() {
        let stack = parse_collapsed_line("{main};{closure:a b.php:3} 7\n").unwrap();
        assert_eq!(stack.stack, "{main};{closure:a b.php:3}");
        assert_eq!(stack.weight, 7);
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        assert!(parse_collapsed_line("nospace").is_err());
        assert!(parse_collapsed_line("foo bar").is_err());
        assert!(parse_collapsed_line(";foo 1").is_err());
        assert!(parse_collapsed_line("foo; 1").is_err());
        assert!(parse_collapsed_line(" 1").is_err());
    }

    #[test]
    fn test_parse_collapsed_sorts_and_skips_blank_lines() {
        let input = "a 1\n\na;b 5\n";
        let stacks = parse_collapsed(input.as_bytes()).unwrap();

        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0].stack, "a;b");
    }
}
