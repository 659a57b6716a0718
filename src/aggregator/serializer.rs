//! Write a frame tree in collapsed-stack format.
//!
//! Format: "parent;child;grandchild value"
//!
//! One line is written per frame, parents before their children. The
//! value is the frame's call count or its cumulative nanoseconds,
//! depending on the aggregation mode. The root itself is never written.

use super::frame_tree::{FrameId, FrameTree};
use crate::function::InternTable;
use crate::utils::config::AggregationMode;
use log::debug;
use std::io::{self, Write};

/// Walk `tree` depth-first and write one line per frame
///
/// **Public** - used by trace handlers at trace end
///
/// The walk keeps its own stack, so tree depth does not grow the
/// call stack.
///
/// # Returns
/// Number of lines written
pub fn write_collapsed<W: Write>(
    tree: &FrameTree,
    names: &InternTable,
    mode: AggregationMode,
    out: &mut W,
) -> io::Result<usize> {
    let root = tree.root();

    // (frame, length of the prefix that belongs to its parent)
    let mut pending: Vec<(FrameId, usize)> = Vec::new();
    push_children(tree, root, 0, &mut pending);

    let mut prefix = String::new();
    let mut line = String::new();
    let mut lines = 0;

    while let Some((id, prefix_len)) = pending.pop() {
        let frame = tree.frame(id);
        let name = frame.key.map_or("", |key| names.resolve(key.name));
        let value = match mode {
            AggregationMode::Calls => frame.calls,
            AggregationMode::Time => frame.nanotime,
        };

        prefix.truncate(prefix_len);

        line.clear();
        line.push_str(&prefix);
        line.push_str(name);
        line.push(' ');
        line.push_str(&value.to_string());
        line.push('\n');
        out.write_all(line.as_bytes())?;
        lines += 1;

        prefix.push_str(name);
        prefix.push(';');
        push_children(tree, id, prefix.len(), &mut pending);
    }

    debug!("Wrote {} collapsed stack lines ({} mode)", lines, mode);

    Ok(lines)
}

/// Render collapsed stacks into a string
pub fn render_collapsed(tree: &FrameTree, names: &InternTable, mode: AggregationMode) -> String {
    let mut out = Vec::new();

    // Writing into a Vec cannot fail
    let _ = write_collapsed(tree, names, mode, &mut out);

    String::from_utf8_lossy(&out).into_owned()
}

/// Queue children so that the first stored child is popped first
fn push_children(
    tree: &FrameTree,
    parent: FrameId,
    prefix_len: usize,
    pending: &mut Vec<(FrameId, usize)>,
) {
    let start = pending.len();
    pending.extend(tree.children(parent).map(|child| (child, prefix_len)));
    pending[start..].reverse();
}
