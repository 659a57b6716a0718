//! Aggregate entry/exit events into a tree of call paths.
//!
//! Every `enter` moves the cursor to the matching child of the current
//! frame (creating it on first sight) and stamps its entry time. Every
//! `exit` closes the current frame and moves the cursor back up.
//!
//! Example: `{main}` calling `foo` twice, each `foo` calling `bar`,
//! produces three frames: `{main}`, `{main};foo` and `{main};foo;bar`.

use super::frame_tree::{FrameId, FrameTree};
use super::serializer;
use crate::function::{FunctionDescriptor, FunctionKey, InternTable};
use crate::utils::config::AggregationMode;
use log::debug;
use std::io::Write;

/// Aggregation context for one execution stream
#[derive(Debug)]
pub struct Aggregator {
    tree: FrameTree,
    current: FrameId,
    names: InternTable,
    mode: AggregationMode,
    depth: usize,
}

impl Aggregator {
    pub fn new(mode: AggregationMode) -> Self {
        let tree = FrameTree::new();
        let current = tree.root();

        Self {
            tree,
            current,
            names: InternTable::new(),
            mode,
            depth: 0,
        }
    }

    /// Record entry into `function` at `timestamp` (nanoseconds)
    pub fn enter(&mut self, function: &FunctionDescriptor, timestamp: u64) {
        let key = FunctionKey::derive(function, &mut self.names);
        let frame = self.tree.find_or_create_child(self.current, key, &self.names);

        self.tree.frame_mut(frame).entry = timestamp;
        self.current = frame;
        self.depth += 1;
    }

    /// Record exit from the current frame at `timestamp` (nanoseconds)
    ///
    /// Elapsed time is measured from the frame's latest entry stamp. A
    /// recursive call matches against the current frame's children, so
    /// every recursion level gets a frame of its own.
    pub fn exit(&mut self, timestamp: u64) {
        let Some(parent) = self.tree.parent(self.current) else {
            debug!("Ignoring function exit while no call is active");
            return;
        };

        let frame = self.tree.frame_mut(self.current);
        frame.calls += 1;
        frame.nanotime += timestamp.saturating_sub(frame.entry);
        frame.entry = 0;

        self.current = parent;
        self.depth -= 1;
    }

    /// No call is active
    pub fn is_idle(&self) -> bool {
        self.current == self.tree.root()
    }

    /// Number of calls currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn current(&self) -> FrameId {
        self.current
    }

    /// Number of distinct call paths seen so far
    pub fn frame_count(&self) -> usize {
        self.tree.len()
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    pub fn names(&self) -> &InternTable {
        &self.names
    }

    /// Write the tree as collapsed stacks, returning the line count
    pub fn write_collapsed<W: Write>(&self, out: &mut W) -> std::io::Result<usize> {
        serializer::write_collapsed(&self.tree, &self.names, self.mode, out)
    }

    /// Collapsed stacks as an in-memory string
    pub fn render_collapsed(&self) -> String {
        serializer::render_collapsed(&self.tree, &self.names, self.mode)
    }

    /// Release all frames and names, returning the number of frames released
    pub fn reset(&mut self) -> usize {
        let released = self.tree.release();
        let names = self.names.clear();

        self.current = self.tree.root();
        self.depth = 0;

        debug!("Released {} frames and {} interned names", released, names);
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_exit_tracks_cursor() {
        let mut aggregator = Aggregator::new(AggregationMode::Calls);
        assert!(aggregator.is_idle());

        aggregator.enter(&FunctionDescriptor::main(), 10);
        aggregator.enter(&FunctionDescriptor::function("foo"), 20);
        assert_eq!(aggregator.depth(), 2);
        assert!(!aggregator.is_idle());

        aggregator.exit(50);
        aggregator.exit(100);
        assert!(aggregator.is_idle());
        assert_eq!(aggregator.depth(), 0);

        let tree = aggregator.tree();
        let main = tree.children(tree.root()).next().unwrap();
        let foo = tree.children(main).next().unwrap();
        assert_eq!(tree.frame(main).nanotime, 90);
        assert_eq!(tree.frame(foo).nanotime, 30);
        assert_eq!(tree.frame(foo).entry, 0);
    }

    #[test]
    fn test_exit_while_idle_is_noop() {
        let mut aggregator = Aggregator::new(AggregationMode::Calls);
        aggregator.exit(100);

        assert!(aggregator.is_idle());
        assert_eq!(aggregator.frame_count(), 0);
        assert_eq!(aggregator.tree().frame(aggregator.tree().root()).calls, 0);
    }

    #[test]
    fn test_clock_going_backwards_does_not_underflow() {
        let mut aggregator = Aggregator::new(AggregationMode::Time);
        aggregator.enter(&FunctionDescriptor::function("foo"), 500);
        aggregator.exit(400);

        assert_eq!(aggregator.render_collapsed(), "foo 0\n");
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut aggregator = Aggregator::new(AggregationMode::Calls);
        aggregator.enter(&FunctionDescriptor::main(), 0);
        aggregator.enter(&FunctionDescriptor::function("foo"), 1);

        assert_eq!(aggregator.reset(), 2);
        assert!(aggregator.is_idle());
        assert!(aggregator.names().is_empty());
        assert_eq!(aggregator.render_collapsed(), "");
    }
}
