//! Build ranked collapsed stacks from an aggregated call tree.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "{main};render;load_template 1200"
//! This means: {main} called render which called load_template,
//! with a weight of 1200 (calls or nanoseconds, depending on the mode).

use super::Aggregator;
use log::debug;

/// A single collapsed stack entry
///
/// **Public** - used by metrics and the flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (calls or nanoseconds)
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    ///
    /// **Public** - constructor
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Format as the standard collapsed stack line (without newline)
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }

    /// Number of frames in the stack
    pub fn depth(&self) -> usize {
        self.stack.split(';').count()
    }
}

/// Build collapsed stacks from an aggregator
///
/// **Public** - main entry point for in-process analysis
///
/// # Returns
/// One collapsed stack per distinct call path, sorted by weight
/// (descending, ties by stack text)
pub fn build_collapsed_stacks(aggregator: &Aggregator) -> Vec<CollapsedStack> {
    let rendered = aggregator.render_collapsed();

    let mut stacks: Vec<CollapsedStack> = rendered
        .lines()
        .filter_map(|line| {
            let (stack, weight) = line.rsplit_once(' ')?;
            Some(CollapsedStack::new(stack.to_string(), weight.parse().ok()?))
        })
        .collect();

    sort_by_weight(&mut stacks);

    debug!("Built {} collapsed stacks", stacks.len());

    stacks
}

/// Sort stacks heaviest first
pub fn sort_by_weight(stacks: &mut [CollapsedStack]) {
    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));
}
