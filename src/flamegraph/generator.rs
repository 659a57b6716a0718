//! SVG flamegraph generation using the inferno library.
//!
//! In time mode a collapsed line carries the time of its call path
//! including its callees, while inferno adds every child's weight on
//! top of its parent's. Time traces are therefore converted to self
//! weights before rendering. Call counts are per path, so in calls mode
//! a frame's width is the number of calls made in its subtree.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::config::AggregationMode;
use crate::utils::error::FlamegraphError;
use log::info;
use std::collections::HashMap;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,

    /// Label for the weight unit in tooltips
    pub count_name: String,

    /// Convert inclusive weights to self weights before rendering
    pub self_weights: bool,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Call Path Profile".to_string(),
            width: 1200,
            count_name: "calls".to_string(),
            self_weights: false,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_count_name(mut self, count_name: impl Into<String>) -> Self {
        self.count_name = count_name.into();
        self
    }

    pub fn with_self_weights(mut self, self_weights: bool) -> Self {
        self.self_weights = self_weights;
        self
    }

    /// Settings that render a trace of `mode` without double counting
    pub fn for_mode(mode: AggregationMode) -> Self {
        match mode {
            AggregationMode::Calls => Self::new(),
            AggregationMode::Time => Self::new().with_count_name("ns").with_self_weights(true),
        }
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - Nothing to render
/// * `FlamegraphError::RenderFailed` - inferno rejected the input
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let stacks = if config.self_weights {
        to_self_weights(stacks)
    } else {
        stacks.to_vec()
    };

    let lines: Vec<String> = stacks
        .iter()
        .filter(|stack| stack.weight > 0)
        .map(CollapsedStack::to_line)
        .collect();

    if lines.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let mut options = inferno::flamegraph::Options::default();
    options.title = config.title.clone();
    options.count_name = config.count_name.clone();
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    inferno::flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    let svg = String::from_utf8(svg).map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Subtract each stack's direct children from its weight
pub fn to_self_weights(stacks: &[CollapsedStack]) -> Vec<CollapsedStack> {
    let mut children_weight: HashMap<&str, u64> = HashMap::new();
    for stack in stacks {
        if let Some((parent, _)) = stack.stack.rsplit_once(';') {
            *children_weight.entry(parent).or_insert(0) += stack.weight;
        }
    }

    stacks
        .iter()
        .map(|stack| {
            let children = children_weight.get(stack.stack.as_str()).copied().unwrap_or(0);
            CollapsedStack::new(stack.stack.clone(), stack.weight.saturating_sub(children))
        })
        .collect()
}

/// Create a text table of the heaviest stacks
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize, total_weight: u64) -> String {
    let mut lines = Vec::new();

    lines.push("  HOT CALL PATHS".to_string());
    lines.push(format!("  {:<52} {:>14} {:>7}", "Call Path (Hottest First)", "WEIGHT", "%"));
    lines.push(format!("  {}", "-".repeat(75)));

    let total = total_weight.max(1);

    for stack in stacks.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;

        // Keep the innermost frames visible
        let len = stack.stack.chars().count();
        let display_stack = if len > 52 {
            let tail: String = stack.stack.chars().skip(len - 49).collect();
            format!("...{}", tail)
        } else {
            stack.stack.clone()
        };

        lines.push(format!("  {:<52} {:>14} {:>6.1}%", display_stack, stack.weight, percentage));
    }

    if stacks.len() > max_lines {
        lines.push(String::new());
        lines.push(format!("   (Showing top {} of {} unique paths)", max_lines, stacks.len()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stacks() -> Vec<CollapsedStack> {
        vec![
            CollapsedStack::new("{main}".to_string(), 1000),
            CollapsedStack::new("{main};foo".to_string(), 600),
            CollapsedStack::new("{main};foo;bar".to_string(), 100),
            CollapsedStack::new("{main};baz".to_string(), 300),
        ]
    }

    #[test]
    fn test_empty_stacks_rejected() {
        assert!(matches!(generate_flamegraph(&[], None), Err(FlamegraphError::EmptyStacks)));
    }

    #[test]
    fn test_to_self_weights() {
        let self_weights = to_self_weights(&sample_stacks());

        assert_eq!(self_weights[0].weight, 100);
        assert_eq!(self_weights[1].weight, 500);
        assert_eq!(self_weights[2].weight, 100);
        assert_eq!(self_weights[3].weight, 300);
    }

    #[test]
    fn test_generate_svg() {
        let config = FlamegraphConfig::new().with_title("Test Profile");
        let svg = generate_flamegraph(&sample_stacks(), Some(&config)).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Test Profile"));
    }

    #[test]
    fn test_time_mode_renders_self_weights() {
        let stacks = vec![
            CollapsedStack::new("{main}".to_string(), 100),
            CollapsedStack::new("{main};foo".to_string(), 60),
            CollapsedStack::new("{main};foo;bar".to_string(), 10),
            CollapsedStack::new("{main};baz".to_string(), 30),
        ];

        let config = FlamegraphConfig::for_mode(AggregationMode::Time);
        assert!(config.self_weights);
        assert_eq!(config.count_name, "ns");

        let svg = generate_flamegraph(&stacks, Some(&config)).unwrap();
        assert!(svg.contains("(100 ns"));
        assert!(!svg.contains("(200 ns"));
    }

    #[test]
    fn test_calls_mode_keeps_counts() {
        let config = FlamegraphConfig::for_mode(AggregationMode::Calls);

        assert!(!config.self_weights);
        assert_eq!(config.count_name, "calls");
    }

    #[test]
    fn test_text_summary_truncates() {
        let summary = generate_text_summary(&sample_stacks(), 2, 1000);

        assert!(summary.contains("{main};foo"));
        assert!(summary.contains("Showing top 2 of 4"));
    }
}
