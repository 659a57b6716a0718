//! Calculate hot paths and weight distribution from collapsed stacks.
//!
//! Hot paths are the call paths with the largest weight: the most
//! calls in `calls` mode, the most time in `time` mode. They are the
//! first places to look when optimizing.

use super::stack_builder::CollapsedStack;
use crate::output::schema::HotPath;
use log::debug;

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks, heaviest first
/// * `total_weight` - Weight the percentages are relative to
/// * `top_n` - Number of top paths to return (e.g., 10)
///
/// # Returns
/// Vector of hot paths, in the order of `stacks`
pub fn calculate_hot_paths(
    stacks: &[CollapsedStack],
    total_weight: u64,
    top_n: usize,
) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    stacks
        .iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_weight))
        .collect()
}

/// Create a HotPath from a CollapsedStack
///
/// **Public** - also used by report tests
pub fn create_hot_path(stack: &CollapsedStack, total_weight: u64) -> HotPath {
    let percentage = if total_weight > 0 {
        (stack.weight as f64 / total_weight as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        weight: stack.weight,
        percentage,
    }
}

/// Total weight of the outermost frames
///
/// Collapsed weights of nested frames are already counted in their
/// ancestors' lines, so only top-level stacks add up to the total.
pub fn total_weight(stacks: &[CollapsedStack]) -> u64 {
    stacks
        .iter()
        .filter(|stack| !stack.stack.contains(';'))
        .map(|stack| stack.weight)
        .sum()
}

/// Calculate weight distribution statistics
///
/// **Public** - provides summary statistics
pub fn calculate_weight_distribution(stacks: &[CollapsedStack]) -> WeightDistribution {
    if stacks.is_empty() {
        return WeightDistribution::default();
    }

    let total: u64 = stacks.iter().map(|s| s.weight).sum();
    let count = stacks.len();
    let mean = total / count as u64;

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable();
    let median = weights[weights.len() / 2];

    let max_depth = stacks.iter().map(CollapsedStack::depth).max().unwrap_or(0);

    // Top 10% of stacks
    let top_10_percent_count = (count as f64 * 0.1).ceil() as usize;
    let top_10_percent_weight: u64 = weights.iter().rev().take(top_10_percent_count).sum();

    WeightDistribution {
        total_weight: total,
        stack_count: count,
        max_depth,
        mean_weight_per_stack: mean,
        median_weight_per_stack: median,
        top_10_percent_weight,
        top_10_percent_percentage: if total > 0 {
            (top_10_percent_weight as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

/// Weight distribution statistics
///
/// **Public** - returned from calculate_weight_distribution
#[derive(Debug, Clone, Default)]
pub struct WeightDistribution {
    /// Sum of all stack weights
    pub total_weight: u64,

    /// Number of distinct stacks
    pub stack_count: usize,

    /// Deepest call path
    pub max_depth: usize,

    pub mean_weight_per_stack: u64,

    pub median_weight_per_stack: u64,

    /// Weight of the heaviest 10% of stacks
    pub top_10_percent_weight: u64,

    pub top_10_percent_percentage: f64,
}

impl WeightDistribution {
    /// Returns true if the heaviest 10% of stacks carry more than 80% of the weight
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Stacks: {} | Max depth: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_weight,
            self.stack_count,
            self.max_depth,
            self.mean_weight_per_stack,
            self.median_weight_per_stack,
            self.top_10_percent_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hot_paths() {
        let stacks = vec![
            CollapsedStack::new("{main};execute".to_string(), 5000),
            CollapsedStack::new("{main};storage".to_string(), 3000),
            CollapsedStack::new("{main};compute".to_string(), 2000),
        ];

        let hot_paths = calculate_hot_paths(&stacks, 10000, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].stack, "{main};execute");
        assert_eq!(hot_paths[0].weight, 5000);
        assert_eq!(hot_paths[0].percentage, 50.0);
    }

    #[test]
    fn test_total_weight_counts_top_level_only() {
        let stacks = vec![
            CollapsedStack::new("{main}".to_string(), 100),
            CollapsedStack::new("{main};foo".to_string(), 60),
            CollapsedStack::new("shutdown".to_string(), 5),
        ];

        assert_eq!(total_weight(&stacks), 105);
    }

    #[test]
    fn test_calculate_weight_distribution() {
        let stacks = vec![
            CollapsedStack::new("stack1".to_string(), 8500),
            CollapsedStack::new("stack1;stack2".to_string(), 1000),
            CollapsedStack::new("stack3".to_string(), 250),
            CollapsedStack::new("stack4".to_string(), 250),
        ];

        let dist = calculate_weight_distribution(&stacks);

        assert_eq!(dist.total_weight, 10000);
        assert_eq!(dist.stack_count, 4);
        assert_eq!(dist.max_depth, 2);
        assert_eq!(dist.mean_weight_per_stack, 2500);
        assert!(dist.is_highly_concentrated());
    }

    #[test]
    fn test_weight_distribution_empty() {
        let dist = calculate_weight_distribution(&[]);
        assert_eq!(dist.total_weight, 0);
        assert_eq!(dist.stack_count, 0);
        assert!(!dist.is_highly_concentrated());
    }

    #[test]
    fn test_zero_total_gives_zero_percentage() {
        let stack = CollapsedStack::new("idle".to_string(), 0);
        assert_eq!(create_hot_path(&stack, 0).percentage, 0.0);
    }
}
