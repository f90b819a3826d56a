use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// What the committer does when a net cannot be routed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommitPolicy {
    #[default]
    Stop,
    Skip,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Exhaustive,
    Random,
    Greedy,
    Local,
    Auto,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    #[serde(default = "default_via_cost")]
    pub via_cost: u32,
    #[serde(default)]
    pub commit_policy: CommitPolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            via_cost: default_via_cost(),
            commit_policy: CommitPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,
    /// Used when `strategy = "exhaustive"` meets more nets than
    /// `exhaustive_limit`, and by `auto` above the limit.
    #[serde(default)]
    pub fallback: Option<StrategyKind>,
    #[serde(default = "default_exhaustive_limit")]
    pub exhaustive_limit: usize,
    #[serde(default = "default_random_samples")]
    pub random_samples: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_local_search_rounds")]
    pub local_search_rounds: usize,
    #[serde(default)]
    pub max_orderings: Option<usize>,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            fallback: None,
            exhaustive_limit: default_exhaustive_limit(),
            random_samples: default_random_samples(),
            seed: None,
            local_search_rounds: default_local_search_rounds(),
            max_orderings: None,
            time_budget_ms: None,
            parallel: default_parallel(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_design_file")]
    pub design_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            design_file: default_design_file(),
        }
    }
}

fn default_via_cost() -> u32 {
    20
}

fn default_strategy() -> StrategyKind {
    StrategyKind::Auto
}

fn default_exhaustive_limit() -> usize {
    8
}

fn default_random_samples() -> usize {
    500
}

fn default_local_search_rounds() -> usize {
    50
}

fn default_parallel() -> bool {
    true
}

fn default_batch_size() -> usize {
    256
}

fn default_design_file() -> String {
    "inputs/demo.toml".to_string()
}
