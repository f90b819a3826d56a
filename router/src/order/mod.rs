pub mod optimizer;
pub mod strategy;

pub use optimizer::{OrderOptimizer, SearchReport, StopReason};
pub use strategy::OrderingStrategy;
