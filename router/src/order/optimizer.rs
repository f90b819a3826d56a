use super::strategy::{self, OrderingStrategy};
use crate::algo::dijkstra::Dijkstra;
use crate::error::{Result, RouteError};
use crate::grid::RoutingGrid;
use crate::net_router::{NetRouter, SequentialRouter};
use crate::result::RoutingResult;
use layerroute_common::db::core::Net;
use layerroute_common::util::config::{SearchConfig, StrategyKind};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    OrderingBudget,
    TimeBudget,
}

#[derive(Clone, Debug)]
pub struct SearchReport {
    pub best: RoutingResult,
    pub strategy: &'static str,
    pub explored: usize,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// Searches net orderings for the one that routes the most nets at the
/// lowest total cost.
pub struct OrderOptimizer<R: NetRouter = SequentialRouter> {
    router: R,
    config: SearchConfig,
}

impl OrderOptimizer<SequentialRouter> {
    pub fn sequential(config: SearchConfig) -> Self {
        Self::new(SequentialRouter, config)
    }
}

impl<R: NetRouter> OrderOptimizer<R> {
    pub fn new(router: R, config: SearchConfig) -> Self {
        Self { router, config }
    }

    pub fn optimize<G: RoutingGrid + ?Sized>(
        &self,
        grid: &G,
        nets: &[Net],
    ) -> Result<SearchReport> {
        validate(grid, nets)?;
        let kind = self.select_strategy(nets.len())?;
        let mut strategy = strategy::build(kind, nets, &self.config);
        self.explore(grid, nets, strategy.as_mut())
    }

    pub fn explore<G: RoutingGrid + ?Sized>(
        &self,
        grid: &G,
        nets: &[Net],
        strategy: &mut dyn OrderingStrategy,
    ) -> Result<SearchReport> {
        validate(grid, nets)?;

        log::info!(
            "Order search: {} nets, strategy '{}', router '{}'{}",
            nets.len(),
            strategy.name(),
            self.router.name(),
            if self.config.parallel { " (parallel)" } else { "" }
        );

        let start = Instant::now();
        let deadline = self
            .config
            .time_budget_ms
            .map(|ms| start + Duration::from_millis(ms));
        let ordering_limit = self.config.max_orderings.map(|m| m.max(1));
        let mut batch_size = self.config.batch_size.max(1);
        if deadline.is_some() && self.config.parallel {
            // One ordering per worker, so a batch never runs far past the deadline.
            batch_size = batch_size.min(rayon::current_num_threads().max(1));
        }

        let mut best: Option<RoutingResult> = None;
        let mut explored = 0;

        let stop_reason = loop {
            let mut max = batch_size;
            if let Some(limit) = ordering_limit {
                if explored >= limit {
                    break StopReason::OrderingBudget;
                }
                max = max.min(limit - explored);
            }
            if explored > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                break StopReason::TimeBudget;
            }

            let mut batch = strategy.next_batch(best.as_ref(), max);
            if batch.is_empty() {
                break StopReason::Exhausted;
            }
            batch.truncate(max);
            for order in &batch {
                check_ordering(order, nets.len())?;
            }

            let results = self.evaluate(grid, nets, &batch, deadline, explored == 0);
            let cut_short = results.len() < batch.len();
            for result in results {
                explored += 1;
                let replace = match &best {
                    Some(incumbent) => result.is_better_than(incumbent),
                    None => true,
                };
                if replace {
                    log::debug!(
                        "New best after {} orderings: {} routed, cost {}",
                        explored,
                        result.routed,
                        result.total_cost
                    );
                    best = Some(result);
                }
            }
            if cut_short {
                break StopReason::TimeBudget;
            }
        };

        let best = best.unwrap_or_default();
        let elapsed = start.elapsed();

        match stop_reason {
            StopReason::Exhausted => {}
            StopReason::OrderingBudget => log::warn!(
                "Ordering budget of {} reached; keeping best result so far",
                explored
            ),
            StopReason::TimeBudget => log::warn!(
                "Time budget reached after {:?}; keeping best result so far",
                elapsed
            ),
        }
        log::info!(
            "Order search done: {} orderings in {}ms, best routes {}/{} nets at cost {}",
            explored,
            elapsed.as_millis(),
            best.routed,
            nets.len(),
            best.total_cost
        );

        Ok(SearchReport {
            best,
            strategy: strategy.name(),
            explored,
            stop_reason,
            elapsed,
        })
    }

    fn evaluate<G: RoutingGrid + ?Sized>(
        &self,
        grid: &G,
        nets: &[Net],
        batch: &[Vec<usize>],
        deadline: Option<Instant>,
        first_batch: bool,
    ) -> Vec<RoutingResult> {
        if self.config.parallel && batch.len() > 1 {
            batch
                .par_iter()
                .map_with(Dijkstra::new(), |solver, order| {
                    self.router.route_order(solver, grid, nets, order)
                })
                .collect()
        } else {
            let mut solver = Dijkstra::new();
            let mut results = Vec::with_capacity(batch.len());
            for order in batch {
                let started = !first_batch || !results.is_empty();
                if started && deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
                results.push(self.router.route_order(&mut solver, grid, nets, order));
            }
            results
        }
    }

    fn select_strategy(&self, n: usize) -> Result<StrategyKind> {
        let limit = self.config.exhaustive_limit;
        let fallback = self.config.fallback.and_then(bounded);

        match self.config.strategy {
            StrategyKind::Auto if n <= limit => Ok(StrategyKind::Exhaustive),
            StrategyKind::Auto => Ok(fallback.unwrap_or(StrategyKind::Local)),
            StrategyKind::Exhaustive if n > limit => match fallback {
                Some(kind) => {
                    log::warn!(
                        "{} nets exceed the exhaustive limit of {}; falling back to {:?}",
                        n,
                        limit,
                        kind
                    );
                    Ok(kind)
                }
                None => Err(RouteError::ExplorationBudgetExceeded { nets: n, limit }),
            },
            kind => Ok(kind),
        }
    }
}

fn bounded(kind: StrategyKind) -> Option<StrategyKind> {
    match kind {
        StrategyKind::Exhaustive => None,
        StrategyKind::Auto => Some(StrategyKind::Local),
        other => Some(other),
    }
}

fn check_ordering(order: &[usize], n: usize) -> Result<()> {
    let mut seen = vec![false; n];
    let is_permutation = order.len() == n
        && order
            .iter()
            .all(|&i| i < n && !std::mem::replace(&mut seen[i], true));
    if is_permutation {
        Ok(())
    } else {
        Err(RouteError::MalformedNetlist(format!(
            "ordering {:?} is not a permutation of {} nets",
            order, n
        )))
    }
}

fn validate<G: RoutingGrid + ?Sized>(grid: &G, nets: &[Net]) -> Result<()> {
    if grid.num_cells() == 0 {
        return Err(RouteError::InvalidGrid("empty grid".into()));
    }
    let mut names = HashSet::with_capacity(nets.len());
    for net in nets {
        for c in [net.start, net.end] {
            if !grid.in_bounds(c) {
                return Err(RouteError::InvalidCoordinate(c));
            }
        }
        if !names.insert(net.name.as_str()) {
            return Err(RouteError::MalformedNetlist(format!(
                "duplicate net name '{}'",
                net.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LayeredGrid;
    use layerroute_common::db::core::Netlist;
    use layerroute_common::db::indices::NetId;
    use layerroute_common::geom::coord::GridCoord;

    fn c(x: u32, y: u32, z: u8) -> GridCoord {
        GridCoord::new(x, y, z)
    }

    fn config(strategy: StrategyKind) -> SearchConfig {
        SearchConfig {
            strategy,
            parallel: false,
            seed: Some(1),
            ..SearchConfig::default()
        }
    }

    // Netlist order fails on the second net; reversing routes all three.
    fn crossing() -> (LayeredGrid, Netlist) {
        let grid = LayeredGrid::uniform(5, 3, 1, 1).unwrap();
        let mut nl = Netlist::new();
        nl.add_net("Long", c(0, 1, 0), c(4, 1, 0)).unwrap();
        nl.add_net("Up", c(1, 1, 0), c(1, 0, 0)).unwrap();
        nl.add_net("Down", c(3, 1, 0), c(3, 2, 0)).unwrap();
        (grid, nl)
    }

    #[test]
    fn exhaustive_finds_full_routing() {
        let (grid, nl) = crossing();
        let report = OrderOptimizer::sequential(config(StrategyKind::Exhaustive))
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.explored, 6);
        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert_eq!(report.strategy, "exhaustive");
        assert_eq!(report.best.routed, 3);
        assert_eq!(report.best.total_cost, 13);
        assert_eq!(report.best.order[2], 0);
    }

    #[test]
    fn full_tie_keeps_first_evaluated() {
        // Up and Down never interact, so [1, 2, 0] and [2, 1, 0] tie exactly.
        let (grid, nl) = crossing();
        let report = OrderOptimizer::sequential(config(StrategyKind::Exhaustive))
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.best.order, vec![1, 2, 0]);
    }

    #[test]
    fn greedy_and_local_route_everything() {
        let (grid, nl) = crossing();
        for kind in [StrategyKind::Greedy, StrategyKind::Local] {
            let report = OrderOptimizer::sequential(config(kind))
                .optimize(&grid, &nl.nets)
                .unwrap();
            assert_eq!(report.best.routed, 3, "{:?}", kind);
            assert_eq!(report.best.total_cost, 13, "{:?}", kind);
        }
    }

    #[test]
    fn exhaustive_above_limit_needs_fallback() {
        let (grid, nl) = crossing();
        let mut cfg = config(StrategyKind::Exhaustive);
        cfg.exhaustive_limit = 2;
        assert_eq!(
            OrderOptimizer::sequential(cfg.clone())
                .optimize(&grid, &nl.nets)
                .unwrap_err(),
            RouteError::ExplorationBudgetExceeded { nets: 3, limit: 2 }
        );

        cfg.fallback = Some(StrategyKind::Random);
        cfg.random_samples = 10;
        let report = OrderOptimizer::sequential(cfg)
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.strategy, "random");
        // The netlist order plus ten shuffles.
        assert_eq!(report.explored, 11);
    }

    #[test]
    fn auto_switches_on_net_count() {
        let (grid, nl) = crossing();
        let mut cfg = config(StrategyKind::Auto);
        let report = OrderOptimizer::sequential(cfg.clone())
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.strategy, "exhaustive");

        cfg.exhaustive_limit = 2;
        let report = OrderOptimizer::sequential(cfg).optimize(&grid, &nl.nets).unwrap();
        assert_eq!(report.strategy, "local");
        assert_eq!(report.best.routed, 3);
    }

    #[test]
    fn ordering_budget_returns_best_so_far() {
        let (grid, nl) = crossing();
        let mut cfg = config(StrategyKind::Exhaustive);
        cfg.max_orderings = Some(2);
        let report = OrderOptimizer::sequential(cfg)
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.explored, 2);
        assert_eq!(report.stop_reason, StopReason::OrderingBudget);
        // [0, 1, 2] and [0, 2, 1] both stop after "Long".
        assert_eq!(report.best.routed, 1);
        assert_eq!(report.best.order, vec![0, 1, 2]);
    }

    #[test]
    fn zero_time_budget_still_evaluates_one_batch() {
        let (grid, nl) = crossing();
        let mut cfg = config(StrategyKind::Exhaustive);
        cfg.time_budget_ms = Some(0);
        cfg.batch_size = 1;
        let report = OrderOptimizer::sequential(cfg)
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.explored, 1);
        assert_eq!(report.stop_reason, StopReason::TimeBudget);
    }

    #[test]
    fn time_budget_is_checked_between_orderings() {
        let (grid, nl) = crossing();
        let mut cfg = config(StrategyKind::Exhaustive);
        cfg.time_budget_ms = Some(0);
        let report = OrderOptimizer::sequential(cfg.clone())
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert_eq!(report.explored, 1);
        assert_eq!(report.stop_reason, StopReason::TimeBudget);

        cfg.parallel = true;
        let report = OrderOptimizer::sequential(cfg)
            .optimize(&grid, &nl.nets)
            .unwrap();
        assert!(report.explored >= 1);
        assert!(report.explored <= rayon::current_num_threads().max(1));
        assert_eq!(report.stop_reason, StopReason::TimeBudget);
    }

    // Replays fixed batches.
    struct Scripted(Vec<Vec<Vec<usize>>>);

    impl OrderingStrategy for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn next_batch(&mut self, _best: Option<&RoutingResult>, _max: usize) -> Vec<Vec<usize>> {
            if self.0.is_empty() {
                Vec::new()
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn explore_rejects_orderings_that_drop_nets() {
        let (grid, nl) = crossing();
        let optimizer = OrderOptimizer::sequential(config(StrategyKind::Exhaustive));

        for bad in [vec![1, 2], vec![0, 0, 2], vec![0, 1, 7], vec![0, 1, 2, 0]] {
            let mut strategy = Scripted(vec![vec![bad.clone()]]);
            assert!(
                matches!(
                    optimizer.explore(&grid, &nl.nets, &mut strategy),
                    Err(RouteError::MalformedNetlist(_))
                ),
                "{:?}",
                bad
            );
        }

        let mut strategy = Scripted(vec![vec![vec![0, 1, 2]], vec![vec![2, 1, 0]]]);
        let report = optimizer.explore(&grid, &nl.nets, &mut strategy).unwrap();
        assert_eq!(report.strategy, "scripted");
        assert_eq!(report.explored, 2);
        assert_eq!(report.best.outcomes.len(), 3);
        assert!(report.best.all_routed());
    }

    #[test]
    fn rejects_malformed_input() {
        let (grid, mut nl) = crossing();
        let mut nets = nl.nets.clone();
        nets.push(Net {
            id: NetId::new(3),
            name: "Up".into(),
            start: c(0, 0, 0),
            end: c(0, 2, 0),
        });
        assert!(matches!(
            OrderOptimizer::sequential(config(StrategyKind::Greedy)).optimize(&grid, &nets),
            Err(RouteError::MalformedNetlist(_))
        ));

        nl.add_net("Off", c(0, 0, 0), c(0, 0, 1)).unwrap();
        assert_eq!(
            OrderOptimizer::sequential(config(StrategyKind::Greedy))
                .optimize(&grid, &nl.nets)
                .unwrap_err(),
            RouteError::InvalidCoordinate(c(0, 0, 1))
        );
    }

    #[test]
    fn empty_netlist_is_valid() {
        let grid = LayeredGrid::uniform(2, 2, 1, 1).unwrap();
        let report = OrderOptimizer::sequential(config(StrategyKind::Auto))
            .optimize(&grid, &[])
            .unwrap();
        assert_eq!(report.best.routed, 0);
        assert_eq!(report.best.total_cost, 0);
        assert_eq!(report.explored, 1);
    }
}
