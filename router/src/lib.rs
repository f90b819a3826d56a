pub mod algo;
pub mod check;
pub mod error;
pub mod grid;
pub mod net_router;
pub mod order;
pub mod result;

use error::Result;
use grid::{LayeredGrid, RoutingGrid};
use layerroute_common::db::core::{GridSpec, Net};
use layerroute_common::util::config::{CommitPolicy, Config};
use net_router::{NetRouter, SequentialRouter, SkipFailedRouter};
use order::{OrderOptimizer, SearchReport};
use result::RoutingResult;

pub fn build_grid(spec: &GridSpec, config: &Config) -> Result<LayeredGrid> {
    Ok(LayeredGrid::from_spec(spec)?.with_via_cost(config.routing.via_cost))
}

pub fn optimize<G: RoutingGrid + ?Sized>(
    grid: &G,
    nets: &[Net],
    config: &Config,
) -> Result<SearchReport> {
    let search = config.search.clone();
    match config.routing.commit_policy {
        CommitPolicy::Stop => OrderOptimizer::new(SequentialRouter, search).optimize(grid, nets),
        CommitPolicy::Skip => OrderOptimizer::new(SkipFailedRouter, search).optimize(grid, nets),
    }
}

pub fn route_fixed_order<G: RoutingGrid + ?Sized>(
    grid: &G,
    nets: &[Net],
    order: &[usize],
    config: &Config,
) -> RoutingResult {
    match config.routing.commit_policy {
        CommitPolicy::Stop => SequentialRouter.route(grid, nets, order),
        CommitPolicy::Skip => SkipFailedRouter.route(grid, nets, order),
    }
}
