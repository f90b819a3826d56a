use crate::algo::dijkstra::Dijkstra;
use crate::grid::{Occupancy, RoutingGrid};
use crate::result::{RoutingOutcome, RoutingResult};
use layerroute_common::db::core::Net;
use layerroute_common::util::config::CommitPolicy;

/// Commits nets one at a time in a fixed order onto a fresh occupancy mask.
///
/// Implementations never fail: unroutable nets are reported in the result.
/// None of them revisits a net once it is committed.
pub trait NetRouter: Sync {
    fn name(&self) -> &'static str;

    fn route_order<G: RoutingGrid + ?Sized>(
        &self,
        solver: &mut Dijkstra,
        grid: &G,
        nets: &[Net],
        order: &[usize],
    ) -> RoutingResult;

    fn route<G: RoutingGrid + ?Sized>(
        &self,
        grid: &G,
        nets: &[Net],
        order: &[usize],
    ) -> RoutingResult {
        self.route_order(&mut Dijkstra::new(), grid, nets, order)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialRouter;

impl NetRouter for SequentialRouter {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn route_order<G: RoutingGrid + ?Sized>(
        &self,
        solver: &mut Dijkstra,
        grid: &G,
        nets: &[Net],
        order: &[usize],
    ) -> RoutingResult {
        commit_in_order(solver, grid, nets, order, CommitPolicy::Stop)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SkipFailedRouter;

impl NetRouter for SkipFailedRouter {
    fn name(&self) -> &'static str {
        "skip-failed"
    }

    fn route_order<G: RoutingGrid + ?Sized>(
        &self,
        solver: &mut Dijkstra,
        grid: &G,
        nets: &[Net],
        order: &[usize],
    ) -> RoutingResult {
        commit_in_order(solver, grid, nets, order, CommitPolicy::Skip)
    }
}

fn commit_in_order<G: RoutingGrid + ?Sized>(
    solver: &mut Dijkstra,
    grid: &G,
    nets: &[Net],
    order: &[usize],
    policy: CommitPolicy,
) -> RoutingResult {
    let mut occupancy = Occupancy::new(grid);
    let mut listed = vec![false; nets.len()];
    let mut result = RoutingResult {
        order: Vec::with_capacity(nets.len()),
        outcomes: Vec::with_capacity(nets.len()),
        ..Default::default()
    };
    let mut stopped = false;

    for &net_idx in order {
        let Some(net) = nets.get(net_idx) else {
            log::warn!("Ordering references unknown net index {}; skipped", net_idx);
            continue;
        };
        if std::mem::replace(&mut listed[net_idx], true) {
            log::warn!("Net '{}' listed twice in the ordering; repeat skipped", net.name);
            continue;
        }
        result.order.push(net_idx);

        if stopped {
            result.push(RoutingOutcome::not_attempted(net));
            continue;
        }

        match solver.find_path(grid, &occupancy, net.start, net.end) {
            Ok(path) => {
                log::debug!(
                    "{} routed: cost {}, {} cells, {} vias",
                    net.name,
                    path.cost,
                    path.cells.len(),
                    path.via_count()
                );
                occupancy.occupy_path(&path.cells);
                log::trace!("{} cells occupied", occupancy.occupied_count());
                result.push(RoutingOutcome::routed(net, path));
            }
            Err(reason) => {
                log::debug!("{} failed: {}", net.name, reason);
                result.push(RoutingOutcome::failed(net, reason));
                stopped = policy == CommitPolicy::Stop;
            }
        }
    }

    // Nets the ordering left out still get a row.
    for (net_idx, net) in nets.iter().enumerate() {
        if !listed[net_idx] {
            result.order.push(net_idx);
            result.push(RoutingOutcome::not_attempted(net));
        }
    }

    result
}
