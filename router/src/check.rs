use crate::grid::RoutingGrid;
use crate::result::{NetStatus, RoutingOutcome, RoutingResult};
use layerroute_common::geom::coord::GridCoord;
use std::collections::HashMap;

/// Re-validates a routing result against the grid.
pub fn run<G: RoutingGrid + ?Sized>(grid: &G, result: &RoutingResult) -> Result<(), String> {
    log::info!("Starting Routing Verification ({} nets)", result.outcomes.len());

    let mut msgs = Vec::new();

    match check_paths(grid, result) {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Disconnected or Illegal Paths Detected");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: All routed paths are connected."),
    }

    match check_shorts(result) {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Shared Cells Detected");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: No cell is used by two nets."),
    }

    match check_costs(grid, result) {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Cost Mismatch");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: Reported costs match the grid."),
    }

    if msgs.is_empty() {
        log::info!(
            "\x1b[32mSUCCESS\x1b[0m: VALID ROUTING ({}/{} nets, cost {})",
            result.routed,
            result.outcomes.len(),
            result.total_cost
        );
        Ok(())
    } else {
        log::error!("\x1b[31mFAILURE\x1b[0m: INVALID ROUTING ({} Errors)", msgs.len());
        Err(msgs.join("; "))
    }
}

fn routed(result: &RoutingResult) -> impl Iterator<Item = (&RoutingOutcome, &[GridCoord])> {
    result
        .outcomes
        .iter()
        .filter_map(|o| o.path.as_ref().map(|p| (o, p.cells.as_slice())))
}

fn check_paths<G: RoutingGrid + ?Sized>(grid: &G, result: &RoutingResult) -> Result<(), String> {
    for outcome in &result.outcomes {
        if (outcome.status == NetStatus::Routed) != outcome.path.is_some() {
            return Err(format!(
                "Net '{}' has status {:?} but {} path",
                outcome.name,
                outcome.status,
                if outcome.path.is_some() { "a" } else { "no" }
            ));
        }
    }

    for (outcome, cells) in routed(result) {
        let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
            return Err(format!("Net '{}' has an empty path", outcome.name));
        };
        if *first != outcome.start || *last != outcome.end {
            return Err(format!(
                "Net '{}' path runs {} -> {}, expected {} -> {}",
                outcome.name, first, last, outcome.start, outcome.end
            ));
        }
        if let Some(c) = cells.iter().find(|c| !grid.in_bounds(**c)) {
            return Err(format!("Net '{}' leaves the grid at {}", outcome.name, c));
        }
        for w in cells.windows(2) {
            let legal = w[0].is_planar_neighbor(&w[1])
                || (w[0].is_layer_step(&w[1])
                    && grid.is_via_capable(w[0].x, w[0].y).unwrap_or(false));
            if !legal {
                return Err(format!(
                    "Net '{}' jumps from {} to {}",
                    outcome.name, w[0], w[1]
                ));
            }
        }
    }
    Ok(())
}

fn check_shorts(result: &RoutingResult) -> Result<(), String> {
    let mut owner: HashMap<GridCoord, &str> = HashMap::new();
    for (outcome, cells) in routed(result) {
        for c in cells {
            if let Some(prev) = owner.insert(*c, &outcome.name) {
                return Err(format!(
                    "Cell {} used by '{}' and '{}'",
                    c, prev, outcome.name
                ));
            }
        }
    }
    Ok(())
}

fn check_costs<G: RoutingGrid + ?Sized>(grid: &G, result: &RoutingResult) -> Result<(), String> {
    let mut total = 0u64;
    let mut count = 0usize;
    for (outcome, cells) in routed(result) {
        let mut cost = 0u64;
        for c in cells {
            cost += grid.cost(*c).map_err(|e| e.to_string())? as u64;
        }
        let vias = cells.windows(2).filter(|w| w[0].z != w[1].z).count() as u64;
        cost += vias * grid.via_cost() as u64;

        if cost != outcome.cost() {
            return Err(format!(
                "Net '{}' reports cost {}, grid gives {}",
                outcome.name,
                outcome.cost(),
                cost
            ));
        }
        total += cost;
        count += 1;
    }

    if count != result.routed || total != result.total_cost {
        return Err(format!(
            "Result reports {} nets at cost {}, paths give {} at cost {}",
            result.routed, result.total_cost, count, total
        ));
    }
    Ok(())
}
