use crate::algo::dijkstra::RoutedPath;
use crate::error::RouteError;
use layerroute_common::db::core::Net;
use layerroute_common::db::indices::NetId;
use layerroute_common::geom::coord::GridCoord;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetStatus {
    Routed,
    Failed(RouteError),
    NotAttempted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingOutcome {
    pub net: NetId,
    pub name: String,
    pub start: GridCoord,
    pub end: GridCoord,
    pub status: NetStatus,
    pub path: Option<RoutedPath>,
}

impl RoutingOutcome {
    pub fn routed(net: &Net, path: RoutedPath) -> Self {
        Self::with_status(net, NetStatus::Routed, Some(path))
    }

    pub fn failed(net: &Net, reason: RouteError) -> Self {
        Self::with_status(net, NetStatus::Failed(reason), None)
    }

    pub fn not_attempted(net: &Net) -> Self {
        Self::with_status(net, NetStatus::NotAttempted, None)
    }

    fn with_status(net: &Net, status: NetStatus, path: Option<RoutedPath>) -> Self {
        Self {
            net: net.id,
            name: net.name.clone(),
            start: net.start,
            end: net.end,
            status,
            path,
        }
    }

    pub fn success(&self) -> bool {
        self.status == NetStatus::Routed
    }

    pub fn cost(&self) -> u64 {
        self.path.as_ref().map_or(0, |p| p.cost)
    }

    pub fn features(&self) -> NetFeatures {
        let dx = self.start.x.abs_diff(self.end.x);
        let dy = self.start.y.abs_diff(self.end.y);
        NetFeatures {
            net: self.net,
            name: self.name.clone(),
            start: self.start,
            end: self.end,
            dx,
            dy,
            dz: self.start.layer_diff(&self.end),
            manhattan: dx + dy,
            horizontal_dominant: dx >= dy,
            success: self.success(),
            cost: self.cost(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetFeatures {
    pub net: NetId,
    pub name: String,
    pub start: GridCoord,
    pub end: GridCoord,
    pub dx: u32,
    pub dy: u32,
    pub dz: u8,
    pub manhattan: u32,
    pub horizontal_dominant: bool,
    pub success: bool,
    pub cost: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingResult {
    pub order: Vec<usize>,
    pub outcomes: Vec<RoutingOutcome>,
    pub routed: usize,
    pub total_cost: u64,
}

impl RoutingResult {
    pub fn push(&mut self, outcome: RoutingOutcome) {
        if outcome.success() {
            self.routed += 1;
            self.total_cost += outcome.cost();
        }
        self.outcomes.push(outcome);
    }

    /// Outcomes of the nets the router tried. Under the stop policy this
    /// ends at the first failure; under skip it keeps every later failure.
    pub fn attempted(&self) -> &[RoutingOutcome] {
        let end = self
            .outcomes
            .iter()
            .position(|o| o.status == NetStatus::NotAttempted)
            .unwrap_or(self.outcomes.len());
        &self.outcomes[..end]
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, NetStatus::Failed(_)))
            .count()
    }

    pub fn all_routed(&self) -> bool {
        self.routed == self.outcomes.len()
    }

    /// More routed nets wins, then lower total cost. `Greater` means better.
    pub fn score_cmp(&self, other: &RoutingResult) -> Ordering {
        self.routed
            .cmp(&other.routed)
            .then_with(|| other.total_cost.cmp(&self.total_cost))
    }

    /// Strictly better; full ties keep the incumbent.
    pub fn is_better_than(&self, other: &RoutingResult) -> bool {
        self.score_cmp(other) == Ordering::Greater
    }

    pub fn features(&self) -> Vec<NetFeatures> {
        self.outcomes.iter().map(RoutingOutcome::features).collect()
    }
}
