use layerroute_common::geom::coord::GridCoord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("cell {0} is outside the grid")]
    InvalidCoordinate(GridCoord),
    #[error("endpoint {0} is already occupied")]
    BlockedEndpoint(GridCoord),
    #[error("no path from {start} to {target} under the current occupancy")]
    Unreachable { start: GridCoord, target: GridCoord },
    #[error("{nets} nets exceed the exhaustive search limit of {limit} and no fallback strategy is configured")]
    ExplorationBudgetExceeded { nets: usize, limit: usize },
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    #[error("malformed netlist: {0}")]
    MalformedNetlist(String),
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;
