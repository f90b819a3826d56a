use crate::error::{Result, RouteError};
use crate::grid::{Occupancy, RoutingGrid};
use layerroute_common::geom::coord::GridCoord;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedPath {
    pub cells: Vec<GridCoord>,
    pub cost: u64,
}

impl RoutedPath {
    pub fn via_count(&self) -> usize {
        self.cells.windows(2).filter(|w| w[0].z != w[1].z).count()
    }
}

const NO_PARENT: u32 = u32::MAX;

#[derive(Clone)]
pub struct Dijkstra {
    parents: Vec<u32>,
    dist: Vec<u64>,
    visited_tag: Vec<u32>,
    current_tag: u32,
    frontier: PriorityQueue<u32, Reverse<(u64, u32)>>,
}

impl Default for Dijkstra {
    fn default() -> Self {
        Self::new()
    }
}

impl Dijkstra {
    pub fn new() -> Self {
        Self {
            parents: Vec::new(),
            dist: Vec::new(),
            visited_tag: Vec::new(),
            current_tag: 1,
            frontier: PriorityQueue::new(),
        }
    }

    fn ensure_capacity(&mut self, size: usize) {
        if size > self.parents.len() {
            self.parents.resize(size, NO_PARENT);
            self.dist.resize(size, u64::MAX);
            self.visited_tag.resize(size, 0);
        }
    }

    fn reset(&mut self) {
        self.current_tag = self.current_tag.wrapping_add(1);
        if self.current_tag == 0 {
            self.visited_tag.fill(0);
            self.current_tag = 1;
        }
        self.frontier.clear();
    }

    /// Minimum-cost path from `start` to `target` through unoccupied cells.
    ///
    /// Planar steps cost the destination cell; layer changes cost the via
    /// cost plus the destination cell and are only allowed at via-capable
    /// columns. The start cell's own cost seeds the search, so a path's cost
    /// covers every cell it uses. `occupancy` is never modified.
    pub fn find_path<G: RoutingGrid + ?Sized>(
        &mut self,
        grid: &G,
        occupancy: &Occupancy,
        start: GridCoord,
        target: GridCoord,
    ) -> Result<RoutedPath> {
        for c in [start, target] {
            if !grid.in_bounds(c) {
                return Err(RouteError::InvalidCoordinate(c));
            }
        }
        for c in [start, target] {
            if occupancy.is_occupied(c) {
                return Err(RouteError::BlockedEndpoint(c));
            }
        }

        self.ensure_capacity(grid.num_cells());
        self.reset();

        let start_idx = grid.index(start) as u32;
        let target_idx = grid.index(target) as u32;
        let via_cost = grid.via_cost() as u64;

        let start_cost = grid.cost(start)? as u64;
        self.record(start_idx as usize, NO_PARENT, start_cost);
        self.frontier.push(start_idx, Reverse((start_cost, start_idx)));

        while let Some((index, Reverse((current_dist, _)))) = self.frontier.pop() {
            if index == target_idx {
                return Ok(self.reconstruct_path(grid, target_idx, current_dist));
            }

            let position = grid.coord(index as usize);
            let mut neighbors = [(position, 0u64); 6];
            let mut n_count = 0;
            if position.x > 0 {
                neighbors[n_count] = (GridCoord::new(position.x - 1, position.y, position.z), 0);
                n_count += 1;
            }
            if position.x + 1 < grid.width() {
                neighbors[n_count] = (GridCoord::new(position.x + 1, position.y, position.z), 0);
                n_count += 1;
            }
            if position.y > 0 {
                neighbors[n_count] = (GridCoord::new(position.x, position.y - 1, position.z), 0);
                n_count += 1;
            }
            if position.y + 1 < grid.height() {
                neighbors[n_count] = (GridCoord::new(position.x, position.y + 1, position.z), 0);
                n_count += 1;
            }
            if grid.is_via_capable(position.x, position.y)? {
                if position.z > 0 {
                    neighbors[n_count] =
                        (GridCoord::new(position.x, position.y, position.z - 1), via_cost);
                    n_count += 1;
                }
                if position.z + 1 < grid.layers() {
                    neighbors[n_count] =
                        (GridCoord::new(position.x, position.y, position.z + 1), via_cost);
                    n_count += 1;
                }
            }

            for &(neighbor, extra) in &neighbors[..n_count] {
                if occupancy.is_occupied(neighbor) {
                    continue;
                }
                let tentative = current_dist + extra + grid.cost(neighbor)? as u64;
                let neighbor_idx = grid.index(neighbor);

                if self.visited_tag[neighbor_idx] != self.current_tag
                    || tentative < self.dist[neighbor_idx]
                {
                    self.record(neighbor_idx, index, tentative);
                    self.frontier.push_increase(
                        neighbor_idx as u32,
                        Reverse((tentative, neighbor_idx as u32)),
                    );
                }
            }
        }

        Err(RouteError::Unreachable { start, target })
    }

    #[inline(always)]
    fn record(&mut self, idx: usize, parent: u32, dist: u64) {
        self.parents[idx] = parent;
        self.dist[idx] = dist;
        self.visited_tag[idx] = self.current_tag;
    }

    fn reconstruct_path<G: RoutingGrid + ?Sized>(
        &self,
        grid: &G,
        target_idx: u32,
        cost: u64,
    ) -> RoutedPath {
        let mut cells = Vec::new();
        let mut curr = target_idx;
        loop {
            cells.push(grid.coord(curr as usize));
            let parent = self.parents[curr as usize];
            if parent == NO_PARENT {
                break;
            }
            curr = parent;
        }
        cells.reverse();
        RoutedPath { cells, cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LayeredGrid;

    fn c(x: u32, y: u32, z: u8) -> GridCoord {
        GridCoord::new(x, y, z)
    }

    #[test]
    fn straight_line_on_uniform_grid() {
        let grid = LayeredGrid::uniform(5, 5, 1, 1).unwrap();
        let occ = Occupancy::new(&grid);
        let path = Dijkstra::new()
            .find_path(&grid, &occ, c(0, 2, 0), c(4, 2, 0))
            .unwrap();
        assert_eq!(path.cost, 5);
        assert_eq!(path.cells.len(), 5);
        assert_eq!(path.cells.first(), Some(&c(0, 2, 0)));
        assert_eq!(path.cells.last(), Some(&c(4, 2, 0)));
        assert_eq!(path.via_count(), 0);
    }

    #[test]
    fn start_equals_target() {
        let grid = LayeredGrid::uniform(3, 3, 1, 4).unwrap();
        let occ = Occupancy::new(&grid);
        let path = Dijkstra::new()
            .find_path(&grid, &occ, c(1, 1, 0), c(1, 1, 0))
            .unwrap();
        assert_eq!(path.cells, vec![c(1, 1, 0)]);
        assert_eq!(path.cost, 4);
    }

    #[test]
    fn endpoint_errors() {
        let grid = LayeredGrid::uniform(3, 3, 1, 1).unwrap();
        let mut occ = Occupancy::new(&grid);
        let mut solver = Dijkstra::new();

        assert_eq!(
            solver.find_path(&grid, &occ, c(0, 0, 0), c(3, 0, 0)),
            Err(RouteError::InvalidCoordinate(c(3, 0, 0)))
        );
        assert_eq!(
            solver.find_path(&grid, &occ, c(0, 0, 1), c(2, 0, 0)),
            Err(RouteError::InvalidCoordinate(c(0, 0, 1)))
        );

        occ.occupy(c(2, 2, 0));
        assert_eq!(
            solver.find_path(&grid, &occ, c(0, 0, 0), c(2, 2, 0)),
            Err(RouteError::BlockedEndpoint(c(2, 2, 0)))
        );
        assert_eq!(
            solver.find_path(&grid, &occ, c(2, 2, 0), c(0, 0, 0)),
            Err(RouteError::BlockedEndpoint(c(2, 2, 0)))
        );
    }

    #[test]
    fn wall_makes_target_unreachable() {
        let grid = LayeredGrid::uniform(3, 3, 1, 1).unwrap();
        let mut occ = Occupancy::new(&grid);
        occ.occupy_path(&[c(1, 0, 0), c(1, 1, 0), c(1, 2, 0)]);
        assert_eq!(
            Dijkstra::new().find_path(&grid, &occ, c(0, 1, 0), c(2, 1, 0)),
            Err(RouteError::Unreachable {
                start: c(0, 1, 0),
                target: c(2, 1, 0)
            })
        );
    }

    #[test]
    fn solver_reuse_across_grid_sizes() {
        let small = LayeredGrid::uniform(2, 2, 1, 1).unwrap();
        let large = LayeredGrid::uniform(6, 6, 2, 2).unwrap().with_via(5, 5).unwrap();
        let mut solver = Dijkstra::new();

        let a = solver
            .find_path(&small, &Occupancy::new(&small), c(0, 0, 0), c(1, 1, 0))
            .unwrap();
        assert_eq!(a.cost, 3);

        let b = solver
            .find_path(&large, &Occupancy::new(&large), c(0, 0, 0), c(5, 5, 1))
            .unwrap();
        // 11 cells on layer 0, via, one cell on layer 1.
        assert_eq!(b.cost, 11 * 2 + 20 + 2);
        assert_eq!(b.via_count(), 1);

        let again = solver
            .find_path(&small, &Occupancy::new(&small), c(0, 0, 0), c(1, 1, 0))
            .unwrap();
        assert_eq!(again.cost, a.cost);
    }
}
