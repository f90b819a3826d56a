#![allow(dead_code)]

use layerroute_common::db::core::Netlist;
use layerroute_common::geom::coord::GridCoord;
use layerroute_router::grid::{LayeredGrid, Occupancy, RoutingGrid};

pub fn c(x: u32, y: u32, z: u8) -> GridCoord {
    GridCoord::new(x, y, z)
}

// 6x6x3 board with via columns on the diagonal, costs indexed [layer][y][x].
pub const DEMO_COSTS: [[[u32; 6]; 6]; 3] = [
    [
        [1, 2, 3, 4, 5, 1],
        [3, 6, 5, 2, 2, 1],
        [2, 1, 1, 7, 6, 3],
        [1, 4, 2, 3, 1, 3],
        [4, 1, 1, 9, 6, 1],
        [1, 3, 4, 3, 2, 5],
    ],
    [
        [3, 2, 1, 4, 3, 5],
        [1, 3, 1, 5, 2, 6],
        [1, 4, 2, 1, 1, 2],
        [2, 1, 1, 1, 7, 3],
        [1, 4, 2, 1, 3, 2],
        [1, 5, 6, 1, 7, 3],
    ],
    [
        [1, 4, 1, 1, 3, 1],
        [2, 1, 2, 1, 2, 2],
        [1, 1, 2, 1, 4, 1],
        [1, 2, 3, 1, 3, 1],
        [5, 6, 3, 1, 4, 1],
        [5, 1, 2, 1, 3, 1],
    ],
];

pub fn demo_grid() -> LayeredGrid {
    let mut grid = LayeredGrid::uniform(6, 6, 3, 1).unwrap();
    for (z, plane) in DEMO_COSTS.iter().enumerate() {
        for (y, row) in plane.iter().enumerate() {
            for (x, &cost) in row.iter().enumerate() {
                grid = grid.with_cost(c(x as u32, y as u32, z as u8), cost).unwrap();
            }
        }
    }
    for i in 1..=4 {
        grid = grid.with_via(i, i).unwrap();
    }
    grid
}

pub fn demo_nets() -> Netlist {
    let mut nl = Netlist::new();
    nl.add_net("A", c(0, 0, 0), c(5, 5, 2)).unwrap();
    nl.add_net("B", c(5, 0, 0), c(0, 5, 1)).unwrap();
    nl.add_net("C", c(0, 3, 0), c(5, 2, 0)).unwrap();
    nl.add_net("D", c(2, 0, 1), c(3, 5, 1)).unwrap();
    nl.add_net("E", c(0, 5, 2), c(5, 0, 2)).unwrap();
    nl
}

// Three nets where committing "Long" first blocks both short ones.
pub fn crossing() -> (LayeredGrid, Netlist) {
    let grid = LayeredGrid::uniform(5, 3, 1, 1).unwrap();
    let mut nl = Netlist::new();
    nl.add_net("Long", c(0, 1, 0), c(4, 1, 0)).unwrap();
    nl.add_net("Up", c(1, 1, 0), c(1, 0, 0)).unwrap();
    nl.add_net("Down", c(3, 1, 0), c(3, 2, 0)).unwrap();
    (grid, nl)
}

// Reference minimum path cost by exhaustive edge relaxation.
pub fn relaxed_cost(
    grid: &LayeredGrid,
    occupancy: &Occupancy,
    start: GridCoord,
    target: GridCoord,
) -> Option<u64> {
    if occupancy.is_occupied(start) || occupancy.is_occupied(target) {
        return None;
    }
    let mut dist = vec![u64::MAX; grid.num_cells()];
    dist[grid.index(start)] = grid.cost(start).unwrap() as u64;

    let cells: Vec<GridCoord> = (0..grid.num_cells()).map(|i| grid.coord(i)).collect();
    loop {
        let mut changed = false;
        for &from in &cells {
            let d = dist[grid.index(from)];
            if d == u64::MAX {
                continue;
            }
            for &to in &cells {
                if occupancy.is_occupied(to) {
                    continue;
                }
                let extra = if from.is_planar_neighbor(&to) {
                    0
                } else if from.is_layer_step(&to) && grid.is_via_capable(from.x, from.y).unwrap() {
                    grid.via_cost() as u64
                } else {
                    continue;
                };
                let next = d + extra + grid.cost(to).unwrap() as u64;
                if next < dist[grid.index(to)] {
                    dist[grid.index(to)] = next;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    let d = dist[grid.index(target)];
    (d != u64::MAX).then_some(d)
}
