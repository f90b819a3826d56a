use super::RoutingGrid;
use crate::error::{Result, RouteError};
use layerroute_common::db::core::GridSpec;
use layerroute_common::geom::coord::GridCoord;

pub const DEFAULT_VIA_COST: u32 = 20;

/// Dense per-layer cost array plus a per-column via map.
#[derive(Clone, Debug)]
pub struct LayeredGrid {
    width: u32,
    height: u32,
    layers: u8,
    costs: Vec<u32>,
    vias: Vec<bool>,
    via_cost: u32,
}

impl LayeredGrid {
    pub fn uniform(width: u32, height: u32, layers: u8, cost: u32) -> Result<Self> {
        if width == 0 || height == 0 || layers == 0 {
            return Err(RouteError::InvalidGrid(format!(
                "empty grid ({}x{}x{})",
                width, height, layers
            )));
        }
        if cost == 0 {
            return Err(RouteError::InvalidGrid("cell cost must be positive".into()));
        }

        let plane = (width as usize) * (height as usize);
        if plane * layers as usize > 50_000_000 {
            log::warn!(
                "Allocating large LayeredGrid: {} cells. Ensure sufficient RAM.",
                plane * layers as usize
            );
        }

        Ok(Self {
            width,
            height,
            layers,
            costs: vec![cost; plane * layers as usize],
            vias: vec![false; plane],
            via_cost: DEFAULT_VIA_COST,
        })
    }

    pub fn from_spec(spec: &GridSpec) -> Result<Self> {
        let mut grid = Self::uniform(spec.width, spec.height, spec.layers, spec.default_cost)?;

        if let Some(costs) = &spec.costs {
            if costs.len() != spec.layers as usize {
                return Err(RouteError::InvalidGrid(format!(
                    "cost table has {} layers, grid has {}",
                    costs.len(),
                    spec.layers
                )));
            }
            for (z, plane) in costs.iter().enumerate() {
                if plane.len() != spec.height as usize
                    || plane.iter().any(|row| row.len() != spec.width as usize)
                {
                    return Err(RouteError::InvalidGrid(format!(
                        "cost table for layer {} is not {}x{}",
                        z, spec.width, spec.height
                    )));
                }
                for (y, row) in plane.iter().enumerate() {
                    for (x, &cost) in row.iter().enumerate() {
                        grid = grid.with_cost(GridCoord::new(x as u32, y as u32, z as u8), cost)?;
                    }
                }
            }
        }

        if spec.via_everywhere {
            grid.vias.fill(true);
        } else {
            for &(x, y) in &spec.vias {
                grid = grid.with_via(x, y).map_err(|_| {
                    RouteError::InvalidGrid(format!("via column ({}, {}) is outside the grid", x, y))
                })?;
            }
        }

        Ok(grid)
    }

    pub fn with_cost(mut self, coord: GridCoord, cost: u32) -> Result<Self> {
        if !self.in_bounds(coord) {
            return Err(RouteError::InvalidCoordinate(coord));
        }
        if cost == 0 {
            return Err(RouteError::InvalidGrid(format!(
                "cost at {} must be positive",
                coord
            )));
        }
        let idx = self.index(coord);
        self.costs[idx] = cost;
        Ok(self)
    }

    pub fn with_via(mut self, x: u32, y: u32) -> Result<Self> {
        if x >= self.width || y >= self.height {
            return Err(RouteError::InvalidCoordinate(GridCoord::new(x, y, 0)));
        }
        let idx = self.column(x, y);
        self.vias[idx] = true;
        Ok(self)
    }

    pub fn with_via_cost(mut self, via_cost: u32) -> Self {
        self.via_cost = via_cost;
        self
    }

    pub fn via_columns(&self) -> usize {
        self.vias.iter().filter(|&&v| v).count()
    }

    #[inline(always)]
    fn column(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

impl RoutingGrid for LayeredGrid {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn layers(&self) -> u8 {
        self.layers
    }
    fn via_cost(&self) -> u32 {
        self.via_cost
    }

    #[inline(always)]
    fn cost(&self, coord: GridCoord) -> Result<u32> {
        if !self.in_bounds(coord) {
            return Err(RouteError::InvalidCoordinate(coord));
        }
        Ok(self.costs[self.index(coord)])
    }

    #[inline(always)]
    fn is_via_capable(&self, x: u32, y: u32) -> Result<bool> {
        if x >= self.width || y >= self.height {
            return Err(RouteError::InvalidCoordinate(GridCoord::new(x, y, 0)));
        }
        Ok(self.vias[self.column(x, y)])
    }
}
