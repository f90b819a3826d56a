pub mod layered;
pub mod occupancy;

pub use layered::LayeredGrid;
pub use occupancy::Occupancy;

use crate::error::Result;
use layerroute_common::geom::coord::GridCoord;

pub trait RoutingGrid: Sync + Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn layers(&self) -> u8;

    fn via_cost(&self) -> u32;

    fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x < self.width() && coord.y < self.height() && coord.z < self.layers()
    }

    /// Cost of entering `coord`. Always positive.
    fn cost(&self, coord: GridCoord) -> Result<u32>;

    /// Whether the column at (x, y) allows layer changes, on every layer.
    fn is_via_capable(&self, x: u32, y: u32) -> Result<bool>;

    fn num_cells(&self) -> usize {
        (self.width() as usize) * (self.height() as usize) * (self.layers() as usize)
    }

    #[inline(always)]
    fn index(&self, coord: GridCoord) -> usize {
        (coord.z as usize) * (self.width() as usize) * (self.height() as usize)
            + (coord.y as usize) * (self.width() as usize)
            + (coord.x as usize)
    }

    #[inline(always)]
    fn coord(&self, idx: usize) -> GridCoord {
        let plane = (self.width() as usize) * (self.height() as usize);
        let z = (idx / plane) as u8;
        let rem = idx % plane;
        GridCoord::new(
            (rem % self.width() as usize) as u32,
            (rem / self.width() as usize) as u32,
            z,
        )
    }
}
