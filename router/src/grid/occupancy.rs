use super::RoutingGrid;
use layerroute_common::geom::coord::GridCoord;

#[derive(Clone, Debug)]
pub struct Occupancy {
    width: u32,
    height: u32,
    layers: u8,
    cells: Vec<bool>,
    count: usize,
}

impl Occupancy {
    pub fn new<G: RoutingGrid + ?Sized>(grid: &G) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            layers: grid.layers(),
            cells: vec![false; grid.num_cells()],
            count: 0,
        }
    }

    #[inline(always)]
    fn index(&self, coord: GridCoord) -> Option<usize> {
        if coord.x >= self.width || coord.y >= self.height || coord.z >= self.layers {
            return None;
        }
        Some(
            (coord.z as usize) * (self.width as usize) * (self.height as usize)
                + (coord.y as usize) * (self.width as usize)
                + (coord.x as usize),
        )
    }

    /// Out-of-bounds cells count as occupied.
    #[inline(always)]
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        match self.index(coord) {
            Some(idx) => self.cells[idx],
            None => true,
        }
    }

    /// Claims `coord`. Returns false when it was already taken or is out of bounds.
    pub fn occupy(&mut self, coord: GridCoord) -> bool {
        match self.index(coord) {
            Some(idx) if !self.cells[idx] => {
                self.cells[idx] = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn occupy_path(&mut self, path: &[GridCoord]) {
        for &c in path {
            self.occupy(c);
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LayeredGrid;

    #[test]
    fn occupy_and_query() {
        let grid = LayeredGrid::uniform(3, 3, 2, 1).unwrap();
        let mut occ = Occupancy::new(&grid);
        let c = GridCoord::new(2, 1, 1);

        assert!(!occ.is_occupied(c));
        assert!(occ.occupy(c));
        assert!(!occ.occupy(c));
        assert!(occ.is_occupied(c));
        assert_eq!(occ.occupied_count(), 1);

        assert!(occ.is_occupied(GridCoord::new(3, 0, 0)));
        assert!(!occ.occupy(GridCoord::new(0, 0, 2)));

        occ.occupy_path(&[GridCoord::new(0, 0, 0), GridCoord::new(1, 0, 0), c]);
        assert_eq!(occ.occupied_count(), 3);
    }
}
