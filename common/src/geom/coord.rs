use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl GridCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    pub fn manhattan(&self, other: &GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn layer_diff(&self, other: &GridCoord) -> u8 {
        self.z.abs_diff(other.z)
    }

    pub fn is_planar_neighbor(&self, other: &GridCoord) -> bool {
        self.z == other.z && self.manhattan(other) == 1
    }

    pub fn is_layer_step(&self, other: &GridCoord) -> bool {
        self.x == other.x && self.y == other.y && self.layer_diff(other) == 1
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})[L{}]", self.x, self.y, self.z)
    }
}
