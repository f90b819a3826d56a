use crate::db::indices::NetId;
use crate::geom::coord::GridCoord;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Net {
    pub id: NetId,
    pub name: String,
    pub start: GridCoord,
    pub end: GridCoord,
}

#[derive(Clone, Debug, Default)]
pub struct Netlist {
    pub nets: Vec<Net>,
    pub net_name_map: HashMap<String, NetId>,
}

impl Netlist {
    pub fn new() -> Self {
        Self {
            nets: Vec::new(),
            net_name_map: HashMap::new(),
        }
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    pub fn add_net(
        &mut self,
        name: impl Into<String>,
        start: GridCoord,
        end: GridCoord,
    ) -> anyhow::Result<NetId> {
        let name = name.into();
        if self.net_name_map.contains_key(&name) {
            anyhow::bail!("Duplicate net name '{}'", name);
        }
        let id = NetId::new(self.nets.len());
        self.nets.push(Net {
            id,
            name: name.clone(),
            start,
            end,
        });
        self.net_name_map.insert(name, id);
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<&Net> {
        self.net_name_map.get(name).map(|id| &self.nets[id.index()])
    }

    pub fn order_by_names<S: AsRef<str>>(&self, names: &[S]) -> anyhow::Result<Vec<usize>> {
        let mut order = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let net = self
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown net '{}'", name))?;
            if order.contains(&net.id.index()) {
                anyhow::bail!("Net '{}' listed twice in the ordering", name);
            }
            order.push(net.id.index());
        }
        Ok(order)
    }
}

/// Raw grid description as loaded from a design file.
///
/// `costs` is indexed `[layer][y][x]`. When it is absent every cell costs
/// `default_cost`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSpec {
    pub width: u32,
    pub height: u32,
    pub layers: u8,
    pub default_cost: u32,
    pub costs: Option<Vec<Vec<Vec<u32>>>>,
    pub vias: Vec<(u32, u32)>,
    pub via_everywhere: bool,
}

impl GridSpec {
    pub fn contains(&self, c: GridCoord) -> bool {
        c.x < self.width && c.y < self.height && c.z < self.layers
    }
}

#[derive(Clone, Debug)]
pub struct Design {
    pub grid: GridSpec,
    pub netlist: Netlist,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netlist_rejects_duplicates() {
        let mut nl = Netlist::new();
        let a = nl
            .add_net("A", GridCoord::new(0, 0, 0), GridCoord::new(1, 1, 0))
            .unwrap();
        assert_eq!(a.index(), 0);
        assert!(
            nl.add_net("A", GridCoord::new(2, 2, 0), GridCoord::new(3, 3, 0))
                .is_err()
        );
        assert_eq!(nl.num_nets(), 1);
        assert_eq!(nl.get("A").unwrap().end, GridCoord::new(1, 1, 0));
    }

    #[test]
    fn order_by_names() {
        let mut nl = Netlist::new();
        for name in ["A", "B", "C"] {
            nl.add_net(name, GridCoord::new(0, 0, 0), GridCoord::new(0, 0, 0))
                .unwrap();
        }
        assert_eq!(nl.order_by_names(&["C", "A", "B"]).unwrap(), vec![2, 0, 1]);
        assert!(nl.order_by_names(&["C", "C"]).is_err());
        assert!(nl.order_by_names(&["D"]).is_err());
    }
}
