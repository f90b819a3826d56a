use crate::db::core::{Design, GridSpec, Netlist};
use crate::geom::coord::GridCoord;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawDesign {
    grid: RawGrid,
    #[serde(default)]
    nets: Vec<RawNet>,
}

#[derive(Debug, Deserialize)]
struct RawGrid {
    width: u32,
    height: u32,
    layers: u32,
    #[serde(default = "default_cell_cost")]
    default_cost: u32,
    #[serde(default)]
    costs: Option<Vec<Vec<Vec<u32>>>>,
    #[serde(default)]
    vias: Vec<[u32; 2]>,
    #[serde(default)]
    via_everywhere: bool,
}

#[derive(Debug, Deserialize)]
struct RawNet {
    name: String,
    start: [u32; 3],
    end: [u32; 3],
}

fn default_cell_cost() -> u32 {
    1
}

pub fn parse(filename: &str) -> Result<Design> {
    let text = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read design file '{}'", filename))?;
    parse_str(&text).with_context(|| format!("Invalid design file '{}'", filename))
}

pub fn parse_str(text: &str) -> Result<Design> {
    let raw: RawDesign = toml::from_str(text)?;
    let grid = build_grid(raw.grid)?;

    let mut netlist = Netlist::new();
    for net in raw.nets {
        let start = checked_cell(&grid, net.start)
            .with_context(|| format!("Net '{}' start", net.name))?;
        let end =
            checked_cell(&grid, net.end).with_context(|| format!("Net '{}' end", net.name))?;
        netlist.add_net(net.name, start, end)?;
    }

    log::info!(
        "Loaded design: {}x{}x{} grid, {} via columns, {} nets",
        grid.width,
        grid.height,
        grid.layers,
        if grid.via_everywhere {
            (grid.width * grid.height) as usize
        } else {
            grid.vias.len()
        },
        netlist.num_nets()
    );

    Ok(Design { grid, netlist })
}

fn build_grid(raw: RawGrid) -> Result<GridSpec> {
    if raw.width == 0 || raw.height == 0 || raw.layers == 0 {
        anyhow::bail!(
            "Grid dimensions must be positive (got {}x{}x{})",
            raw.width,
            raw.height,
            raw.layers
        );
    }
    if raw.layers > u8::MAX as u32 {
        anyhow::bail!("At most {} layers are supported", u8::MAX);
    }
    if raw.default_cost == 0 {
        anyhow::bail!("default_cost must be positive");
    }

    if let Some(costs) = &raw.costs {
        if costs.len() != raw.layers as usize {
            anyhow::bail!(
                "costs has {} layers, expected {}",
                costs.len(),
                raw.layers
            );
        }
        for (l, plane) in costs.iter().enumerate() {
            if plane.len() != raw.height as usize {
                anyhow::bail!(
                    "costs layer {} has {} rows, expected {}",
                    l,
                    plane.len(),
                    raw.height
                );
            }
            for (y, row) in plane.iter().enumerate() {
                if row.len() != raw.width as usize {
                    anyhow::bail!(
                        "costs layer {} row {} has {} entries, expected {}",
                        l,
                        y,
                        row.len(),
                        raw.width
                    );
                }
                if let Some(x) = row.iter().position(|&c| c == 0) {
                    anyhow::bail!("Cost at ({},{}) on layer {} must be positive", x, y, l);
                }
            }
        }
    }

    for &[x, y] in &raw.vias {
        if x >= raw.width || y >= raw.height {
            anyhow::bail!("Via column ({},{}) is outside the grid", x, y);
        }
    }

    Ok(GridSpec {
        width: raw.width,
        height: raw.height,
        layers: raw.layers as u8,
        default_cost: raw.default_cost,
        costs: raw.costs,
        vias: raw.vias.into_iter().map(|[x, y]| (x, y)).collect(),
        via_everywhere: raw.via_everywhere,
    })
}

fn checked_cell(grid: &GridSpec, raw: [u32; 3]) -> Result<GridCoord> {
    let [x, y, l] = raw;
    if x >= grid.width || y >= grid.height || l >= grid.layers as u32 {
        anyhow::bail!(
            "Cell ({},{}) on layer {} is outside the {}x{}x{} grid",
            x,
            y,
            l,
            grid.width,
            grid.height,
            grid.layers
        );
    }
    Ok(GridCoord::new(x, y, l as u8))
}
