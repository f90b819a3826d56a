use clap::{Parser, Subcommand};
use layerroute_common::db::core::Design;
use layerroute_common::db::parser::design;
use layerroute_common::util::config::Config;
use layerroute_common::util::logger;
use layerroute_router::check;
use layerroute_router::grid::{LayeredGrid, RoutingGrid};
use layerroute_router::result::{NetStatus, RoutingResult};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `input.design_file` from the config.
    #[arg(short, long, value_name = "FILE")]
    design: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search net orderings and report the best routing.
    Optimize,
    /// Route the nets in exactly the given order.
    Route {
        /// Comma-separated net names, e.g. `Net2,Net1`.
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<String>,
    },
    /// Optimize, then print one feature row per net.
    Features,
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let mut config: Config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    if let Some(path) = &args.design {
        config.input.design_file = path.to_string_lossy().into_owned();
    }

    let (design, grid) = load_design(&config)?;
    let command = args.command.unwrap_or(Commands::Optimize);

    let result = match command {
        Commands::Optimize => {
            let result = run_optimizer(&design, &grid, &config)?;
            print_routing(&result);
            result
        }
        Commands::Route { order } => {
            let order = design
                .netlist
                .order_by_names(order.as_slice())
                .map_err(|e| anyhow::anyhow!("Invalid --order: {}", e))?;
            log::info!("Routing {} nets in fixed order", order.len());
            let result =
                layerroute_router::route_fixed_order(&grid, &design.netlist.nets, &order, &config);
            print_routing(&result);
            result
        }
        Commands::Features => {
            let result = run_optimizer(&design, &grid, &config)?;
            print_features(&result);
            result
        }
    };

    check::run(&grid, &result).map_err(|e| anyhow::anyhow!("Verification Failed: {}", e))?;

    Ok(())
}

fn load_design(config: &Config) -> anyhow::Result<(Design, LayeredGrid)> {
    let path = &config.input.design_file;
    if !Path::new(path).exists() {
        return Err(anyhow::anyhow!("Design file missing: {}", path));
    }

    log::info!("Parsing design: {}", path);
    let design = design::parse(path)?;
    let grid = layerroute_router::build_grid(&design.grid, config)
        .map_err(|e| anyhow::anyhow!("Invalid grid in '{}': {}", path, e))?;
    log::info!(
        "Routing grid: {}x{}x{}, {} via columns, via cost {}",
        grid.width(),
        grid.height(),
        grid.layers(),
        grid.via_columns(),
        grid.via_cost()
    );
    Ok((design, grid))
}

fn run_optimizer(
    design: &Design,
    grid: &LayeredGrid,
    config: &Config,
) -> anyhow::Result<RoutingResult> {
    log::info!("Starting Order Optimization...");
    let report = layerroute_router::optimize(grid, &design.netlist.nets, config)
        .map_err(|e| anyhow::anyhow!("Order optimization failed: {}", e))?;

    let names: Vec<&str> = report
        .best
        .order
        .iter()
        .map(|&i| design.netlist.nets[i].name.as_str())
        .collect();
    println!(
        "Best order ({} strategy, {} orderings, {:?}): {}",
        report.strategy,
        report.explored,
        report.stop_reason,
        names.join(" -> ")
    );
    Ok(report.best)
}

fn print_routing(result: &RoutingResult) {
    for outcome in &result.outcomes {
        match (&outcome.status, &outcome.path) {
            (NetStatus::Routed, Some(path)) => {
                let cells: Vec<String> = path.cells.iter().map(|c| c.to_string()).collect();
                println!(
                    "{}: cost {}, {} vias: {}",
                    outcome.name,
                    path.cost,
                    path.via_count(),
                    cells.join(" ")
                );
            }
            (NetStatus::Failed(reason), _) => println!("{}: FAILED ({})", outcome.name, reason),
            _ => println!("{}: not attempted", outcome.name),
        }
    }
    println!(
        "Routed {}/{} nets, total cost {}",
        result.routed,
        result.outcomes.len(),
        result.total_cost
    );
}

fn print_features(result: &RoutingResult) {
    println!("net,sx,sy,sl,ex,ey,el,dx,dy,dz,manhattan,horizontal_dominant,success,cost");
    for row in result.features() {
        println!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            row.name,
            row.start.x,
            row.start.y,
            row.start.z,
            row.end.x,
            row.end.y,
            row.end.z,
            row.dx,
            row.dy,
            row.dz,
            row.manhattan,
            row.horizontal_dominant as u8,
            row.success as u8,
            row.cost
        );
    }
}
