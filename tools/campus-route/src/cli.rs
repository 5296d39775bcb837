//! CLI commands for campus-route

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::campus::{Campus, Category, Location, LocationStore};
use crate::config::Config;
use crate::graph::{AdjacencyGraph, CampusGraph};
use crate::metric::CostMetric;
use crate::route::find_shortest_path;
use crate::server::{self, AppState};
use crate::verify::verify_random_queries;

#[derive(Parser)]
#[command(name = "campus-route")]
#[command(version, about = "Shortest walking routes across the campus", long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Location dataset (JSON); overrides the config file
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the shortest route between two locations (id or name)
    Route {
        from: String,
        to: String,

        #[arg(short, long, value_enum, default_value_t = CostMetric::Distance)]
        metric: CostMetric,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List locations
    Locations {
        #[arg(long, value_enum)]
        campus: Option<Campus>,

        #[arg(long, value_enum)]
        category: Option<Category>,
    },

    /// Search locations by keyword
    Search { keyword: String },

    /// Write the walkway graph as a JSON adjacency list
    ExportGraph {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import and validate a JSON adjacency-list graph
    CheckGraph { file: PathBuf },

    /// Compare the route engine against a brute-force reference on random queries
    Verify {
        #[arg(long, default_value = "200")]
        samples: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Start HTTP API server with OpenAPI docs
    Serve {
        /// Port to listen on (config file value if omitted)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Config file contents with command-line overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        if let Some(dataset) = &self.dataset {
            config.dataset = Some(dataset.clone());
        }
        Ok(config)
    }
}

fn load_store(config: &Config) -> Result<LocationStore> {
    let store = match &config.dataset {
        Some(path) => LocationStore::load(path)
            .with_context(|| format!("Failed to load dataset {}", path.display()))?,
        None => LocationStore::builtin().context("Bundled dataset is invalid")?,
    };
    tracing::debug!(
        locations = store.dataset().locations.len(),
        paths = store.paths().len(),
        "dataset loaded"
    );
    Ok(store)
}

fn print_locations(locations: &[&Location]) {
    for l in locations {
        println!(
            "{:>3}  {:<36} {:<14} {}",
            l.id,
            l.name,
            l.category.label(),
            l.campus.label()
        );
    }
    println!("{} location(s)", locations.len());
}

pub async fn run(command: Commands, config: Config) -> Result<()> {
    let store = load_store(&config)?;

    match command {
        Commands::Route {
            from,
            to,
            metric,
            json,
        } => {
            let start = store.resolve(&from)?;
            let end = store.resolve(&to)?;
            if start == end {
                bail!("Start and end are the same location ({start})");
            }

            let graph = store.graph(config.limits)?;
            let result = find_shortest_path(&graph, start, end, metric)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            if !result.is_found() {
                println!("No route from {from} to {to}");
                return Ok(());
            }

            for step in store.itinerary(&result) {
                println!("  {:>3}  {}", step.id, step.name);
            }
            println!("\nDistance: {:.0}m", result.total_distance);
            println!("Time: {:.1} minutes", result.total_time);
            println!("Optimized for: {metric}");
        }
        Commands::Locations { campus, category } => {
            print_locations(&store.locations(campus, category));
        }
        Commands::Search { keyword } => {
            print_locations(&store.search(&keyword));
        }
        Commands::ExportGraph { output } => {
            let graph = store.graph(config.limits)?;
            let json = serde_json::to_string_pretty(&graph.to_adjacency())?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "✓ Wrote {} vertices, {} edges to {}",
                        graph.vertex_count(),
                        graph.edge_count(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::CheckGraph { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let raw: AdjacencyGraph = serde_json::from_str(&text)
                .with_context(|| format!("{} is not an adjacency-list graph", file.display()))?;
            let graph = CampusGraph::from_adjacency(&raw, config.limits)
                .with_context(|| format!("{} failed validation", file.display()))?;
            println!(
                "✓ {}: {} vertices, {} edges",
                file.display(),
                graph.vertex_count(),
                graph.edge_count()
            );
        }
        Commands::Verify { samples, seed } => {
            let graph = store.graph(config.limits)?;
            let report = verify_random_queries(&graph, samples, seed)?;
            println!(
                "Queries: {}  unreachable: {}  mismatches: {}",
                report.queries,
                report.unreachable,
                report.mismatches.len()
            );
            if !report.passed() {
                for m in &report.mismatches {
                    println!("  ✗ {} -> {} ({}): {}", m.start, m.end, m.metric, m.reason);
                }
                bail!("{} route(s) disagree with the reference", report.mismatches.len());
            }
            println!("✓ All routes optimal");
        }
        Commands::Serve { port } => {
            let graph = store.graph(config.limits)?;
            let ip: IpAddr = config
                .server
                .bind
                .parse()
                .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
            let addr = SocketAddr::new(ip, port.unwrap_or(config.server.port));
            server::serve(Arc::new(AppState::new(store, graph)), addr).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_route_with_global_flags() {
        let cli = Cli::try_parse_from([
            "campus-route",
            "route",
            "North Gate",
            "11",
            "--metric",
            "time",
            "--dataset",
            "/tmp/campus.json",
        ])
        .unwrap();
        assert_eq!(cli.dataset, Some(PathBuf::from("/tmp/campus.json")));
        match cli.command {
            Commands::Route {
                from, to, metric, json,
            } => {
                assert_eq!(from, "North Gate");
                assert_eq!(to, "11");
                assert_eq!(metric, CostMetric::Time);
                assert!(!json);
            }
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn dataset_flag_overrides_config() {
        let cli = Cli::try_parse_from(["campus-route", "--dataset", "d.json", "locations"]).unwrap();
        let config = cli.load_config().unwrap();
        assert_eq!(config.dataset, Some(PathBuf::from("d.json")));
    }

    #[test]
    fn rejects_unknown_metric() {
        assert!(Cli::try_parse_from(["campus-route", "route", "0", "11", "-m", "stairs"]).is_err());
    }

    #[tokio::test]
    async fn route_rejects_identical_endpoints() {
        let command = Commands::Route {
            from: "Library".to_string(),
            to: "11".to_string(),
            metric: CostMetric::Distance,
            json: false,
        };
        assert!(run(command, Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn export_then_check_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        run(
            Commands::ExportGraph {
                output: Some(path.clone()),
            },
            Config::default(),
        )
        .await
        .unwrap();
        run(Commands::CheckGraph { file: path.clone() }, Config::default())
            .await
            .unwrap();

        fs::write(&path, r#"{"vertices":[0,1],"adjacencyList":{"0":[{"vertex":1,"distance":5.0,"time":1.0}],"1":[]}}"#)
            .unwrap();
        assert!(run(Commands::CheckGraph { file: path }, Config::default())
            .await
            .is_err());
    }
}
