//! `dashctl`: command line front end for the dashboard engine

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dash_layout::grid::GridTemplate;
use dash_layout::{Layout, MenuId, NodeKind, Workspace, WorkspaceRecord};
use dash_session::{run_simulator, SessionConfig, SimulatorConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("dashctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dashboard workspace engine tools")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Session config (TOML)"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a workspace JSON file against the layout invariants")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Print a workspace's layout tree")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("instantiate")
                .about("Create a workspace from a grid template and print it as JSON")
                .arg(
                    Arg::new("template")
                        .long("template")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Grid template JSON"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Workspace name"),
                )
                .arg(Arg::new("menu").long("menu").help("Menu folder id")),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the session invariant simulator")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("ops")
                        .long("ops")
                        .default_value("1000")
                        .value_parser(value_parser!(u64))
                        .help("Number of operations to simulate"),
                )
                .arg(
                    Arg::new("workspaces")
                        .long("workspaces")
                        .default_value("4")
                        .value_parser(value_parser!(usize))
                        .help("Workspaces seeded into the store"),
                )
                .arg(
                    Arg::new("keep-going")
                        .long("keep-going")
                        .action(ArgAction::SetTrue)
                        .help("Collect every violation instead of stopping at the first"),
                ),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Session config from the global `--config`, defaults without one
fn load_config(args: &ArgMatches) -> Result<SessionConfig> {
    let Some(path) = args.get_one::<PathBuf>("config") else {
        return Ok(SessionConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config =
        SessionConfig::from_toml_str(&text).with_context(|| format!("loading config {}", path.display()))?;
    tracing::debug!(path = %path.display(), app = %config.app_id, "loaded session config");
    Ok(config)
}

fn read_workspace(path: &Path) -> Result<Workspace> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let record: WorkspaceRecord =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Workspace::try_from(record).with_context(|| format!("normalizing {}", path.display()))
}

fn validate(path: &Path) -> Result<()> {
    let workspace = read_workspace(path)?;
    if !dash_provider::is_consistent(&workspace) {
        bail!(
            "{}: node and workspace provider bindings disagree",
            workspace.id
        );
    }
    println!(
        "ok: {} ({} nodes, version {})",
        workspace.id,
        workspace.layout.len(),
        workspace.version
    );
    Ok(())
}

fn describe(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Grid { grid, direction } => format!("grid {}x{} {direction:?}", grid.rows, grid.cols),
        NodeKind::Container { workspace, direction } => format!("container [{workspace}] {direction:?}"),
        NodeKind::Widget {
            uuid,
            parent_workspace,
        } => match parent_workspace {
            Some(tag) => format!("widget {uuid} [{tag}]"),
            None => format!("widget {uuid}"),
        },
    }
}

fn print_tree(layout: &Layout) {
    for (depth, node) in layout.depth_first() {
        let component = node
            .component
            .as_deref()
            .map(|c| format!(" {c}"))
            .unwrap_or_default();
        println!(
            "{:indent$}{} {}{}",
            "",
            node.id,
            describe(&node.kind),
            component,
            indent = depth * 2
        );
    }
}

fn tree(path: &Path, config: &SessionConfig) -> Result<()> {
    let workspace = read_workspace(path)?;
    println!("{} ({})", workspace.display_name(&config.untitled_name), workspace.id);
    print_tree(&workspace.layout);
    Ok(())
}

fn instantiate(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("template")
        .context("missing --template")?;
    let name = args.get_one::<String>("name").context("missing --name")?;
    let menu = args.get_one::<String>("menu").map(|m| MenuId::from(m.as_str()));

    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let template = GridTemplate::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    let workspace = Workspace::from_template(name.as_str(), &template, menu)?;
    println!("{}", serde_json::to_string_pretty(&WorkspaceRecord::from(workspace))?);
    Ok(())
}

async fn simulate(args: &ArgMatches, session: SessionConfig) -> Result<bool> {
    let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);
    let operations = args.get_one::<u64>("ops").copied().unwrap_or(1000);
    let workspaces = args.get_one::<usize>("workspaces").copied().unwrap_or(4);

    println!("Running session simulator...");
    println!("Seed: {seed}");
    println!("Operations: {operations}");
    println!();

    let report = run_simulator(SimulatorConfig {
        seed,
        operations,
        workspaces,
        stop_on_first_violation: !args.get_flag("keep-going"),
        session,
        ..SimulatorConfig::default()
    })
    .await;
    println!("{}", report.generate_text());
    Ok(report.passed())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("validate", args)) => validate(args.get_one::<PathBuf>("file").context("missing file")?),
        Some(("tree", args)) => {
            let config = load_config(args)?;
            tree(args.get_one::<PathBuf>("file").context("missing file")?, &config)
        }
        Some(("instantiate", args)) => instantiate(args),
        Some(("simulate", args)) => {
            let passed = simulate(args, load_config(args)?).await?;
            std::process::exit(if passed { 0 } else { 1 });
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn parses_simulate_flags() {
        let matches = cli()
            .try_get_matches_from(["dashctl", "simulate", "--seed", "7", "--ops", "50", "--keep-going"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "simulate");
        assert_eq!(args.get_one::<u64>("seed"), Some(&7));
        assert_eq!(args.get_one::<u64>("ops"), Some(&50));
        assert!(args.get_flag("keep-going"));
    }

    #[test]
    fn global_config_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["dashctl", "tree", "ws.json", "--config", "dash.toml"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(
            args.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("dash.toml"))
        );
    }
}
