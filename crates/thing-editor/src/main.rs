use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{Args as ClapArgs, CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{build_project, info_project, run_l10n, BuildProjectArgs, L10nCommand};
use miette::{IntoDiagnostic, Result};

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Where the project lives. Missing values fall back to the last used ones.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Workspace root holding `games/`, `libs/` and the editor sources
    #[arg(short, long)]
    pub root: Option<String>,

    /// Project directory relative to the root, e.g. `games/demo`
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the build manifests and run the bundler
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Build in debug mode (keeps `__` prefixed content)
        #[arg(short, long)]
        debug: bool,

        /// Do not open the built project in a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Show information about a project
    Info {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Inspect and edit localization files
    L10n {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(subcommand)]
        command: L10nCommand,
    },
}

fn parse_args() -> Result<Args> {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).into_diagnostic()
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let args = parse_args()?;

    match args.command {
        Commands::Build {
            project,
            debug,
            no_open,
        } => build_project(BuildProjectArgs {
            project,
            debug,
            no_open,
        }),
        Commands::Info { project } => info_project(&project),
        Commands::L10n { project, command } => run_l10n(&project, command),
    }
}
