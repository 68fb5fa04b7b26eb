use anyhow::Result;
use ccx::core::country::CountryQuery;
use ccx::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ccx::AppCommand {
    fn from(cmd: Commands) -> ccx::AppCommand {
        match cmd {
            Commands::Serve => ccx::AppCommand::Serve,
            Commands::Refresh => ccx::AppCommand::Refresh,
            Commands::List {
                region,
                currency,
                sort,
            } => ccx::AppCommand::List(CountryQuery {
                region,
                currency,
                sort,
            }),
            Commands::Show { name } => ccx::AppCommand::Show(name),
            Commands::Delete { name } => ccx::AppCommand::Delete(name),
            Commands::Status => ccx::AppCommand::Status,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the REST API
    Serve,
    /// Fetch both feeds, rebuild the country table and the summary image
    Refresh,
    /// List stored countries
    List {
        /// Only countries in this region (case-insensitive)
        #[arg(long)]
        region: Option<String>,
        /// Only countries using this currency code
        #[arg(long)]
        currency: Option<String>,
        /// Order by estimated GDP: gdp_asc or gdp_desc
        #[arg(long)]
        sort: Option<ccx::core::GdpSort>,
    },
    /// Show a single country
    Show { name: String },
    /// Delete a country
    Delete { name: String },
    /// Display row count and last refresh time
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Some(Commands::Serve));
    init_logging(cli.verbose, serving);

    let result = match cli.command {
        Some(Commands::Setup) => ccx::cli::setup::setup(),
        Some(cmd) => ccx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
