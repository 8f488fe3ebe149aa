use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

use codescope::cli::{AppContext, commands, output};
use codescope::config::ConfigLoader;

#[derive(Parser)]
#[command(name = "codescope")]
#[command(
    version,
    about = "AI-driven codebase analysis and documentation pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load configuration from this file instead of the default chain
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a directory: structure, documentation, security, quality, chat index
    Process {
        /// Directory to analyze
        path: PathBuf,
        /// Project name (defaults to the directory name)
        #[arg(long, short)]
        name: Option<String>,
    },

    /// One-off capped security scan of a directory (nothing persisted)
    Scan {
        /// Directory to scan
        path: PathBuf,
        /// Cap on files analyzed (highest-risk files first)
        #[arg(long)]
        max_files: Option<usize>,
    },

    /// List all projects
    List,

    /// Show a project's processing status
    Status {
        project_id: Uuid,
    },

    /// Print a project's generated documentation
    Doc {
        project_id: Uuid,
    },

    /// List a project's security findings
    Findings {
        project_id: Uuid,
    },

    /// List a project's code improvement suggestions
    Improvements {
        project_id: Uuid,
    },

    /// Ask a question about a processed project
    Chat {
        project_id: Uuid,
        message: String,
    },

    /// Delete a project and all its data
    Delete {
        project_id: Uuid,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "codescope=debug" } else { "codescope=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            output::error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let ctx = match AppContext::open(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Process { path, name } => commands::process(&ctx, &path, name).await,
        Commands::Scan { path, max_files } => commands::scan(&ctx, &path, max_files).await,
        Commands::List => commands::list(&ctx),
        Commands::Status { project_id } => commands::status(&ctx, project_id),
        Commands::Doc { project_id } => commands::doc(&ctx, project_id),
        Commands::Findings { project_id } => commands::findings(&ctx, project_id),
        Commands::Improvements { project_id } => commands::improvements(&ctx, project_id),
        Commands::Chat { project_id, message } => {
            commands::chat(&ctx, project_id, &message).await
        }
        Commands::Delete { project_id } => commands::delete(&ctx, project_id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
