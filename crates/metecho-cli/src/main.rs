mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "metecho",
    about = "Browse and manage Metecho repositories, projects and tasks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ~/.metecho/config.yaml)
    #[arg(long, global = true, env = "METECHO_CONFIG")]
    config: Option<PathBuf>,

    /// Server URL, overriding the config file
    #[arg(long, global = true, env = "METECHO_SERVER")]
    server: Option<String>,

    /// API token, overriding the config file
    #[arg(long, global = true, env = "METECHO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log requests and dispatched actions
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the logged-in user
    Whoami,

    /// End the server session
    Logout,

    /// Print the GitHub login URL
    LoginUrl {
        /// Path to return to after login
        #[arg(long)]
        next: Option<String>,
    },

    /// List repositories
    Repos {
        /// Follow pagination to the last page
        #[arg(long)]
        all: bool,
    },

    /// List the projects of a repository
    Projects {
        /// Repository slug
        repo: String,
        /// Follow pagination to the last page
        #[arg(long)]
        all: bool,
    },

    /// Show a project and its tasks
    Project {
        /// Repository slug
        repo: String,
        /// Project slug
        project: String,
    },

    /// Create a project in a repository
    CreateProject {
        /// Repository slug
        repo: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Add GitHub collaborators to a project
    Assign {
        /// Repository slug
        repo: String,
        /// Project slug
        project: String,
        /// GitHub logins
        #[arg(required = true)]
        logins: Vec<String>,
    },

    /// Inspect and edit the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Context::load(cli.config, cli.server, cli.token, cli.json).and_then(|ctx| {
        match cli.command {
            Commands::Whoami => cmd::session::whoami(&ctx),
            Commands::Logout => cmd::session::logout(&ctx),
            Commands::LoginUrl { next } => cmd::session::login_url(&ctx, next.as_deref()),
            Commands::Repos { all } => cmd::repos::run(&ctx, all),
            Commands::Projects { repo, all } => cmd::projects::list(&ctx, &repo, all),
            Commands::Project { repo, project } => cmd::projects::show(&ctx, &repo, &project),
            Commands::CreateProject {
                repo,
                name,
                description,
            } => cmd::projects::create(&ctx, &repo, &name, description.as_deref()),
            Commands::Assign {
                repo,
                project,
                logins,
            } => cmd::projects::assign(&ctx, &repo, &project, &logins),
            Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
