use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::industry_commands::{IndustryAction, handle_industry_command_with_conn};
use admin_cli::user_commands::{UserAction, handle_user_command_with_conn};
use admin_cli::utils::establish_connection;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "farm-admin")]
#[command(about = "Administrative tasks for the farm management database")]
#[command(version)]
struct Cli {
    /// SQLite database to operate on (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage industries")]
    Industry {
        #[command(subcommand)]
        action: IndustryAction,
    },
    #[command(about = "Manage users")]
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        return Err("No command given; try --help".into());
    };
    let mut conn = establish_connection(cli.database_url)?;
    match command {
        Commands::Industry { action } => handle_industry_command_with_conn(&mut conn, action),
        Commands::User { action } => handle_user_command_with_conn(&mut conn, action),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.version_info {
        println!("farm-admin {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
