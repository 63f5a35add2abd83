//! Resolve properties in a JSON content tree.
//!
//! Loads a content tree, mounts it at the configured content root and runs
//! a single lookup inside a scoped session. The exit code tells whether the
//! value was found, defaulted, or recovered from a fault.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lookup::core::chain::Lookup;
use lookup::core::fallback::{Resolution, recover};
use lookup::exit_codes;
use lookup::io::config::{DEFAULT_CONFIG_FILE, LookupConfig, load_config, write_config};
use lookup::io::content_store::{load_content_tree, load_repository};
use lookup::logging;
use lookup::repository::{Credentials, SessionFactory};
use lookup::session::{Session, with_session};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "lookup",
    version,
    about = "Resolve properties in a JSON content tree"
)]
struct Cli {
    /// Config file; defaults apply if it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file if missing.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// Check a content tree against the schema and invariants.
    Validate {
        /// Content tree JSON file.
        tree: PathBuf,
    },
    /// Read a string property, printing a default if anything along the way is missing.
    Get(GetArgs),
}

#[derive(Args)]
struct GetArgs {
    /// Content tree JSON file, mounted at `content_root`.
    #[arg(long)]
    tree: PathBuf,

    /// Resource path to start from.
    path: String,

    /// Property to read.
    field: String,

    /// Treat the property as a path, resolve it and print the resolved path.
    #[arg(long)]
    follow: bool,

    /// Printed when the value is absent.
    #[arg(long, default_value = "")]
    default: String,

    /// Printed when the lookup faults (e.g. login fails).
    #[arg(long, default_value = "")]
    on_error: String,

    /// Principal to log in as.
    #[arg(long, default_value = "anonymous", conflicts_with = "admin")]
    user: String,

    /// Use an administrative session (requires `allow_administrative`).
    #[arg(long)]
    admin: bool,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Validate { tree } => cmd_validate(&tree),
        Command::Get(args) => cmd_get(&cli.config, &args),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        info!(path = %config_path.display(), "config exists, leaving it alone");
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &LookupConfig::default())?;
    Ok(exit_codes::OK)
}

fn cmd_validate(tree_path: &Path) -> Result<i32> {
    load_content_tree(tree_path)?;
    println!("ok");
    Ok(exit_codes::OK)
}

fn cmd_get(config_path: &Path, args: &GetArgs) -> Result<i32> {
    let config = load_config(config_path)?;
    let repository = load_repository(&config, &args.tree)?;
    let factory = SessionFactory::from_config(repository, &config);

    let resolution = with_session(
        || {
            if args.admin {
                factory.administrative()
            } else {
                factory.login(&Credentials::user(&args.user))
            }
        },
        |session| lookup_field(session, args),
        recover(args.on_error.clone()),
    );

    if factory.ledger().live() != 0 {
        warn!(live = factory.ledger().live(), "session leaked");
    }
    println!("{}", resolution.value());
    Ok(match resolution {
        Resolution::Found(_) => exit_codes::OK,
        Resolution::Defaulted(_) => exit_codes::DEFAULTED,
        Resolution::Recovered(_) => exit_codes::RECOVERED,
    })
}

fn lookup_field<S: Session>(session: &S, args: &GetArgs) -> Result<Resolution<String>> {
    let value = Lookup::at(session, &args.path)
        .value_map()
        .get::<String>(&args.field);
    let value = if args.follow {
        value.resolve(session).path()
    } else {
        value
    };
    value.settle(|| args.default.clone())
}
