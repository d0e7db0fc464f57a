mod auth;
mod config;
mod error;
mod metadata;
mod models;
mod store;

use crate::auth::CredentialStore;
use crate::config::AppPaths;
use crate::error::Result;
use crate::store::MetadataStore;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "metadata-gen", version, about = "Offline image metadata generator and catalog")]
struct Cli {
    /// Data directory for the catalog, users file and backups
    /// (defaults to the per-user data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and print an image's metadata without saving it
    Inspect { path: PathBuf },
    /// Compute an image's metadata and save it into the catalog
    Save { path: PathBuf },
    /// List the saved records
    List,
    /// Export the raw path -> record mapping as standalone JSON
    Export { destination: PathBuf },
    /// Verify a username/password pair
    Login { username: String, password: String },
    /// Create a new account
    Register {
        name: String,
        username: String,
        password: String,
        confirm: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = match &cli.data_dir {
        Some(root) => AppPaths::at(root)?,
        None => AppPaths::discover()?,
    };

    match cli.command {
        Command::Inspect { path } => {
            let record = metadata::compute_metadata(&path)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Save { path } => {
            let key = record_key(&path);
            let record = metadata::compute_metadata(Path::new(&key))?;
            let mut store = MetadataStore::load(&paths)?;
            store.upsert(key, record);
            store.save()?;
            println!("Metadatos guardados correctamente");
        }
        Command::List => {
            let store = MetadataStore::load(&paths)?;
            let entries = store.list();
            if entries.is_empty() {
                println!("No hay imágenes guardadas");
            }
            for entry in entries {
                println!("{}  {}  {}", entry.filename, entry.resolution, entry.saved_at);
            }
        }
        Command::Export { destination } => {
            if !config::is_json_file(&destination) {
                log::warn!("Export destination {} is not a .json file", destination.display());
            }
            let store = MetadataStore::load(&paths)?;
            store.export(&destination)?;
            println!("Metadatos exportados a {}", destination.display());
        }
        Command::Login { username, password } => {
            let users = CredentialStore::new(&paths.users_path);
            users.ensure_store_exists()?;
            let display_name = users.verify(&username, &password)?;
            println!("Bienvenido, {}!", display_name);
        }
        Command::Register {
            name,
            username,
            password,
            confirm,
        } => {
            let users = CredentialStore::new(&paths.users_path);
            users.ensure_store_exists()?;
            users.register(&name, &username, &password, &confirm)?;
            println!("Usuario registrado correctamente. Ya puedes iniciar sesión.");
        }
    }
    Ok(())
}

/// Records are keyed by absolute path so the same file selected through
/// different relative paths maps to one entry.
fn record_key(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
