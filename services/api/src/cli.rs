use crate::infra::{connect_database, parse_worker_seed};
use crate::server;
use clap::{Args, Parser, Subcommand};
use complaint_portal::config::AppConfig;
use complaint_portal::error::AppError;
use complaint_portal::lifecycle::NewWorker;
use complaint_portal::store::PortalStore;
use complaint_portal::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Complaint Portal",
    about = "Run and administer the complaint reporting portal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create the users, workers, and complaint tables in the configured database
    Migrate,
    /// Manage field workers
    Worker {
        #[command(subcommand)]
        command: WorkerCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WorkerCommand {
    /// Register a field worker who can log in and receive assignments
    Add(AddWorkerArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed a worker at startup as USERNAME:PASSWORD:NAME (repeatable)
    #[arg(long = "seed-worker", value_parser = parse_worker_seed)]
    pub(crate) seed_workers: Vec<NewWorker>,
}

#[derive(Args, Debug)]
struct AddWorkerArgs {
    /// Login username
    #[arg(long)]
    username: String,
    /// Login password
    #[arg(long)]
    password: String,
    /// Display name used for assignments
    #[arg(long)]
    name: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Migrate => run_migrate().await,
        Command::Worker {
            command: WorkerCommand::Add(args),
        } => run_add_worker(args).await,
    }
}

async fn run_migrate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = connect_database(&config).await?;
    store.migrate().await?;
    println!("Database schema is up to date");
    Ok(())
}

async fn run_add_worker(args: AddWorkerArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = connect_database(&config).await?;
    let worker = store
        .create_worker(NewWorker {
            username: args.username,
            password: args.password,
            name: args.name,
        })
        .await?;
    println!(
        "Registered worker {} ({}) with id {}",
        worker.name, worker.username, worker.id
    );
    Ok(())
}
