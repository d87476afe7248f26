mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "pgdb")]
#[command(about = "Deploy and manage PostgreSQL databases on a remote pgdbd host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new database on the configured server
    Deploy {
        /// Database name (generated by the daemon when omitted)
        #[arg(long)]
        name: Option<String>,
        /// Data size in gigabytes
        #[arg(long)]
        size: Option<u32>,
        /// Postgres major version
        #[arg(long)]
        version: Option<u32>,
        /// Server alias from the local configuration
        #[arg(long)]
        server: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List databases managed by the configured server
    Status {
        /// Server alias from the local configuration
        #[arg(long)]
        server: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Destroy a database
    Destroy {
        /// Database name
        name: String,
        /// Keep the data volume
        #[arg(long)]
        keep_data: bool,
        /// Server alias from the local configuration
        #[arg(long)]
        server: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage local configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Provision or bootstrap pgdbd hosts
    Infra {
        #[command(subcommand)]
        command: InfraCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set a configuration value (only server.<alias> keys are supported)
    Set {
        /// Key, e.g. server.default
        key: String,
        /// Value, e.g. http://203.0.113.9:8080
        value: String,
    },
}

#[derive(Subcommand)]
enum InfraCommands {
    /// Create firewall, volume and server on Hetzner Cloud
    Init {
        /// Logical name for the created resources
        #[arg(long)]
        name: Option<String>,
        /// Hetzner location
        #[arg(long, default_value = "nbg1")]
        location: String,
        /// Server type
        #[arg(long = "server-type", default_value = "cpx21")]
        server_type: String,
        /// Operating system image
        #[arg(long, default_value = "ubuntu-24.04")]
        image: String,
        /// Data volume size in gigabytes
        #[arg(long = "volume-size", default_value_t = 20)]
        volume_size: u32,
        /// Id of an existing Hetzner SSH key
        #[arg(long = "ssh-key-id")]
        ssh_key_id: Option<i64>,
        /// Port the daemon will listen on
        #[arg(long = "pgdb-port", default_value_t = 8080)]
        pgdb_port: u16,
        /// CIDR allowed to reach SSH and the daemon
        #[arg(long = "allow-cidr", default_value = "0.0.0.0/0")]
        allow_cidr: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Install and start pgdbd on an existing host over SSH
    Bootstrap {
        /// Target host (IP or DNS name)
        #[arg(long)]
        host: String,
        /// Git repository to install from
        #[arg(long = "repo-url")]
        repo_url: String,
        /// Remote user
        #[arg(long, default_value = "root")]
        user: String,
        /// Install path on the host
        #[arg(long, default_value = "/opt/pgdb")]
        path: String,
        /// Externally visible host for the daemon URL (defaults to --host)
        #[arg(long = "public-host")]
        public_host: Option<String>,
        /// Port the daemon will listen on
        #[arg(long = "pgdb-port", default_value_t = 8080)]
        pgdb_port: u16,
        /// Pre-shared daemon token (generated when omitted)
        #[arg(long)]
        token: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("{} {error}", "Error:".red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Deploy {
            name,
            size,
            version,
            server,
            json,
        } => commands::deploy::handle(name, size, version, server, json).await,
        Commands::Status { server, json } => commands::status::handle(server, json).await,
        Commands::Destroy {
            name,
            keep_data,
            server,
            json,
        } => commands::destroy::handle(&name, keep_data, server, json).await,
        Commands::Config { command } => match command {
            ConfigCommands::Set { key, value } => commands::config::handle_set(&key, &value),
        },
        Commands::Infra { command } => match command {
            InfraCommands::Init {
                name,
                location,
                server_type,
                image,
                volume_size,
                ssh_key_id,
                pgdb_port,
                allow_cidr,
                json,
            } => {
                commands::infra::handle_init(
                    name,
                    location,
                    server_type,
                    image,
                    volume_size,
                    ssh_key_id,
                    pgdb_port,
                    allow_cidr,
                    json,
                )
                .await
            }
            InfraCommands::Bootstrap {
                host,
                repo_url,
                user,
                path,
                public_host,
                pgdb_port,
                token,
                json,
            } => {
                commands::infra::handle_bootstrap(
                    host,
                    repo_url,
                    user,
                    path,
                    public_host,
                    pgdb_port,
                    token,
                    json,
                )
                .await
            }
        },
    }
}
