use crate::output;
use colored::Colorize;
use pgdb_bootstrap::{BootstrapOptions, SshExecutor, bootstrap};
use pgdb_cloud_hetzner::{HcloudClient, ProvisionOptions, provision, resolve_api_token};
use pgdb_config::ConfigStore;

#[allow(clippy::too_many_arguments)]
pub async fn handle_init(
    name: Option<String>,
    location: String,
    server_type: String,
    image: String,
    volume_size: u32,
    ssh_key_id: Option<i64>,
    pgdb_port: u16,
    allow_cidr: String,
    json: bool,
) -> anyhow::Result<()> {
    let token = resolve_api_token()?;
    let api = HcloudClient::new(token);
    let store = ConfigStore::open_default()?;

    let options = ProvisionOptions {
        name,
        location,
        server_type,
        image,
        volume_size_gb: volume_size,
        ssh_key_id,
        pgdb_port,
        allow_cidr,
        ..Default::default()
    };

    if !json {
        println!("{}", "Creating Hetzner infrastructure...".blue());
    }

    let result = provision(&api, &store, &options).await?;
    output::print_infra_init(&result, json)
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_bootstrap(
    host: String,
    repo_url: String,
    user: String,
    path: String,
    public_host: Option<String>,
    pgdb_port: u16,
    token: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let store = ConfigStore::open_default()?;
    let executor = SshExecutor::new();

    let mut options = BootstrapOptions::new(host, repo_url);
    options.user = user;
    options.install_path = path;
    options.pgdb_port = pgdb_port;
    options.public_host = public_host;
    options.token = token;

    let result = bootstrap(&executor, &store, &options).await?;
    output::print_infra_bootstrap(&result, json)
}
