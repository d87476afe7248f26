use crate::output;
use pgdb_client::DeployRequest;

pub async fn handle(
    name: Option<String>,
    size: Option<u32>,
    version: Option<u32>,
    server: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let client = super::daemon_client(server.as_deref())?;

    let request = DeployRequest {
        name,
        size_gb: size,
        version,
    };
    let result = client.deploy(&request).await?;

    output::print_deploy(&result, json)
}
