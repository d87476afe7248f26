use crate::output;

pub async fn handle(
    name: &str,
    keep_data: bool,
    server: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let client = super::daemon_client(server.as_deref())?;
    let result = client.destroy(name, keep_data).await?;
    output::print_destroy(name, &result, json)
}
