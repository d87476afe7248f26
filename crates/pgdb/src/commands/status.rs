use crate::output;

pub async fn handle(server: Option<String>, json: bool) -> anyhow::Result<()> {
    let client = super::daemon_client(server.as_deref())?;
    let result = client.status().await?;
    output::print_status(&result, json)
}
