use pgdb_config::ConfigStore;

pub fn handle_set(key: &str, value: &str) -> anyhow::Result<()> {
    let Some(alias) = key.strip_prefix("server.") else {
        anyhow::bail!("Only server.<alias> keys are supported. Example: server.default");
    };
    if alias.is_empty() {
        anyhow::bail!("Alias cannot be empty");
    }

    let store = ConfigStore::open_default()?;
    store.set_server(alias, value)?;

    println!("Set {key}={value}");
    Ok(())
}
