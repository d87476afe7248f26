//! Result rendering, human-readable or JSON.

use pgdb_bootstrap::BootstrapResult;
use pgdb_client::{DeployResponse, DestroyResponse, StatusResponse};
use pgdb_cloud_hetzner::ProvisionResult;
use serde::Serialize;
use serde_json::json;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_deploy(result: &DeployResponse, as_json: bool) -> anyhow::Result<()> {
    // DATABASE_URL is deliberately upper-case so it can be pasted into an
    // env file as-is.
    let shape = json!({
        "name": result.name,
        "host": result.host,
        "port": result.port,
        "db": result.db,
        "user": result.user,
        "password": result.password,
        "DATABASE_URL": result.database_url,
    });

    if as_json {
        return print_json(&shape);
    }

    println!("name: {}", result.name);
    println!("host: {}", result.host);
    println!("port: {}", result.port);
    println!("db: {}", result.db);
    println!("user: {}", result.user);
    println!("password: {}", result.password);
    println!("DATABASE_URL: {}", result.database_url);
    Ok(())
}

pub fn print_status(result: &StatusResponse, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(result);
    }

    if result.items.is_empty() {
        println!("No databases found.");
        return Ok(());
    }

    for item in &result.items {
        println!("{} ({})", item.name, item.postgres_version);
        println!("  host: {}", item.host);
        println!("  port: {}", item.host_port);
        println!("  db: {}", item.db);
        println!("  user: {}", item.user);
        println!("  created_at: {}", item.created_at);
        println!("  DATABASE_URL: {}", item.database_url);
    }
    Ok(())
}

pub fn print_destroy(name: &str, result: &DestroyResponse, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(&json!({ "name": name, "ok": result.ok }));
    }

    if result.ok {
        println!("Destroyed {name}");
    }
    Ok(())
}

pub fn print_infra_init(result: &ProvisionResult, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(result);
    }

    println!("provider: {}", result.provider);
    println!(
        "server: {} (id={}, ip={})",
        result.server.name, result.server.id, result.server.ipv4
    );
    println!(
        "volume: {} (id={}, size_gb={})",
        result.volume.name, result.volume.id, result.volume.size_gb
    );
    println!(
        "firewall: {} (id={})",
        result.firewall.name, result.firewall.id
    );
    println!("daemon_url: {}", result.daemon_url);
    println!("next_steps:");
    for step in &result.next_steps {
        println!("  - {step}");
    }
    Ok(())
}

pub fn print_infra_bootstrap(result: &BootstrapResult, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(result);
    }

    println!("host: {}", result.host);
    println!("user: {}", result.user);
    println!("service_status: {}", result.service_status);
    println!("daemon_url: {}", result.daemon_url);
    println!("token: {}", result.token);
    println!("next_steps:");
    for step in &result.next_steps {
        println!("  - {step}");
    }
    Ok(())
}
