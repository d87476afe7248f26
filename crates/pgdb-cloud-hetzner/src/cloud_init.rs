//! cloud-init payload for freshly created pgdbd hosts
//!
//! Installs the container runtime, prepares the data directory and opens the
//! local firewall for SSH and the daemon port. The daemon itself is
//! installed later (`pgdb infra bootstrap` or the printed next steps).

/// Render the `user_data` payload for a server listening on `pgdb_port`.
pub fn cloud_init(pgdb_port: u16) -> String {
    format!(
        r#"#cloud-config
package_update: true
packages:
  - docker.io
runcmd:
  - systemctl enable docker
  - systemctl start docker
  - mkdir -p /var/lib/pgdb
  - chmod 755 /var/lib/pgdb
  - ufw --force enable
  - ufw allow 22/tcp
  - ufw allow {pgdb_port}/tcp
"#
    )
}
