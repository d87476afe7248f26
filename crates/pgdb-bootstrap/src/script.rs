//! Generated install script
//!
//! One self-contained bash script per bootstrap run. Re-running against the
//! same install path converges: an existing checkout is fetched and
//! fast-forwarded instead of re-cloned. All interpolated values are
//! single-quoted so hosts, paths and tokens survive the shell untouched.

/// Values interpolated into the install script.
#[derive(Debug, Clone)]
pub struct ScriptParams<'a> {
    pub repo_url: &'a str,
    pub install_path: &'a str,
    pub token: &'a str,
    pub public_host: &'a str,
    pub pgdb_port: u16,
}

/// Render the install script for one bootstrap run.
pub fn render(params: &ScriptParams<'_>) -> String {
    let repo = sh_quote(params.repo_url);
    let path = sh_quote(params.install_path);
    let token = sh_quote(params.token);
    let host = sh_quote(params.public_host);
    let listen = sh_quote(&format!(":{}", params.pgdb_port));

    format!(
        r#"#!/usr/bin/env bash
set -euo pipefail

export DEBIAN_FRONTEND=noninteractive
apt-get update
apt-get install -y git golang-go

if [ -d {path}/.git ]; then
  git -C {path} fetch --all --prune
  git -C {path} pull --ff-only
else
  rm -rf {path}
  git clone {repo} {path}
fi

cd {path}
export PGDB_TOKEN={token}
export PGDB_PUBLIC_HOST={host}
export PGDB_LISTEN={listen}

sudo -E ./scripts/install.sh
systemctl is-active --quiet pgdbd
"#
    )
}

/// Single-quote a value for bash. Embedded quotes become `'\''`.
pub fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>() -> ScriptParams<'a> {
        ScriptParams {
            repo_url: "https://github.com/pgdb-dev/pgdb.git",
            install_path: "/opt/pgdb",
            token: "deadbeef",
            public_host: "203.0.113.9",
            pgdb_port: 8080,
        }
    }

    #[test]
    fn test_script_has_fetch_and_clone_branches() {
        let script = render(&params());

        // existing checkout: converge via fetch + fast-forward
        assert!(script.contains("if [ -d '/opt/pgdb'/.git ]; then"));
        assert!(script.contains("git -C '/opt/pgdb' fetch --all --prune"));
        assert!(script.contains("git -C '/opt/pgdb' pull --ff-only"));

        // fresh host: clean clone
        assert!(script.contains("rm -rf '/opt/pgdb'"));
        assert!(
            script.contains("git clone 'https://github.com/pgdb-dev/pgdb.git' '/opt/pgdb'")
        );
    }

    #[test]
    fn test_script_exports_daemon_environment() {
        let script = render(&params());
        assert!(script.contains("export PGDB_TOKEN='deadbeef'"));
        assert!(script.contains("export PGDB_PUBLIC_HOST='203.0.113.9'"));
        assert!(script.contains("export PGDB_LISTEN=':8080'"));
        assert!(script.contains("sudo -E ./scripts/install.sh"));
        assert!(script.contains("systemctl is-active --quiet pgdbd"));
    }

    #[test]
    fn test_script_fails_fast() {
        let script = render(&params());
        assert!(script.starts_with("#!/usr/bin/env bash"));
        assert!(script.contains("set -euo pipefail"));
    }

    #[test]
    fn test_sh_quote_escapes_embedded_quotes() {
        assert_eq!(sh_quote("plain"), "'plain'");
        assert_eq!(sh_quote("it's"), r"'it'\''s'");

        let hostile = ScriptParams {
            token: "a'; rm -rf / #",
            ..params()
        };
        let script = render(&hostile);
        assert!(script.contains(r"export PGDB_TOKEN='a'\''; rm -rf / #'"));
    }
}
