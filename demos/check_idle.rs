//! Check a tenant's idle state and optionally wake it up.
//!
//! ```bash
//! cargo run --example check_idle
//! ```
//!
//! Env vars:
//! - `IDLER_URL`
//! - `TENANT`
//! - `UNIDLE=1` to request un-idling when the instance is idle (optional)

use idler_client::BlockingClient;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let base_url = env_or("IDLER_URL", "http://localhost:8080");
    let tenant = env_or("TENANT", "acme");

    let client = BlockingClient::builder(&base_url)?
        .timeout(Duration::from_secs(10))
        .build()?;

    let idle = match client.is_idle(&tenant) {
        Ok(idle) => idle,
        Err(err) => {
            eprintln!("isidle failed: {err}");
            err.assumed_idle()
        }
    };
    println!("{tenant}: idle={idle}");

    if idle && env_opt("UNIDLE").is_some_and(|v| v == "1") {
        client.un_idle(&tenant)?;
        println!("{tenant}: un-idle requested");
    }
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
