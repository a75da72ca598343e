use anyhow::{bail, Result};
use webtally_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher::ensure_daemon_running;

pub async fn execute() -> Result<()> {
    let client = DaemonClient::new();

    match client.send(Request::Ping).await {
        Ok(Response::Pong) => {
            println!("The webtally daemon is already running");
            return Ok(());
        }
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(ClientError::DaemonNotRunning) => {}
        Err(error) => bail!("{}", error),
    }

    ensure_daemon_running().await?;
    println!("webtally daemon started");

    Ok(())
}
