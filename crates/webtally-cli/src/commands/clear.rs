use anyhow::{bail, Result};
use dialoguer::Confirm;
use webtally_core::UsageLedger;
use webtally_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::storage::open_ledger;

pub async fn execute(skip_confirmation: bool) -> Result<()> {
    if !skip_confirmation {
        let confirmed = Confirm::new()
            .with_prompt("Erase all recorded browsing time? This cannot be undone")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Nothing was erased");
            return Ok(());
        }
    }

    let client = DaemonClient::new();

    let rows = match client.send(Request::ClearLedger).await {
        Ok(Response::Cleared { rows }) => rows,
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(ClientError::DaemonNotRunning) => open_ledger()?
            .clear_all()
            .map_err(|error| anyhow::anyhow!("failed to clear usage: {}", error))?,
        Err(error) => bail!("{}", error),
    };

    if rows == 0 {
        println!("The ledger was already empty");
    } else {
        println!("Erased {} entries", rows);
    }

    Ok(())
}
