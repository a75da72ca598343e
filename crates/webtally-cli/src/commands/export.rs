use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use webtally_core::UsageLedger;
use webtally_protocol::{ledger_days, LedgerDays, Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::storage::open_ledger;

pub async fn execute(output: Option<PathBuf>) -> Result<()> {
    let document = fetch_ledger().await?;
    let json = serde_json::to_string_pretty(&document)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} day(s) to {}", document.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn fetch_ledger() -> Result<LedgerDays> {
    let client = DaemonClient::new();

    match client.send(Request::ExportLedger).await {
        Ok(Response::Ledger { days }) => Ok(days),
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(ClientError::DaemonNotRunning) => {
            let ledger = open_ledger()?
                .export_all()
                .map_err(|error| anyhow::anyhow!("read error: {}", error))?;
            Ok(ledger_days(ledger))
        }
        Err(error) => bail!("{}", error),
    }
}
