use anyhow::{bail, Result};
use webtally_protocol::{Request, Response};

use super::fail_on_client_error;
use crate::client::DaemonClient;

pub async fn execute(json: bool) -> Result<()> {
    let client = DaemonClient::new();

    let rules = match client.send(Request::GetRules).await {
        Ok(Response::Rules { rules }) => rules,
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(error) => return Err(fail_on_client_error(error)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    if rules.is_empty() {
        println!("No site is blocked");
        return Ok(());
    }

    println!("Blocked sites:");
    for rule in &rules {
        println!("   {:>6}  {}", rule.id, rule.url_filter);
    }

    Ok(())
}
