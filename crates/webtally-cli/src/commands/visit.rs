use anyhow::{bail, Result};
use webtally_core::extract_domain;
use webtally_protocol::{Request, Response};

use super::fail_on_client_error;
use crate::client::DaemonClient;

pub async fn execute(url: String) -> Result<()> {
    let domain = extract_domain(&url);
    let client = DaemonClient::new();

    match client.send(Request::ActiveUrlKnown { url }).await {
        Ok(Response::Ok) => {
            match domain {
                Some(domain) => println!("Tracking {}", domain),
                None => println!("Not a trackable page, time is not counted"),
            }
            Ok(())
        }
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(error) => Err(fail_on_client_error(error)),
    }
}
