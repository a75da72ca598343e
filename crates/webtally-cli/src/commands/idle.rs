use anyhow::{bail, Result};
use webtally_protocol::{IdleState, Request, Response};

use super::fail_on_client_error;
use crate::client::DaemonClient;

pub async fn execute(state: IdleState) -> Result<()> {
    let client = DaemonClient::new();

    match client.send(Request::IdleStateChanged { state }).await {
        Ok(Response::Ok) => {
            if state.suspends_tracking() {
                println!("Tracking paused ({})", state);
            } else {
                println!("Active again, tracking resumes on the next page focus");
            }
            Ok(())
        }
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(error) => Err(fail_on_client_error(error)),
    }
}
