mod clear;
mod export;
mod idle;
mod rules;
mod settings;
mod start;
mod stats;
mod status;
mod visit;

pub use clear::execute as clear;
pub use export::execute as export;
pub use idle::execute as idle;
pub use rules::execute as rules;
pub use settings::{set as settings_set, show as settings_show, SettingsUpdate};
pub use start::execute as start;
pub use stats::{execute as stats, Period};
pub use status::execute as status;
pub use visit::execute as visit;

use crate::client::ClientError;

/// Exits with the conventional hint when the daemon is not reachable.
fn daemon_not_running() -> ! {
    eprintln!("The webtally daemon is not running");
    eprintln!("   Start it first: webtally start");
    std::process::exit(1);
}

fn fail_on_client_error(error: ClientError) -> anyhow::Error {
    match error {
        ClientError::DaemonNotRunning => daemon_not_running(),
        ClientError::Timeout => anyhow::anyhow!("timed out connecting to the daemon"),
        error => anyhow::anyhow!("{}", error),
    }
}
