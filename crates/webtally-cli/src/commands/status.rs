use anyhow::Result;
use serde::Serialize;
use webtally_core::limit_progress_percent;
use webtally_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};

#[derive(Serialize)]
struct StatusOutput {
    running: bool,
    active_domain: Option<String>,
    today_seconds: i64,
    today_formatted: String,
    limit_enabled: bool,
    limit_minutes: u32,
    limit_percent: u8,
    blocked_hosts: Vec<String>,
}

impl StatusOutput {
    fn new(
        active_domain: Option<String>,
        today_seconds: i64,
        limit_enabled: bool,
        limit_minutes: u32,
        blocked_hosts: Vec<String>,
    ) -> Self {
        Self {
            running: true,
            limit_percent: limit_progress_percent(
                today_seconds as f64 / 60.0,
                limit_minutes,
                limit_enabled,
            ),
            today_formatted: format_duration(today_seconds),
            active_domain,
            today_seconds,
            limit_enabled,
            limit_minutes,
            blocked_hosts,
        }
    }
}

pub async fn execute(json: bool) -> Result<()> {
    let client = DaemonClient::new();

    match client.send(Request::GetStatus).await {
        Ok(Response::Status {
            active_domain,
            today_seconds,
            limit_enabled,
            limit_minutes,
            blocked_hosts,
        }) => {
            let output = StatusOutput::new(
                active_domain,
                today_seconds,
                limit_enabled,
                limit_minutes,
                blocked_hosts,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_formatted(&output);
            }
        }
        Ok(Response::Error { message }) => {
            print_error(json, &message);
            std::process::exit(1);
        }
        Ok(_) => {
            print_error(json, "unexpected response");
            std::process::exit(1);
        }
        Err(ClientError::DaemonNotRunning) => {
            if json {
                println!(r#"{{"error": "daemon not running", "running": false}}"#);
            } else {
                println!("Daemon not running");
            }
        }
        Err(error) => {
            print_error(json, &error.to_string());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_error(json: bool, message: &str) {
    if json {
        println!("{}", serde_json::json!({ "error": message }));
    } else {
        eprintln!("Error: {}", message);
    }
}

fn print_formatted(output: &StatusOutput) {
    match &output.active_domain {
        Some(domain) => println!("Tracking {}", domain),
        None => println!("Not tracking"),
    }

    println!("   Today: {}", output.today_formatted);

    if output.limit_enabled {
        println!(
            "   Daily limit: {} min ({}% used)",
            output.limit_minutes, output.limit_percent
        );
    }

    if !output.blocked_hosts.is_empty() {
        println!("   Blocked: {}", output.blocked_hosts.join(", "));
    }
}

fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining_seconds = seconds % 60;

    if hours > 0 {
        format!("{} h {} min", hours, minutes)
    } else if minutes > 0 {
        format!("{} min {} sec", minutes, remaining_seconds)
    } else {
        format!("{} sec", remaining_seconds)
    }
}
