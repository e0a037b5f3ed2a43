use std::path::Path;

use svcdash_core::config::DashConfig;
use svcdash_core::directory::{DirectoryError, ServiceDirectory};
use svcdash_core::filter::StatusCounts;
use svcdash_core::model::Service;

use crate::logging;

#[derive(Debug)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl Check {
    fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            hint: None,
        }
    }

    fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Run every check and print a report. Returns whether all checks passed.
pub async fn run_doctor(
    config_path: Option<&Path>,
    config: &DashConfig,
    directory: &dyn ServiceDirectory,
) -> bool {
    println!("svcdash doctor\n");

    println!("Configuration:");
    let config_checks = vec![
        check_config_file(config_path),
        Check::ok("backend", config.base_url()),
        Check::ok(
            "refresh",
            format!(
                "every {} ms, re-poll after {} ms, toasts for {} ms",
                config.refresh.interval_ms,
                config.refresh.repoll_delay_ms,
                config.notifications.timeout_ms
            ),
        ),
        check_log_dir(&logging::log_dir(&config.logging)),
    ];
    for check in &config_checks {
        print_check(check);
    }
    println!();

    println!("Backend ({}):", directory.name());
    let backend_check = check_services(directory.fetch_services().await, config.base_url());
    print_check(&backend_check);
    println!();

    let failed: Vec<&Check> = config_checks
        .iter()
        .chain(std::iter::once(&backend_check))
        .filter(|c| !c.passed)
        .collect();

    if failed.is_empty() {
        println!("All checks passed!");
        return true;
    }

    println!("Issues found:");
    for check in &failed {
        println!("  - {}: {}", check.name, check.message);
        if let Some(hint) = &check.hint {
            println!("    Hint: {}", hint);
        }
    }
    false
}

fn print_check(check: &Check) {
    let icon = if check.passed { "✓" } else { "✗" };
    let color = if check.passed { "\x1b[32m" } else { "\x1b[31m" };
    let reset = "\x1b[0m";

    println!(
        "  {}{}{} {}: {}",
        color, icon, reset, check.name, check.message
    );

    if let Some(hint) = &check.hint {
        println!("    └─ {}", hint);
    }
}

fn check_config_file(path: Option<&Path>) -> Check {
    match path {
        Some(path) => Check::ok("config", path.display().to_string()),
        None => Check::ok("config", "none found, using defaults"),
    }
}

fn check_log_dir(dir: &Path) -> Check {
    let probe = if dir.exists() {
        Ok(())
    } else {
        std::fs::create_dir_all(dir)
    };
    match probe {
        Ok(()) => Check::ok("log dir", dir.display().to_string()),
        Err(e) => Check::fail("log dir", format!("{}: {}", dir.display(), e))
            .with_hint("Set logging.dir in svcdash.yaml to a writable directory"),
    }
}

fn check_services(result: Result<Vec<Service>, DirectoryError>, url: &str) -> Check {
    match result {
        Ok(services) => {
            let counts = StatusCounts::tally(&services);
            Check::ok(
                "GET /services",
                format!(
                    "{} services ({} active, {} inactive, {} failed)",
                    counts.all, counts.active, counts.inactive, counts.failed
                ),
            )
        }
        Err(e @ DirectoryError::Transport { .. }) => Check::fail("GET /services", e.to_string())
            .with_hint(format!("Is the control plane running at {}?", url)),
        Err(e @ DirectoryError::Http { .. }) => Check::fail("GET /services", e.to_string())
            .with_hint("The backend answered but refused the request"),
        Err(e @ DirectoryError::Protocol { .. }) => Check::fail("GET /services", e.to_string())
            .with_hint("Expected a JSON array of {name, description, status, active_state, sub_state}"),
    }
}
