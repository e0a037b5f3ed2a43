use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use svcdash_core::directory::{DirectoryError, ServiceDirectory};
use svcdash_core::model::{ControlResult, Service, ServiceAction, ServiceStatus};

/// Unit whose start always fails, so error paths can be exercised by hand
pub const BROKEN_UNIT: &str = "backup.service";

/// In-process stand-in for the control plane, used by `--demo`.
pub struct DemoDirectory {
    services: Mutex<Vec<Service>>,
    latency: Duration,
}

fn unit(name: &str, description: &str, status: ServiceStatus) -> Service {
    let (active_state, sub_state) = states_for(status);
    Service {
        name: name.into(),
        description: description.into(),
        status,
        active_state: active_state.into(),
        sub_state: sub_state.into(),
    }
}

fn states_for(status: ServiceStatus) -> (&'static str, &'static str) {
    match status {
        ServiceStatus::Active => ("active", "running"),
        ServiceStatus::Inactive => ("inactive", "dead"),
        ServiceStatus::Failed => ("failed", "failed"),
    }
}

fn set_status(service: &mut Service, status: ServiceStatus) {
    let (active_state, sub_state) = states_for(status);
    service.status = status;
    service.active_state = active_state.into();
    service.sub_state = sub_state.into();
}

impl DemoDirectory {
    pub fn new() -> Self {
        Self {
            services: Mutex::new(Self::sample_units()),
            latency: Duration::from_millis(250),
        }
    }

    #[allow(dead_code)]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn sample_units() -> Vec<Service> {
        vec![
            unit("nginx.service", "A high performance web server", ServiceStatus::Active),
            unit("postgresql.service", "PostgreSQL RDBMS", ServiceStatus::Active),
            unit("ssh.service", "OpenBSD Secure Shell server", ServiceStatus::Active),
            unit("cron.service", "Regular background program processing daemon", ServiceStatus::Active),
            unit("docker.service", "Docker Application Container Engine", ServiceStatus::Active),
            unit("cups.service", "CUPS Scheduler", ServiceStatus::Inactive),
            unit("bluetooth.service", "Bluetooth service", ServiceStatus::Inactive),
            unit("redis-server.service", "Advanced key-value store", ServiceStatus::Inactive),
            unit(BROKEN_UNIT, "Nightly backup job", ServiceStatus::Failed),
            unit("certbot.service", "Certbot renewal", ServiceStatus::Failed),
        ]
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for DemoDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceDirectory for DemoDirectory {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn fetch_services(&self) -> Result<Vec<Service>, DirectoryError> {
        self.simulate_latency().await;
        let services = self
            .services
            .lock()
            .map_err(|_| DirectoryError::transport("demo directory unavailable"))?;
        Ok(services.clone())
    }

    async fn control_service(
        &self,
        name: &str,
        action: ServiceAction,
    ) -> Result<ControlResult, DirectoryError> {
        self.simulate_latency().await;
        let mut services = self
            .services
            .lock()
            .map_err(|_| DirectoryError::transport("demo directory unavailable"))?;

        let Some(service) = services.iter_mut().find(|s| s.name == name) else {
            return Ok(ControlResult::failed(format!("Unit {} not found.", name)));
        };

        let starts = matches!(action, ServiceAction::Start | ServiceAction::Restart);
        if starts && name == BROKEN_UNIT {
            set_status(service, ServiceStatus::Failed);
            let mut result = ControlResult::failed(format!("Failed to {} {}", action, name));
            result.error = Some(format!(
                "Job for {} failed because the control process exited with error code.",
                name
            ));
            return Ok(result);
        }

        let (status, verb) = match action {
            ServiceAction::Start => (ServiceStatus::Active, "Started"),
            ServiceAction::Stop => (ServiceStatus::Inactive, "Stopped"),
            ServiceAction::Restart => (ServiceStatus::Active, "Restarted"),
        };
        set_status(service, status);
        Ok(ControlResult::ok(format!("{} {}", verb, name)))
    }
}
