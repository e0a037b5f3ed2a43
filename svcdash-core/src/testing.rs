//! In-memory directory with scripted responses for engine tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::directory::{DirectoryError, ServiceDirectory};
use crate::model::{ControlResult, Service, ServiceAction};

#[derive(Default)]
struct Script {
    services: Vec<Service>,
    fetch_failures: VecDeque<DirectoryError>,
    fetch_delay: Duration,
    controls: HashMap<String, Result<ControlResult, DirectoryError>>,
    control_delays: HashMap<String, Duration>,
    control_panics: HashSet<String>,
}

pub struct ScriptedDirectory {
    script: Mutex<Script>,
    fetches: AtomicUsize,
    controls: AtomicUsize,
}

impl ScriptedDirectory {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            script: Mutex::new(Script {
                services,
                ..Script::default()
            }),
            fetches: AtomicUsize::new(0),
            controls: AtomicUsize::new(0),
        }
    }

    pub fn set_services(&self, services: Vec<Service>) {
        self.script.lock().unwrap().services = services;
    }

    /// Queue an error for the next fetch; later fetches succeed again.
    pub fn fail_next_fetch(&self, error: DirectoryError) {
        self.script.lock().unwrap().fetch_failures.push_back(error);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        self.script.lock().unwrap().fetch_delay = delay;
    }

    pub fn script_control(&self, name: &str, result: Result<ControlResult, DirectoryError>) {
        self.script
            .lock()
            .unwrap()
            .controls
            .insert(name.to_string(), result);
    }

    pub fn set_control_delay(&self, name: &str, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .control_delays
            .insert(name.to_string(), delay);
    }

    /// Make control calls for `name` panic instead of returning.
    pub fn panic_on_control(&self, name: &str) {
        self.script
            .lock()
            .unwrap()
            .control_panics
            .insert(name.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn control_count(&self) -> usize {
        self.controls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceDirectory for ScriptedDirectory {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_services(&self) -> Result<Vec<Service>, DirectoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let (delay, outcome) = {
            let mut script = self.script.lock().unwrap();
            let outcome = match script.fetch_failures.pop_front() {
                Some(e) => Err(e),
                None => Ok(script.services.clone()),
            };
            (script.fetch_delay, outcome)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    async fn control_service(
        &self,
        name: &str,
        action: ServiceAction,
    ) -> Result<ControlResult, DirectoryError> {
        self.controls.fetch_add(1, Ordering::SeqCst);
        let (delay, outcome) = {
            let script = self.script.lock().unwrap();
            if script.control_panics.contains(name) {
                drop(script);
                panic!("scripted control panic for {}", name);
            }
            let outcome = script
                .controls
                .get(name)
                .cloned()
                .unwrap_or_else(|| Ok(ControlResult::ok(format!("{} {}", action.label(), name))));
            let delay = script.control_delays.get(name).copied().unwrap_or_default();
            (delay, outcome)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
