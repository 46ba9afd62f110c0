//! Scripted fake backend for pipeline tests.

use async_trait::async_trait;
use stack_orchestration::{Error, Result, ServiceState, StackBackend};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One scripted answer to a `service_state` query
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Report this state
    State(ServiceState),
    /// Fail the query (engine hiccup)
    QueryError,
}

/// In-memory stack backend that records every call and replays scripted
/// per-service states. The last scripted entry repeats forever.
#[derive(Default)]
pub struct FakeBackend {
    pub services: Vec<String>,
    pub running: Vec<String>,
    /// Canonical log of every backend call, in order
    pub calls: Mutex<Vec<String>>,
    /// Make the named mutating op fail ("pull", "recreate", "stop", "start")
    pub fail_op: Option<&'static str>,
    pub states: Mutex<HashMap<String, VecDeque<Scripted>>>,
    pub poll_counts: Mutex<HashMap<String, usize>>,
}

impl FakeBackend {
    pub fn with_services(names: &[&str]) -> Self {
        Self {
            services: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn set_running(mut self, names: &[&str]) -> Self {
        self.running = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn script(&self, service: &str, sequence: Vec<Scripted>) {
        self.states
            .lock()
            .unwrap()
            .insert(service.to_string(), sequence.into());
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn polls(&self, service: &str) -> usize {
        self.poll_counts
            .lock()
            .unwrap()
            .get(service)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail_if_scripted(&self, op: &'static str) -> Result<()> {
        if self.fail_op == Some(op) {
            return Err(Error::Backend {
                op: op.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StackBackend for FakeBackend {
    async fn list_services(&self) -> Result<Vec<String>> {
        self.record("list-services".to_string());
        Ok(self.services.clone())
    }

    async fn list_running(&self) -> Result<Vec<String>> {
        self.record("list-running".to_string());
        Ok(self.running.clone())
    }

    async fn pull_images(&self, services: &[String]) -> Result<()> {
        self.record(format!("pull {}", services.join(",")));
        self.fail_if_scripted("pull")
    }

    async fn recreate_services(&self, services: &[String], force_recreate: bool) -> Result<()> {
        self.record(format!(
            "recreate {} force={}",
            services.join(","),
            force_recreate
        ));
        self.fail_if_scripted("recreate")
    }

    async fn stop_all(&self) -> Result<()> {
        self.record("stop-all".to_string());
        self.fail_if_scripted("stop")
    }

    async fn start_all(&self, services: &[String], force_recreate: bool) -> Result<()> {
        let scope = if services.is_empty() {
            "all".to_string()
        } else {
            services.join(",")
        };
        self.record(format!("start {} force={}", scope, force_recreate));
        self.fail_if_scripted("start")
    }

    async fn service_state(&self, service: &str) -> Result<ServiceState> {
        *self
            .poll_counts
            .lock()
            .unwrap()
            .entry(service.to_string())
            .or_insert(0) += 1;

        let mut states = self.states.lock().unwrap();
        let next = match states.get_mut(service) {
            Some(sequence) => {
                let entry = if sequence.len() > 1 {
                    sequence.pop_front().unwrap()
                } else {
                    sequence.front().cloned().unwrap_or(Scripted::State(
                        ServiceState {
                            running: true,
                            health: None,
                        },
                    ))
                };
                entry
            }
            // Unscripted services are simply up with no health check.
            None => Scripted::State(ServiceState {
                running: true,
                health: None,
            }),
        };

        match next {
            Scripted::State(state) => Ok(state),
            Scripted::QueryError => Err(Error::Backend {
                op: "ps".to_string(),
                reason: "scripted query failure".to_string(),
            }),
        }
    }
}
