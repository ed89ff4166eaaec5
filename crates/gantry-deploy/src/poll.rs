//! Health-convergence polling.
//!
//! After an environment accepts an update it takes observable time to
//! reprovision instances and shift traffic; the update ack says nothing
//! about completion. This loop samples environment health at a fixed
//! interval until the status reaches `Ready`, reporting status/health
//! transitions along the way. Transitions are informational only — no
//! decision in the loop depends on them.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{info, warn};

use gantry_core::{EnvironmentControl, EnvironmentStatus, HealthSnapshot, Transition};

use crate::error::{DeployError, DeployResult};

/// Polling parameters.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed wait between samples.
    pub interval: Duration,
    /// Bound on total polling time. `None` waits indefinitely, matching
    /// the platform's historical behavior.
    pub timeout: Option<Duration>,
    /// Consecutive transient sample failures tolerated before giving up.
    pub max_sample_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(gantry_core::plan::DEFAULT_CHECK_INTERVAL_MS),
            timeout: None,
            max_sample_failures: 5,
        }
    }
}

/// Snapshot pair owned by one polling invocation.
///
/// Mutated only by [`PollState::observe`], which shifts the old current
/// into previous. Never shared across deployments.
#[derive(Debug, Default)]
pub struct PollState {
    pub previous: Option<HealthSnapshot>,
    pub current: Option<HealthSnapshot>,
}

impl PollState {
    /// Record a new sample, returning the transition it produced, if any.
    ///
    /// A transition exists only when the new sample differs from the old
    /// current in status or health_status; an unchanged pair is not a
    /// transition.
    pub fn observe(&mut self, snapshot: HealthSnapshot) -> Option<Transition> {
        let transition = self.current.as_ref().and_then(|prev| {
            if prev.status != snapshot.status || prev.health_status != snapshot.health_status {
                Some(Transition {
                    from_status: prev.status.clone(),
                    from_health: prev.health_status.clone(),
                    to_status: snapshot.status.clone(),
                    to_health: snapshot.health_status.clone(),
                })
            } else {
                None
            }
        });
        self.previous = self.current.take();
        self.current = Some(snapshot);
        transition
    }
}

/// Result of a completed polling run.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// The sample that showed `Ready`.
    pub final_snapshot: HealthSnapshot,
    /// Number of successful health samples taken.
    pub samples: u32,
    /// Every transition observed, in order.
    pub transitions: Vec<Transition>,
}

/// Poll environment health until it reports `Ready`.
///
/// Sampling failures are classified: transient ones (transport, 5xx, 429)
/// are logged and retried on the next interval, up to
/// [`PollConfig::max_sample_failures`] consecutive misses; fatal ones
/// propagate immediately. `cancel` is observed around the interval sleep,
/// so an in-flight sample finishes before cancellation takes effect.
pub async fn wait_for_ready<C: EnvironmentControl + ?Sized>(
    control: &C,
    environment: &str,
    config: &PollConfig,
    mut cancel: Option<watch::Receiver<bool>>,
) -> DeployResult<PollOutcome> {
    let deadline = config.timeout.map(|t| Instant::now() + t);
    let mut state = PollState::default();
    let mut transitions = Vec::new();
    let mut samples: u32 = 0;
    let mut consecutive_failures: u32 = 0;

    info!(%environment, interval_ms = config.interval.as_millis() as u64, "waiting for environment to converge");

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(DeployError::PollTimeout {
                    environment: environment.to_string(),
                    timeout: config.timeout.unwrap_or_default(),
                });
            }
        }

        if let Some(rx) = cancel.as_mut() {
            let sleep = tokio::time::sleep(config.interval);
            tokio::pin!(sleep);
            // The full interval elapses unless cancellation actually
            // arrives; a notification carrying `false` (or a dropped
            // sender) does not cut the sleep short.
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            sleep.as_mut().await;
                            break;
                        }
                        if *rx.borrow() {
                            info!(%environment, "health polling cancelled");
                            return Err(DeployError::Cancelled);
                        }
                    }
                }
            }
        } else {
            tokio::time::sleep(config.interval).await;
        }

        // A cancellation that raced the end of the sleep still wins
        // before we go back out on the wire.
        if let Some(rx) = cancel.as_ref() {
            if *rx.borrow() {
                info!(%environment, "health polling cancelled");
                return Err(DeployError::Cancelled);
            }
        }

        match control.describe_health(environment).await {
            Ok(snapshot) => {
                samples += 1;
                consecutive_failures = 0;
                let ready = snapshot.status == EnvironmentStatus::Ready;
                let current = snapshot.clone();

                if let Some(transition) = state.observe(snapshot) {
                    info!(
                        %environment,
                        from_status = %transition.from_status,
                        from_health = %transition.from_health,
                        to_status = %transition.to_status,
                        to_health = %transition.to_health,
                        "environment health transitioned"
                    );
                    transitions.push(transition);
                }

                if ready {
                    info!(%environment, samples, "environment converged to Ready");
                    return Ok(PollOutcome {
                        final_snapshot: current,
                        samples,
                        transitions,
                    });
                }
            }
            Err(e) if e.is_transient() => {
                consecutive_failures += 1;
                warn!(
                    %environment,
                    error = %e,
                    failures = consecutive_failures,
                    limit = config.max_sample_failures,
                    "transient health sample failure"
                );
                if consecutive_failures >= config.max_sample_failures {
                    return Err(DeployError::Poll {
                        environment: environment.to_string(),
                        source: e,
                    });
                }
            }
            Err(e) => {
                return Err(DeployError::Poll {
                    environment: environment.to_string(),
                    source: e,
                });
            }
        }
    }
}
