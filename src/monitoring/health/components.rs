//! Individual probe implementations
//!
//! Every probe returns a [`HealthCheck`]; failures inside a probe become an
//! unhealthy check instead of an error.

use super::database::DatabaseHandle;
use super::sampler::RuntimeSampler;
use super::types::{HealthCheck, HealthState};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Memory above this many MB is degraded
pub const MEMORY_DEGRADED_MB: f64 = 1024.0;
/// Memory above this many MB is unhealthy
pub const MEMORY_UNHEALTHY_MB: f64 = 2048.0;
/// More live tasks than this is degraded
pub const TASKS_DEGRADED: usize = 1000;
/// More live tasks than this is unhealthy
pub const TASKS_UNHEALTHY: usize = 10000;
/// Disk usage above this percentage is degraded
pub const DISK_DEGRADED_PERCENT: f64 = 85.0;
/// Disk usage above this percentage is unhealthy
pub const DISK_UNHEALTHY_PERCENT: f64 = 95.0;

pub fn classify_memory(resident_mb: f64) -> HealthState {
    if resident_mb > MEMORY_UNHEALTHY_MB {
        HealthState::Unhealthy
    } else if resident_mb > MEMORY_DEGRADED_MB {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    }
}

pub fn classify_tasks(tasks: usize) -> HealthState {
    if tasks > TASKS_UNHEALTHY {
        HealthState::Unhealthy
    } else if tasks > TASKS_DEGRADED {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    }
}

/// All endpoints up is healthy, some is degraded, none is unhealthy
pub fn classify_http(ok: usize, total: usize) -> HealthState {
    if ok == total {
        HealthState::Healthy
    } else if ok > 0 {
        HealthState::Degraded
    } else {
        HealthState::Unhealthy
    }
}

pub fn classify_disk(used_percent: f64) -> HealthState {
    if used_percent > DISK_UNHEALTHY_PERCENT {
        HealthState::Unhealthy
    } else if used_percent > DISK_DEGRADED_PERCENT {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    }
}

/// Check database health
///
/// Ping and query each get their own `timeout`.
pub async fn check_database(
    db: Option<&Arc<dyn DatabaseHandle>>,
    timeout: Duration,
) -> HealthCheck {
    let start = Instant::now();

    let Some(db) = db else {
        return HealthCheck::new(
            "database",
            HealthState::Unhealthy,
            "database handle is not configured",
            start.elapsed(),
        );
    };

    match tokio::time::timeout(timeout, db.ping()).await {
        Err(_) => {
            return HealthCheck::new(
                "database",
                HealthState::Unhealthy,
                format!("database ping timed out after {:?}", timeout),
                start.elapsed(),
            );
        }
        Ok(Err(e)) => {
            return HealthCheck::new(
                "database",
                HealthState::Unhealthy,
                format!("database ping failed: {}", e),
                start.elapsed(),
            );
        }
        Ok(Ok(())) => {}
    }

    let ping_ms = start.elapsed().as_millis() as u64;
    let check = match tokio::time::timeout(timeout, db.query_probe()).await {
        Err(_) => HealthCheck::new(
            "database",
            HealthState::Degraded,
            format!("database query timed out after {:?}", timeout),
            start.elapsed(),
        ),
        Ok(Err(e)) => HealthCheck::new(
            "database",
            HealthState::Degraded,
            format!("database query failed: {}", e),
            start.elapsed(),
        ),
        Ok(Ok(())) => HealthCheck::new(
            "database",
            HealthState::Healthy,
            "database is responding",
            start.elapsed(),
        ),
    };
    check.with_detail("ping_ms", ping_ms)
}

/// Check process memory
pub fn check_memory(sampler: &dyn RuntimeSampler) -> HealthCheck {
    let start = Instant::now();

    match sampler.sample() {
        Ok(sample) => {
            let resident_mb = sample.resident_mb();
            let status = classify_memory(resident_mb);
            HealthCheck::new(
                "memory",
                status,
                format!("resident memory {:.1} MB", resident_mb),
                start.elapsed(),
            )
            .with_detail("resident_mb", resident_mb)
            .with_detail("virtual_mb", sample.virtual_mb())
            .with_detail("tasks", sample.tasks)
            .with_detail("workers", sample.workers)
        }
        Err(e) => HealthCheck::new(
            "memory",
            HealthState::Unhealthy,
            format!("failed to sample memory: {}", e),
            start.elapsed(),
        ),
    }
}

/// Check the number of live runtime tasks
pub fn check_tasks(sampler: &dyn RuntimeSampler) -> HealthCheck {
    let start = Instant::now();

    match sampler.sample() {
        Ok(sample) => HealthCheck::new(
            "tasks",
            classify_tasks(sample.tasks),
            format!("{} live tasks", sample.tasks),
            start.elapsed(),
        )
        .with_detail("tasks", sample.tasks)
        .with_detail("workers", sample.workers),
        Err(e) => HealthCheck::new(
            "tasks",
            HealthState::Unhealthy,
            format!("failed to sample tasks: {}", e),
            start.elapsed(),
        ),
    }
}

/// Probe liveness endpoints concurrently; only a 200 counts as up
///
/// The per-request timeout is configured on `client`.
pub async fn check_http(client: &reqwest::Client, endpoints: &[String]) -> HealthCheck {
    let start = Instant::now();

    if endpoints.is_empty() {
        return HealthCheck::new(
            "http",
            HealthState::Healthy,
            "no endpoints configured",
            start.elapsed(),
        );
    }

    let results = join_all(endpoints.iter().map(|endpoint| async move {
        let sent = Instant::now();
        let outcome = match client.get(endpoint).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) => Err(e.to_string()),
        };
        (endpoint.clone(), outcome, sent.elapsed())
    }))
    .await;

    let mut details = serde_json::Map::new();
    let mut latencies = Vec::with_capacity(results.len());
    let mut ok = 0;
    for (endpoint, outcome, latency) in results {
        latencies.push(latency);
        match outcome {
            Ok(200) => {
                ok += 1;
                details.insert(endpoint, serde_json::json!(200));
            }
            Ok(status) => {
                details.insert(endpoint, serde_json::json!(status));
            }
            Err(e) => {
                details.insert(endpoint, serde_json::json!(e));
            }
        }
    }

    let total = endpoints.len();
    HealthCheck::new(
        "http",
        classify_http(ok, total),
        format!("{}/{} endpoints healthy", ok, total),
        start.elapsed(),
    )
    .with_detail("endpoints", serde_json::Value::Object(details))
    .with_detail("error_rate", (total - ok) as f64 / total as f64 * 100.0)
    .with_detail("p95_seconds", percentile(&mut latencies, 0.95).as_secs_f64())
}

/// Nearest-rank percentile, zero for no samples
pub fn percentile(samples: &mut [Duration], p: f64) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    samples.sort_unstable();
    let rank = (p * samples.len() as f64).ceil() as usize;
    samples[rank.clamp(1, samples.len()) - 1]
}

/// Check disk usage; the fullest disk decides
pub fn check_disk(sampler: &dyn RuntimeSampler) -> HealthCheck {
    let start = Instant::now();

    let disks = match sampler.disks() {
        Ok(disks) => disks,
        Err(e) => {
            return HealthCheck::new(
                "disk",
                HealthState::Unhealthy,
                format!("failed to read disks: {}", e),
                start.elapsed(),
            );
        }
    };

    let Some(fullest) = disks
        .iter()
        .max_by(|a, b| a.used_percent().total_cmp(&b.used_percent()))
    else {
        return HealthCheck::new(
            "disk",
            HealthState::Healthy,
            "no disks reported",
            start.elapsed(),
        );
    };

    let used = fullest.used_percent();
    let usage: serde_json::Map<String, serde_json::Value> = disks
        .iter()
        .map(|d| (d.mount_point.clone(), serde_json::json!(d.used_percent())))
        .collect();

    HealthCheck::new(
        "disk",
        classify_disk(used),
        format!("{} is {:.1}% full", fullest.mount_point, used),
        start.elapsed(),
    )
    .with_detail("used_percent", used)
    .with_detail("disks", serde_json::Value::Object(usage))
}
