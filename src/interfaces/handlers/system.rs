use actix_web::{web, get, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::time::Duration;
use parking_lot::RwLock;
use sysinfo::System;
use serde::Serialize;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    hostname: String,
    cpu_count: usize,
    memory_usage: String,
}

#[derive(Serialize, Clone)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    contact_store: String,
    subscription_store: String,
    throttled_identifiers: usize,
    version: String,
    system: SystemInfo,
}

const HEALTH_CACHE_SECS: i64 = 5;

/// Last health report of one `AppState`, reused for a few seconds.
#[derive(Default)]
pub struct HealthCache {
    entry: RwLock<Option<(i64, HealthCheckResponse)>>,
}

impl HealthCache {
    fn fresh(&self, now: i64) -> Option<HealthCheckResponse> {
        self.entry
            .read()
            .as_ref()
            .filter(|(built_at, _)| now - built_at <= HEALTH_CACHE_SECS)
            .map(|(_, response)| response.clone())
    }

    fn store(&self, now: i64, response: HealthCheckResponse) {
        *self.entry.write() = Some((now, response));
    }
}

fn store_status<E: std::fmt::Display>(result: Result<(), E>) -> String {
    match result {
        Ok(_) => "OK".to_string(),
        Err(e) => {
            tracing::warn!("Health check store failure: {}", e);
            "Unavailable".to_string()
        }
    }
}

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_all();
    let pid = sysinfo::get_current_pid().ok();
    if let Some(pid) = pid {
        sys.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
    }

    let memory_usage = pid
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| {
            format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
        });

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_usage,
    };

    let contact_store = store_status(state.repos.contact_repo.check_connection().await);
    let subscription_store = store_status(state.repos.subscription_store.check_connection().await);

    let status = if contact_store == "OK" && subscription_store == "OK" {
        "healthy"
    } else {
        "degraded"
    };

    HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        contact_store,
        subscription_store,
        throttled_identifiers: state.throttles.tracked_identifiers(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        system: system_info,
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();

    if let Some(cached) = state.health_cache.fresh(now) {
        return HttpResponse::Ok().json(cached);
    }

    let response = build_health_response(&state).await;
    state.health_cache.store(now, response.clone());

    HttpResponse::Ok().json(response)
}
