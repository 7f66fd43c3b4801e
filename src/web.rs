use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::SchedulerConfig;
use crate::directive::Directive;
use crate::parser::{read_calendar_csv, read_roster_csv};
use crate::schedule::{
    apply_override, build_week, check_override_day, clear_overrides, normalize_roster, Employee,
    Override, RawEmployee, Roster,
};

/// In-memory state owned on behalf of the caller; the scheduler itself keeps nothing
pub struct AppState {
    pub config: Mutex<SchedulerConfig>,
    pub roster: Mutex<Roster>,
    pub overrides: Mutex<Vec<Override>>,
}

impl AppState {
    pub fn new(config: SchedulerConfig, roster: Roster) -> Self {
        Self {
            config: Mutex::new(config),
            roster: Mutex::new(roster),
            overrides: Mutex::new(Vec::new()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Serialize)]
pub struct UploadResponse {
    success: bool,
    loaded: usize,
    issues: Vec<String>,
}

fn bad_request(error: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": error.to_string(),
    }))
}

// Replace the roster with an uploaded CSV
async fn upload_roster(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    let raws = match read_roster_csv(&body[..]) {
        Ok(raws) => raws,
        Err(e) => return Ok(bad_request(format!("Failed to process roster: {}", e))),
    };

    let (roster, issues) = normalize_roster(raws);
    for issue in &issues {
        tracing::warn!("roster record skipped: {}", issue);
    }
    let loaded = roster.len();
    *lock(&state.roster) = roster;
    tracing::info!(loaded, "roster replaced");

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        loaded,
        issues: issues.iter().map(ToString::to_string).collect(),
    }))
}

// Attach PTO days and meetings from a calendar CSV
async fn upload_calendar(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    let entries = match read_calendar_csv(&body[..]) {
        Ok(entries) => entries,
        Err(e) => return Ok(bad_request(format!("Failed to process calendar: {}", e))),
    };

    let issues = lock(&state.roster).resolve_calendar(&entries);
    for issue in &issues {
        tracing::warn!("calendar entry dropped: {}", issue);
    }

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        loaded: entries.len() - issues.len(),
        issues: issues.iter().map(ToString::to_string).collect(),
    }))
}

async fn get_roster(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&*lock(&state.roster)))
}

// Add or edit one employee; PTO and meetings already on file are kept
async fn put_employee(
    name: web::Path<String>,
    req: web::Json<RawEmployee>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut raw = req.into_inner();
    if raw.name.trim().is_empty() {
        raw.name = name.to_string();
    }
    let employee = match Employee::from_raw(raw) {
        Ok(employee) => employee,
        Err(e) => return Ok(bad_request(e)),
    };

    let employee_name = employee.name.clone();
    match lock(&state.roster).upsert(&name, employee) {
        Ok(replaced) => {
            tracing::info!(employee = %employee_name, replaced, "employee saved");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "replaced": replaced,
            })))
        }
        Err(e) => Ok(bad_request(e)),
    }
}

async fn delete_employee(name: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    match lock(&state.roster).remove(&name) {
        Some(employee) => {
            tracing::info!(employee = %employee.name, "employee removed");
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": format!("no employee named '{}'", name),
        }))),
    }
}

async fn get_overrides(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&*lock(&state.overrides)))
}

async fn add_override(req: web::Json<Override>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let new = req.into_inner();
    if let Err(e) = check_override_day(&new) {
        return Ok(bad_request(e));
    }
    let mut overrides = lock(&state.overrides);
    *overrides = apply_override(std::mem::take(&mut *overrides), new);
    Ok(HttpResponse::Ok().json(&*overrides))
}

async fn delete_overrides(state: web::Data<AppState>) -> Result<HttpResponse> {
    *lock(&state.overrides) = clear_overrides();
    tracing::info!("overrides cleared");
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn post_directive(req: web::Json<Directive>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut roster = lock(&state.roster);
    let mut overrides = lock(&state.overrides);

    // Work on copies so a rejected directive leaves the state untouched
    let mut next_roster = roster.clone();
    match req.into_inner().apply(&mut next_roster, overrides.clone()) {
        Ok(next_overrides) => {
            *roster = next_roster;
            *overrides = next_overrides;
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        Err(e) => {
            tracing::warn!("directive rejected: {}", e);
            Ok(bad_request(e))
        }
    }
}

// Schedule endpoint
async fn get_schedule(
    week_start: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let week_start = match NaiveDate::parse_from_str(&week_start, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return Ok(bad_request("Week start must be a date in YYYY-MM-DD format")),
    };

    // Build from a snapshot so the locks are not held while allocating
    let roster = lock(&state.roster).clone();
    let overrides = lock(&state.overrides).clone();
    let config = lock(&state.config).clone();

    let week = web::block(move || build_week(&config, &roster, &overrides, week_start)).await?;
    Ok(HttpResponse::Ok().json(week))
}

async fn get_rules(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&*lock(&state.config)))
}

// Replace the active configuration; fields left out keep their defaults
async fn put_rules(req: web::Json<SchedulerConfig>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let config = req.into_inner();
    if let Err(e) = config.validate() {
        tracing::warn!("rules rejected: {}", e);
        return Ok(bad_request(e));
    }
    *lock(&state.config) = config;
    tracing::info!("rules updated");
    Ok(HttpResponse::Ok().json(&*lock(&state.config)))
}

/// Registers every API route; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/roster")
            .route(web::get().to(get_roster))
            .route(web::post().to(upload_roster)),
    )
    .service(
        web::resource("/api/roster/{name}")
            .route(web::put().to(put_employee))
            .route(web::delete().to(delete_employee)),
    )
    .route("/api/calendar", web::post().to(upload_calendar))
    .service(
        web::resource("/api/overrides")
            .route(web::get().to(get_overrides))
            .route(web::post().to(add_override))
            .route(web::delete().to(delete_overrides)),
    )
    .route("/api/directive", web::post().to(post_directive))
    .service(
        web::resource("/api/rules")
            .route(web::get().to(get_rules))
            .route(web::put().to(put_rules)),
    )
    .route("/api/schedule/{week_start}", web::get().to(get_schedule));
}

pub async fn start_server(port: u16, config: SchedulerConfig, roster: Roster) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config, roster));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
