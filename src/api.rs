//! REST API over the tournament engine: an in-memory store of tournaments keyed by id.
//!
//! Each handler loads one tournament, runs a pure engine function on it and
//! stores the returned state. Errors render as `400 {"error": "..."}`.

use crate::logic::{self, io, LeaderTier};
use crate::models::{TableResult, TournamentError, TournamentState};
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path, Query},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Unique identifier for a stored tournament.
pub type TournamentId = Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
pub struct TournamentEntry {
    pub tournament: TournamentState,
    pub last_activity: Instant,
}

impl TournamentEntry {
    fn new(tournament: TournamentState) -> Self {
        Self {
            tournament,
            last_activity: Instant::now(),
        }
    }
}

/// In-memory state: many tournaments by id.
pub type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

pub fn new_store() -> AppState {
    Data::new(RwLock::new(HashMap::new()))
}

/// Remove tournaments not touched within `timeout`; returns how many were dropped.
pub fn evict_inactive(state: &AppState, timeout: Duration) -> usize {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return 0,
    };
    let before = g.len();
    g.retain(|_, entry| entry.last_activity.elapsed() < timeout);
    before - g.len()
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct TournamentView<'a> {
    id: TournamentId,
    tournament: &'a TournamentState,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: Option<String>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsBody {
    total_qualifying_rounds: u32,
    top_cut: usize,
}

#[derive(Deserialize)]
struct LeaderQuery {
    from: Option<u32>,
    to: Option<u32>,
    tier: Option<LeaderTier>,
}

#[derive(Deserialize)]
struct TierQuery {
    tier: Option<LeaderTier>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and player id
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: String,
}

/// Path segments: tournament id, round index (0-based) and table id
#[derive(Deserialize)]
struct TablePath {
    id: TournamentId,
    round_index: usize,
    table_id: u32,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Replace a tournament with the state returned by `f`, or report its error.
fn update<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&TournamentState) -> Result<TournamentState, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match f(&entry.tournament) {
        Ok(next) => {
            entry.tournament = next;
            HttpResponse::Ok().json(TournamentView {
                id,
                tournament: &entry.tournament,
            })
        }
        Err(e) => {
            log::warn!("Tournament {}: {}", id, e);
            error_response(&e)
        }
    }
}

/// Render a response from a tournament without changing it.
fn view<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&TournamentState) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&entry.tournament)
        }
        None => not_found(),
    }
}

fn insert(state: &AppState, tournament: TournamentState) -> HttpResponse {
    let id = Uuid::new_v4();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = g.entry(id).or_insert_with(|| TournamentEntry::new(tournament));
    log::info!("Created tournament {} ('{}')", id, entry.tournament.metadata.tournament_name);
    HttpResponse::Ok().json(TournamentView {
        id,
        tournament: &entry.tournament,
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "dune-tournament",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Option<Json<CreateTournamentBody>>) -> HttpResponse {
    let tournament = match body.and_then(|b| b.into_inner().name) {
        Some(name) if !name.trim().is_empty() => TournamentState::new(name.trim()),
        _ => TournamentState::default(),
    };
    insert(&state, tournament)
}

/// Import a previously exported tournament JSON as a new tournament.
#[post("/api/tournaments/import")]
async fn api_import_tournament(state: AppState, body: String) -> HttpResponse {
    match io::from_json(&body) {
        Ok(tournament) => insert(&state, tournament),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    view(&state, id, |t| HttpResponse::Ok().json(TournamentView { id, tournament: t }))
}

/// Export the tournament as a downloadable JSON file.
#[get("/api/tournaments/{id}/export")]
async fn api_export_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, path.id, |t| match io::to_json(t) {
        Ok(json) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                "Content-Disposition",
                format!(
                    "attachment; filename=\"{}_{}.json\"",
                    t.metadata.tournament_name.split_whitespace().collect::<Vec<_>>().join("_"),
                    t.metadata.timestamp.format("%Y-%m-%d")
                ),
            ))
            .body(json),
        Err(e) => error_response(&e),
    })
}

/// Add a player (Registration only).
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(state: AppState, path: Path<TournamentPath>, body: Json<NameBody>) -> HttpResponse {
    update(&state, path.id, |t| logic::add_player(t, &body.name))
}

/// Register every name in a CSV roster (Registration only). All or nothing.
#[post("/api/tournaments/{id}/roster")]
async fn api_import_roster(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    update(&state, path.id, |t| {
        io::roster_from_csv(body.as_bytes())?
            .iter()
            .try_fold(t.clone(), |acc, name| logic::add_player(&acc, name))
    })
}

#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    update(&state, path.id, |t| logic::remove_player(t, &path.player_id))
}

#[put("/api/tournaments/{id}/name")]
async fn api_set_name(state: AppState, path: Path<TournamentPath>, body: Json<NameBody>) -> HttpResponse {
    update(&state, path.id, |t| logic::set_tournament_name(t, &body.name))
}

#[put("/api/tournaments/{id}/settings")]
async fn api_set_settings(state: AppState, path: Path<TournamentPath>, body: Json<SettingsBody>) -> HttpResponse {
    update(&state, path.id, |t| {
        logic::update_settings(t, body.total_qualifying_rounds, body.top_cut)
    })
}

/// Start the tournament (Registration -> Qualifying).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, logic::start_tournament)
}

/// Pair the next qualifying round.
#[post("/api/tournaments/{id}/rounds/generate")]
async fn api_generate_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t| logic::generate_round(t, &mut rand::thread_rng()))
}

/// Submit (or edit) one table's results.
#[put("/api/tournaments/{id}/rounds/{round_index}/tables/{table_id}/results")]
async fn api_submit_results(
    state: AppState,
    path: Path<TablePath>,
    body: Json<Vec<TableResult>>,
) -> HttpResponse {
    let results = body.into_inner();
    update(&state, path.id, |t| {
        logic::submit_table_results(t, path.round_index, path.table_id, results)
    })
}

/// Revert one table's scoring and clear its results.
#[delete("/api/tournaments/{id}/rounds/{round_index}/tables/{table_id}/results")]
async fn api_clear_results(state: AppState, path: Path<TablePath>) -> HttpResponse {
    update(&state, path.id, |t| {
        logic::clear_table_results(t, path.round_index, path.table_id)
    })
}

/// Qualifying -> TopCut.
#[post("/api/tournaments/{id}/advance")]
async fn api_advance(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, logic::advance_to_top_cut)
}

/// Generate the next bracket round.
#[post("/api/tournaments/{id}/top-cut/generate")]
async fn api_generate_top_cut_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, logic::generate_top_cut_round)
}

#[post("/api/tournaments/{id}/finish")]
async fn api_finish(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, logic::finish_tournament)
}

/// Reset to Registration with an empty roster.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t| Ok(logic::reset(t)))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, path.id, |t| {
        HttpResponse::Ok().json(logic::standings_table(&t.players))
    })
}

/// Bracket-aware standings (cumulative until the grand final is complete).
#[get("/api/tournaments/{id}/standings/final")]
async fn api_final_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, path.id, |t| {
        HttpResponse::Ok().json(logic::final_standings_table(t))
    })
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, path.id, |t| {
        let mut buf = Vec::new();
        match io::standings_to_csv(&logic::final_standings_table(t), &mut buf) {
            Ok(()) => HttpResponse::Ok().content_type("text/csv").body(buf),
            Err(e) => error_response(&e),
        }
    })
}

#[get("/api/tournaments/{id}/leaders")]
async fn api_leader_stats(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<LeaderQuery>,
) -> HttpResponse {
    view(&state, path.id, |t| {
        let stats = logic::leader_stats(&t.rounds, query.from, query.to);
        match query.tier {
            Some(tier) => HttpResponse::Ok().json(logic::filter_by_tier(stats, tier)),
            None => HttpResponse::Ok().json(stats),
        }
    })
}

/// The leader catalog, optionally one tier only.
#[get("/api/leaders")]
async fn api_leader_catalog(query: Query<TierQuery>) -> HttpResponse {
    match query.tier {
        Some(tier) => HttpResponse::Ok().json(logic::leaders_by_tier(tier)),
        None => HttpResponse::Ok().json(logic::leaders::LEADERS),
    }
}

/// Register every route. The store must be added with `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_import_tournament)
        .service(api_get_tournament)
        .service(api_export_tournament)
        .service(api_add_player)
        .service(api_import_roster)
        .service(api_remove_player)
        .service(api_set_name)
        .service(api_set_settings)
        .service(api_start_tournament)
        .service(api_generate_round)
        .service(api_submit_results)
        .service(api_clear_results)
        .service(api_advance)
        .service(api_generate_top_cut_round)
        .service(api_finish)
        .service(api_reset)
        .service(api_standings)
        .service(api_final_standings)
        .service(api_standings_csv)
        .service(api_leader_stats)
        .service(api_leader_catalog);
}
