//! Single binary web server: bracket engine over a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so scorers on the venue network can reach it.
//! Override with env: HOST, PORT, INACTIVITY_TIMEOUT_HOURS, CLEANUP_INTERVAL_MINUTES.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use dart_bracket_engine::{
    assign_board, auto_assign_boards, cancel_match, cancel_tournament, ensure_version,
    generate_bracket, open_registration, record_arrival, record_score, record_winner,
    release_board, report_result, resolve_dispute, DartboardId, Entrant, EntrantId, ErrorKind,
    MatchId, MatchStatus, SeedingMethod, Settings, Tournament, TournamentError, TournamentFormat,
    TournamentId, TournamentStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

type AppState = Data<TournamentStore>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    /// Parsed by hand so unknown formats come back as a validation error.
    format: String,
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    entrants: Vec<Entrant>,
    #[serde(default)]
    seeding: SeedingMethod,
}

#[derive(Deserialize)]
struct ActorBody {
    participant_id: Uuid,
    version: Option<u64>,
}

#[derive(Deserialize)]
struct ReportBody {
    participant_id: Uuid,
    won: bool,
    version: Option<u64>,
}

#[derive(Deserialize)]
struct WinnerBody {
    winner_id: EntrantId,
    version: Option<u64>,
}

#[derive(Deserialize)]
struct ScoreBody {
    entrant_id: EntrantId,
    legs_won: u32,
    sets_won: u32,
}

#[derive(Deserialize)]
struct ResolveBody {
    winner_id: EntrantId,
    note: Option<String>,
    version: Option<u64>,
}

#[derive(Deserialize)]
struct CreateBoardBody {
    number: u32,
    name: Option<String>,
}

#[derive(Deserialize)]
struct MatchListQuery {
    status: Option<MatchStatus>,
}

#[derive(Deserialize)]
struct BoardListQuery {
    available: Option<bool>,
}

#[derive(Serialize)]
struct AutoAssignResponse {
    assigned: usize,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

/// Path segments: tournament id, match id and board id.
#[derive(Deserialize)]
struct MatchBoardPath {
    id: TournamentId,
    match_id: MatchId,
    board_id: DartboardId,
}

#[derive(Deserialize)]
struct BoardPath {
    board_id: DartboardId,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

/// Run a match operation and answer with the updated match.
fn respond_with_match(
    state: &TournamentStore,
    path: &MatchPath,
    result: Result<(), TournamentError>,
) -> HttpResponse {
    respond(result.and_then(|()| {
        let t = state.get(path.id)?;
        t.get_match(path.match_id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(path.match_id))
    }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "dart-bracket-engine",
    })
}

/// Create a new tournament in draft (client stores the id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let format: TournamentFormat = match body.format.parse() {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };
    let tournament = Tournament::new(body.name.trim(), format);
    let id = state.insert(tournament);
    respond(state.get(id))
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.get(path.id))
}

/// Draft → registration.
#[post("/api/tournaments/{id}/registration")]
async fn api_open_registration(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.update(path.id, |t| open_registration(t).map(|()| t.clone())))
}

/// Cancel the tournament and every unfinished match.
#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state.update(path.id, |t| cancel_tournament(t).map(|()| t.clone()));
    if result.is_ok() {
        state.release_tournament_boards(path.id);
    }
    respond(result)
}

/// Seed entrants and generate every match (draft or registration only).
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<GenerateBracketBody>,
) -> HttpResponse {
    let GenerateBracketBody { entrants, seeding } = body.into_inner();
    respond(state.update(path.id, |t| {
        generate_bracket(t, entrants, seeding).map(|()| t.clone())
    }))
}

/// Matches ordered by (round_number, match_number), optionally filtered by status.
#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<MatchListQuery>,
) -> HttpResponse {
    respond(state.get(path.id).map(|t| {
        let mut matches: Vec<_> = t
            .matches
            .into_iter()
            .filter(|m| query.status.map_or(true, |s| m.status == s))
            .collect();
        matches.sort_by_key(|m| (m.round_number, m.match_number));
        matches
    }))
}

#[get("/api/tournaments/{id}/matches/{match_id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond_with_match(&state, &path, Ok(()))
}

/// Bind a board to a match.
#[post("/api/tournaments/{id}/matches/{match_id}/board/{board_id}")]
async fn api_assign_board(state: AppState, path: Path<MatchBoardPath>) -> HttpResponse {
    let result = state.update_with_boards(path.id, |t, pool| {
        assign_board(t, pool, path.match_id, path.board_id)
    });
    respond(result.and_then(|()| state.board(path.board_id)))
}

/// Release the board held by a match.
#[delete("/api/tournaments/{id}/matches/{match_id}/board")]
async fn api_release_board(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let result = state.update_with_boards(path.id, |t, pool| release_board(t, pool, path.match_id));
    respond(result.and_then(|board_id| state.board(board_id)))
}

/// Pair waiting matches with free boards.
#[post("/api/tournaments/{id}/boards/auto-assign")]
async fn api_auto_assign(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .update_with_boards(path.id, auto_assign_boards)
            .map(|assigned| AutoAssignResponse { assigned }),
    )
}

#[post("/api/tournaments/{id}/matches/{match_id}/arrival")]
async fn api_record_arrival(state: AppState, path: Path<MatchPath>, body: Json<ActorBody>) -> HttpResponse {
    let result = state.update(path.id, |t| {
        ensure_version(t, path.match_id, body.version)?;
        record_arrival(t, path.match_id, body.participant_id).map(|_| ())
    });
    respond_with_match(&state, &path, result)
}

/// Self-report a win or loss; agreeing reports complete the match, conflicting ones dispute it.
#[post("/api/tournaments/{id}/matches/{match_id}/report")]
async fn api_report_result(state: AppState, path: Path<MatchPath>, body: Json<ReportBody>) -> HttpResponse {
    let result = state.update(path.id, |t| {
        ensure_version(t, path.match_id, body.version)?;
        report_result(t, path.match_id, body.participant_id, body.won).map(|_| ())
    });
    respond_with_match(&state, &path, result)
}

/// Scorer records the winner directly.
#[put("/api/tournaments/{id}/matches/{match_id}/winner")]
async fn api_record_winner(state: AppState, path: Path<MatchPath>, body: Json<WinnerBody>) -> HttpResponse {
    let result = state.update(path.id, |t| {
        ensure_version(t, path.match_id, body.version)?;
        record_winner(t, path.match_id, body.winner_id)
    });
    respond_with_match(&state, &path, result)
}

#[put("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_record_score(state: AppState, path: Path<MatchPath>, body: Json<ScoreBody>) -> HttpResponse {
    let result = state.update(path.id, |t| {
        record_score(t, path.match_id, body.entrant_id, body.legs_won, body.sets_won)
    });
    respond_with_match(&state, &path, result)
}

/// Admin decides a disputed match.
#[post("/api/tournaments/{id}/matches/{match_id}/resolve")]
async fn api_resolve_dispute(state: AppState, path: Path<MatchPath>, body: Json<ResolveBody>) -> HttpResponse {
    let ResolveBody {
        winner_id,
        note,
        version,
    } = body.into_inner();
    let result = state.update(path.id, |t| {
        ensure_version(t, path.match_id, version)?;
        resolve_dispute(t, path.match_id, winner_id, note)
    });
    respond_with_match(&state, &path, result)
}

#[post("/api/tournaments/{id}/matches/{match_id}/cancel")]
async fn api_cancel_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let result = state.update(path.id, |t| cancel_match(t, path.match_id));
    respond_with_match(&state, &path, result)
}

#[post("/api/dartboards")]
async fn api_create_board(state: AppState, body: Json<CreateBoardBody>) -> HttpResponse {
    let CreateBoardBody { number, name } = body.into_inner();
    let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    respond(state.add_board(number, name))
}

#[get("/api/dartboards")]
async fn api_list_boards(state: AppState, query: Query<BoardListQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.list_boards(query.available.unwrap_or(false)))
}

#[delete("/api/dartboards/{board_id}")]
async fn api_delete_board(state: AppState, path: Path<BoardPath>) -> HttpResponse {
    match state.remove_board(path.board_id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Register every route on an app; shared with the HTTP tests.
fn routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_open_registration)
        .service(api_cancel_tournament)
        .service(api_generate_bracket)
        .service(api_list_matches)
        .service(api_get_match)
        .service(api_assign_board)
        .service(api_release_board)
        .service(api_auto_assign)
        .service(api_record_arrival)
        .service(api_report_result)
        .service(api_record_winner)
        .service(api_record_score)
        .service(api_resolve_dispute)
        .service(api_cancel_match)
        .service(api_create_board)
        .service(api_list_boards)
        .service(api_delete_board);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::from_env();
    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    let state = Data::new(TournamentStore::new());

    // Background task: periodically remove tournaments nobody has touched for a while
    let state_cleanup = state.clone();
    let (timeout, every) = (settings.inactivity_timeout, settings.cleanup_interval);
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = state_cleanup.evict_inactive(timeout);
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive tournament(s) (no activity for {}h)",
                    removed,
                    timeout.as_secs() / 3600
                );
            }
        }
    });

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind((settings.host.as_str(), settings.port))?
        .run()
        .await
}
