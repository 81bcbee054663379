use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;

use mapstation_common::ActiveView;
use mapstation_core::{AppContext, QuizKind};

/// Build the application router. The state is the process-wide context:
/// this mirrors the original single-user page, one session per process.
pub fn app(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // The map page; rendering and pan/zoom happen client-side
        .route("/", get(page))
        // Geometry
        .route("/api/atlas", get(api_atlas))
        .route("/api/countries", get(api_countries))
        // View routing
        .route("/api/view", get(api_view).post(api_set_view))
        // Selection / info panel
        .route("/api/select", post(api_select))
        .route("/api/selection", get(api_selection))
        // Quizzes
        .route("/api/quiz/{kind}", get(api_quiz_state))
        .route("/api/quiz/{kind}/start", post(api_quiz_start))
        .route("/api/quiz/{kind}/answer", post(api_quiz_answer))
        .route("/api/quiz/{kind}/next", post(api_quiz_next))
        .with_state(ctx)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Everything here is live state; never cache
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

async fn page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

// --- Geometry ---

async fn api_atlas(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(ctx.atlas.topology().clone())
}

async fn api_countries(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    let countries: Vec<serde_json::Value> = ctx
        .atlas
        .shapes()
        .iter()
        .map(|shape| serde_json::json!({"id": shape.id, "name": shape.name}))
        .collect();
    Json(serde_json::Value::Array(countries))
}

// --- Views ---

#[derive(Deserialize)]
struct ViewRequest {
    view: ActiveView,
}

async fn api_view(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"view": ctx.router.active().await}))
}

async fn api_set_view(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<ViewRequest>,
) -> Json<serde_json::Value> {
    ctx.router.set_view(request.view).await;
    Json(serde_json::json!({"view": request.view}))
}

// --- Selection ---

#[derive(Deserialize)]
struct SelectRequest {
    name: String,
    id: String,
}

async fn api_select(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<SelectRequest>,
) -> impl IntoResponse {
    ctx.selection.select(&request.name, &request.id).await;
    Json(ctx.selection.snapshot().await)
}

async fn api_selection(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    Json(ctx.selection.snapshot().await)
}

// --- Quizzes ---

#[derive(Deserialize)]
struct AnswerRequest {
    answer: String,
}

fn parse_kind(kind: &str) -> Option<QuizKind> {
    match kind {
        "capital" => Some(QuizKind::Capital),
        "flag" => Some(QuizKind::Flag),
        _ => None,
    }
}

async fn api_quiz_state(
    State(ctx): State<Arc<AppContext>>,
    Path(kind): Path<String>,
) -> Response {
    let Some(kind) = parse_kind(&kind) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    Json(ctx.quiz(kind).session().await).into_response()
}

async fn api_quiz_start(
    State(ctx): State<Arc<AppContext>>,
    Path(kind): Path<String>,
) -> Response {
    let Some(kind) = parse_kind(&kind) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let engine = ctx.quiz(kind);
    engine.start().await;
    Json(engine.session().await).into_response()
}

async fn api_quiz_answer(
    State(ctx): State<Arc<AppContext>>,
    Path(kind): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Response {
    let Some(kind) = parse_kind(&kind) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let engine = ctx.quiz(kind);
    engine.answer(&request.answer).await;
    Json(engine.session().await).into_response()
}

async fn api_quiz_next(
    State(ctx): State<Arc<AppContext>>,
    Path(kind): Path<String>,
) -> Response {
    let Some(kind) = parse_kind(&kind) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let engine = ctx.quiz(kind);
    engine.next_question().await;
    Json(engine.session().await).into_response()
}
