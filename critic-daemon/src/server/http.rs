//! HTTP routes and handlers for the critic API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use critic_core::persona::{self, Persona};
use critic_core::{parse_github_url, parser, RepositoryRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ApiError;
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        // Health and metadata
        .route("/health", get(health))
        .route("/api/personas", get(list_personas))
        // Review operations
        .route("/api/repos", post(list_repo_files))
        .route("/api/review", post(review_file))
        .route("/api/debate", post(debate_code))
        .route("/api/summary", post(summarize_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state))
}

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Deserialize)]
struct RepoRequest {
    repo_url: String,
}

#[derive(Serialize)]
struct FileListResponse {
    files: Vec<String>,
}

#[derive(Deserialize)]
struct FileRequest {
    repo_url: String,
    file_path: String,
    #[serde(default)]
    branch: Option<String>,
}

#[derive(Serialize)]
struct ReviewResponse {
    security: String,
    ux: String,
    performance: String,
    test: String,
    ethics: String,
    architecture: String,
    documentation: String,
    summary: String,
}

#[derive(Deserialize)]
struct DebateRequest {
    code: String,
}

#[derive(Serialize)]
struct DebateResponse {
    structure_summary: String,
    security_review: String,
    ux_review: String,
    performance_review: String,
    test_review: String,
    architecture_review: String,
    documentation_review: String,
    action_plan: String,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary_bullets: String,
}

#[derive(Serialize)]
struct PersonaListResponse {
    personas: &'static [Persona],
}

// =============================================================================
// Health & Metadata
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "critic-daemon"
    }))
}

async fn list_personas() -> Json<PersonaListResponse> {
    Json(PersonaListResponse {
        personas: persona::CATALOG,
    })
}

// =============================================================================
// Review Operations
// =============================================================================

/// Source of one repository file, resolved against an explicit or default branch.
struct SourceFile {
    repo: RepositoryRef,
    branch: String,
    code: String,
}

async fn fetch_source(state: &AppState, req: &FileRequest) -> Result<SourceFile, ApiError> {
    let repo = parse_github_url(&req.repo_url)?;
    let branch = match req.branch.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        Some(branch) => branch.to_string(),
        None => state.repos.default_branch(&repo).await?,
    };
    let code = state
        .repos
        .fetch_file_content(&repo, &branch, &req.file_path)
        .await?;
    Ok(SourceFile { repo, branch, code })
}

async fn list_repo_files(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RepoRequest>, JsonRejection>,
) -> ApiResult<FileListResponse> {
    let Json(req) = body?;
    let repo = parse_github_url(&req.repo_url)?;
    let branch = state.repos.default_branch(&repo).await?;
    let files = state
        .repos
        .list_matching_files(&repo, &branch, state.repos.max_file_size_bytes())
        .await?;

    info!(repo = %repo, branch = %branch, files = files.len(), "Listed repository files");
    Ok(Json(FileListResponse { files }))
}

async fn review_file(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FileRequest>, JsonRejection>,
) -> ApiResult<ReviewResponse> {
    let Json(req) = body?;
    let start = Instant::now();

    let source = fetch_source(&state, &req).await?;
    let code_summary = parser::summarize(&source.code);

    let keys = persona::all_keys();
    let reviews = state
        .engine
        .review_all(&keys, &source.code, Some(code_summary.as_str()))
        .await?;
    let plan = state.aggregator.action_plan(&reviews).await?;

    info!(
        repo = %source.repo,
        branch = %source.branch,
        path = %req.file_path,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Review complete"
    );

    Ok(Json(ReviewResponse {
        security: reviews.text("security"),
        ux: reviews.text("ux"),
        performance: reviews.text("performance"),
        test: reviews.text("test"),
        ethics: reviews.text("ethics"),
        architecture: reviews.text("architecture"),
        documentation: reviews.text("documentation"),
        summary: plan,
    }))
}

async fn debate_code(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DebateRequest>, JsonRejection>,
) -> ApiResult<DebateResponse> {
    let Json(req) = body?;
    let start = Instant::now();

    let structure_summary = parser::summarize(&req.code);
    let reviews = state
        .engine
        .review_all(persona::DEBATE_PANEL, &req.code, Some(structure_summary.as_str()))
        .await?;
    let action_plan = state.aggregator.action_plan(&reviews).await?;

    info!(
        code_len = req.code.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Debate complete"
    );

    Ok(Json(DebateResponse {
        security_review: reviews.text("security"),
        ux_review: reviews.text("ux"),
        performance_review: reviews.text("performance"),
        test_review: reviews.text("test"),
        architecture_review: reviews.text("architecture"),
        documentation_review: reviews.text("documentation"),
        structure_summary,
        action_plan,
    }))
}

async fn summarize_file(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FileRequest>, JsonRejection>,
) -> ApiResult<SummaryResponse> {
    let Json(req) = body?;
    let start = Instant::now();

    let source = fetch_source(&state, &req).await?;
    let code_summary = parser::summarize(&source.code);

    let reviews = state
        .engine
        .review_all(persona::DEBATE_PANEL, &source.code, Some(code_summary.as_str()))
        .await?;
    let texts: Vec<&str> = reviews.iter().map(|r| r.text.as_str()).collect();
    let summary_bullets = state.aggregator.bullet_summary(&texts).await?;

    info!(
        repo = %source.repo,
        branch = %source.branch,
        path = %req.file_path,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Summary complete"
    );

    Ok(Json(SummaryResponse { summary_bullets }))
}
