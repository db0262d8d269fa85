use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::auth::{AuthClaims, JwtSecret};
use crate::config::AppConfig;
use crate::manage_categories::CategoryController;
use crate::services::{AdminContext, CategoryError, InMemoryService, RequestVars};
use crate::templates::categories_template::render_category_page;
use crate::view_state::InMemoryViewStateStore;

type Pairs = Vec<(String, String)>;

#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryController<InMemoryService, InMemoryViewStateStore>>,
    pub jwt_secret: JwtSecret,
    pub scripturl: String,
}

impl AppState {
    pub fn new(config: &AppConfig, service: InMemoryService) -> Self {
        let controller = CategoryController::new(service, InMemoryViewStateStore::default())
            .with_page_size(config.page_size);
        Self {
            categories: Arc::new(controller),
            jwt_secret: JwtSecret(config.jwt_secret.clone()),
            scripturl: config.scripturl.clone(),
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/categories", get(show_categories).post(submit_categories))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "service": "ok",
            "timestamp": Utc::now()
        })),
    )
}

async fn show_categories(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(query): Query<Pairs>,
) -> Response {
    render(&state, &claims, query, Vec::new())
}

async fn submit_categories(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(query): Query<Pairs>,
    Form(form): Form<Pairs>,
) -> Response {
    render(&state, &claims, query, form)
}

fn render(state: &AppState, claims: &AuthClaims, query: Pairs, form: Pairs) -> Response {
    let mut ctx = AdminContext::for_account(claims.account_id);
    ctx.scripturl = state.scripturl.clone();
    ctx.account.name = claims.sub.clone();
    if let Some(language) = &claims.language {
        ctx.account.language = language.clone();
    }
    ctx.request = RequestVars::from_pairs(query);
    ctx.post_vars = RequestVars::from_pairs(form);

    match state.categories.handle(&mut ctx) {
        Ok(page) => Html(render_category_page(&page, &ctx.txt, &ctx.scripturl)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: CategoryError) -> Response {
    let status = match err {
        CategoryError::Backend { .. } => StatusCode::BAD_GATEWAY,
        CategoryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %err, "category page failed");
    (
        status,
        Json(json!({ "status": "error", "message": err.to_string() })),
    )
        .into_response()
}
