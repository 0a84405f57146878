use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::lead_store::LeadStore;
use crate::models::{LeadRecord, ScoreRequest};
use crate::pages;
use crate::questionnaire::Questionnaire;
use crate::report::render_text_report;
use crate::scoring::{compute_score, summarize, ScoreSummary};
use crate::validation::{answers_from_json, form_values, prefill_from_query, validate_submission};
use crate::view::ViewMode;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use moka::future::Cache;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Notice shown when the same email submits again inside the cooldown.
fn cooldown_message(secs: u64) -> String {
    let wait = match secs {
        1 => "a second".to_string(),
        60 => "a minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    };
    format!("Please wait {} before submitting again.", wait)
}

/// Runs a lead store call on the blocking pool; the store does file I/O
/// behind a std mutex.
async fn with_store<T, F>(state: &Arc<AppState>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&LeadStore) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.store))
        .await
        .map_err(|e| AppError::InternalError(format!("Lead store task failed: {}", e)))?
}

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Questions, scale and tier bands used for rendering and scoring.
    pub questionnaire: Questionnaire,
    /// Append-only lead file.
    pub store: LeadStore,
    /// Emails (lowercased) that submitted within the cooldown window.
    pub recent_submissions: Cache<String, ()>,
}

impl AppState {
    pub fn new(config: Config, questionnaire: Questionnaire) -> Self {
        let store = LeadStore::new(config.leads_csv_path.clone());
        let recent_submissions = Cache::builder()
            .time_to_live(Duration::from_secs(config.submit_cooldown_secs.max(1)))
            .max_capacity(10_000)
            .build();

        Self {
            config,
            questionnaire,
            store,
            recent_submissions,
        }
    }

    fn cooldown_enabled(&self) -> bool {
        self.config.submit_cooldown_secs > 0
    }
}

/// Routes without the outer middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit_assessment))
        .route("/leads.csv", get(export_leads_csv))
        .route("/leads/:position/report", get(lead_report))
        .route("/api/v1/score", post(score_answers))
        .route("/health", get(health))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "channel-readiness",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Client view renders the questionnaire, prefilled from the query string.
/// Admin view (`?admin=1`) lists stored leads instead and never renders the form.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let brand = state.config.brand_name.as_str();

    match ViewMode::from_query(&params) {
        ViewMode::Client => {
            let values = prefill_from_query(&state.questionnaire, &params);
            Html(pages::client_form(brand, &state.questionnaire, &values, &[], None)).into_response()
        }
        ViewMode::Admin => {
            tracing::info!("Admin view requested");
            let records = with_store(&state, |store| store.records())
                .await
                .context("Failed to load leads for admin view");
            match records {
                Ok(records) => {
                    let leads: Vec<(usize, LeadRecord)> =
                        records.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect();
                    Html(pages::admin_page(brand, &leads)).into_response()
                }
                Err(e) => e.into_page(brand, "Could not load leads"),
            }
        }
    }
}

/// POST /
///
/// Validates, scores and stores a client submission. Rejected submissions are
/// re-rendered with their messages and never reach the lead store. The admin
/// view has no form, so posting to it is a 404 and stores nothing.
pub async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let brand = state.config.brand_name.as_str();
    let questionnaire = &state.questionnaire;

    if ViewMode::from_query(&params) == ViewMode::Admin {
        tracing::warn!("Submission posted to the admin view, ignoring");
        return AppError::NotFound("Submissions are not accepted in the admin view".to_string())
            .into_page(brand, "Not found");
    }

    let submission = match validate_submission(questionnaire, &form) {
        Ok(submission) => submission,
        Err(err) => {
            let messages = err.validation_messages().map(<[String]>::to_vec).unwrap_or_default();
            tracing::info!("Rejected submission: {}", messages.join("; "));
            let values = form_values(questionnaire, &form);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(pages::client_form(brand, questionnaire, &values, &messages, None)),
            )
                .into_response();
        }
    };

    let card = match compute_score(questionnaire, &submission.answers) {
        Ok(card) => card,
        Err(e) => return e.into_page(brand, "Submission error"),
    };
    let tier = questionnaire.tier_for(card.overall).to_string();
    let record = LeadRecord::from_submission(submission, &card, &tier, brand, Utc::now());

    // Claim the cooldown slot before writing so concurrent duplicates lose
    let cooldown_key = record.contact.email.to_lowercase();
    if state.cooldown_enabled() {
        let entry = state
            .recent_submissions
            .entry(cooldown_key.clone())
            .or_insert_with(async {})
            .await;
        if !entry.is_fresh() {
            tracing::warn!("Submission from {} inside cooldown window", cooldown_key);
            return AppError::RateLimited(cooldown_message(state.config.submit_cooldown_secs))
                .into_page(brand, "Please wait");
        }
    }

    let stored = with_store(&state, move |store| store.append(&record).map(|_| record))
        .await
        .context("Failed to store lead");
    let record = match stored {
        Ok(record) => record,
        Err(e) => {
            if state.cooldown_enabled() {
                state.recent_submissions.invalidate(&cooldown_key).await;
            }
            return e.into_page(brand, "Submission error");
        }
    };

    tracing::info!(
        "Stored lead for {}: score {} ({})",
        record.contact.company,
        record.score_overall,
        record.tier
    );

    Html(pages::confirmation(brand)).into_response()
}

/// GET /leads.csv?admin=1
///
/// Raw lead file as a download. Responds 404 outside the admin view.
pub async fn export_leads_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    if ViewMode::from_query(&params) != ViewMode::Admin {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let content = with_store(&state, |store| store.read_all())
        .await
        .context("Failed to read lead file")?;
    let filename = format!("leads_export_{}.csv", Utc::now().format("%Y%m%d_%H%M"));
    tracing::info!("Exporting lead file as {}", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        content,
    )
        .into_response())
}

/// GET /leads/:position/report?admin=1
///
/// Plain-text readiness report for the lead at a 1-based row position.
pub async fn lead_report(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    if ViewMode::from_query(&params) != ViewMode::Admin {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    if position == 0 {
        return Err(AppError::BadRequest("Lead positions start at 1".to_string()));
    }

    let record = with_store(&state, move |store| store.record(position))
        .await
        .with_context(|| format!("Failed to load lead {}", position))?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", position)))?;

    let report = render_text_report(&state.questionnaire, &record);

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report,
    )
        .into_response())
}

/// POST /api/v1/score
///
/// Scores answers without storing anything.
pub async fn score_answers(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreSummary>, AppError> {
    let answers = answers_from_json(&request.answers);
    let card = compute_score(&state.questionnaire, &answers)?;
    tracing::debug!("Scored {} answers: {:.1}", answers.len(), card.overall);
    Ok(Json(summarize(&state.questionnaire, card)))
}
