use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use irs_core::metrics::{Metrics, ReferenceTable};
use irs_core::persist::{load_data_dir, DataPaths};
use irs_core::porter::{stem, stem_query};
use irs_core::{DocId, Engine, EngineConfig, EngineError, ModelKind, SearchOptions};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_LEN: usize = 300;
const MAX_K: usize = 100;

/// Everything needed to start serving a data directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub model: ModelKind,
    /// Reference relevance table; precision and recall are reported when set.
    pub reference: Option<PathBuf>,
    pub admin_token: Option<String>,
    /// Comma separated origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Reads `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` from the environment.
    pub fn from_env(data_dir: impl Into<PathBuf>, model: ModelKind) -> Self {
        Self {
            data_dir: data_dir.into(),
            model,
            reference: None,
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub stopwords: bool,
    #[serde(default)]
    pub stemming: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// The query with every word replaced by its stem, when stemming was requested.
    pub normalized_query: Option<String>,
    pub model: ModelKind,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
}

#[derive(Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub snippet: Option<String>,
}

#[derive(Serialize)]
pub struct DocSummary {
    pub doc_id: DocId,
    pub title: String,
}

#[derive(Deserialize)]
pub struct ModelRequest {
    pub model: ModelKind,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Engine>>,
    pub data_dir: PathBuf,
    pub reference: Option<Arc<ReferenceTable>>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

fn engine_error(e: EngineError) -> ApiError {
    let status = match e {
        EngineError::NoActiveModel => StatusCode::CONFLICT,
        EngineError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        EngineError::Query(_) => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<_> = allow_origin
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    }
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    let paths = DataPaths::new(&config.data_dir);
    let (collection, stop_words) = load_data_dir(&paths)?;
    let mut engine = Engine::new(collection, stop_words, config.engine.clone());
    engine.activate(config.model)?;
    let reference = match &config.reference {
        Some(path) => Some(Arc::new(ReferenceTable::load(path)?)),
        None => None,
    };
    tracing::info!(
        data_dir = %config.data_dir.display(),
        num_docs = engine.collection().len(),
        model = %config.model,
        "engine ready"
    );

    let state = AppState {
        engine: Arc::new(RwLock::new(engine)),
        data_dir: config.data_dir,
        reference,
        admin_token: config.admin_token,
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/docs", get(docs_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/model", post(model_handler))
        .route("/collection/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_allow_origin.as_deref()));
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let engine = state.engine.read();
    let options = SearchOptions::new(params.stopwords, params.stemming);
    let hits = engine.search(&params.q, options).map_err(engine_error)?;
    let model = engine.active_model().ok_or_else(|| engine_error(EngineError::NoActiveModel))?;

    let metrics: Option<Metrics> = match &state.reference {
        Some(table) => Some(engine.evaluate(table, &params.q, &hits).map_err(engine_error)?),
        None => None,
    };

    let k = params.k.unwrap_or(engine.config().output_k).clamp(1, MAX_K);
    let terms = highlight_terms(&params.q, params.stemming);
    let results = hits
        .iter()
        .take(k)
        .filter_map(|hit| {
            let doc = engine.document(hit.doc_id)?;
            Some(SearchResult {
                doc_id: hit.doc_id,
                score: hit.score,
                title: doc.title.clone(),
                snippet: snippet(&doc.raw_text, &terms),
            })
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits = hits.len(), took_s = elapsed.as_secs_f64(), "search served");
    Ok(Json(SearchResponse {
        normalized_query: params.stemming.then(|| stem_query(&params.q)),
        query: params.q,
        model,
        took_s: elapsed.as_secs_f64(),
        total_hits: hits.len(),
        results,
        precision: metrics.map(|m| m.precision),
        recall: metrics.map(|m| m.recall),
    }))
}

pub async fn docs_handler(State(state): State<AppState>) -> Json<Vec<DocSummary>> {
    let engine = state.engine.read();
    Json(
        engine
            .collection()
            .iter()
            .map(|d| DocSummary { doc_id: d.document_id, title: d.title.clone() })
            .collect(),
    )
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = state.engine.read();
    match engine.document(doc_id) {
        Some(doc) => Ok(Json(serde_json::json!({
            "doc_id": doc.document_id,
            "title": doc.title,
            "text": doc.raw_text,
        }))),
        None => Err((StatusCode::NOT_FOUND, format!("no document with id {doc_id}"))),
    }
}

async fn model_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ModelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    state.engine.write().activate(req.model).map_err(engine_error)?;
    tracing::info!(model = %req.model, "model switched");
    Ok(Json(serde_json::json!({ "model": req.model, "name": req.model.to_string() })))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let (collection, stop_words) = load_data_dir(&DataPaths::new(&state.data_dir))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let mut engine = state.engine.write();
    engine.replace_collection(collection, stop_words).map_err(engine_error)?;
    let num_docs = engine.collection().len();
    tracing::info!(num_docs, "collection reloaded");
    Ok(Json(serde_json::json!({ "num_docs": num_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

/// Query words to highlight, plus their stems when stemming is on.
fn highlight_terms(query: &str, stemming: bool) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let words = query
        .split(|c: char| !c.is_alphabetic() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase);
    for word in words {
        if stemming {
            let stemmed = stem(&word);
            if !terms.contains(&stemmed) {
                terms.push(stemmed);
            }
        }
        if !terms.contains(&word) {
            terms.push(word);
        }
    }
    terms
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// A window of `text` around the first query term, with matches wrapped in `<em>`.
fn snippet(text: &str, terms: &[String]) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first = terms.iter().filter_map(|t| text.find(t.as_str())).min();
    let window = match first {
        Some(idx) => {
            let start = floor_char_boundary(text, idx.saturating_sub(SNIPPET_BEFORE));
            let end = floor_char_boundary(text, (start + SNIPPET_LEN).min(text.len()));
            &text[start..end]
        }
        None => &text[..floor_char_boundary(text, SNIPPET_LEN.min(text.len()))],
    };
    Some(highlight(window, terms))
}

fn highlight(snippet: &str, terms: &[String]) -> String {
    if terms.is_empty() {
        return snippet.to_string();
    }
    let mut sorted: Vec<&String> = terms.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = sorted.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    match regex::RegexBuilder::new(&format!(r"\b(?:{alternation})\w*")).case_insensitive(true).build() {
        Ok(pat) => pat.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "highlight pattern rejected");
            snippet.to_string()
        }
    }
}
