use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use engine::{create, topk, Collection, CreateOptions, DocMeta, ScoringConfig, SearchOptions, Searcher, StemmingTokenizer, Tokenizer};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Recency boost, on unless `date=false`
    pub date: Option<bool>,
    /// Phrase multiplier, on unless `phrase=false`
    pub phrase: Option<bool>,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub title: String,
    pub url: Option<String>,
    pub date: String,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub term: String,
    pub normalized: Option<String>,
    pub document_frequency: u32,
}

/// Everything needed to (re)build the collection.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub source: PathBuf,
    pub create: CreateOptions,
    pub scoring: ScoringConfig,
    /// Required in `X-ADMIN-TOKEN` for admin endpoints; unset disables them.
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    /// Swapped wholesale on reload; handlers clone the inner `Arc` and never hold the lock.
    pub collection: Arc<RwLock<Arc<Collection>>>,
    pub tokenizer: Arc<StemmingTokenizer>,
    pub settings: Arc<ServerSettings>,
}

impl AppState {
    fn snapshot(&self) -> Arc<Collection> {
        self.collection.read().clone()
    }
}

pub fn build_app(settings: ServerSettings) -> Result<Router> {
    // Build or load the collection at startup
    let tokenizer = Arc::new(StemmingTokenizer::new());
    let collection = create(&settings.source, tokenizer.as_ref(), &settings.scoring, &settings.create)?;
    tracing::info!(num_docs = collection.num_docs(), num_terms = collection.index().len(), "collection loaded");
    let app_state = AppState {
        collection: Arc::new(RwLock::new(Arc::new(collection))),
        tokenizer,
        settings: Arc::new(settings),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/terms/:term", get(term_handler))
        .route("/index/reload", post(index_reload))
        .with_state(app_state)
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let collection = state.snapshot();
    let options = SearchOptions {
        date_score: params.date.unwrap_or(true),
        phrase_score: params.phrase.unwrap_or(true),
        ..Default::default()
    };
    let searcher = Searcher::new(&collection, state.tokenizer.as_ref(), &state.settings.scoring);
    let scored = searcher.score_all(&params.q, &options);
    let total_hits = scored.len();
    let k = params.k.max(1).min(100);
    let top = topk::select(scored.into_iter().map(|(doc, score)| (doc.id.as_str(), doc, score)), k);

    let results = top
        .into_iter()
        .map(|(doc, score)| SearchHit {
            doc_id: doc.id.clone(),
            score,
            title: doc.title.clone(),
            url: doc.url.clone(),
            date: doc.date.clone(),
        })
        .collect();

    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query = %params.q, total_hits, took_s, "search");
    Json(SearchResponse { query: params.q, took_s, total_hits, results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<DocMeta>, (StatusCode, String)> {
    let collection = state.snapshot();
    match collection.doc(&doc_id) {
        Some(meta) => Ok(Json(meta.clone())),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

pub async fn term_handler(State(state): State<AppState>, Path(term): Path<String>) -> Json<TermResponse> {
    let normalized = state.tokenizer.tokenize(&term).into_iter().next();
    let document_frequency = normalized
        .as_deref()
        .map_or(0, |t| state.snapshot().document_frequency(t));
    Json(TermResponse { term, normalized, document_frequency })
}

// --- Admin endpoints ---
async fn index_reload(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let settings = state.settings.clone();
    let tokenizer = state.tokenizer.clone();
    let rebuilt = tokio::task::spawn_blocking(move || {
        create(&settings.source, tokenizer.as_ref(), &settings.scoring, &settings.create)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(|e| {
        tracing::warn!(error = %e, "reload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let num_docs = rebuilt.num_docs();
    *state.collection.write() = Arc::new(rebuilt);
    tracing::info!(num_docs, "collection reloaded");
    Ok(Json(serde_json::json!({ "reloaded": true, "num_docs": num_docs })))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.settings.admin_token {
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
