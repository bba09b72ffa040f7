use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use irs_core::cleanup::StopWords;
use irs_core::persist::{save_collection, save_stop_words, DataPaths};
use irs_core::{Document, EngineConfig, ModelKind};
use serde_json::Value;
use server::{build_app, AppConfig};
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

const TOKEN: &str = "secret";

fn write_data_dir(dir: &Path) {
    let paths = DataPaths::new(dir);
    let collection = vec![
        Document::new(0, "The Fox and the Grapes", "a hungry fox saw some fine bunches of grapes"),
        Document::new(1, "The Dog and the Shadow", "a dog carrying a piece of meat saw his shadow"),
        Document::new(2, "The Fox and the Crow", "a crow sat on a branch and the fox flattered her"),
    ];
    save_collection(&paths, &collection).unwrap();
    let stop_words: StopWords = ["a", "the", "of", "and"].iter().map(|s| s.to_string()).collect();
    save_stop_words(&paths, &stop_words).unwrap();
}

fn config(dir: &Path, model: ModelKind) -> AppConfig {
    AppConfig {
        data_dir: dir.to_path_buf(),
        model,
        reference: None,
        admin_token: Some(TOKEN.into()),
        cors_allow_origin: None,
        engine: EngineConfig::default(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn post_json(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("X-ADMIN-TOKEN", t);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn ids(json: &Value) -> Vec<u64> {
    json["results"].as_array().unwrap().iter().map(|r| r["doc_id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn boolean_search_returns_matching_documents() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let app = build_app(config(dir.path(), ModelKind::Inverted)).unwrap();

    let (status, json) = get(app.clone(), "/search?q=fox").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec![0, 2]);
    assert_eq!(json["results"][0]["title"], "The Fox and the Grapes");
    assert!(json["results"][0]["snippet"].as_str().unwrap().contains("<em>fox</em>"));
    assert!(json["precision"].is_null());

    let (_, json) = get(app.clone(), "/search?q=fox%20-crow").await;
    assert_eq!(ids(&json), vec![0]);

    let (_, json) = get(app, "/search?q=flattering&stemming=true").await;
    assert_eq!(ids(&json), vec![2]);
    assert_eq!(json["normalized_query"], "flatter");
}

#[tokio::test]
async fn vector_search_ranks_and_limits() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let app = build_app(config(dir.path(), ModelKind::Vector)).unwrap();
    let (status, json) = get(app, "/search?q=fox%20crow&k=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec![2]);
    assert_eq!(json["total_hits"], 2);
    assert_eq!(json["model"], "vector");
}

#[tokio::test]
async fn linear_model_rejects_malformed_query() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let app = build_app(config(dir.path(), ModelKind::Linear)).unwrap();
    let (status, _) = get(app, "/search?q=fox%20%26").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reports_metrics_with_reference_table() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let reference = dir.path().join("ground_truth.txt");
    std::fs::write(&reference, "fox - 1\ncrow - 3\n").unwrap();
    let mut cfg = config(dir.path(), ModelKind::Inverted);
    cfg.reference = Some(reference);
    let app = build_app(cfg).unwrap();

    let (_, json) = get(app.clone(), "/search?q=fox").await;
    assert_eq!(json["precision"], 0.5);
    assert_eq!(json["recall"], 1.0);
    let (_, json) = get(app, "/search?q=wolf").await;
    assert_eq!(json["precision"], -1.0);
}

#[tokio::test]
async fn documents_are_listed_and_fetched() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let app = build_app(config(dir.path(), ModelKind::Inverted)).unwrap();

    let (_, json) = get(app.clone(), "/docs").await;
    assert_eq!(json.as_array().unwrap().len(), 3);
    let (status, json) = get(app.clone(), "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "The Dog and the Shadow");
    let (status, _) = get(app, "/doc/9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_token() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let app = build_app(config(dir.path(), ModelKind::Inverted)).unwrap();

    let (status, _) = send(app.clone(), post_json("/model", r#"{"model":"vector"}"#, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(app.clone(), post_json("/model", r#"{"model":"vector"}"#, Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(app.clone(), post_json("/model", r#"{"model":"signature"}"#, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Boolean Model (Signatures)");
    let (_, json) = get(app.clone(), "/search?q=crow").await;
    assert_eq!(json["model"], "signature");
    assert_eq!(ids(&json), vec![2]);

    let (status, _) = send(app, post_json("/model", r#"{"model":"fuzzy"}"#, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn reload_picks_up_new_collection() {
    let dir = tempdir().unwrap();
    write_data_dir(dir.path());
    let app = build_app(config(dir.path(), ModelKind::Inverted)).unwrap();

    save_collection(&DataPaths::new(dir.path()), &vec![Document::new(0, "The Wolf and the Lamb", "a wolf met a lamb")])
        .unwrap();
    let (status, json) = send(app.clone(), post_json("/collection/reload", "", Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"], 1);
    let (_, json) = get(app, "/search?q=wolf").await;
    assert_eq!(ids(&json), vec![0]);
}
