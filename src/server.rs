/// HTTP surface
///
/// Four small endpoints: the contact form, the (token-guarded) submission
/// listing, the gallery catalog, and a liveness probe. Blocking SQLite work
/// runs on the blocking pool with a fresh connection per request.

use crate::contact::email::{ContactEmail, Mailer};
use crate::contact::store::{StoredSubmission, SubmissionStore};
use crate::contact::submission::ContactPayload;
use crate::gallery::catalog::{Catalog, ImageRecord};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub catalog: Arc<Catalog>,
    pub mailer: Arc<Mailer>,
    /// Bearer token for the submission listing; None disables the endpoint
    pub admin_token: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/contact", post(submit_contact))
        .route("/api/contact-submissions", get(list_submissions))
        .route("/api/gallery", get(full_gallery))
        .route("/api/gallery/:category", get(gallery_category))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Internal server error",
        })),
    )
        .into_response()
}

/// POST /api/contact
///
/// Validate, store, then notify. Email delivery is best-effort: once the
/// row is written the request succeeds no matter what the providers do.
async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> Response {
    let submission = match payload.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": "Invalid form data",
                    "errors": errors,
                })),
            )
                .into_response();
        }
    };

    let db_path = state.db_path.clone();
    let to_store = submission.clone();
    let stored = task::spawn_blocking(move || -> rusqlite::Result<i64> {
        let store = SubmissionStore::open(&db_path)?;
        store.insert(&to_store)
    })
    .await;

    let id = match stored {
        Ok(Ok(id)) => id,
        Ok(Err(e)) => {
            error!(error = %e, "Failed to store contact submission");
            return server_error();
        }
        Err(e) => {
            error!(error = %e, "Contact storage task failed");
            return server_error();
        }
    };

    if state.mailer.is_enabled() {
        let email = ContactEmail::build(&submission);
        match state.mailer.deliver(&email).await {
            Ok(provider) => info!(id, provider, "Contact notification delivered"),
            Err(e) => {
                // The submission is already durable; the submitter still
                // gets a success
                warn!(id, error = %e, "Email notification failed, submission was saved");
            }
        }
    } else {
        info!(id, "Email notifications disabled, skipping");
    }

    Json(json!({
        "success": true,
        "message": "Contact form submitted successfully",
        "id": id,
    }))
    .into_response()
}

/// GET /api/contact-submissions
///
/// Admin-only. Requires `Authorization: Bearer <ADMIN_TOKEN>`; when no
/// token is configured the endpoint is disabled outright rather than open.
async fn list_submissions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(expected) = &state.admin_token else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "message": "Submission listing is disabled",
            })),
        )
            .into_response();
    };

    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "Unauthorized",
            })),
        )
            .into_response();
    }

    let db_path = state.db_path.clone();
    let listed = task::spawn_blocking(move || -> rusqlite::Result<Vec<StoredSubmission>> {
        let store = SubmissionStore::open(&db_path)?;
        store.list_all()
    })
    .await;

    match listed {
        Ok(Ok(submissions)) => Json(submissions).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "Failed to list contact submissions");
            server_error()
        }
        Err(e) => {
            error!(error = %e, "Submission listing task failed");
            server_error()
        }
    }
}

/// GET /api/gallery — the full image catalog.
async fn full_gallery(State(state): State<AppState>) -> Json<Vec<ImageRecord>> {
    Json(state.catalog.images.clone())
}

/// GET /api/gallery/:category — one section, original order preserved.
/// Unknown categories yield an empty list, not a 404.
async fn gallery_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<Vec<ImageRecord>> {
    let records: Vec<ImageRecord> = state
        .catalog
        .category(&category)
        .into_iter()
        .cloned()
        .collect();
    Json(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::email::{EmailError, EmailProvider};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tower::ServiceExt;

    static DB_SEQ: AtomicU32 = AtomicU32::new(0);

    fn record(id: &str, category: &str) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            src: format!("/images/{}/{}.webp", category, id),
            srcset: Vec::new(),
            sizes: Vec::new(),
            placeholder: None,
            alt: format!("{} photo", category),
            width: 1200,
            height: 800,
            category: category.to_string(),
            priority: false,
        }
    }

    fn test_state(mailer: Mailer, admin_token: Option<&str>) -> AppState {
        let db_path = std::env::temp_dir().join(format!(
            "nest-portfolio-router-{}-{}.db",
            std::process::id(),
            DB_SEQ.fetch_add(1, Ordering::SeqCst),
        ));
        let _ = std::fs::remove_file(&db_path);
        let catalog = Catalog::new(vec![
            record("w1", "wedding"),
            record("w2", "wedding"),
            record("p1", "portrait"),
        ])
        .unwrap();
        AppState {
            db_path,
            catalog: Arc::new(catalog),
            mailer: Arc::new(mailer),
            admin_token: admin_token.map(str::to_string),
        }
    }

    fn contact_body() -> Value {
        json!({
            "firstName": "Austin",
            "lastName": "Wren",
            "email": "austin@example.com",
            "service": "wedding",
            "eventDate": "2026-06-20",
            "message": "We're getting married next June and love your work.",
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_contact(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    struct StubProvider {
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl EmailProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn send(&self, _email: &ContactEmail) -> Result<(), EmailError> {
            if self.fail {
                Err(EmailError::Api {
                    status: 500,
                    body: "provider down".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_short_message_rejected_with_field_error() {
        let app = router(test_state(Mailer::disabled(), None));
        let mut body = contact_body();
        body["message"] = json!("Hello");

        let (status, value) = send(app, post_contact(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["success"], json!(false));
        let fields: Vec<&str> = value["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["message"]);
    }

    #[tokio::test]
    async fn test_valid_submission_accepted_without_mailer() {
        let app = router(test_state(Mailer::disabled(), None));
        let (status, value) = send(app, post_contact(&contact_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["success"], json!(true));
        assert!(value["id"].as_i64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_and_still_succeeds() {
        let mailer = Mailer::new(vec![
            Box::new(StubProvider {
                name: "resend",
                fail: true,
            }),
            Box::new(StubProvider {
                name: "smtp",
                fail: false,
            }),
        ]);
        let app = router(test_state(mailer, None));

        let (status, value) = send(app, post_contact(&contact_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["success"], json!(true));
        assert!(value["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn test_both_providers_failing_does_not_fail_request() {
        let mailer = Mailer::new(vec![
            Box::new(StubProvider {
                name: "resend",
                fail: true,
            }),
            Box::new(StubProvider {
                name: "smtp",
                fail: true,
            }),
        ]);
        let app = router(test_state(mailer, None));

        let (status, value) = send(app, post_contact(&contact_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["success"], json!(true));
    }

    #[tokio::test]
    async fn test_listing_disabled_without_configured_token() {
        let app = router(test_state(Mailer::disabled(), None));
        let (status, _) = send(app, get_request("/api/contact-submissions", None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_listing_requires_bearer_token() {
        let state = test_state(Mailer::disabled(), Some("shutter-secret"));

        let (status, _) = send(
            router(state.clone()),
            get_request("/api/contact-submissions", None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            router(state.clone()),
            get_request("/api/contact-submissions", Some("wrong")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Store one submission, then list it with the right token
        let (status, _) = send(router(state.clone()), post_contact(&contact_body())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, value) = send(
            router(state),
            get_request("/api/contact-submissions", Some("shutter-secret")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let listed = value.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["firstName"], json!("Austin"));
    }

    #[tokio::test]
    async fn test_gallery_endpoints() {
        let state = test_state(Mailer::disabled(), None);

        let (status, value) = send(router(state.clone()), get_request("/api/gallery", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value.as_array().unwrap().len(), 3);

        let (status, value) = send(
            router(state.clone()),
            get_request("/api/gallery/wedding", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let weddings = value.as_array().unwrap();
        assert_eq!(weddings.len(), 2);
        assert_eq!(weddings[0]["id"], json!("w1"));

        let (status, value) = send(router(state), get_request("/api/gallery/lifestyle", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(value.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(test_state(Mailer::disabled(), None));
        let response = app
            .oneshot(get_request("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
