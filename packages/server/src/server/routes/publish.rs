use axum::{extract::Extension, http::StatusCode, Json};
use indexnow::{PublishEvent, RequestContext, Visibility};
use serde::{Deserialize, Serialize};

use crate::kernel::ServerDeps;
use crate::server::middleware::ClientIp;

/// Body of `POST /publish`, sent by the CMS when an item is saved.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub id: i64,
    pub visibility: Visibility,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    status: &'static str,
}

/// Build the outcome-log context for a request.
pub fn request_context(user_id: i64, client_ip: Option<Extension<ClientIp>>) -> RequestContext {
    let ip = client_ip
        .map(|Extension(ClientIp(ip))| ip.to_string())
        .unwrap_or_default();
    RequestContext::new(user_id, ip)
}

/// Queue a single-URL submission for a published item.
///
/// Returns before the submission runs; the outcome goes to the recorder.
pub async fn publish_handler(
    Extension(deps): Extension<ServerDeps>,
    client_ip: Option<Extension<ClientIp>>,
    Json(request): Json<PublishRequest>,
) -> (StatusCode, Json<PublishResponse>) {
    if !request.visibility.is_public() {
        tracing::debug!(id = request.id, visibility = ?request.visibility, "Publish event ignored");
        return (StatusCode::OK, Json(PublishResponse { status: "ignored" }));
    }

    let ctx = request_context(request.user_id, client_ip);
    let event = PublishEvent::new(request.id, request.visibility, request.permalink);

    tracing::info!(id = event.id, user_ip = %ctx.user_ip, "Publish event queued");
    // Detached: the CMS never waits on IndexNow
    drop(deps.indexnow.spawn_publish(event, ctx));

    (StatusCode::ACCEPTED, Json(PublishResponse { status: "queued" }))
}
