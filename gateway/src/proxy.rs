use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::error::GatewayError;
use crate::exchange::{GatewayRequest, GatewayResponse};
use crate::network::Network;
use crate::policy::Gateway;

const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;

/// Router sending every request through the gateway policy.
pub fn router<N: Network + 'static>(gateway: Arc<Gateway<N>>) -> Router {
    Router::new().fallback(forward::<N>).with_state(gateway)
}

async fn forward<N: Network + 'static>(State(gateway): State<Arc<Gateway<N>>>, request: Request) -> Response {
    let request = match buffer(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };
    match gateway.handle(request).await {
        Ok(response) => into_response(response),
        Err(err @ GatewayError::Target(_)) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        Err(err) => {
            // static assets get no fallback: the failed fetch is surfaced as is
            tracing::warn!(error = %err, "fetch failed");
            (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
    }
}

async fn buffer(request: Request) -> Result<GatewayRequest, Response> {
    let (parts, body) = request.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = to_bytes(body, MAX_REQUEST_BYTES)
        .await
        .map_err(|err| (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response())?;
    Ok(GatewayRequest { method: parts.method, target, headers, body: body.to_vec() })
}

fn into_response(reply: GatewayResponse) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    for (name, value) in reply.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            headers.append(name, value);
        }
    }
    response
}
