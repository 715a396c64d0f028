//! Request throttling middleware.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::rate_limit::Decision;
use crate::web::state::SharedLimiter;

pub(crate) const TOO_MANY_REQUESTS_TEXT: &str = "Too many requests, try again after some time";

/// Count the request against its client address and reject it with 429 once
/// the client is over its window budget.
///
/// The address comes from [`ConnectInfo`]; when the server was started
/// without it every request shares the unspecified address.
pub async fn throttle(
    State(limiter): State<SharedLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    tracing::debug!(
        %client,
        method = %request.method(),
        path = %request.uri().path(),
        "request"
    );

    match limiter.check(client) {
        Decision::Allow => next.run(request).await,
        Decision::Throttle => {
            tracing::warn!(
                %client,
                "throttled: over {} request(s) per window",
                limiter.config().max_requests
            );
            (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS_TEXT).into_response()
        }
    }
}
