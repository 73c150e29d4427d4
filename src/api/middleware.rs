//! Per-client rate limiting for the product routes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::app::config::RateLimitSettings;

use super::dto::ErrorResponse;

/// Token bucket parameters applied to each client IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub rps: u32,
    /// Requests allowed in a single burst
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { rps: 10, burst: 20 }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            rps: settings.rps,
            burst: settings.burst,
        }
    }
}

/// Limiter shared by every request passing through the middleware.
pub struct RateLimitState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    config: RateLimitConfig,
}

impl RateLimitState {
    /// Zero values are raised to one.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let rps = NonZeroU32::new(config.rps).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rps).allow_burst(burst);

        Self {
            limiter: RateLimiter::dashmap(quota),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }
}

/// Client address from `X-Forwarded-For`, `X-Real-IP`, or the socket peer.
///
/// Requests with no usable address share the `0.0.0.0` bucket.
fn client_ip<B>(request: &Request<B>) -> IpAddr {
    let header_ip = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rejects requests over the client's quota with `429 Too Many Requests`.
pub async fn rate_limit_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let ip = client_ip(&request);
    let limit = HeaderValue::from(rate_limit.config.rps);

    match rate_limit.limiter.check_key(&ip) {
        Ok(()) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert("X-RateLimit-Limit", limit);
            response
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1);
            warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let body = ErrorResponse::new(
                "rate_limited",
                "Rate limit exceeded. Please slow down your requests.",
            );
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", limit);
            headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
            headers.insert("Retry-After", HeaderValue::from(retry_after));
            response
        }
    }
}
