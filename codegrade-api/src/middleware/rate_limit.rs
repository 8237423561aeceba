/// Per-user rate limiting for evaluation requests
///
/// Each user gets a token bucket sized by their subscription plan. Buckets
/// live in process memory behind a mutex, so limits are per server instance.
///
/// # Rate Limits by Plan
///
/// - **Free**: 5 requests/minute
/// - **Premium**: 20 requests/minute
/// - **Ultra Premium**: 60 requests/minute
///
/// # Algorithm
///
/// - Tokens refill continuously at `requests_per_minute / 60` per second
/// - Each request consumes 1 token
/// - Request rejected if fewer than 1 token is left
///
/// # Headers
///
/// - `X-RateLimit-Limit`: requests allowed per minute
/// - `X-RateLimit-Remaining`: whole tokens left
/// - `Retry-After`: seconds to wait (429 responses only)
///
/// # Example
///
/// ```
/// use codegrade_api::middleware::rate_limit::RateLimiter;
/// use codegrade_shared::models::profile::SubscriptionPlan;
/// use uuid::Uuid;
///
/// let limiter = RateLimiter::new();
/// let decision = limiter.check(Uuid::new_v4(), SubscriptionPlan::Free);
/// assert!(decision.allowed);
/// assert_eq!(decision.remaining, 4);
/// ```

use crate::error::ApiError;
use axum::{
    http::{HeaderName, HeaderValue},
    response::Response,
};
use codegrade_shared::models::profile::SubscriptionPlan;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// `X-RateLimit-Limit` header
pub static RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");

/// `X-RateLimit-Remaining` header
pub static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Buckets idle this long are full again and can be dropped
const IDLE_EVICTION: Duration = Duration::from_secs(120);

/// Table size that triggers eviction of idle buckets
const EVICTION_THRESHOLD: usize = 10_000;

/// Rate limit configuration for a plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    /// Maximum requests per minute
    pub requests_per_minute: u32,

    /// Token refill rate (tokens per second)
    pub refill_rate: f64,

    /// Maximum tokens in bucket (burst capacity)
    pub bucket_capacity: u32,
}

impl RateLimit {
    fn per_minute(requests_per_minute: u32) -> Self {
        RateLimit {
            requests_per_minute,
            refill_rate: requests_per_minute as f64 / 60.0,
            bucket_capacity: requests_per_minute,
        }
    }

    /// Gets rate limit configuration for a subscription plan
    pub fn for_plan(plan: SubscriptionPlan) -> Self {
        match plan {
            SubscriptionPlan::Free => Self::per_minute(5),
            SubscriptionPlan::Premium => Self::per_minute(20),
            SubscriptionPlan::UltraPremium => Self::per_minute(60),
        }
    }
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, now: Instant) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill: now,
        }
    }

    fn refill(&mut self, rate: f64, capacity: u32, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity as f64);
        self.last_refill = now;
    }

    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            // Tolerate float noise such as 1.0 / (5.0 / 60.0) = 12.000000000000002
            ((deficit / rate - 1e-9).ceil() as u64).max(1)
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Requests allowed per minute
    pub limit: u32,

    /// Whole tokens left after this request
    pub remaining: u32,

    /// Seconds until a token is available (0 when allowed)
    pub retry_after: u64,
}

impl RateLimitDecision {
    /// Converts a rejection into a 429 error
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(ApiError::RateLimitExceeded {
                retry_after: self.retry_after,
                message: format!(
                    "Rate limit of {} evaluations per minute exceeded. Try again in {} seconds",
                    self.limit, self.retry_after
                ),
            })
        }
    }

    /// Adds `X-RateLimit-*` headers to a response
    pub fn apply_headers(&self, response: &mut Response) {
        let headers = response.headers_mut();
        headers.insert(RATE_LIMIT_LIMIT.clone(), HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING.clone(), HeaderValue::from(self.remaining));
    }
}

/// In-process token buckets keyed by user
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<Uuid, TokenBucket>>,
}

impl RateLimiter {
    /// Creates an empty limiter
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one token for `user_id`
    pub fn check(&self, user_id: Uuid, plan: SubscriptionPlan) -> RateLimitDecision {
        self.check_at(user_id, plan, Instant::now())
    }

    /// Consumes one token for `user_id` as of `now`
    ///
    /// A bucket is created full on first use. After a plan change the
    /// existing bucket is refilled against the new capacity.
    pub fn check_at(&self, user_id: Uuid, plan: SubscriptionPlan, now: Instant) -> RateLimitDecision {
        let limit = RateLimit::for_plan(plan);
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        if buckets.len() >= EVICTION_THRESHOLD {
            buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < IDLE_EVICTION);
        }

        let bucket = buckets
            .entry(user_id)
            .or_insert_with(|| TokenBucket::new(limit.bucket_capacity, now));
        bucket.refill(limit.refill_rate, limit.bucket_capacity, now);

        let allowed = bucket.try_consume(1.0);
        let retry_after = if allowed {
            0
        } else {
            bucket.seconds_until_available(1.0, limit.refill_rate)
        };

        if !allowed {
            tracing::warn!(user_id = %user_id, plan = plan.as_str(), retry_after, "Rate limit exceeded");
        }

        RateLimitDecision {
            allowed,
            limit: limit.requests_per_minute,
            remaining: bucket.tokens.floor() as u32,
            retry_after,
        }
    }

    /// Number of tracked users
    pub fn tracked_users(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
