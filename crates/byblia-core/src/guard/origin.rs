//! Origin allow-list check.
//!
//! This is an advisory perimeter, NOT a security boundary. `Origin` and
//! `Referer` are plain request headers: browsers set them honestly, but any
//! non-browser client can send whatever value it likes. The guard only keeps
//! casual cross-site embedding away; abuse control is the rate limiter's job.

use axum::http::{header, HeaderMap, Method};
use byblia_types::models::config::OriginConfig;

/// Why a request was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginRejection {
    /// No declared origin on a non-preflight request
    MissingOrigin,
    /// Declared origin matches no allow-list entry
    NotAllowed { origin: String },
}

impl OriginRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingOrigin => "unknown origin",
            Self::NotAllowed { .. } => "origin not allowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    Allow,
    Reject(OriginRejection),
}

impl OriginDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct OriginGuard {
    allowed: Vec<String>,
    development: bool,
    disabled: bool,
}

impl OriginGuard {
    pub fn new(config: &OriginConfig) -> Self {
        Self {
            allowed: config.effective_origins(),
            development: config.development,
            disabled: config.disabled,
        }
    }

    /// Guard that admits everything.
    pub fn permissive() -> Self {
        Self { allowed: Vec::new(), development: true, disabled: true }
    }

    /// Origin the request declares: `Origin`, falling back to `Referer`.
    pub fn declared_origin(headers: &HeaderMap) -> Option<&str> {
        [header::ORIGIN, header::REFERER]
            .iter()
            .filter_map(|name| headers.get(name).and_then(|v| v.to_str().ok()))
            .map(str::trim)
            .find(|v| !v.is_empty() && *v != "null")
    }

    pub fn check(&self, origin: Option<&str>, method: &Method) -> OriginDecision {
        if self.disabled {
            return OriginDecision::Allow;
        }

        let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
            if *method == Method::OPTIONS || self.development {
                return OriginDecision::Allow;
            }
            return OriginDecision::Reject(OriginRejection::MissingOrigin);
        };

        if self.is_allowed_origin(origin) {
            OriginDecision::Allow
        } else {
            OriginDecision::Reject(OriginRejection::NotAllowed { origin: origin.to_string() })
        }
    }

    /// Substring match against the allow-list (also used to answer CORS).
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.disabled || self.allowed.iter().any(|entry| origin.contains(entry.as_str()))
    }
}
