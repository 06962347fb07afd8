use axum::http::Method;

use crate::api::v1::extractors::security_ctx::SecurityCtx;
use crate::services::auth::identity::canonical_authority;

/// Access requirement a rule grants to matching requests.
#[derive(Debug, Clone, Copy)]
pub enum Access {
    /// No authentication required.
    Public,
    /// Any authenticated principal.
    Authenticated,
    /// Authenticated principal holding this role. Accepts either the bare
    /// role name or its canonical authority form.
    Role(&'static str),
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Split so the HTTP layer can answer 401 for missing identity and 403 for
/// insufficient role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seg {
    Literal(String),
    /// `*`: exactly one path segment.
    One,
    /// `**`: zero or more trailing segments.
    Rest,
}

/// Anchored, case-sensitive path pattern over `/`-separated segments.
#[derive(Debug, Clone)]
struct PathPattern {
    segs: Vec<Seg>,
}

impl PathPattern {
    /// Panics on a `**` that is not the final segment. Patterns come from
    /// the static rule table, so this fails at startup, not per request.
    fn parse(pattern: &str) -> Self {
        let trimmed = pattern.strip_prefix('/').unwrap_or(pattern);
        let parts: Vec<&str> = trimmed.split('/').collect();
        let last = parts.len() - 1;

        let segs = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match *part {
                "**" => {
                    if i != last {
                        panic!("`**` is only supported as the final segment: {pattern}");
                    }
                    Seg::Rest
                }
                "*" => Seg::One,
                lit => Seg::Literal(lit.to_string()),
            })
            .collect();

        Self { segs }
    }

    fn matches(&self, path: &str) -> bool {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut parts = path.split('/');
        let mut segs = self.segs.iter();

        loop {
            match (segs.next(), parts.next()) {
                (Some(Seg::Rest), _) => return true,
                (Some(Seg::One), Some(_)) => {}
                (Some(Seg::Literal(lit)), Some(part)) => {
                    if lit != part {
                        return false;
                    }
                }
                (Some(_), None) | (None, Some(_)) => return false,
                (None, None) => return true,
            }
        }
    }
}

/// One row of the access table: optional method filter, path pattern, and
/// the access requirement granted on match.
#[derive(Debug, Clone)]
pub struct AccessRule {
    method: Option<Method>,
    pattern: PathPattern,
    access: Access,
}

impl AccessRule {
    /// Rule matching every method on the pattern.
    pub fn path(pattern: &str, access: Access) -> Self {
        Self {
            method: None,
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    pub fn method(method: Method, pattern: &str, access: Access) -> Self {
        Self {
            method: Some(method),
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    pub fn get(pattern: &str, access: Access) -> Self {
        Self::method(Method::GET, pattern, access)
    }

    pub fn post(pattern: &str, access: Access) -> Self {
        Self::method(Method::POST, pattern, access)
    }

    pub fn put(pattern: &str, access: Access) -> Self {
        Self::method(Method::PUT, pattern, access)
    }

    pub fn delete(pattern: &str, access: Access) -> Self {
        Self::method(Method::DELETE, pattern, access)
    }

    fn applies(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// Ordered route access table, built once at startup and shared read-only.
///
/// Evaluation is first-match-wins in declaration order. A request no rule
/// matches falls through to `Access::Authenticated`, so new routes are
/// protected until a rule says otherwise.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    pub fn decide(&self, method: &Method, path: &str, ctx: &SecurityCtx) -> Decision {
        let access = self
            .rules
            .iter()
            .find(|rule| rule.applies(method, path))
            .map(|rule| &rule.access)
            .unwrap_or(&Access::Authenticated);

        match access {
            Access::Public => Decision::Allow,
            Access::Authenticated => {
                if ctx.is_authenticated() {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::Unauthenticated)
                }
            }
            Access::Role(role) => {
                if !ctx.is_authenticated() {
                    Decision::Deny(DenyReason::Unauthenticated)
                } else if ctx.has_authority(&canonical_authority(role)) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::Forbidden)
                }
            }
        }
    }
}
