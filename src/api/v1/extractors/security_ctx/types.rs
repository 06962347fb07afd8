/*
 * Responsibility
 * - The per-request security context as handlers and the policy layer see it
 * - The authentication middleware resolves it and stores it in the request
 *   extensions; everything downstream only reads this type
 *
 * Notes
 * - Token and credential checking is the services/auth side; this is the
 *   contract type only
 */

use crate::services::auth::identity::Principal;

/// Outcome of request authentication, attached to every request.
///
/// `Authenticated` carries the resolved principal plus its canonical
/// authority strings, computed once so authorization checks are lookups.
#[derive(Debug, Clone)]
pub enum SecurityCtx {
    Anonymous,
    Authenticated {
        principal: Principal,
        authorities: Vec<String>,
    },
}

impl SecurityCtx {
    pub fn authenticated(principal: Principal) -> Self {
        let authorities = principal.authorities();
        SecurityCtx::Authenticated {
            principal,
            authorities,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SecurityCtx::Authenticated { .. })
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SecurityCtx::Anonymous => None,
            SecurityCtx::Authenticated { principal, .. } => Some(principal),
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        match self {
            SecurityCtx::Anonymous => false,
            SecurityCtx::Authenticated { authorities, .. } => {
                authorities.iter().any(|a| a == authority)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Principal {
        Principal {
            id: 1,
            username: "alice".into(),
            password_hash: "hash".into(),
            roles: vec!["USER".into(), "ADMIN".into()],
        }
    }

    #[test]
    fn authenticated_ctx_carries_canonical_authorities() {
        let ctx = SecurityCtx::authenticated(alice());
        assert!(ctx.is_authenticated());
        assert!(ctx.has_authority("ROLE_USER"));
        assert!(ctx.has_authority("ROLE_ADMIN"));
        assert!(!ctx.has_authority("USER"));
    }

    #[test]
    fn anonymous_ctx_has_no_principal_and_no_authorities() {
        let ctx = SecurityCtx::Anonymous;
        assert!(!ctx.is_authenticated());
        assert!(ctx.principal().is_none());
        assert!(!ctx.has_authority("ROLE_USER"));
    }
}
