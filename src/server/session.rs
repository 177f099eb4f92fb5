//! Caller identity as forwarded by the upstream gateway.

use crate::jobs::{Actor, Permission, Role};

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use tracing::debug;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_TENANT_ID: &str = "x-tenant-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";

/// The request's actor, if the gateway identified one.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub actor: Option<Actor>,
}

impl Session {
    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.actor
            .as_ref()
            .is_some_and(|actor| actor.has_permission(permission))
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn extract_actor(parts: &Parts) -> Option<Actor> {
    let user_id = header_value(parts, HEADER_USER_ID)?;
    // Missing or unknown roles fall back to the least privileged one.
    let role = match header_value(parts, HEADER_USER_ROLE) {
        Some(raw) => Role::parse(&raw).unwrap_or_else(|| {
            debug!("Unknown role {:?} for user {}", raw, user_id);
            Role::Viewer
        }),
        None => Role::Viewer,
    };
    let mut actor = Actor::new(user_id, role);
    actor.tenant_id = header_value(parts, HEADER_TENANT_ID);
    Some(actor)
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session {
            actor: extract_actor(parts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/v1/jobs");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn no_user_header_means_no_actor() {
        let parts = parts_with(&[(HEADER_USER_ROLE, "admin")]);
        assert!(extract_actor(&parts).is_none());
    }

    #[test]
    fn extracts_full_actor() {
        let parts = parts_with(&[
            (HEADER_USER_ID, "u1"),
            (HEADER_TENANT_ID, "acme"),
            (HEADER_USER_ROLE, "Recruiter"),
        ]);
        let actor = extract_actor(&parts).unwrap();
        assert_eq!(actor.user_id, "u1");
        assert_eq!(actor.tenant_id.as_deref(), Some("acme"));
        assert_eq!(actor.role, Role::Recruiter);
    }

    #[test]
    fn unknown_role_is_viewer() {
        let parts = parts_with(&[(HEADER_USER_ID, "u1"), (HEADER_USER_ROLE, "superuser")]);
        assert_eq!(extract_actor(&parts).unwrap().role, Role::Viewer);
    }
}
