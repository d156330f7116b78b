//! Agent scope extractor.
//!
//! Authentication is an external collaborator; it forwards the authenticated
//! agent's id in the `X-Agent-Id` header. Document uploads require it, image
//! uploads are scoped transitively through the property's agent.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use propmedia_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

pub const AGENT_HEADER: &str = "x-agent-id";

#[derive(Debug, Clone, Copy)]
pub struct AgentScope(pub Option<Uuid>);

impl<S> FromRequestParts<S> for AgentScope
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(AGENT_HEADER) {
            None => Ok(AgentScope(None)),
            Some(value) => {
                let id = value
                    .to_str()
                    .ok()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(|| {
                        HttpAppError(AppError::InvalidInput(
                            "X-Agent-Id must be a UUID".to_string(),
                        ))
                    })?;
                Ok(AgentScope(Some(id)))
            }
        }
    }
}
