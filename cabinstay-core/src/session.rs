//! Session enrichment.
//!
//! A session carries the provider identity of the signed-in user. Each
//! time a session is read, the matching guest id is looked up and
//! attached to `user.guest_id`. The id is never stored with the session;
//! it is resolved again on the next read.
//!
//! Enrichment must never break session retrieval. When the lookup fails
//! or finds nothing, the session is returned exactly as it came in.

use serde::{Deserialize, Serialize};

use crate::email::NormalizedEmail;
use crate::error::StoreResult;
use crate::models::GuestId;
use crate::repository::GuestRepository;

/// The user portion of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
}

/// An authenticated browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn for_user(email: Option<String>, name: Option<String>) -> Self {
        Self {
            user: Some(SessionUser {
                email,
                name,
                guest_id: None,
            }),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }

    pub fn guest_id(&self) -> Option<GuestId> {
        self.user.as_ref().and_then(|u| u.guest_id)
    }
}

/// Result of resolving the guest behind a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    /// The session has no user or no email.
    Skipped,
    /// No guest is registered under the session email.
    NoGuest,
    /// The lookup failed.
    Failed,
    Enriched(GuestId),
}

/// Resolves the guest for `session` without modifying it.
pub async fn resolve_guest(guests: &dyn GuestRepository, session: &Session) -> Enrichment {
    let Some(email) = session.email().and_then(NormalizedEmail::parse) else {
        return Enrichment::Skipped;
    };

    match lookup_guest_id(guests, &email).await {
        Ok(Some(id)) => Enrichment::Enriched(id),
        Ok(None) => Enrichment::NoGuest,
        Err(e) => {
            tracing::warn!("Session enrichment failed for {}: {}", email, e);
            Enrichment::Failed
        }
    }
}

async fn lookup_guest_id(
    guests: &dyn GuestRepository,
    email: &NormalizedEmail,
) -> StoreResult<Option<GuestId>> {
    Ok(guests.find_by_email(email).await?.map(|guest| guest.id))
}

/// Attaches the resolved guest id to `session`.
///
/// Returns the session unchanged unless a guest was found.
pub async fn enrich_session(guests: &dyn GuestRepository, mut session: Session) -> Session {
    let enrichment = resolve_guest(guests, &session).await;
    tracing::debug!(?enrichment, "Session read");

    if let (Enrichment::Enriched(id), Some(user)) = (enrichment, session.user.as_mut()) {
        user.guest_id = Some(id);
    }
    session
}
