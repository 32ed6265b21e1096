//! Login reconciliation.
//!
//! Every successful identity-provider login is mapped to an internal
//! [`Guest`], creating one the first time an email is seen.
//!
//! # Fail-open
//!
//! Reconciliation is a side effect of signing in and never decides it.
//! [`reconcile_login`] always allows the login: store errors from the
//! lookup or the insert are logged and dropped. A `Conflict` on insert
//! means a concurrent first login for the same email won the race, which
//! leaves the guest in place exactly as if this call had created it.
//!
//! Existing guests are never updated, even when the provider reports a
//! different display name.

use serde::Deserialize;

use crate::email::NormalizedEmail;
use crate::error::{StoreError, StoreResult};
use crate::models::Guest;
use crate::repository::GuestRepository;

/// Profile fields received from the identity provider after login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderProfile {
    pub email: Option<String>,
    #[serde(alias = "displayName")]
    pub name: Option<String>,
}

impl ProviderProfile {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: Some(name.into()),
        }
    }
}

/// What reconciliation did for one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The provider sent no usable email; no guest is implied.
    Anonymous,
    /// A guest was already registered under the email.
    Existing(Guest),
    /// A new guest was created.
    Created(Guest),
    /// The insert lost a race with a concurrent login for the same email.
    RaceAbsorbed,
}

/// Reconciles a login and returns whether sign-in may proceed.
///
/// Always returns `true`.
pub async fn reconcile_login(guests: &dyn GuestRepository, profile: &ProviderProfile) -> bool {
    match reconcile(guests, profile).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "Login reconciled");
        }
        Err(e) => {
            // Fail-open: sign-in goes ahead without a guest record.
            tracing::warn!("Guest reconciliation failed, allowing sign-in: {}", e);
        }
    }
    true
}

/// Finds or creates the guest for `profile`.
///
/// A `Conflict` from the insert is mapped to [`ReconcileOutcome::RaceAbsorbed`];
/// every other store error is returned.
pub async fn reconcile(
    guests: &dyn GuestRepository,
    profile: &ProviderProfile,
) -> StoreResult<ReconcileOutcome> {
    let Some(email) = profile.email.as_deref().and_then(NormalizedEmail::parse) else {
        return Ok(ReconcileOutcome::Anonymous);
    };

    if let Some(existing) = guests.find_by_email(&email).await? {
        return Ok(ReconcileOutcome::Existing(existing));
    }

    let full_name = profile.name.as_deref().unwrap_or("");
    match guests.create(&email, full_name).await {
        Ok(guest) => {
            tracing::info!(guest_id = guest.id, "Created guest for {}", email);
            Ok(ReconcileOutcome::Created(guest))
        }
        Err(StoreError::Conflict(_)) => {
            tracing::debug!("Guest for {} created by a concurrent login", email);
            Ok(ReconcileOutcome::RaceAbsorbed)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_login_creates_guest() {
        let store = MemoryStore::new();
        let profile = ProviderProfile::new("Alice@Example.com", "Alice Liddell");

        let outcome = reconcile(&store, &profile).await.unwrap();

        let ReconcileOutcome::Created(guest) = outcome else {
            panic!("expected a new guest, got {:?}", outcome);
        };
        assert_eq!(guest.email.as_str(), "alice@example.com");
        assert_eq!(guest.full_name, "Alice Liddell");
    }

    #[tokio::test]
    async fn test_second_login_finds_existing_guest() {
        let store = MemoryStore::new();
        let profile = ProviderProfile::new("alice@example.com", "Alice");

        assert!(reconcile_login(&store, &profile).await);
        assert!(reconcile_login(&store, &profile).await);

        assert_eq!(store.guest_count(), 1);
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_email_variants_map_to_one_guest() {
        let store = MemoryStore::new();

        reconcile_login(&store, &ProviderProfile::new("bob@example.com", "Bob")).await;
        let outcome = reconcile(&store, &ProviderProfile::new("  BOB@example.COM", "Bob"))
            .await
            .unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Existing(_)));
        assert_eq!(store.guest_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_email_is_anonymous() {
        let store = MemoryStore::new();
        let profile = ProviderProfile {
            email: None,
            name: Some("No Email".into()),
        };

        assert_eq!(
            reconcile(&store, &profile).await.unwrap(),
            ReconcileOutcome::Anonymous
        );
        assert!(reconcile_login(&store, &profile).await);
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_email_is_anonymous() {
        let store = MemoryStore::new();
        let profile = ProviderProfile::new("   ", "Blank");

        assert_eq!(
            reconcile(&store, &profile).await.unwrap(),
            ReconcileOutcome::Anonymous
        );
    }

    #[tokio::test]
    async fn test_missing_name_creates_empty_full_name() {
        let store = MemoryStore::new();
        let profile = ProviderProfile {
            email: Some("carol@example.com".into()),
            name: None,
        };

        reconcile_login(&store, &profile).await;

        let guests = store.guests();
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].full_name, "");
    }

    #[tokio::test]
    async fn test_existing_name_is_not_updated() {
        let store = MemoryStore::new();

        reconcile_login(&store, &ProviderProfile::new("dan@example.com", "Dan")).await;
        reconcile_login(&store, &ProviderProfile::new("dan@example.com", "Daniel")).await;

        assert_eq!(store.guests()[0].full_name, "Dan");
    }

    #[tokio::test]
    async fn test_conflict_is_absorbed() {
        let store = MemoryStore::new();
        store.race_next_create();

        let outcome = reconcile(&store, &ProviderProfile::new("eve@example.com", "Eve"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::RaceAbsorbed);
        assert_eq!(store.guest_count(), 1);
    }

    #[tokio::test]
    async fn test_create_failure_still_allows_login() {
        let store = MemoryStore::new();
        store.fail_creates(true);
        let profile = ProviderProfile::new("frank@example.com", "Frank");

        assert!(matches!(
            reconcile(&store, &profile).await,
            Err(StoreError::DataUnavailable(_))
        ));
        assert!(reconcile_login(&store, &profile).await);
        assert_eq!(store.guest_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_still_allows_login() {
        let store = MemoryStore::new();
        store.fail_reads(true);

        assert!(reconcile_login(&store, &ProviderProfile::new("gina@example.com", "Gina")).await);
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_logins_create_one_guest() {
        let store = Arc::new(MemoryStore::new());
        let profile = ProviderProfile::new("hal@example.com", "Hal");

        let logins = (0..8).map(|_| {
            let store = Arc::clone(&store);
            let profile = profile.clone();
            tokio::spawn(async move { reconcile_login(store.as_ref(), &profile).await })
        });

        for allowed in futures::future::join_all(logins).await {
            assert!(allowed.unwrap());
        }
        assert_eq!(store.guest_count(), 1);
    }

    #[test]
    fn test_profile_accepts_display_name_alias() {
        let profile: ProviderProfile =
            serde_json::from_str(r#"{"email":"a@example.com","displayName":"A"}"#).unwrap();
        assert_eq!(profile, ProviderProfile::new("a@example.com", "A"));
    }
}
