//! Cabinstay Core Library
//!
//! Guest identity resolution, booking lookups and cabin availability,
//! independent of any particular store or web framework.

pub mod availability;
pub mod email;
pub mod error;
pub mod identity;
pub mod memory;
pub mod models;
pub mod repository;
pub mod session;

pub use availability::{blocked_dates, booked_dates_for_cabin, BlockedDateSet};
pub use email::NormalizedEmail;
pub use error::{AvailabilityError, StoreError, StoreResult};
pub use identity::{reconcile_login, ProviderProfile, ReconcileOutcome};
pub use memory::MemoryStore;
pub use models::{Booking, BookingId, BookingStatus, Cabin, CabinId, Guest, GuestId, Settings};
pub use repository::{BookingRepository, GuestRepository};
pub use session::{enrich_session, resolve_guest, Enrichment, Session, SessionUser};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
