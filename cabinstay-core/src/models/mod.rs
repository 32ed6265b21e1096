mod booking;
mod booking_status;
mod cabin;
mod guest;
mod settings;

pub use booking::{Booking, BookingId};
pub use booking_status::BookingStatus;
pub use cabin::{Cabin, CabinId};
pub use guest::{Guest, GuestId};
pub use settings::Settings;
