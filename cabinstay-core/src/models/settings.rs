use serde::{Deserialize, Serialize};

/// Global booking rules shown on the reservation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub min_booking_length: i64,
    pub max_booking_length: i64,
    pub max_guests_per_booking: i64,
    pub breakfast_price: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_booking_length: 1,
            max_booking_length: 90,
            max_guests_per_booking: 8,
            breakfast_price: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_json_uses_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["minBookingLength"], 1);
        assert_eq!(json["maxGuestsPerBooking"], 8);
    }
}
