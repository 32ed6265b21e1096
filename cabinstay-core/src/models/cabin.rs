use serde::{Deserialize, Serialize};

pub type CabinId = i64;

/// A bookable cabin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cabin {
    pub id: CabinId,
    pub name: String,
    pub max_capacity: i64,
    pub regular_price: f64,
    pub discount: f64,
    pub description: String,
    pub image: Option<String>,
}
