use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{City, Purchase};

/// Both fields are optional on the wire so a missing one yields a 400 with a clear message.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub city: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalCost {
    pub total_cost: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PurchaseList {
    #[schema(value_type = Vec<Purchase>)]
    pub items: Vec<Purchase>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CityList {
    #[schema(value_type = Vec<City>)]
    pub items: Vec<City>,
}
