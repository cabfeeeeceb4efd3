//! Static per-city shipping tables for certificate delivery.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShippingCity {
    Almaty,
    Astana,
    Shymkent,
    Karaganda,
    Aktobe,
    Pavlodar,
    Semey,
    Atyrau,
    Uralsk,
    Kostanay,
    Kokshetau,
    Taraz,
    Kyzylorda,
    Aktau,
}

/// Cost in KZT and delivery time in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRate {
    pub cost: i64,
    pub delivery_days: i32,
}

impl ShippingCity {
    pub const ALL: [ShippingCity; 14] = [
        ShippingCity::Almaty,
        ShippingCity::Astana,
        ShippingCity::Shymkent,
        ShippingCity::Karaganda,
        ShippingCity::Aktobe,
        ShippingCity::Pavlodar,
        ShippingCity::Semey,
        ShippingCity::Atyrau,
        ShippingCity::Uralsk,
        ShippingCity::Kostanay,
        ShippingCity::Kokshetau,
        ShippingCity::Taraz,
        ShippingCity::Kyzylorda,
        ShippingCity::Aktau,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ShippingCity::Almaty => "almaty",
            ShippingCity::Astana => "astana",
            ShippingCity::Shymkent => "shymkent",
            ShippingCity::Karaganda => "karaganda",
            ShippingCity::Aktobe => "aktobe",
            ShippingCity::Pavlodar => "pavlodar",
            ShippingCity::Semey => "semey",
            ShippingCity::Atyrau => "atyrau",
            ShippingCity::Uralsk => "uralsk",
            ShippingCity::Kostanay => "kostanay",
            ShippingCity::Kokshetau => "kokshetau",
            ShippingCity::Taraz => "taraz",
            ShippingCity::Kyzylorda => "kyzylorda",
            ShippingCity::Aktau => "aktau",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShippingCity::Almaty => "Almaty",
            ShippingCity::Astana => "Astana",
            ShippingCity::Shymkent => "Shymkent",
            ShippingCity::Karaganda => "Karaganda",
            ShippingCity::Aktobe => "Aktobe",
            ShippingCity::Pavlodar => "Pavlodar",
            ShippingCity::Semey => "Semey",
            ShippingCity::Atyrau => "Atyrau",
            ShippingCity::Uralsk => "Uralsk",
            ShippingCity::Kostanay => "Kostanay",
            ShippingCity::Kokshetau => "Kokshetau",
            ShippingCity::Taraz => "Taraz",
            ShippingCity::Kyzylorda => "Kyzylorda",
            ShippingCity::Aktau => "Aktau",
        }
    }

    pub fn rate(self) -> ShippingRate {
        let (cost, delivery_days) = match self {
            ShippingCity::Almaty => (2000, 1),
            ShippingCity::Astana => (3500, 3),
            ShippingCity::Shymkent => (2200, 2),
            ShippingCity::Karaganda => (2300, 3),
            ShippingCity::Aktobe => (2400, 5),
            ShippingCity::Pavlodar => (2300, 5),
            ShippingCity::Semey => (2400, 4),
            ShippingCity::Atyrau => (2600, 5),
            ShippingCity::Uralsk => (2500, 6),
            ShippingCity::Kostanay => (2100, 3),
            ShippingCity::Kokshetau => (2150, 3),
            ShippingCity::Taraz => (2050, 2),
            ShippingCity::Kyzylorda => (2250, 2),
            ShippingCity::Aktau => (2450, 7),
        };
        ShippingRate {
            cost,
            delivery_days,
        }
    }

    pub fn cost(self) -> Decimal {
        Decimal::from(self.rate().cost)
    }

    pub fn delivery_days(self) -> i32 {
        self.rate().delivery_days
    }
}

impl fmt::Display for ShippingCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCity(pub String);

impl fmt::Display for UnknownCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown city '{}'", self.0)
    }
}

impl FromStr for ShippingCity {
    type Err = UnknownCity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ShippingCity::ALL
            .into_iter()
            .find(|c| c.key() == needle)
            .ok_or_else(|| UnknownCity(s.to_string()))
    }
}

/// Label for a city key as stored on a shipping record; falls back to the raw key.
pub fn city_name(key: &str) -> String {
    key.parse::<ShippingCity>()
        .map(|c| c.name().to_string())
        .unwrap_or_else(|_| key.to_string())
}

/// Days left until delivery: the snapshotted delivery time minus whole days elapsed,
/// never below zero.
pub fn remaining_delivery_days(
    delivery_time: i32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i32 {
    let elapsed = (now - created_at).num_days().max(0);
    let remaining = i64::from(delivery_time) - elapsed;
    remaining.max(0) as i32
}

/// Sum of course prices plus the city's shipping cost.
pub fn total_cost(prices: &[Decimal], city: ShippingCity) -> Decimal {
    prices.iter().copied().sum::<Decimal>() + city.cost()
}
