//! User domain model
//!
//! The backend reports balances in yoctoNEAR as decimal strings. For display
//! they are shown as "points": NEAR rounded to four fractional digits, times
//! one thousand.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::result::{Error, Result};

/// yoctoNEAR per NEAR (10^24)
const YOCTO_PER_NEAR_EXP: u32 = 24;

/// Fractional NEAR digits kept before scaling to points
const DISPLAY_FRAC_DIGITS: u32 = 4;

/// Points per NEAR
const POINTS_PER_NEAR: u128 = 1000;

/// A NEAR amount in yoctoNEAR
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct NearAmount(u128);

impl NearAmount {
    pub fn from_yocto(yocto: u128) -> Self {
        Self(yocto)
    }

    pub fn yocto(&self) -> u128 {
        self.0
    }

    /// Display value in points, e.g. `1.2` for 0.0012 NEAR
    pub fn format_points(&self) -> String {
        let drop_exp = YOCTO_PER_NEAR_EXP - DISPLAY_FRAC_DIGITS;
        let unit = 10u128.pow(drop_exp);
        // Round half up at the last kept digit
        let half = 5 * 10u128.pow(drop_exp - 1);
        let kept = self.0 / unit + u128::from(self.0 % unit >= half);

        // kept is in 10^-4 NEAR; points = NEAR * 1000, so scale 4 - 3 = 1
        let points_scale = DISPLAY_FRAC_DIGITS - POINTS_PER_NEAR.ilog10();
        i128::try_from(kept)
            .ok()
            .and_then(|k| Decimal::try_from_i128_with_scale(k, points_scale).ok())
            .map(|d| d.normalize().to_string())
            .unwrap_or_else(|| format!("{}", kept / 10))
    }
}

impl FromStr for NearAmount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(format!("Invalid yoctoNEAR amount: '{}'", s)));
        }
        trimmed
            .parse::<u128>()
            .map(Self)
            .map_err(|_| Error::validation(format!("yoctoNEAR amount out of range: '{}'", s)))
    }
}

impl fmt::Display for NearAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NearAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for NearAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: Error| D::Error::custom(e.to_string()))
    }
}

/// `GET /user/me` response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub balance: JsonBalance,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonBalance {
    pub pending: String,
    pub available: String,
    #[serde(default)]
    pub total: Option<String>,
}

/// Represents the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar: String,
    pub pending_balance: NearAmount,
    pub available_balance: NearAmount,
}

impl User {
    /// Build a user from the backend representation, validating balances
    pub fn from_json(json: JsonUser) -> Result<Self> {
        Ok(Self {
            pending_balance: json.balance.pending.parse()?,
            available_balance: json.balance.available.parse()?,
            id: json.id,
            email: json.email,
            name: json.name,
            avatar: json.avatar_url,
        })
    }

    pub fn formatted_pending_balance(&self) -> String {
        self.pending_balance.format_points()
    }

    pub fn formatted_available_balance(&self) -> String {
        self.available_balance.format_points()
    }
}

impl TryFrom<JsonUser> for User {
    type Error = Error;

    fn try_from(json: JsonUser) -> Result<Self> {
        Self::from_json(json)
    }
}
