//! Dispenser DTOs

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Billing, Dispenser, TapState, TapStatus, UsageSession};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDispenserRequest {
    /// Liters per second
    #[serde(alias = "flow_volume")]
    #[validate(range(exclusive_min = 0.0, message = "flowRate must be greater than 0"))]
    #[schema(example = 0.0653)]
    pub flow_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispenserResponse {
    pub id: i32,
    pub flow_rate: f64,
}

impl From<Dispenser> for DispenserResponse {
    fn from(d: Dispenser) -> Self {
        Self {
            id: d.id,
            flow_rate: d.flow_rate,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeStatusRequest {
    #[schema(value_type = String, example = "open")]
    pub status: TapStatus,
    /// RFC 3339, or a zone-less date-time read as UTC
    #[serde(alias = "updated_at", deserialize_with = "deserialize_timestamp")]
    #[schema(value_type = String, example = "2022-01-01T02:00:00Z")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangedResponse {
    pub message: String,
}

impl StatusChangedResponse {
    pub fn accepted() -> Self {
        Self {
            message: "Status of the tap changed correctly".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpendingDto {
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub flow_rate: f64,
    #[schema(value_type = String, example = "12.25")]
    pub amount_owed: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpendingResponse {
    #[schema(value_type = String, example = "102.165")]
    pub total_amount: Decimal,
    pub sessions: Vec<SessionSpendingDto>,
}

impl SpendingResponse {
    pub fn from_billing(dispenser: &Dispenser, billing: Billing) -> Self {
        Self {
            total_amount: billing.total,
            sessions: billing
                .sessions
                .into_iter()
                .map(|s| session_dto(dispenser.flow_rate, s))
                .collect(),
        }
    }
}

fn session_dto(flow_rate: f64, s: UsageSession) -> SessionSpendingDto {
    SessionSpendingDto {
        opened_at: s.opened_at,
        closed_at: s.closed_at,
        flow_rate,
        amount_owed: s.total_spent.unwrap_or_default(),
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispenserStateResponse {
    pub id: i32,
    pub flow_rate: f64,
    /// Total as of the last recompute, absent before the first transition
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    #[schema(value_type = String, example = "idle")]
    pub state: TapState,
}

impl DispenserStateResponse {
    pub fn new(d: Dispenser, state: TapState) -> Self {
        Self {
            id: d.id,
            flow_rate: d.flow_rate,
            amount: d.amount,
            state,
        }
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an RFC 3339 timestamp, falling back to zone-less forms taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}'", raw))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
