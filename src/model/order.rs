use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use crate::model::UserId;

/// Minimum description length, in characters.
pub const MIN_DESCRIPTION: usize = 5;
/// Maximum description length, in characters.
pub const MAX_DESCRIPTION: usize = 1000;
/// Maximum delivery-instructions length, in characters.
pub const MAX_INSTRUCTIONS: usize = 500;

/// Type-safe identifier for orders. Assigned by the store on insert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of an order.
///
/// Transitions are monotonic along two paths:
/// `Pending -> InProgress -> Completed` and `Pending -> Cancelled`.
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transition is legal from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns true if `self -> target` is one of the legal transitions.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, InProgress) | (Pending, Cancelled) | (InProgress, Completed)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "InProgress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

/// The fixed set of delivery zones served by the system.
///
/// Each zone carries a flat delivery fee in kwacha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryZone {
    Town,
    Market,
    Campus,
    Mall,
}

impl DeliveryZone {
    /// All zones, in display order.
    pub const ALL: [DeliveryZone; 4] = [
        DeliveryZone::Town,
        DeliveryZone::Market,
        DeliveryZone::Campus,
        DeliveryZone::Mall,
    ];

    /// Flat delivery fee for this zone, in kwacha.
    pub fn fee(self) -> u32 {
        match self {
            DeliveryZone::Town => 15,
            DeliveryZone::Market => 20,
            DeliveryZone::Campus => 25,
            DeliveryZone::Mall => 30,
        }
    }
}

impl Display for DeliveryZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryZone::Town => "Town",
            DeliveryZone::Market => "Market",
            DeliveryZone::Campus => "Campus",
            DeliveryZone::Mall => "Mall",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DeliveryZone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "town" => Ok(DeliveryZone::Town),
            "market" => Ok(DeliveryZone::Market),
            "campus" => Ok(DeliveryZone::Campus),
            "mall" => Ok(DeliveryZone::Mall),
            _ => Err(ValidationError::Zone(s.trim().to_string())),
        }
    }
}

/// Validation failures for order drafts. Each variant names the offending field.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// Description outside the 5..=1000 character range.
    #[error("description must be {MIN_DESCRIPTION}-{MAX_DESCRIPTION} characters, got {0}")]
    Description(usize),

    /// Location missing or not one of the known delivery zones.
    #[error("unknown delivery zone: {0:?}")]
    Zone(String),

    /// Estimated time missing or not a parseable time of day.
    #[error("estimated time must be a time of day (HH:MM), got {0:?}")]
    Time(String),

    /// Delivery instructions longer than 500 characters.
    #[error("delivery instructions must be at most {MAX_INSTRUCTIONS} characters, got {0}")]
    Instructions(usize),
}

/// A delivery request as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// User who created the order. Immutable after insert.
    pub owner: UserId,
    pub description: String,
    pub zone: DeliveryZone,
    /// Time of day the user needs the delivery, not when it was placed.
    pub estimated_time: NaiveTime,
    pub instructions: Option<String>,
    pub status: OrderStatus,
    /// Stamped once at creation. Immutable after insert.
    pub created_at: DateTime<Utc>,
}

/// Raw form input for a new order, exactly as submitted.
///
/// Validate with [`OrderDraft::validate`] to obtain a [`NewOrder`] the store
/// will accept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub description: String,
    /// Delivery zone name, matched case-insensitively against [`DeliveryZone`].
    pub location: String,
    /// Desired time of day, `HH:MM` (seconds accepted).
    pub estimated_time: String,
    pub instructions: Option<String>,
}

/// A validated order ready for insertion. The store assigns the id and
/// stamps the initial `Pending` status.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner: UserId,
    pub description: String,
    pub zone: DeliveryZone,
    pub estimated_time: NaiveTime,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Validates the draft and binds it to its owner and creation time.
    ///
    /// Character counts are measured after trimming surrounding whitespace.
    pub fn validate(
        self,
        owner: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<NewOrder, ValidationError> {
        let description = self.description.trim().to_string();
        let len = description.chars().count();
        if !(MIN_DESCRIPTION..=MAX_DESCRIPTION).contains(&len) {
            return Err(ValidationError::Description(len));
        }

        let zone: DeliveryZone = self.location.parse()?;

        let time_input = self.estimated_time.trim();
        let estimated_time = NaiveTime::parse_from_str(time_input, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time_input, "%H:%M:%S"))
            .map_err(|_| ValidationError::Time(time_input.to_string()))?;

        let instructions = match self.instructions {
            Some(raw) => {
                let trimmed = raw.trim();
                let len = trimmed.chars().count();
                if len > MAX_INSTRUCTIONS {
                    return Err(ValidationError::Instructions(len));
                }
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            None => None,
        };

        Ok(NewOrder {
            owner,
            description,
            zone,
            estimated_time,
            instructions,
            created_at,
        })
    }
}
