//! Service entries: one workshop visit for a vehicle, from intake to
//! delivery.
//!
//! `total_amount` is a derived cache: after any line-item mutation it equals
//! the pre-discount sum of `price * quantity` over the entry's items, and the
//! billing-completion path is the only one allowed to write a discounted
//! figure. Status moves strictly forward through
//! `waiting -> in_progress -> completed -> delivered`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Waiting,
    InProgress,
    Completed,
    Delivered,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delivered => "delivered",
        }
    }

    /// Position in the lifecycle; transitions may only increase it.
    const fn rank(self) -> u8 {
        match self {
            Self::Waiting => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Delivered => 3,
        }
    }

    /// Returns `true` when moving from `self` to `next` goes forward (or
    /// stays put). Backward transitions are rejected by the engine.
    #[must_use]
    pub const fn allows(self, next: ServiceStatus) -> bool {
        self.rank() <= next.rank()
    }

    /// Active entries are those still being worked on.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::InProgress)
    }
}

impl TryFrom<&str> for ServiceStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "waiting" => Ok(Self::Waiting),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "delivered" => Ok(Self::Delivered),
            other => Err(EngineError::Validation(format!(
                "invalid service status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Split,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Split => "split",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "split" => Ok(Self::Split),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEntry {
    pub id: i32,
    pub vehicle_id: i32,
    pub entry_date: DateTime<Utc>,
    pub complaint: Option<String>,
    pub status: ServiceStatus,
    pub total_amount: Money,
    pub is_paid: bool,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A service entry joined with its vehicle, owner and line items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEntryDetails {
    pub entry: ServiceEntry,
    pub vehicle: super::vehicles::Vehicle,
    pub customer: super::customers::Customer,
    pub items: Vec<super::service_items::ServiceItem>,
}

/// Fields for creating a service entry; everything else starts at its
/// intake defaults (total 0, unpaid, entry date now).
#[derive(Clone, Debug)]
pub struct NewServiceEntry {
    pub vehicle_id: i32,
    pub complaint: Option<String>,
    pub status: ServiceStatus,
}

impl NewServiceEntry {
    pub(crate) fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            vehicle_id: ActiveValue::Set(self.vehicle_id),
            entry_date: ActiveValue::Set(Utc::now()),
            complaint: ActiveValue::Set(self.complaint),
            status: ActiveValue::Set(self.status.as_str().to_string()),
            total_amount: ActiveValue::Set(0),
            is_paid: ActiveValue::Set(false),
            payment_method: ActiveValue::Set(None),
            notes: ActiveValue::Set(None),
            completed_at: ActiveValue::Set(None),
        }
    }
}

/// Partial update applied by the manual PATCH path.
///
/// Status changes here are still subject to the forward-only rule; billing
/// completion is the only way to set payment fields.
#[derive(Clone, Debug, Default)]
pub struct ServiceEntryUpdate {
    pub status: Option<ServiceStatus>,
    pub complaint: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub vehicle_id: i32,
    pub entry_date: DateTimeUtc,
    pub complaint: Option<String>,
    pub status: String,
    pub total_amount: i64,
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vehicles,
    #[sea_orm(has_many = "super::service_items::Entity")]
    ServiceItems,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::service_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ServiceEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            entry_date: model.entry_date,
            complaint: model.complaint,
            status: ServiceStatus::try_from(model.status.as_str())?,
            total_amount: Money::new(model.total_amount),
            is_paid: model.is_paid,
            payment_method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            notes: model.notes,
            completed_at: model.completed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_forward_only() {
        use ServiceStatus::*;

        assert!(Waiting.allows(InProgress));
        assert!(InProgress.allows(Completed));
        assert!(Completed.allows(Delivered));
        assert!(Waiting.allows(Completed));
        assert!(InProgress.allows(InProgress));

        assert!(!Completed.allows(Waiting));
        assert!(!Delivered.allows(Completed));
        assert!(!InProgress.allows(Waiting));
    }

    #[test]
    fn active_statuses() {
        assert!(ServiceStatus::Waiting.is_active());
        assert!(ServiceStatus::InProgress.is_active());
        assert!(!ServiceStatus::Completed.is_active());
        assert!(!ServiceStatus::Delivered.is_active());
    }

    #[test]
    fn status_round_trips() {
        for status in [
            ServiceStatus::Waiting,
            ServiceStatus::InProgress,
            ServiceStatus::Completed,
            ServiceStatus::Delivered,
        ] {
            assert_eq!(ServiceStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(ServiceStatus::try_from("done").is_err());
    }
}
