//! Pre-orders: items reserved with an advance, independent of any service
//! entry or vehicle.
//!
//! Small state machine: `pending -> delivered | cancelled | refunded`. The
//! three non-pending states are terminal.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreOrderStatus {
    Pending,
    Delivered,
    Cancelled,
    Refunded,
}

impl PreOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validates a transition; only `pending` may move, and only to a
    /// terminal state.
    pub fn transition_to(self, next: PreOrderStatus) -> ResultEngine<()> {
        if self.is_terminal() {
            return Err(EngineError::InvalidTransition(format!(
                "pre-order already {}",
                self.as_str()
            )));
        }
        if !next.is_terminal() {
            return Err(EngineError::InvalidTransition(format!(
                "cannot move a pre-order back to {}",
                next.as_str()
            )));
        }
        Ok(())
    }
}

impl TryFrom<&str> for PreOrderStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(EngineError::Validation(format!(
                "invalid pre-order status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreOrder {
    pub id: i32,
    pub item_name: String,
    pub advance_amount: Money,
    pub customer_name: String,
    pub contact_number: String,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub refunded_date: Option<DateTime<Utc>>,
    pub status: PreOrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a pre-order; it always starts `pending`.
#[derive(Clone, Debug)]
pub struct NewPreOrder {
    pub item_name: String,
    pub advance_amount: Money,
    pub customer_name: String,
    pub contact_number: String,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl NewPreOrder {
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.item_name.trim().is_empty() {
            return Err(EngineError::Validation("item name is required".to_string()));
        }
        if self.customer_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "customer name is required".to_string(),
            ));
        }
        if self.contact_number.trim().is_empty() {
            return Err(EngineError::Validation(
                "contact number is required".to_string(),
            ));
        }
        if self.advance_amount.is_negative() {
            return Err(EngineError::Validation(
                "advance amount cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            item_name: ActiveValue::Set(self.item_name),
            advance_amount: ActiveValue::Set(self.advance_amount.minor()),
            customer_name: ActiveValue::Set(self.customer_name),
            contact_number: ActiveValue::Set(self.contact_number),
            expected_delivery_date: ActiveValue::Set(self.expected_delivery_date),
            delivered_date: ActiveValue::Set(None),
            refunded_date: ActiveValue::Set(None),
            status: ActiveValue::Set(PreOrderStatus::Pending.as_str().to_string()),
            notes: ActiveValue::Set(self.notes),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pre_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_name: String,
    pub advance_amount: i64,
    pub customer_name: String,
    pub contact_number: String,
    pub expected_delivery_date: Option<DateTimeUtc>,
    pub delivered_date: Option<DateTimeUtc>,
    pub refunded_date: Option<DateTimeUtc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PreOrder {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            item_name: model.item_name,
            advance_amount: Money::new(model.advance_amount),
            customer_name: model.customer_name,
            contact_number: model.contact_number,
            expected_delivery_date: model.expected_delivery_date,
            delivered_date: model.delivered_date,
            refunded_date: model.refunded_date,
            status: PreOrderStatus::try_from(model.status.as_str())?,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
