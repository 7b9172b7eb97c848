//! Vehicle records.
//!
//! A vehicle belongs to exactly one customer and is reused across service
//! entries over its lifetime. `vehicle_number` is intended unique per real
//! vehicle; intake auto-generates one when the user supplies none, so
//! uniqueness is best-effort rather than guaranteed.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Car,
    Other,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Car => "car",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for VehicleType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bike" => Ok(Self::Bike),
            "car" => Ok(Self::Car),
            "other" => Ok(Self::Other),
            other => Err(EngineError::Validation(format!(
                "invalid vehicle type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub id: i32,
    pub customer_id: i32,
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: Option<String>,
    pub vehicle_number: String,
    pub created_at: DateTime<Utc>,
}

/// A vehicle joined with its owning customer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VehicleWithOwner {
    pub vehicle: Vehicle,
    pub customer: super::customers::Customer,
}

/// Fields for creating a vehicle; id and timestamp are assigned on insert.
#[derive(Clone, Debug)]
pub struct NewVehicle {
    pub customer_id: i32,
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: Option<String>,
    pub vehicle_number: String,
}

impl NewVehicle {
    pub(crate) fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            customer_id: ActiveValue::Set(self.customer_id),
            vehicle_type: ActiveValue::Set(self.vehicle_type.as_str().to_string()),
            make: ActiveValue::Set(self.make),
            model: ActiveValue::Set(self.model),
            vehicle_number: ActiveValue::Set(self.vehicle_number),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

/// Partial update for a vehicle record.
#[derive(Clone, Debug, Default)]
pub struct VehicleUpdate {
    pub vehicle_type: Option<VehicleType>,
    pub make: Option<String>,
    pub model: Option<Option<String>>,
    pub vehicle_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    pub vehicle_type: String,
    pub make: String,
    pub model: Option<String>,
    pub vehicle_number: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Customers,
    #[sea_orm(has_many = "super::service_entries::Entity")]
    ServiceEntries,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::service_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Vehicle {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            customer_id: model.customer_id,
            vehicle_type: VehicleType::try_from(model.vehicle_type.as_str())?,
            make: model.make,
            model: model.model,
            vehicle_number: model.vehicle_number,
            created_at: model.created_at,
        })
    }
}
