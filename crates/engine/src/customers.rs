//! Customer records.
//!
//! A customer is created on first intake and never deleted. The phone number
//! is the natural dedup key: intake reuses an existing customer with the same
//! phone instead of creating a duplicate.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

/// Sentinel stored when intake is given no phone number.
pub const PHONE_NOT_PROVIDED: &str = "not provided";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a customer; id and timestamp are assigned on insert.
#[derive(Clone, Debug, Default)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewCustomer {
    pub(crate) fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(self.name),
            phone: ActiveValue::Set(self.phone),
            email: ActiveValue::Set(self.email),
            address: ActiveValue::Set(self.address),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

/// Partial update for a customer record.
///
/// The inner `Option` on `email`/`address` distinguishes "leave as is"
/// (outer `None`) from "clear the field" (`Some(None)`).
#[derive(Clone, Debug, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicles::Entity")]
    Vehicles,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            created_at: model.created_at,
        }
    }
}
