//! Line items billed against a service entry.
//!
//! An item may reference a catalog product (`product_id`) but always carries
//! its own `product_name` and `price` snapshot, so editing the catalog later
//! never rewrites past bills and ad-hoc items need no catalog row at all.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceItem {
    pub id: i32,
    pub service_entry_id: i32,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i64,
    /// Price at the time of billing, not the live catalog price.
    pub price: Money,
    pub notes: Option<String>,
}

impl ServiceItem {
    /// The line amount: `price * quantity`.
    pub fn amount(&self) -> ResultEngine<Money> {
        self.price
            .checked_mul(self.quantity)
            .ok_or_else(|| EngineError::Validation("line amount overflow".to_string()))
    }
}

/// Fields for creating a line item; the id is assigned on insert.
#[derive(Clone, Debug)]
pub struct NewServiceItem {
    pub service_entry_id: i32,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub notes: Option<String>,
}

impl NewServiceItem {
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.product_name.trim().is_empty() {
            return Err(EngineError::Validation("item name is required".to_string()));
        }
        if self.quantity < 1 {
            return Err(EngineError::Validation(format!(
                "quantity must be >= 1, got {}",
                self.quantity
            )));
        }
        if self.price.is_negative() {
            return Err(EngineError::Validation(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        Ok(())
    }

    pub(crate) fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            service_entry_id: ActiveValue::Set(self.service_entry_id),
            product_id: ActiveValue::Set(self.product_id),
            product_name: ActiveValue::Set(self.product_name),
            quantity: ActiveValue::Set(self.quantity),
            price: ActiveValue::Set(self.price.minor()),
            notes: ActiveValue::Set(self.notes),
        }
    }
}

/// Partial update for an existing line item.
#[derive(Clone, Debug, Default)]
pub struct ServiceItemUpdate {
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
    pub notes: Option<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_entry_id: i32,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i64,
    pub price: i64,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_entries::Entity",
        from = "Column::ServiceEntryId",
        to = "super::service_entries::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ServiceEntries,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Products,
}

impl Related<super::service_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceEntries.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceItem {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            service_entry_id: model.service_entry_id,
            product_id: model.product_id,
            product_name: model.product_name,
            quantity: model.quantity,
            price: Money::new(model.price),
            notes: model.notes,
        }
    }
}
