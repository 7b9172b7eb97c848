//! The product/service catalog.
//!
//! A static list of sellable items with list prices, seeded at startup and
//! updatable afterwards. Selling a product does not decrement `in_stock`;
//! the stock figure is informational only.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Product,
    Service,
}

impl ProductKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Service => "service",
        }
    }
}

impl TryFrom<&str> for ProductKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "product" => Ok(Self::Product),
            "service" => Ok(Self::Service),
            other => Err(EngineError::Validation(format!(
                "invalid product kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub kind: ProductKind,
    pub price: Money,
    /// Units on hand; only meaningful for `kind = Product`.
    pub in_stock: Option<i32>,
}

/// Fields for creating a catalog entry; the id is assigned on insert.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub kind: ProductKind,
    pub price: Money,
    pub in_stock: Option<i32>,
}

impl NewProduct {
    pub(crate) fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(self.name),
            description: ActiveValue::Set(self.description),
            kind: ActiveValue::Set(self.kind.as_str().to_string()),
            price: ActiveValue::Set(self.price.minor()),
            in_stock: ActiveValue::Set(self.in_stock),
        }
    }
}

/// Partial update for a catalog entry.
#[derive(Clone, Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Money>,
    pub in_stock: Option<Option<i32>>,
}

/// The catalog seeded into an empty database at startup.
pub(crate) fn default_catalog() -> Vec<NewProduct> {
    let service = |name: &str, description: &str, price: i64| NewProduct {
        name: name.to_string(),
        description: Some(description.to_string()),
        kind: ProductKind::Service,
        price: Money::new(price),
        in_stock: None,
    };
    let product = |name: &str, description: &str, price: i64, stock: i32| NewProduct {
        name: name.to_string(),
        description: Some(description.to_string()),
        kind: ProductKind::Product,
        price: Money::new(price),
        in_stock: Some(stock),
    };

    vec![
        service("Oil Change Service", "Engine oil + labor", 50_000),
        product("Air Filter", "New air filter element", 25_000, 10),
        service("Brake Adjustment", "Labor only", 10_000),
        service("Engine Tuning", "Basic engine tune-up service", 60_000),
        service("Wheel Alignment", "Full wheel alignment", 80_000),
        product("Brake Pads (Front)", "Set of front brake pads", 45_000, 5),
        product("Brake Pads (Rear)", "Set of rear brake pads", 40_000, 5),
        product("Clutch Plates", "Clutch plate set", 120_000, 3),
        product("Battery", "12V battery", 150_000, 4),
        product("Spark Plugs", "Set of spark plugs", 35_000, 20),
    ]
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub price: i64,
    pub in_stock: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_items::Entity")]
    ServiceItems,
}

impl Related<super::service_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Product {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            description: model.description,
            kind: ProductKind::try_from(model.kind.as_str())?,
            price: Money::new(model.price),
            in_stock: model.in_stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_ten_entries() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 10);
        assert!(
            catalog
                .iter()
                .filter(|p| matches!(p.kind, ProductKind::Product))
                .all(|p| p.in_stock.is_some())
        );
        assert!(
            catalog
                .iter()
                .filter(|p| matches!(p.kind, ProductKind::Service))
                .all(|p| p.in_stock.is_none())
        );
    }
}
