//! Wire types shared between the HTTP server and its clients.
//!
//! All JSON fields are camelCase. Monetary fields carry minor units
//! (paise) as integers; `50000` is ₹500.00.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Car,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Waiting,
    InProgress,
    Completed,
    Delivered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Split,
}

pub mod customer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerNew {
        pub name: String,
        pub phone: String,
        pub email: Option<String>,
        pub address: Option<String>,
    }

    /// Partial update; absent fields are left untouched, `null` clears an
    /// optional field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerPatch {
        pub name: Option<String>,
        pub phone: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_option")]
        pub email: Option<Option<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_option")]
        pub address: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerView {
        pub id: i32,
        pub name: String,
        pub phone: String,
        pub email: Option<String>,
        pub address: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod vehicle {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VehicleNew {
        pub customer_id: i32,
        pub vehicle_type: VehicleType,
        pub make: String,
        pub model: Option<String>,
        pub vehicle_number: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VehiclePatch {
        pub vehicle_type: Option<VehicleType>,
        pub make: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_option")]
        pub model: Option<Option<String>>,
        pub vehicle_number: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VehicleView {
        pub id: i32,
        pub customer_id: i32,
        pub vehicle_type: VehicleType,
        pub make: String,
        pub model: Option<String>,
        pub vehicle_number: String,
        pub created_at: DateTime<Utc>,
    }

    /// A vehicle joined with its owner, as listed on the vehicles page.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VehicleWithOwnerView {
        #[serde(flatten)]
        pub vehicle: VehicleView,
        pub customer: super::customer::CustomerView,
    }
}

pub mod service_entry {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceEntryNew {
        pub vehicle_id: i32,
        pub complaint: Option<String>,
        pub status: Option<ServiceStatus>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceEntryPatch {
        pub status: Option<ServiceStatus>,
        pub complaint: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceEntryView {
        pub id: i32,
        pub vehicle_id: i32,
        pub entry_date: DateTime<Utc>,
        pub complaint: Option<String>,
        pub status: ServiceStatus,
        pub total_amount: i64,
        pub is_paid: bool,
        pub payment_method: Option<PaymentMethod>,
        pub notes: Option<String>,
        pub completed_at: Option<DateTime<Utc>>,
    }

    /// An entry joined with its vehicle, owner and billed items.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceEntryDetailsView {
        #[serde(flatten)]
        pub entry: ServiceEntryView,
        pub vehicle: super::vehicle::VehicleView,
        pub customer: super::customer::CustomerView,
        pub items: Vec<super::service_item::ServiceItemView>,
    }
}

pub mod service_item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceItemNew {
        pub service_entry_id: i32,
        pub product_id: Option<i32>,
        pub product_name: String,
        pub quantity: i64,
        pub price: i64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceItemPatch {
        pub product_name: Option<String>,
        pub quantity: Option<i64>,
        pub price: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_option")]
        pub notes: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceItemView {
        pub id: i32,
        pub service_entry_id: i32,
        pub product_id: Option<i32>,
        pub product_name: String,
        pub quantity: i64,
        pub price: i64,
        pub notes: Option<String>,
    }

    /// Response for item mutations: the item plus the parent entry's
    /// recomputed total.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceItemWithTotal {
        #[serde(flatten)]
        pub item: ServiceItemView,
        pub entry_total: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryTotal {
        pub entry_total: i64,
    }
}

pub mod product {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ProductKind {
        Product,
        Service,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductNew {
        pub name: String,
        pub description: Option<String>,
        #[serde(rename = "type")]
        pub kind: ProductKind,
        pub price: i64,
        pub in_stock: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductPatch {
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_option")]
        pub description: Option<Option<String>>,
        pub price: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_option")]
        pub in_stock: Option<Option<i32>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductView {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        #[serde(rename = "type")]
        pub kind: ProductKind,
        pub price: i64,
        pub in_stock: Option<i32>,
    }
}

pub mod pre_order {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PreOrderStatus {
        Pending,
        Delivered,
        Cancelled,
        Refunded,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PreOrderNew {
        pub item_name: String,
        pub advance_amount: i64,
        pub customer_name: String,
        pub contact_number: String,
        pub expected_delivery_date: Option<DateTime<Utc>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PreOrderStatusPatch {
        pub status: PreOrderStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PreOrderView {
        pub id: i32,
        pub item_name: String,
        pub advance_amount: i64,
        pub customer_name: String,
        pub contact_number: String,
        pub expected_delivery_date: Option<DateTime<Utc>>,
        pub delivered_date: Option<DateTime<Utc>>,
        pub refunded_date: Option<DateTime<Utc>>,
        pub status: PreOrderStatus,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod intake {
    use super::*;

    /// Request body of the combined vehicle-entry intake form.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IntakeNew {
        pub vehicle_type: VehicleType,
        pub make: String,
        pub model: Option<String>,
        pub customer_name: String,
        pub customer_phone: Option<String>,
        pub customer_email: Option<String>,
        pub status: Option<ServiceStatus>,
    }
}

pub mod billing {
    use super::*;

    /// One submitted bill line; `id` present means "this stored item",
    /// absent means "insert".
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BillingItem {
        pub id: Option<i32>,
        pub product_id: Option<i32>,
        pub product_name: String,
        pub quantity: i64,
        pub price: i64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SplitPayments {
        pub cash: i64,
        pub upi: i64,
        pub card: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BillingSubmit {
        pub service_entry_id: i32,
        pub items: Vec<BillingItem>,
        #[serde(default)]
        pub discount: i64,
        pub payment_method: Option<PaymentMethod>,
        pub split_payments: Option<SplitPayments>,
        pub notes: Option<String>,
        #[serde(default)]
        pub mark_as_complete: bool,
    }
}

pub mod stats {
    use super::*;

    /// Dashboard rollup for one day.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyStats {
        pub vehicle_count: u64,
        pub active_jobs: u64,
        pub total_revenue: i64,
        pub pending_payments: i64,
    }
}

/// Serde helper distinguishing an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
