//! Service items API endpoints
//!
//! Every mutation answers with the parent entry's recomputed total so the
//! billing screen never shows a stale figure.

use api_types::service_item::{
    EntryTotal, ServiceItemNew, ServiceItemPatch, ServiceItemView, ServiceItemWithTotal,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;

use crate::{ServerError, server::ServerState};

pub(crate) fn item_view(item: engine::ServiceItem) -> ServiceItemView {
    ServiceItemView {
        id: item.id,
        service_entry_id: item.service_entry_id,
        product_id: item.product_id,
        product_name: item.product_name,
        quantity: item.quantity,
        price: item.price.minor(),
        notes: item.notes,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceItemNew>,
) -> Result<(StatusCode, Json<ServiceItemWithTotal>), ServerError> {
    let (item, total) = state
        .engine
        .add_item(engine::NewServiceItem {
            service_entry_id: payload.service_entry_id,
            product_id: payload.product_id,
            product_name: payload.product_name,
            quantity: payload.quantity,
            price: Money::new(payload.price),
            notes: payload.notes,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ServiceItemWithTotal {
            item: item_view(item),
            entry_total: total.minor(),
        }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ServiceItemPatch>,
) -> Result<Json<ServiceItemWithTotal>, ServerError> {
    let (item, total) = state
        .engine
        .update_item(
            id,
            engine::ServiceItemUpdate {
                product_name: payload.product_name,
                quantity: payload.quantity,
                price: payload.price.map(Money::new),
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(ServiceItemWithTotal {
        item: item_view(item),
        entry_total: total.minor(),
    }))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryTotal>, ServerError> {
    let total = state.engine.remove_item(id).await?;
    Ok(Json(EntryTotal {
        entry_total: total.minor(),
    }))
}
