//! Pre-orders API endpoints

use api_types::pre_order::{
    PreOrderNew, PreOrderStatus as ApiStatus, PreOrderStatusPatch, PreOrderView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;

use crate::{ServerError, server::ServerState};

fn map_status(status: ApiStatus) -> engine::PreOrderStatus {
    match status {
        ApiStatus::Pending => engine::PreOrderStatus::Pending,
        ApiStatus::Delivered => engine::PreOrderStatus::Delivered,
        ApiStatus::Cancelled => engine::PreOrderStatus::Cancelled,
        ApiStatus::Refunded => engine::PreOrderStatus::Refunded,
    }
}

fn map_engine_status(status: engine::PreOrderStatus) -> ApiStatus {
    match status {
        engine::PreOrderStatus::Pending => ApiStatus::Pending,
        engine::PreOrderStatus::Delivered => ApiStatus::Delivered,
        engine::PreOrderStatus::Cancelled => ApiStatus::Cancelled,
        engine::PreOrderStatus::Refunded => ApiStatus::Refunded,
    }
}

fn pre_order_view(order: engine::PreOrder) -> PreOrderView {
    PreOrderView {
        id: order.id,
        item_name: order.item_name,
        advance_amount: order.advance_amount.minor(),
        customer_name: order.customer_name,
        contact_number: order.contact_number,
        expected_delivery_date: order.expected_delivery_date,
        delivered_date: order.delivered_date,
        refunded_date: order.refunded_date,
        status: map_engine_status(order.status),
        notes: order.notes,
        created_at: order.created_at,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<PreOrderView>>, ServerError> {
    let orders = state.engine.pre_orders().await?;
    Ok(Json(orders.into_iter().map(pre_order_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<PreOrderView>, ServerError> {
    let order = state.engine.pre_order(id).await?;
    Ok(Json(pre_order_view(order)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PreOrderNew>,
) -> Result<(StatusCode, Json<PreOrderView>), ServerError> {
    let order = state
        .engine
        .new_pre_order(engine::NewPreOrder {
            item_name: payload.item_name,
            advance_amount: Money::new(payload.advance_amount),
            customer_name: payload.customer_name,
            contact_number: payload.contact_number,
            expected_delivery_date: payload.expected_delivery_date,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(pre_order_view(order))))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<PreOrderStatusPatch>,
) -> Result<Json<PreOrderView>, ServerError> {
    let order = state
        .engine
        .update_pre_order_status(id, map_status(payload.status))
        .await?;
    Ok(Json(pre_order_view(order)))
}
