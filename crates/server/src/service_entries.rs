//! Service entries API endpoints

use api_types::service_entry::{
    ServiceEntryDetailsView, ServiceEntryNew, ServiceEntryPatch, ServiceEntryView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_status(status: api_types::ServiceStatus) -> engine::ServiceStatus {
    match status {
        api_types::ServiceStatus::Waiting => engine::ServiceStatus::Waiting,
        api_types::ServiceStatus::InProgress => engine::ServiceStatus::InProgress,
        api_types::ServiceStatus::Completed => engine::ServiceStatus::Completed,
        api_types::ServiceStatus::Delivered => engine::ServiceStatus::Delivered,
    }
}

fn map_engine_status(status: engine::ServiceStatus) -> api_types::ServiceStatus {
    match status {
        engine::ServiceStatus::Waiting => api_types::ServiceStatus::Waiting,
        engine::ServiceStatus::InProgress => api_types::ServiceStatus::InProgress,
        engine::ServiceStatus::Completed => api_types::ServiceStatus::Completed,
        engine::ServiceStatus::Delivered => api_types::ServiceStatus::Delivered,
    }
}

pub(crate) fn map_payment_method(method: api_types::PaymentMethod) -> engine::PaymentMethod {
    match method {
        api_types::PaymentMethod::Cash => engine::PaymentMethod::Cash,
        api_types::PaymentMethod::Card => engine::PaymentMethod::Card,
        api_types::PaymentMethod::Upi => engine::PaymentMethod::Upi,
        api_types::PaymentMethod::Split => engine::PaymentMethod::Split,
    }
}

fn map_engine_payment_method(method: engine::PaymentMethod) -> api_types::PaymentMethod {
    match method {
        engine::PaymentMethod::Cash => api_types::PaymentMethod::Cash,
        engine::PaymentMethod::Card => api_types::PaymentMethod::Card,
        engine::PaymentMethod::Upi => api_types::PaymentMethod::Upi,
        engine::PaymentMethod::Split => api_types::PaymentMethod::Split,
    }
}

pub(crate) fn entry_view(entry: engine::ServiceEntry) -> ServiceEntryView {
    ServiceEntryView {
        id: entry.id,
        vehicle_id: entry.vehicle_id,
        entry_date: entry.entry_date,
        complaint: entry.complaint,
        status: map_engine_status(entry.status),
        total_amount: entry.total_amount.minor(),
        is_paid: entry.is_paid,
        payment_method: entry.payment_method.map(map_engine_payment_method),
        notes: entry.notes,
        completed_at: entry.completed_at,
    }
}

pub(crate) fn details_view(details: engine::ServiceEntryDetails) -> ServiceEntryDetailsView {
    ServiceEntryDetailsView {
        entry: entry_view(details.entry),
        vehicle: crate::vehicles::vehicle_view(details.vehicle),
        customer: crate::customers::customer_view(details.customer),
        items: details
            .items
            .into_iter()
            .map(crate::service_items::item_view)
            .collect(),
    }
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    date: Option<NaiveDate>,
    status: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EntriesQuery>,
) -> Result<Json<Vec<ServiceEntryView>>, ServerError> {
    let entries = match (query.status.as_deref(), query.date) {
        (Some("active"), _) => state.engine.active_service_entries().await?,
        (Some(other), _) => {
            return Err(ServerError::Generic(format!(
                "unsupported status filter: {other}"
            )));
        }
        (None, Some(date)) => state.engine.service_entries_by_date(date).await?,
        (None, None) => state.engine.service_entries().await?,
    };
    Ok(Json(entries.into_iter().map(entry_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ServiceEntryView>, ServerError> {
    let entry = state.engine.service_entry(id).await?;
    Ok(Json(entry_view(entry)))
}

pub async fn details(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ServiceEntryDetailsView>, ServerError> {
    let details = state.engine.service_entry_details(id).await?;
    Ok(Json(details_view(details)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceEntryNew>,
) -> Result<(StatusCode, Json<ServiceEntryView>), ServerError> {
    let entry = state
        .engine
        .new_service_entry(engine::NewServiceEntry {
            vehicle_id: payload.vehicle_id,
            complaint: payload.complaint,
            status: payload
                .status
                .map(map_status)
                .unwrap_or(engine::ServiceStatus::Waiting),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry_view(entry))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ServiceEntryPatch>,
) -> Result<Json<ServiceEntryView>, ServerError> {
    let entry = state
        .engine
        .update_service_entry(
            id,
            engine::ServiceEntryUpdate {
                status: payload.status.map(map_status),
                complaint: payload.complaint,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(entry_view(entry)))
}

pub async fn items(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<api_types::service_item::ServiceItemView>>, ServerError> {
    state.engine.service_entry(id).await?;
    let items = state.engine.service_items(id).await?;
    Ok(Json(
        items
            .into_iter()
            .map(crate::service_items::item_view)
            .collect(),
    ))
}
