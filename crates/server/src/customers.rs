//! Customers API endpoints

use api_types::customer::{CustomerNew, CustomerPatch, CustomerView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn customer_view(customer: engine::Customer) -> CustomerView {
    CustomerView {
        id: customer.id,
        name: customer.name,
        phone: customer.phone,
        email: customer.email,
        address: customer.address,
        created_at: customer.created_at,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CustomerView>>, ServerError> {
    let customers = state.engine.customers().await?;
    Ok(Json(customers.into_iter().map(customer_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CustomerView>, ServerError> {
    let customer = state.engine.customer(id).await?;
    Ok(Json(customer_view(customer)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerNew>,
) -> Result<(StatusCode, Json<CustomerView>), ServerError> {
    let customer = state
        .engine
        .new_customer(engine::NewCustomer {
            name: payload.name,
            phone: payload.phone,
            email: payload.email,
            address: payload.address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(customer_view(customer))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CustomerPatch>,
) -> Result<Json<CustomerView>, ServerError> {
    let customer = state
        .engine
        .update_customer(
            id,
            engine::CustomerUpdate {
                name: payload.name,
                phone: payload.phone,
                email: payload.email,
                address: payload.address,
            },
        )
        .await?;
    Ok(Json(customer_view(customer)))
}

pub async fn vehicles(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<api_types::vehicle::VehicleView>>, ServerError> {
    state.engine.customer(id).await?;
    let vehicles = state.engine.vehicles_by_customer(id).await?;
    Ok(Json(
        vehicles
            .into_iter()
            .map(crate::vehicles::vehicle_view)
            .collect(),
    ))
}
