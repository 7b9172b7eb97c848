//! Vehicles API endpoints

use api_types::vehicle::{VehicleNew, VehiclePatch, VehicleView, VehicleWithOwnerView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_vehicle_type(kind: api_types::VehicleType) -> engine::VehicleType {
    match kind {
        api_types::VehicleType::Bike => engine::VehicleType::Bike,
        api_types::VehicleType::Car => engine::VehicleType::Car,
        api_types::VehicleType::Other => engine::VehicleType::Other,
    }
}

fn map_engine_vehicle_type(kind: engine::VehicleType) -> api_types::VehicleType {
    match kind {
        engine::VehicleType::Bike => api_types::VehicleType::Bike,
        engine::VehicleType::Car => api_types::VehicleType::Car,
        engine::VehicleType::Other => api_types::VehicleType::Other,
    }
}

pub(crate) fn vehicle_view(vehicle: engine::Vehicle) -> VehicleView {
    VehicleView {
        id: vehicle.id,
        customer_id: vehicle.customer_id,
        vehicle_type: map_engine_vehicle_type(vehicle.vehicle_type),
        make: vehicle.make,
        model: vehicle.model,
        vehicle_number: vehicle.vehicle_number,
        created_at: vehicle.created_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<VehicleWithOwnerView>>, ServerError> {
    let vehicles = state.engine.vehicles().await?;
    let mut views = Vec::with_capacity(vehicles.len());
    for vehicle in vehicles {
        let customer = state.engine.customer(vehicle.customer_id).await?;
        views.push(VehicleWithOwnerView {
            vehicle: vehicle_view(vehicle),
            customer: crate::customers::customer_view(customer),
        });
    }
    Ok(Json(views))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<VehicleWithOwnerView>, ServerError> {
    let owned = state.engine.vehicle_with_owner(id).await?;
    Ok(Json(VehicleWithOwnerView {
        vehicle: vehicle_view(owned.vehicle),
        customer: crate::customers::customer_view(owned.customer),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<VehicleNew>,
) -> Result<(StatusCode, Json<VehicleView>), ServerError> {
    let vehicle = state
        .engine
        .new_vehicle(engine::NewVehicle {
            customer_id: payload.customer_id,
            vehicle_type: map_vehicle_type(payload.vehicle_type),
            make: payload.make,
            model: payload.model,
            vehicle_number: payload.vehicle_number,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(vehicle_view(vehicle))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<VehiclePatch>,
) -> Result<Json<VehicleView>, ServerError> {
    let vehicle = state
        .engine
        .update_vehicle(
            id,
            engine::VehicleUpdate {
                vehicle_type: payload.vehicle_type.map(map_vehicle_type),
                make: payload.make,
                model: payload.model,
                vehicle_number: payload.vehicle_number,
            },
        )
        .await?;
    Ok(Json(vehicle_view(vehicle)))
}

pub async fn service_entries(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<api_types::service_entry::ServiceEntryView>>, ServerError> {
    state.engine.vehicle(id).await?;
    let entries = state.engine.service_entries_by_vehicle(id).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(crate::service_entries::entry_view)
            .collect(),
    ))
}
