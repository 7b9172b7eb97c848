//! Vehicle-entry intake endpoint
//!
//! The front-desk form that opens a job in one submit: customer, vehicle and
//! service entry together.

use api_types::{intake::IntakeNew, service_entry::ServiceEntryDetailsView};
use axum::{Json, extract::State, http::StatusCode};
use engine::IntakeCmd;

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<IntakeNew>,
) -> Result<(StatusCode, Json<ServiceEntryDetailsView>), ServerError> {
    let mut cmd = IntakeCmd::new(
        crate::vehicles::map_vehicle_type(payload.vehicle_type),
        payload.make,
        payload.customer_name,
    );
    if let Some(model) = payload.model {
        cmd = cmd.model(model);
    }
    if let Some(phone) = payload.customer_phone {
        cmd = cmd.phone(phone);
    }
    if let Some(email) = payload.customer_email {
        cmd = cmd.email(email);
    }
    if let Some(status) = payload.status {
        cmd = cmd.status(crate::service_entries::map_status(status));
    }

    let details = state.engine.intake(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(crate::service_entries::details_view(details)),
    ))
}
