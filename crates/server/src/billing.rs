//! Billing endpoint
//!
//! Takes the whole billing form in one request: the submitted item list
//! replaces the entry's stored items, the bill is recomputed, and with
//! `markAsComplete` the job is completed and payment recorded.

use api_types::{billing::BillingSubmit, service_entry::ServiceEntryDetailsView};
use axum::{Json, extract::State};
use engine::{BillingCmd, ItemDraft, Money, SplitPayment};

use crate::{ServerError, server::ServerState};

pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<BillingSubmit>,
) -> Result<Json<ServiceEntryDetailsView>, ServerError> {
    let items = payload
        .items
        .into_iter()
        .map(|item| ItemDraft {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: Money::new(item.price),
            notes: item.notes,
        })
        .collect();

    let mut cmd = BillingCmd::new(payload.service_entry_id, items)
        .discount(Money::new(payload.discount));
    if let Some(method) = payload.payment_method {
        cmd = cmd.payment(crate::service_entries::map_payment_method(method));
    }
    if let Some(split) = payload.split_payments {
        cmd = cmd.split(SplitPayment {
            cash: Money::new(split.cash),
            upi: Money::new(split.upi),
            card: Money::new(split.card),
        });
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if payload.mark_as_complete {
        cmd = cmd.complete();
    }

    let details = state.engine.reconcile_billing(cmd).await?;
    Ok(Json(crate::service_entries::details_view(details)))
}
