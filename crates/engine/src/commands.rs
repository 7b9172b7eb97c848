//! Command structs for engine operations.
//!
//! These types group parameters for the multi-step write operations (intake
//! and billing reconciliation), keeping call sites readable and avoiding
//! long argument lists.

use crate::{
    EngineError, Money, ResultEngine,
    billing::SplitPayment,
    service_entries::{PaymentMethod, ServiceStatus},
    vehicles::VehicleType,
};

/// Run the vehicle-entry intake workflow: create-or-reuse customer,
/// create-or-reuse vehicle, open a service entry.
#[derive(Clone, Debug)]
pub struct IntakeCmd {
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub status: ServiceStatus,
}

impl IntakeCmd {
    #[must_use]
    pub fn new(
        vehicle_type: VehicleType,
        make: impl Into<String>,
        customer_name: impl Into<String>,
    ) -> Self {
        Self {
            vehicle_type,
            make: make.into(),
            model: None,
            customer_name: customer_name.into(),
            customer_phone: None,
            customer_email: None,
            status: ServiceStatus::Waiting,
        }
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: ServiceStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.make.trim().is_empty() {
            return Err(EngineError::Validation("make is required".to_string()));
        }
        if self.customer_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "customer name is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Auto-derived complaint text, matching the intake form default.
    pub(crate) fn complaint(&self) -> String {
        format!(
            "Service for {} {}",
            self.make,
            self.model.as_deref().unwrap_or("bike")
        )
    }
}

/// One line of a submitted billing form.
///
/// `id` distinguishes an edit of a stored item (`Some`) from a new line
/// (`None`); reconciliation deletes stored items absent from the submitted
/// set.
#[derive(Clone, Debug)]
pub struct ItemDraft {
    pub id: Option<i32>,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub notes: Option<String>,
}

impl ItemDraft {
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
}

/// Reconcile a service entry's items against a submitted list and update its
/// bill, optionally completing the job and recording payment.
#[derive(Clone, Debug)]
pub struct BillingCmd {
    pub service_entry_id: i32,
    pub items: Vec<ItemDraft>,
    pub discount: Money,
    /// Overrides the engine's configured tax rate when set.
    pub tax_rate_bps: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub split: Option<SplitPayment>,
    pub notes: Option<String>,
    pub mark_as_complete: bool,
}

impl BillingCmd {
    #[must_use]
    pub fn new(service_entry_id: i32, items: Vec<ItemDraft>) -> Self {
        Self {
            service_entry_id,
            items,
            discount: Money::ZERO,
            tax_rate_bps: None,
            payment_method: None,
            split: None,
            notes: None,
            mark_as_complete: false,
        }
    }

    #[must_use]
    pub fn discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    #[must_use]
    pub fn tax_rate_bps(mut self, bps: u32) -> Self {
        self.tax_rate_bps = Some(bps);
        self
    }

    #[must_use]
    pub fn payment(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    #[must_use]
    pub fn split(mut self, split: SplitPayment) -> Self {
        self.split = Some(split);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn complete(mut self) -> Self {
        self.mark_as_complete = true;
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        for item in &self.items {
            item.validate()?;
        }
        if self.mark_as_complete {
            match self.payment_method {
                None => {
                    return Err(EngineError::Validation(
                        "payment method is required to complete billing".to_string(),
                    ));
                }
                Some(PaymentMethod::Split) if self.split.is_none() => {
                    return Err(EngineError::Validation(
                        "split amounts are required for split payment".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
