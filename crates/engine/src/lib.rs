//! Workshop management core.
//!
//! The [`Engine`] owns the database connection and exposes every operation
//! the HTTP layer needs: customer/vehicle/catalog CRUD, the vehicle-entry
//! intake workflow, the service-entry lifecycle (line-item mutations, status
//! transitions, billing reconciliation) and the daily dashboard rollup.
//!
//! Writes to one service entry's aggregate (the entry plus its line items
//! and cached total) are serialized through a per-entry async lock and run
//! inside a database transaction, so a returned item write always left the
//! parent total consistent.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, PaginatorTrait, QueryFilter,
    TransactionTrait, prelude::*,
};
use tokio::sync::Mutex;

pub use billing::{BillLine, BillTotals, DEFAULT_TAX_RATE_BPS, SplitPayment};
pub use commands::{BillingCmd, IntakeCmd, ItemDraft};
pub use customers::{Customer, CustomerUpdate, NewCustomer, PHONE_NOT_PROVIDED};
pub use error::EngineError;
pub use money::Money;
pub use pre_orders::{NewPreOrder, PreOrder, PreOrderStatus};
pub use products::{NewProduct, Product, ProductKind, ProductUpdate};
pub use service_entries::{
    NewServiceEntry, PaymentMethod, ServiceEntry, ServiceEntryDetails, ServiceEntryUpdate,
    ServiceStatus,
};
pub use service_items::{NewServiceItem, ServiceItem, ServiceItemUpdate};
pub use vehicles::{NewVehicle, Vehicle, VehicleType, VehicleUpdate, VehicleWithOwner};

pub mod billing;
mod commands;
mod customers;
mod error;
mod money;
mod pre_orders;
mod products;
mod service_entries;
mod service_items;
mod vehicles;

type ResultEngine<T> = Result<T, EngineError>;

/// Upper bound on the candidates tried when generating a vehicle number.
const MAX_AUTO_NUMBER_ATTEMPTS: u32 = 1_000;

/// Read-only rollup over the service entries of one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DailyStats {
    /// Entries opened that day.
    pub vehicle_count: u64,
    /// Entries still waiting or in progress.
    pub active_jobs: u64,
    /// Sum of totals over paid entries.
    pub total_revenue: Money,
    /// Sum of totals over completed-but-unpaid entries.
    pub pending_payments: Money,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// One lock per service-entry aggregate; see the module docs.
    entry_locks: Mutex<HashMap<i32, Arc<Mutex<()>>>>,
    /// Sequence behind generated vehicle numbers. Seeded from the clock and
    /// bumped per intake, so two intakes in the same millisecond cannot
    /// collide.
    vehicle_seq: AtomicU64,
    /// Tax rate applied when a billing command does not carry its own.
    tax_rate_bps: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn entry_lock(&self, entry_id: i32) -> Arc<Mutex<()>> {
        let mut locks = self.entry_locks.lock().await;
        locks
            .entry(entry_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn next_vehicle_number(&self) -> String {
        let seq = self.vehicle_seq.fetch_add(1, Ordering::Relaxed);
        format!("AUTO-{:06}", seq % 1_000_000)
    }

    /// Draws vehicle numbers from the sequence until one is not already
    /// registered. The sequence wraps at a million, so a generated number can
    /// clash with a long-lived row or an explicitly registered `AUTO-` plate.
    async fn free_vehicle_number<C: ConnectionTrait>(&self, conn: &C) -> ResultEngine<String> {
        for _ in 0..MAX_AUTO_NUMBER_ATTEMPTS {
            let number = self.next_vehicle_number();
            let taken = vehicles::Entity::find()
                .filter(vehicles::Column::VehicleNumber.eq(number.as_str()))
                .one(conn)
                .await?
                .is_some();
            if !taken {
                return Ok(number);
            }
        }
        Err(EngineError::ExistingKey(
            "no free auto-generated vehicle number".to_string(),
        ))
    }

    async fn find_entry_model<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> ResultEngine<service_entries::Model> {
        service_entries::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("service entry not exists".to_string()))
    }

    /// Rewrites the entry's cached total as the pre-discount sum of
    /// `price * quantity` over its items. Must run inside the same
    /// transaction as the item mutation.
    async fn recompute_entry_total<C: ConnectionTrait>(
        conn: &C,
        entry_id: i32,
    ) -> ResultEngine<Money> {
        let items = service_items::Entity::find()
            .filter(service_items::Column::ServiceEntryId.eq(entry_id))
            .all(conn)
            .await?;

        let mut total = Money::ZERO;
        for model in items {
            let item = ServiceItem::from(model);
            total = total
                .checked_add(item.amount()?)
                .ok_or_else(|| EngineError::Validation("entry total overflow".to_string()))?;
        }

        let entry_model = service_entries::ActiveModel {
            id: ActiveValue::Set(entry_id),
            total_amount: ActiveValue::Set(total.minor()),
            ..Default::default()
        };
        entry_model.update(conn).await?;
        Ok(total)
    }

    // ── Customers ───────────────────────────────────────────────────────

    pub async fn customers(&self) -> ResultEngine<Vec<Customer>> {
        let models = customers::Entity::find().all(&self.database).await?;
        Ok(models.into_iter().map(Customer::from).collect())
    }

    pub async fn customer(&self, id: i32) -> ResultEngine<Customer> {
        customers::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Customer::from)
            .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))
    }

    pub async fn customer_by_phone(&self, phone: &str) -> ResultEngine<Option<Customer>> {
        let model = customers::Entity::find()
            .filter(customers::Column::Phone.eq(phone))
            .one(&self.database)
            .await?;
        Ok(model.map(Customer::from))
    }

    /// Creates a customer; the phone number must not be taken already.
    pub async fn new_customer(&self, new: NewCustomer) -> ResultEngine<Customer> {
        if new.name.trim().is_empty() {
            return Err(EngineError::Validation(
                "customer name is required".to_string(),
            ));
        }
        if self.customer_by_phone(&new.phone).await?.is_some() {
            return Err(EngineError::ExistingKey(new.phone));
        }
        let model = new.into_active_model().insert(&self.database).await?;
        Ok(Customer::from(model))
    }

    pub async fn update_customer(
        &self,
        id: i32,
        update: CustomerUpdate,
    ) -> ResultEngine<Customer> {
        self.customer(id).await?;

        let mut active = customers::ActiveModel {
            id: ActiveValue::Set(id),
            ..Default::default()
        };
        if let Some(name) = update.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(phone) = update.phone {
            if let Some(other) = self.customer_by_phone(&phone).await?
                && other.id != id
            {
                return Err(EngineError::ExistingKey(phone));
            }
            active.phone = ActiveValue::Set(phone);
        }
        if let Some(email) = update.email {
            active.email = ActiveValue::Set(email);
        }
        if let Some(address) = update.address {
            active.address = ActiveValue::Set(address);
        }

        let model = active.update(&self.database).await?;
        Ok(Customer::from(model))
    }

    // ── Vehicles ────────────────────────────────────────────────────────

    pub async fn vehicles(&self) -> ResultEngine<Vec<Vehicle>> {
        let models = vehicles::Entity::find().all(&self.database).await?;
        models.into_iter().map(Vehicle::try_from).collect()
    }

    pub async fn vehicle(&self, id: i32) -> ResultEngine<Vehicle> {
        vehicles::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("vehicle not exists".to_string()))
            .and_then(Vehicle::try_from)
    }

    pub async fn vehicle_by_number(&self, vehicle_number: &str) -> ResultEngine<Option<Vehicle>> {
        let model = vehicles::Entity::find()
            .filter(vehicles::Column::VehicleNumber.eq(vehicle_number))
            .one(&self.database)
            .await?;
        model.map(Vehicle::try_from).transpose()
    }

    pub async fn vehicles_by_customer(&self, customer_id: i32) -> ResultEngine<Vec<Vehicle>> {
        let models = vehicles::Entity::find()
            .filter(vehicles::Column::CustomerId.eq(customer_id))
            .all(&self.database)
            .await?;
        models.into_iter().map(Vehicle::try_from).collect()
    }

    /// Creates a vehicle; the vehicle number must not be taken already.
    pub async fn new_vehicle(&self, new: NewVehicle) -> ResultEngine<Vehicle> {
        if new.make.trim().is_empty() {
            return Err(EngineError::Validation("make is required".to_string()));
        }
        if new.vehicle_number.trim().is_empty() {
            return Err(EngineError::Validation(
                "vehicle number is required".to_string(),
            ));
        }
        self.customer(new.customer_id).await?;
        if self.vehicle_by_number(&new.vehicle_number).await?.is_some() {
            return Err(EngineError::ExistingKey(new.vehicle_number));
        }
        let model = new.into_active_model().insert(&self.database).await?;
        Vehicle::try_from(model)
    }

    pub async fn update_vehicle(&self, id: i32, update: VehicleUpdate) -> ResultEngine<Vehicle> {
        self.vehicle(id).await?;

        let mut active = vehicles::ActiveModel {
            id: ActiveValue::Set(id),
            ..Default::default()
        };
        if let Some(vehicle_type) = update.vehicle_type {
            active.vehicle_type = ActiveValue::Set(vehicle_type.as_str().to_string());
        }
        if let Some(make) = update.make {
            active.make = ActiveValue::Set(make);
        }
        if let Some(model) = update.model {
            active.model = ActiveValue::Set(model);
        }
        if let Some(number) = update.vehicle_number {
            if let Some(other) = self.vehicle_by_number(&number).await?
                && other.id != id
            {
                return Err(EngineError::ExistingKey(number));
            }
            active.vehicle_number = ActiveValue::Set(number);
        }

        let model = active.update(&self.database).await?;
        Vehicle::try_from(model)
    }

    pub async fn vehicle_with_owner(&self, id: i32) -> ResultEngine<VehicleWithOwner> {
        let vehicle = self.vehicle(id).await?;
        let customer = self.customer(vehicle.customer_id).await?;
        Ok(VehicleWithOwner { vehicle, customer })
    }

    // ── Service entries ─────────────────────────────────────────────────

    pub async fn service_entries(&self) -> ResultEngine<Vec<ServiceEntry>> {
        let models = service_entries::Entity::find().all(&self.database).await?;
        models.into_iter().map(ServiceEntry::try_from).collect()
    }

    /// Entries not yet delivered.
    pub async fn active_service_entries(&self) -> ResultEngine<Vec<ServiceEntry>> {
        let models = service_entries::Entity::find()
            .filter(
                service_entries::Column::Status.ne(ServiceStatus::Delivered.as_str()),
            )
            .all(&self.database)
            .await?;
        models.into_iter().map(ServiceEntry::try_from).collect()
    }

    pub async fn service_entries_by_vehicle(
        &self,
        vehicle_id: i32,
    ) -> ResultEngine<Vec<ServiceEntry>> {
        let models = service_entries::Entity::find()
            .filter(service_entries::Column::VehicleId.eq(vehicle_id))
            .all(&self.database)
            .await?;
        models.into_iter().map(ServiceEntry::try_from).collect()
    }

    /// Entries whose `entry_date` falls inside the given UTC day, from its
    /// midnight up to (but excluding) the next day's midnight.
    pub async fn service_entries_by_date(
        &self,
        date: NaiveDate,
    ) -> ResultEngine<Vec<ServiceEntry>> {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let end = start + Duration::days(1);

        let models = service_entries::Entity::find()
            .filter(service_entries::Column::EntryDate.gte(start))
            .filter(service_entries::Column::EntryDate.lt(end))
            .all(&self.database)
            .await?;
        models.into_iter().map(ServiceEntry::try_from).collect()
    }

    pub async fn service_entry(&self, id: i32) -> ResultEngine<ServiceEntry> {
        let model = Self::find_entry_model(&self.database, id).await?;
        ServiceEntry::try_from(model)
    }

    /// The entry joined with its vehicle, owner and line items.
    pub async fn service_entry_details(&self, id: i32) -> ResultEngine<ServiceEntryDetails> {
        let entry = self.service_entry(id).await?;
        let VehicleWithOwner { vehicle, customer } =
            self.vehicle_with_owner(entry.vehicle_id).await?;
        let items = self.service_items(id).await?;
        Ok(ServiceEntryDetails {
            entry,
            vehicle,
            customer,
            items,
        })
    }

    pub async fn new_service_entry(&self, new: NewServiceEntry) -> ResultEngine<ServiceEntry> {
        self.vehicle(new.vehicle_id).await?;
        let model = new.into_active_model().insert(&self.database).await?;
        ServiceEntry::try_from(model)
    }

    /// Applies a manual PATCH to an entry.
    ///
    /// Status may only move forward; reaching `completed` this way stamps
    /// `completed_at` but records no payment (that is billing's job).
    pub async fn update_service_entry(
        &self,
        id: i32,
        update: ServiceEntryUpdate,
    ) -> ResultEngine<ServiceEntry> {
        let lock = self.entry_lock(id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let entry = ServiceEntry::try_from(Self::find_entry_model(&db_tx, id).await?)?;

        let mut active = service_entries::ActiveModel {
            id: ActiveValue::Set(id),
            ..Default::default()
        };
        if let Some(status) = update.status {
            if !entry.status.allows(status) {
                return Err(EngineError::InvalidTransition(format!(
                    "{} -> {}",
                    entry.status.as_str(),
                    status.as_str()
                )));
            }
            active.status = ActiveValue::Set(status.as_str().to_string());
            if status == ServiceStatus::Completed && entry.status != ServiceStatus::Completed {
                active.completed_at = ActiveValue::Set(Some(Utc::now()));
            }
        }
        if let Some(complaint) = update.complaint {
            active.complaint = ActiveValue::Set(Some(complaint));
        }
        if let Some(notes) = update.notes {
            active.notes = ActiveValue::Set(Some(notes));
        }

        let model = active.update(&db_tx).await?;
        db_tx.commit().await?;
        ServiceEntry::try_from(model)
    }

    // ── Line items ──────────────────────────────────────────────────────

    pub async fn service_items(&self, service_entry_id: i32) -> ResultEngine<Vec<ServiceItem>> {
        let models = service_items::Entity::find()
            .filter(service_items::Column::ServiceEntryId.eq(service_entry_id))
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(ServiceItem::from).collect())
    }

    pub async fn service_item(&self, id: i32) -> ResultEngine<ServiceItem> {
        service_items::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(ServiceItem::from)
            .ok_or_else(|| EngineError::KeyNotFound("service item not exists".to_string()))
    }

    /// Adds a line item and recomputes the parent entry's total in the same
    /// transaction. Returns the item and the new total.
    pub async fn add_item(&self, new: NewServiceItem) -> ResultEngine<(ServiceItem, Money)> {
        new.validate()?;
        let lock = self.entry_lock(new.service_entry_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        Self::find_entry_model(&db_tx, new.service_entry_id).await?;
        if let Some(product_id) = new.product_id {
            products::Entity::find_by_id(product_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
        }

        let entry_id = new.service_entry_id;
        let model = new.into_active_model().insert(&db_tx).await?;
        let total = Self::recompute_entry_total(&db_tx, entry_id).await?;
        db_tx.commit().await?;

        Ok((ServiceItem::from(model), total))
    }

    /// Updates a line item and recomputes the parent entry's total in the
    /// same transaction. Returns the item and the new total.
    pub async fn update_item(
        &self,
        id: i32,
        update: ServiceItemUpdate,
    ) -> ResultEngine<(ServiceItem, Money)> {
        let existing = self.service_item(id).await?;
        let lock = self.entry_lock(existing.service_entry_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        // Re-read under the lock; the first read only located the aggregate.
        let current = service_items::Entity::find_by_id(id)
            .one(&db_tx)
            .await?
            .map(ServiceItem::from)
            .ok_or_else(|| EngineError::KeyNotFound("service item not exists".to_string()))?;

        let mut active = service_items::ActiveModel {
            id: ActiveValue::Set(id),
            ..Default::default()
        };
        if let Some(product_name) = update.product_name {
            if product_name.trim().is_empty() {
                return Err(EngineError::Validation("item name is required".to_string()));
            }
            active.product_name = ActiveValue::Set(product_name);
        }
        if let Some(quantity) = update.quantity {
            if quantity < 1 {
                return Err(EngineError::Validation(format!(
                    "quantity must be >= 1, got {quantity}"
                )));
            }
            active.quantity = ActiveValue::Set(quantity);
        }
        if let Some(price) = update.price {
            if price.is_negative() {
                return Err(EngineError::Validation(format!(
                    "price must not be negative, got {price}"
                )));
            }
            active.price = ActiveValue::Set(price.minor());
        }
        if let Some(notes) = update.notes {
            active.notes = ActiveValue::Set(notes);
        }

        let model = active.update(&db_tx).await?;
        let total = Self::recompute_entry_total(&db_tx, current.service_entry_id).await?;
        db_tx.commit().await?;

        Ok((ServiceItem::from(model), total))
    }

    /// Deletes a line item and recomputes the parent entry's total in the
    /// same transaction. Returns the new total.
    pub async fn remove_item(&self, id: i32) -> ResultEngine<Money> {
        let existing = self.service_item(id).await?;
        let lock = self.entry_lock(existing.service_entry_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let result = service_items::Entity::delete_by_id(id).exec(&db_tx).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("service item not exists".to_string()));
        }
        let total = Self::recompute_entry_total(&db_tx, existing.service_entry_id).await?;
        db_tx.commit().await?;

        Ok(total)
    }

    // ── Billing reconciliation ──────────────────────────────────────────

    /// Reconciles an entry's stored items against the submitted list and
    /// updates the bill; with `mark_as_complete` it also records payment and
    /// completes the job.
    ///
    /// The whole operation runs under the entry lock inside one database
    /// transaction: a missing entry, an invalid item list, a bad discount or
    /// a split mismatch leaves nothing written.
    pub async fn reconcile_billing(&self, cmd: BillingCmd) -> ResultEngine<ServiceEntryDetails> {
        cmd.validate()?;
        let lock = self.entry_lock(cmd.service_entry_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let entry =
            ServiceEntry::try_from(Self::find_entry_model(&db_tx, cmd.service_entry_id).await?)?;

        let stored = service_items::Entity::find()
            .filter(service_items::Column::ServiceEntryId.eq(cmd.service_entry_id))
            .all(&db_tx)
            .await?;
        let stored_ids: HashSet<i32> = stored.iter().map(|model| model.id).collect();

        for draft in &cmd.items {
            if let Some(id) = draft.id
                && !stored_ids.contains(&id)
            {
                return Err(EngineError::KeyNotFound(format!(
                    "service item {id} not part of entry {}",
                    cmd.service_entry_id
                )));
            }
        }

        // Diff by id: delete stored items missing from the submitted set,
        // update the ones present, insert the id-less rest.
        let submitted_ids: HashSet<i32> = cmd.items.iter().filter_map(|draft| draft.id).collect();
        for model in &stored {
            if !submitted_ids.contains(&model.id) {
                service_items::Entity::delete_by_id(model.id)
                    .exec(&db_tx)
                    .await?;
            }
        }
        for draft in &cmd.items {
            match draft.id {
                Some(id) => {
                    let active = service_items::ActiveModel {
                        id: ActiveValue::Set(id),
                        product_id: ActiveValue::Set(draft.product_id),
                        product_name: ActiveValue::Set(draft.product_name.clone()),
                        quantity: ActiveValue::Set(draft.quantity),
                        price: ActiveValue::Set(draft.price.minor()),
                        notes: ActiveValue::Set(draft.notes.clone()),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                }
                None => {
                    let new = NewServiceItem {
                        service_entry_id: cmd.service_entry_id,
                        product_id: draft.product_id,
                        product_name: draft.product_name.clone(),
                        quantity: draft.quantity,
                        price: draft.price,
                        notes: draft.notes.clone(),
                    };
                    new.into_active_model().insert(&db_tx).await?;
                }
            }
        }

        let lines: Vec<BillLine> = cmd
            .items
            .iter()
            .map(|draft| BillLine::new(draft.price, draft.quantity))
            .collect();
        let tax_rate_bps = cmd.tax_rate_bps.unwrap_or(self.tax_rate_bps);
        let totals = billing::compute_totals(&lines, cmd.discount, tax_rate_bps)?;
        let total_due = totals.total_due();

        let mut active = service_entries::ActiveModel {
            id: ActiveValue::Set(cmd.service_entry_id),
            total_amount: ActiveValue::Set(total_due.minor()),
            ..Default::default()
        };

        if cmd.mark_as_complete {
            if !entry.status.allows(ServiceStatus::Completed) {
                return Err(EngineError::InvalidTransition(format!(
                    "{} -> completed",
                    entry.status.as_str()
                )));
            }
            // BillingCmd::validate guarantees a method is present here.
            let method = cmd
                .payment_method
                .ok_or_else(|| EngineError::Validation("payment method is required".to_string()))?;
            if method == PaymentMethod::Split {
                let split = cmd.split.ok_or_else(|| {
                    EngineError::Validation("split amounts are required".to_string())
                })?;
                billing::validate_split_payment(&split, total_due)?;
            }

            active.status = ActiveValue::Set(ServiceStatus::Completed.as_str().to_string());
            active.is_paid = ActiveValue::Set(true);
            active.payment_method = ActiveValue::Set(Some(method.as_str().to_string()));
            active.completed_at = ActiveValue::Set(Some(Utc::now()));
            if let Some(notes) = cmd.notes.clone() {
                active.notes = ActiveValue::Set(Some(notes));
            }
        }

        active.update(&db_tx).await?;
        db_tx.commit().await?;

        self.service_entry_details(cmd.service_entry_id).await
    }

    // ── Intake workflow ─────────────────────────────────────────────────

    /// The combined new-job intake: create-or-reuse the customer by phone,
    /// create-or-reuse the vehicle by (make, model), open a service entry.
    ///
    /// All three steps share one database transaction; a failure in any of
    /// them leaves no half-created customer or vehicle behind.
    pub async fn intake(&self, cmd: IntakeCmd) -> ResultEngine<ServiceEntryDetails> {
        cmd.validate()?;
        let db_tx = self.database.begin().await?;

        let phone = cmd
            .customer_phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty());
        let existing = match phone {
            Some(phone) => {
                customers::Entity::find()
                    .filter(customers::Column::Phone.eq(phone))
                    .one(&db_tx)
                    .await?
            }
            None => None,
        };
        let customer_model = match existing {
            Some(model) => model,
            None => {
                let new = NewCustomer {
                    name: cmd.customer_name.clone(),
                    phone: phone.unwrap_or(PHONE_NOT_PROVIDED).to_string(),
                    email: cmd
                        .customer_email
                        .clone()
                        .filter(|email| !email.trim().is_empty()),
                    address: None,
                };
                new.into_active_model().insert(&db_tx).await?
            }
        };

        let owned = vehicles::Entity::find()
            .filter(vehicles::Column::CustomerId.eq(customer_model.id))
            .all(&db_tx)
            .await?;
        let wanted_model = cmd.model.clone().unwrap_or_default();
        let vehicle_model = match owned.into_iter().find(|vehicle| {
            vehicle.make == cmd.make
                && vehicle.model.clone().unwrap_or_default() == wanted_model
        }) {
            Some(model) => model,
            None => {
                let new = NewVehicle {
                    customer_id: customer_model.id,
                    vehicle_type: cmd.vehicle_type,
                    make: cmd.make.clone(),
                    model: cmd.model.clone(),
                    vehicle_number: self.free_vehicle_number(&db_tx).await?,
                };
                new.into_active_model().insert(&db_tx).await?
            }
        };

        let entry_model = NewServiceEntry {
            vehicle_id: vehicle_model.id,
            complaint: Some(cmd.complaint()),
            status: cmd.status,
        }
        .into_active_model()
        .insert(&db_tx)
        .await?;

        db_tx.commit().await?;
        self.service_entry_details(entry_model.id).await
    }

    // ── Daily stats ─────────────────────────────────────────────────────

    /// Dashboard rollup for one day; returns an all-zero record when no
    /// entry matches.
    pub async fn daily_stats(&self, date: NaiveDate) -> ResultEngine<DailyStats> {
        let entries = self.service_entries_by_date(date).await?;

        let mut stats = DailyStats {
            vehicle_count: entries.len() as u64,
            ..Default::default()
        };
        for entry in entries {
            if entry.status.is_active() {
                stats.active_jobs += 1;
            }
            if entry.is_paid {
                stats.total_revenue += entry.total_amount;
            } else if entry.status == ServiceStatus::Completed {
                stats.pending_payments += entry.total_amount;
            }
        }
        Ok(stats)
    }

    // ── Catalog ─────────────────────────────────────────────────────────

    pub async fn products(&self) -> ResultEngine<Vec<Product>> {
        let models = products::Entity::find().all(&self.database).await?;
        models.into_iter().map(Product::try_from).collect()
    }

    pub async fn product(&self, id: i32) -> ResultEngine<Product> {
        products::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))
            .and_then(Product::try_from)
    }

    pub async fn new_product(&self, new: NewProduct) -> ResultEngine<Product> {
        if new.name.trim().is_empty() {
            return Err(EngineError::Validation(
                "product name is required".to_string(),
            ));
        }
        if new.price.is_negative() {
            return Err(EngineError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        let model = new.into_active_model().insert(&self.database).await?;
        Product::try_from(model)
    }

    pub async fn update_product(&self, id: i32, update: ProductUpdate) -> ResultEngine<Product> {
        self.product(id).await?;

        let mut active = products::ActiveModel {
            id: ActiveValue::Set(id),
            ..Default::default()
        };
        if let Some(name) = update.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = update.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(price) = update.price {
            if price.is_negative() {
                return Err(EngineError::Validation(
                    "price must not be negative".to_string(),
                ));
            }
            active.price = ActiveValue::Set(price.minor());
        }
        if let Some(in_stock) = update.in_stock {
            active.in_stock = ActiveValue::Set(in_stock);
        }

        let model = active.update(&self.database).await?;
        Product::try_from(model)
    }

    // ── Pre-orders ──────────────────────────────────────────────────────

    pub async fn pre_orders(&self) -> ResultEngine<Vec<PreOrder>> {
        let models = pre_orders::Entity::find().all(&self.database).await?;
        models.into_iter().map(PreOrder::try_from).collect()
    }

    pub async fn pre_order(&self, id: i32) -> ResultEngine<PreOrder> {
        pre_orders::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("pre-order not exists".to_string()))
            .and_then(PreOrder::try_from)
    }

    pub async fn new_pre_order(&self, new: NewPreOrder) -> ResultEngine<PreOrder> {
        new.validate()?;
        let model = new.into_active_model().insert(&self.database).await?;
        PreOrder::try_from(model)
    }

    /// Moves a pre-order out of `pending`, stamping `delivered_date` or
    /// `refunded_date` as appropriate.
    pub async fn update_pre_order_status(
        &self,
        id: i32,
        status: PreOrderStatus,
    ) -> ResultEngine<PreOrder> {
        let current = self.pre_order(id).await?;
        current.status.transition_to(status)?;

        let mut active = pre_orders::ActiveModel {
            id: ActiveValue::Set(id),
            status: ActiveValue::Set(status.as_str().to_string()),
            ..Default::default()
        };
        match status {
            PreOrderStatus::Delivered => {
                active.delivered_date = ActiveValue::Set(Some(Utc::now()));
            }
            PreOrderStatus::Refunded => {
                active.refunded_date = ActiveValue::Set(Some(Utc::now()));
            }
            PreOrderStatus::Pending | PreOrderStatus::Cancelled => {}
        }

        let model = active.update(&self.database).await?;
        PreOrder::try_from(model)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    tax_rate_bps: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    #[must_use]
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default tax rate (basis points).
    #[must_use]
    pub fn tax_rate_bps(mut self, bps: u32) -> EngineBuilder {
        self.tax_rate_bps = Some(bps);
        self
    }

    /// Construct `Engine`, seeding the default catalog into an empty
    /// products table.
    pub async fn build(self) -> ResultEngine<Engine> {
        let existing = products::Entity::find().count(&self.database).await?;
        if existing == 0 {
            for product in products::default_catalog() {
                product.into_active_model().insert(&self.database).await?;
            }
        }

        Ok(Engine {
            database: self.database,
            entry_locks: Mutex::new(HashMap::new()),
            vehicle_seq: AtomicU64::new(Utc::now().timestamp_millis().unsigned_abs()),
            tax_rate_bps: self.tax_rate_bps.unwrap_or(billing::DEFAULT_TAX_RATE_BPS),
        })
    }
}
