use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BillingCmd, Engine, EngineError, IntakeCmd, ItemDraft, Money, NewCustomer, NewPreOrder,
    NewServiceItem, NewVehicle, PaymentMethod, PreOrderStatus, ServiceEntryUpdate,
    ServiceItemUpdate, ServiceStatus, SplitPayment, VehicleType,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn open_entry(engine: &Engine, phone: &str) -> i32 {
    let details = engine
        .intake(
            IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi")
                .model("Splendor")
                .phone(phone),
        )
        .await
        .unwrap();
    details.entry.id
}

fn draft(name: &str, quantity: i64, price: i64) -> ItemDraft {
    ItemDraft {
        id: None,
        product_id: None,
        product_name: name.to_string(),
        quantity,
        price: Money::new(price),
        notes: None,
    }
}

// ── Intake ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn intake_creates_customer_vehicle_and_open_entry() {
    let (engine, _db) = engine_with_db().await;

    let details = engine
        .intake(
            IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi")
                .model("Splendor")
                .phone("9876543210"),
        )
        .await
        .unwrap();

    assert_eq!(details.customer.name, "Ravi");
    assert_eq!(details.customer.phone, "9876543210");
    assert_eq!(details.vehicle.make, "Hero");
    assert!(details.vehicle.vehicle_number.starts_with("AUTO-"));
    assert_eq!(details.entry.status, ServiceStatus::Waiting);
    assert_eq!(
        details.entry.complaint.as_deref(),
        Some("Service for Hero Splendor")
    );
    assert_eq!(details.entry.total_amount, Money::ZERO);
    assert!(!details.entry.is_paid);
    assert!(details.items.is_empty());
}

#[tokio::test]
async fn intake_reuses_customer_by_phone_and_vehicle_by_make_model() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .intake(
            IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi")
                .model("Splendor")
                .phone("9876543210"),
        )
        .await
        .unwrap();
    let second = engine
        .intake(
            IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi K")
                .model("Splendor")
                .phone("9876543210"),
        )
        .await
        .unwrap();

    assert_eq!(first.customer.id, second.customer.id);
    assert_eq!(first.vehicle.id, second.vehicle.id);
    assert_ne!(first.entry.id, second.entry.id);
    assert_eq!(engine.customers().await.unwrap().len(), 1);
    assert_eq!(engine.vehicles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn intake_same_customer_different_model_registers_new_vehicle() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .intake(
            IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi")
                .model("Splendor")
                .phone("9876543210"),
        )
        .await
        .unwrap();
    let second = engine
        .intake(
            IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi")
                .model("Passion")
                .phone("9876543210"),
        )
        .await
        .unwrap();

    assert_eq!(first.customer.id, second.customer.id);
    assert_ne!(first.vehicle.id, second.vehicle.id);
}

#[tokio::test]
async fn intake_without_phone_never_merges_customers() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .intake(IntakeCmd::new(VehicleType::Car, "Maruti", "Walk-in"))
        .await
        .unwrap();
    let second = engine
        .intake(IntakeCmd::new(VehicleType::Car, "Maruti", "Walk-in"))
        .await
        .unwrap();

    assert_eq!(first.customer.phone, "not provided");
    assert_ne!(first.customer.id, second.customer.id);
}

#[tokio::test]
async fn intake_skips_taken_auto_numbers() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .intake(IntakeCmd::new(VehicleType::Bike, "Hero", "Ravi").phone("9000000040"))
        .await
        .unwrap();
    let seq: u64 = first
        .vehicle
        .vehicle_number
        .trim_start_matches("AUTO-")
        .parse()
        .unwrap();

    // Register the plate the generator would hand out next.
    let taken = format!("AUTO-{:06}", (seq + 1) % 1_000_000);
    let customer = engine
        .new_customer(NewCustomer {
            name: "Other".to_string(),
            phone: "9000000041".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    engine
        .new_vehicle(NewVehicle {
            customer_id: customer.id,
            vehicle_type: VehicleType::Car,
            make: "Maruti".to_string(),
            model: None,
            vehicle_number: taken.clone(),
        })
        .await
        .unwrap();

    let second = engine
        .intake(IntakeCmd::new(VehicleType::Car, "Tata", "Asha").phone("9000000042"))
        .await
        .unwrap();
    assert!(second.vehicle.vehicle_number.starts_with("AUTO-"));
    assert_ne!(second.vehicle.vehicle_number, taken);
}

#[tokio::test]
async fn intake_rejects_blank_required_fields() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .intake(IntakeCmd::new(VehicleType::Bike, "  ", "Ravi"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .intake(IntakeCmd::new(VehicleType::Bike, "Hero", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

// ── Line items and the cached total ─────────────────────────────────────────

#[tokio::test]
async fn item_mutations_keep_entry_total_in_sync() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000001").await;

    let (oil, total) = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: None,
            product_name: "Engine Oil".to_string(),
            quantity: 2,
            price: Money::new(45_000),
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(total, Money::new(90_000));

    let (_labour, total) = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: None,
            product_name: "Labour".to_string(),
            quantity: 1,
            price: Money::new(30_000),
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(total, Money::new(120_000));

    let (_oil, total) = engine
        .update_item(
            oil.id,
            ServiceItemUpdate {
                quantity: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(total, Money::new(75_000));

    let total = engine.remove_item(oil.id).await.unwrap();
    assert_eq!(total, Money::new(30_000));

    let entry = engine.service_entry(entry_id).await.unwrap();
    assert_eq!(entry.total_amount, Money::new(30_000));
}

#[tokio::test]
async fn add_item_rejects_missing_entry_and_bad_values() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000002").await;

    let err = engine
        .add_item(NewServiceItem {
            service_entry_id: 999,
            product_id: None,
            product_name: "Labour".to_string(),
            quantity: 1,
            price: Money::new(100),
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: None,
            product_name: "Labour".to_string(),
            quantity: 0,
            price: Money::new(100),
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: Some(999),
            product_name: "Phantom".to_string(),
            quantity: 1,
            price: Money::new(100),
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn catalog_linked_item_keeps_free_text_name() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000003").await;

    let product = engine.products().await.unwrap().into_iter().next().unwrap();
    let (item, _total) = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: Some(product.id),
            product_name: product.name.clone(),
            quantity: 1,
            price: product.price,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(item.product_id, Some(product.id));
    assert_eq!(item.product_name, product.name);
}

// ── Billing reconciliation ──────────────────────────────────────────────────

#[tokio::test]
async fn billing_completion_applies_tax_and_records_payment() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000010").await;

    let details = engine
        .reconcile_billing(
            BillingCmd::new(entry_id, vec![draft("General Service", 1, 50_000)])
                .payment(PaymentMethod::Cash)
                .complete(),
        )
        .await
        .unwrap();

    // 500.00 + 18% GST = 590.00
    assert_eq!(details.entry.total_amount, Money::new(59_000));
    assert_eq!(details.entry.status, ServiceStatus::Completed);
    assert!(details.entry.is_paid);
    assert_eq!(details.entry.payment_method, Some(PaymentMethod::Cash));
    assert!(details.entry.completed_at.is_some());
    assert_eq!(details.items.len(), 1);
}

#[tokio::test]
async fn billing_without_completion_updates_bill_only() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000011").await;

    let details = engine
        .reconcile_billing(BillingCmd::new(entry_id, vec![draft("Brake Pads", 2, 30_000)]))
        .await
        .unwrap();

    assert_eq!(details.entry.total_amount, Money::new(70_800));
    assert_eq!(details.entry.status, ServiceStatus::Waiting);
    assert!(!details.entry.is_paid);
    assert_eq!(details.entry.payment_method, None);
}

#[tokio::test]
async fn billing_reconciles_items_by_id() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000012").await;

    let (kept, _) = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: None,
            product_name: "Engine Oil".to_string(),
            quantity: 1,
            price: Money::new(45_000),
            notes: None,
        })
        .await
        .unwrap();
    engine
        .add_item(NewServiceItem {
            service_entry_id: entry_id,
            product_id: None,
            product_name: "Chain Lube".to_string(),
            quantity: 1,
            price: Money::new(10_000),
            notes: None,
        })
        .await
        .unwrap();

    let mut edited = draft("Engine Oil 10W-40", 2, 45_000);
    edited.id = Some(kept.id);
    let details = engine
        .reconcile_billing(BillingCmd::new(
            entry_id,
            vec![edited, draft("Labour", 1, 20_000)],
        ))
        .await
        .unwrap();

    // Chain Lube dropped, Engine Oil updated in place, Labour inserted.
    assert_eq!(details.items.len(), 2);
    let oil = details
        .items
        .iter()
        .find(|item| item.id == kept.id)
        .unwrap();
    assert_eq!(oil.product_name, "Engine Oil 10W-40");
    assert_eq!(oil.quantity, 2);
    assert!(details.items.iter().all(|item| item.product_name != "Chain Lube"));
}

#[tokio::test]
async fn billing_resubmitting_the_same_items_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000018").await;

    let first = engine
        .reconcile_billing(BillingCmd::new(
            entry_id,
            vec![draft("Engine Oil", 1, 45_000), draft("Labour", 1, 20_000)],
        ))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.entry.total_amount, Money::new(76_700));

    // Resubmit the stored items untouched, ids included.
    let resubmitted: Vec<ItemDraft> = first
        .items
        .iter()
        .map(|item| ItemDraft {
            id: Some(item.id),
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price,
            notes: item.notes.clone(),
        })
        .collect();
    let second = engine
        .reconcile_billing(BillingCmd::new(entry_id, resubmitted))
        .await
        .unwrap();

    assert_eq!(second.entry.total_amount, first.entry.total_amount);
    let mut first_ids: Vec<i32> = first.items.iter().map(|item| item.id).collect();
    let mut second_ids: Vec<i32> = second.items.iter().map(|item| item.id).collect();
    first_ids.sort_unstable();
    second_ids.sort_unstable();
    assert_eq!(second_ids, first_ids);
}

#[tokio::test]
async fn billing_rejects_item_id_from_another_entry() {
    let (engine, _db) = engine_with_db().await;
    let entry_a = open_entry(&engine, "9000000013").await;
    let entry_b = open_entry(&engine, "9000000014").await;

    let (foreign, _) = engine
        .add_item(NewServiceItem {
            service_entry_id: entry_a,
            product_id: None,
            product_name: "Labour".to_string(),
            quantity: 1,
            price: Money::new(10_000),
            notes: None,
        })
        .await
        .unwrap();

    let mut stolen = draft("Labour", 1, 10_000);
    stolen.id = Some(foreign.id);
    let err = engine
        .reconcile_billing(BillingCmd::new(entry_b, vec![stolen]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn billing_rejects_discount_beyond_total() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000015").await;

    // Bill totals 236.00 with tax; a 250.00 discount must not clamp.
    let err = engine
        .reconcile_billing(
            BillingCmd::new(entry_id, vec![draft("Wash", 1, 20_000)])
                .discount(Money::new(25_000)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let entry = engine.service_entry(entry_id).await.unwrap();
    assert_eq!(entry.total_amount, Money::ZERO);
    assert!(engine.service_items(entry_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn split_payment_must_cover_total_exactly() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000016").await;

    let short = SplitPayment {
        cash: Money::new(30_000),
        upi: Money::new(15_000),
        card: Money::ZERO,
    };
    let err = engine
        .reconcile_billing(
            BillingCmd::new(entry_id, vec![draft("Service", 1, 50_000)])
                .payment(PaymentMethod::Split)
                .split(short)
                .complete(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing written by the failed attempt.
    let entry = engine.service_entry(entry_id).await.unwrap();
    assert_eq!(entry.status, ServiceStatus::Waiting);
    assert!(engine.service_items(entry_id).await.unwrap().is_empty());

    let exact = SplitPayment {
        cash: Money::new(30_000),
        upi: Money::new(20_000),
        card: Money::new(9_000),
    };
    let details = engine
        .reconcile_billing(
            BillingCmd::new(entry_id, vec![draft("Service", 1, 50_000)])
                .payment(PaymentMethod::Split)
                .split(exact)
                .complete(),
        )
        .await
        .unwrap();
    assert_eq!(details.entry.payment_method, Some(PaymentMethod::Split));
    assert!(details.entry.is_paid);
}

#[tokio::test]
async fn billing_cannot_complete_a_delivered_entry() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000017").await;

    engine
        .update_service_entry(
            entry_id,
            ServiceEntryUpdate {
                status: Some(ServiceStatus::Delivered),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = engine
        .reconcile_billing(
            BillingCmd::new(entry_id, vec![draft("Service", 1, 50_000)])
                .payment(PaymentMethod::Cash)
                .complete(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

// ── Status lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn status_moves_forward_only() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000020").await;

    let entry = engine
        .update_service_entry(
            entry_id,
            ServiceEntryUpdate {
                status: Some(ServiceStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(entry.status, ServiceStatus::InProgress);
    assert!(entry.completed_at.is_none());

    let entry = engine
        .update_service_entry(
            entry_id,
            ServiceEntryUpdate {
                status: Some(ServiceStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(entry.completed_at.is_some());

    let err = engine
        .update_service_entry(
            entry_id,
            ServiceEntryUpdate {
                status: Some(ServiceStatus::Waiting),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn delivered_entries_leave_the_active_list() {
    let (engine, _db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000021").await;
    open_entry(&engine, "9000000022").await;

    assert_eq!(engine.active_service_entries().await.unwrap().len(), 2);

    engine
        .update_service_entry(
            entry_id,
            ServiceEntryUpdate {
                status: Some(ServiceStatus::Delivered),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let active = engine.active_service_entries().await.unwrap();
    assert_eq!(active.len(), 1);
    assert!(active.iter().all(|entry| entry.id != entry_id));
}

// ── Daily stats ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn daily_stats_split_revenue_and_pending() {
    let (engine, _db) = engine_with_db().await;

    let paid = open_entry(&engine, "9000000030").await;
    engine
        .reconcile_billing(
            BillingCmd::new(paid, vec![draft("Service", 1, 50_000)])
                .payment(PaymentMethod::Upi)
                .complete(),
        )
        .await
        .unwrap();

    let owed = open_entry(&engine, "9000000031").await;
    engine
        .reconcile_billing(BillingCmd::new(owed, vec![draft("Service", 1, 10_000)]))
        .await
        .unwrap();
    engine
        .update_service_entry(
            owed,
            ServiceEntryUpdate {
                status: Some(ServiceStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    open_entry(&engine, "9000000032").await;

    let stats = engine.daily_stats(Utc::now().date_naive()).await.unwrap();
    assert_eq!(stats.vehicle_count, 3);
    assert_eq!(stats.active_jobs, 1);
    assert_eq!(stats.total_revenue, Money::new(59_000));
    assert_eq!(stats.pending_payments, Money::new(11_800));
}

#[tokio::test]
async fn daily_stats_ignore_other_days() {
    let (engine, _db) = engine_with_db().await;
    open_entry(&engine, "9000000033").await;

    let yesterday = (Utc::now() - chrono::Duration::days(1)).date_naive();
    let stats = engine.daily_stats(yesterday).await.unwrap();
    assert_eq!(stats, engine::DailyStats::default());
}

#[tokio::test]
async fn daily_stats_count_the_last_moment_of_the_day() {
    let (engine, db) = engine_with_db().await;
    let entry_id = open_entry(&engine, "9000000034").await;

    let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let next_day = date.succ_opt().unwrap();
    let backend = db.get_database_backend();

    // Push the entry to the very end of the day, below millisecond
    // resolution.
    let last_moment =
        Utc.from_utc_datetime(&date.and_hms_micro_opt(23, 59, 59, 999_999).unwrap());
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE service_entries SET entry_date = ? WHERE id = ?",
        [last_moment.into(), entry_id.into()],
    ))
    .await
    .unwrap();

    assert_eq!(engine.daily_stats(date).await.unwrap().vehicle_count, 1);
    assert_eq!(engine.daily_stats(next_day).await.unwrap().vehicle_count, 0);

    // Midnight already belongs to the following day.
    let midnight = Utc.from_utc_datetime(&next_day.and_time(NaiveTime::MIN));
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE service_entries SET entry_date = ? WHERE id = ?",
        [midnight.into(), entry_id.into()],
    ))
    .await
    .unwrap();

    assert_eq!(engine.daily_stats(date).await.unwrap().vehicle_count, 0);
    assert_eq!(engine.daily_stats(next_day).await.unwrap().vehicle_count, 1);
}

// ── Uniqueness ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_phone_and_vehicle_number_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let customer = engine
        .new_customer(NewCustomer {
            name: "Ravi".to_string(),
            phone: "9876543210".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let err = engine
        .new_customer(NewCustomer {
            name: "Other".to_string(),
            phone: "9876543210".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine
        .new_vehicle(NewVehicle {
            customer_id: customer.id,
            vehicle_type: VehicleType::Bike,
            make: "Hero".to_string(),
            model: Some("Splendor".to_string()),
            vehicle_number: "KA-01-AB-1234".to_string(),
        })
        .await
        .unwrap();
    let err = engine
        .new_vehicle(NewVehicle {
            customer_id: customer.id,
            vehicle_type: VehicleType::Bike,
            make: "Hero".to_string(),
            model: Some("Passion".to_string()),
            vehicle_number: "KA-01-AB-1234".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

// ── Catalog seeding ─────────────────────────────────────────────────────────

#[tokio::test]
async fn default_catalog_is_seeded_once() {
    let (engine, db) = engine_with_db().await;

    let seeded = engine.products().await.unwrap();
    assert!(!seeded.is_empty());

    // A second engine over the same database must not duplicate the seed.
    let again = Engine::builder().database(db).build().await.unwrap();
    assert_eq!(again.products().await.unwrap().len(), seeded.len());
}

// ── Pre-orders ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn pre_order_delivery_is_terminal() {
    let (engine, _db) = engine_with_db().await;

    let order = engine
        .new_pre_order(NewPreOrder {
            item_name: "Helmet".to_string(),
            advance_amount: Money::new(20_000),
            customer_name: "Ravi".to_string(),
            contact_number: "9876543210".to_string(),
            expected_delivery_date: None,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(order.status, PreOrderStatus::Pending);
    assert!(order.delivered_date.is_none());

    let delivered = engine
        .update_pre_order_status(order.id, PreOrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, PreOrderStatus::Delivered);
    assert!(delivered.delivered_date.is_some());

    let err = engine
        .update_pre_order_status(order.id, PreOrderStatus::Refunded)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}
