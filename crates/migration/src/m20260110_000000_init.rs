//! Initial schema migration - creates all tables from scratch.
//!
//! The complete workshop schema:
//!
//! - `customers`: people who bring vehicles in, deduplicated by phone
//! - `vehicles`: registered vehicles, each owned by one customer
//! - `service_entries`: one job per workshop visit, with status and bill
//! - `products`: catalog of sellable products and services
//! - `service_items`: billed lines attached to a service entry
//! - `pre_orders`: advance-paid reservations, independent of service jobs

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    Name,
    Phone,
    Email,
    Address,
    CreatedAt,
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
    CustomerId,
    VehicleType,
    Make,
    Model,
    VehicleNumber,
    CreatedAt,
}

#[derive(Iden)]
enum ServiceEntries {
    Table,
    Id,
    VehicleId,
    EntryDate,
    Complaint,
    Status,
    TotalAmount,
    IsPaid,
    PaymentMethod,
    Notes,
    CompletedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Kind,
    Price,
    InStock,
}

#[derive(Iden)]
enum ServiceItems {
    Table,
    Id,
    ServiceEntryId,
    ProductId,
    ProductName,
    Quantity,
    Price,
    Notes,
}

#[derive(Iden)]
enum PreOrders {
    Table,
    Id,
    ItemName,
    AdvanceAmount,
    CustomerName,
    ContactNumber,
    ExpectedDeliveryDate,
    DeliveredDate,
    RefundedDate,
    Status,
    Notes,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Customers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Phone).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string())
                    .col(ColumnDef::new(Customers::Address).string())
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-customers-phone")
                    .table(Customers::Table)
                    .col(Customers::Phone)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Vehicles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vehicles::CustomerId).integer().not_null())
                    .col(ColumnDef::new(Vehicles::VehicleType).string().not_null())
                    .col(ColumnDef::new(Vehicles::Make).string().not_null())
                    .col(ColumnDef::new(Vehicles::Model).string())
                    .col(ColumnDef::new(Vehicles::VehicleNumber).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicles-customer_id")
                            .from(Vehicles::Table, Vehicles::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicles-vehicle_number-unique")
                    .table(Vehicles::Table)
                    .col(Vehicles::VehicleNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Service entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ServiceEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceEntries::VehicleId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceEntries::EntryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceEntries::Complaint).string())
                    .col(
                        ColumnDef::new(ServiceEntries::Status)
                            .string()
                            .not_null()
                            .default("waiting"),
                    )
                    .col(
                        ColumnDef::new(ServiceEntries::TotalAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServiceEntries::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ServiceEntries::PaymentMethod).string())
                    .col(ColumnDef::new(ServiceEntries::Notes).string())
                    .col(
                        ColumnDef::new(ServiceEntries::CompletedAt)
                            .timestamp_with_time_zone(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-service_entries-vehicle_id")
                            .from(ServiceEntries::Table, ServiceEntries::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-service_entries-entry_date")
                    .table(ServiceEntries::Table)
                    .col(ServiceEntries::EntryDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-service_entries-status")
                    .table(ServiceEntries::Table)
                    .col(ServiceEntries::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).string())
                    .col(ColumnDef::new(Products::Kind).string().not_null())
                    .col(ColumnDef::new(Products::Price).big_integer().not_null())
                    .col(ColumnDef::new(Products::InStock).integer())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Service items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ServiceItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceItems::ServiceEntryId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceItems::ProductId).integer())
                    .col(ColumnDef::new(ServiceItems::ProductName).string().not_null())
                    .col(
                        ColumnDef::new(ServiceItems::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceItems::Price).big_integer().not_null())
                    .col(ColumnDef::new(ServiceItems::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-service_items-service_entry_id")
                            .from(ServiceItems::Table, ServiceItems::ServiceEntryId)
                            .to(ServiceEntries::Table, ServiceEntries::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-service_items-product_id")
                            .from(ServiceItems::Table, ServiceItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-service_items-service_entry_id")
                    .table(ServiceItems::Table)
                    .col(ServiceItems::ServiceEntryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Pre-orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PreOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PreOrders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PreOrders::ItemName).string().not_null())
                    .col(
                        ColumnDef::new(PreOrders::AdvanceAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PreOrders::CustomerName).string().not_null())
                    .col(
                        ColumnDef::new(PreOrders::ContactNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PreOrders::ExpectedDeliveryDate)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(PreOrders::DeliveredDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(PreOrders::RefundedDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PreOrders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PreOrders::Notes).string())
                    .col(
                        ColumnDef::new(PreOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PreOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;

        Ok(())
    }
}
