use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_coffee_types_table::Migration),
            Box::new(m20240601_000002_create_coffee_items_table::Migration),
            Box::new(m20240601_000003_create_order_statuses_table::Migration),
            Box::new(m20240601_000004_create_orders_table::Migration),
            Box::new(m20240601_000005_create_order_lines_table::Migration),
        ]
    }
}

mod m20240601_000001_create_coffee_types_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_coffee_types_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CoffeeTypes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CoffeeTypes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CoffeeTypes::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CoffeeTypes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CoffeeTypes {
        Table,
        Id,
        Name,
    }
}

mod m20240601_000002_create_coffee_items_table {
    use super::m20240601_000001_create_coffee_types_table::CoffeeTypes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_coffee_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CoffeeItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CoffeeItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CoffeeItems::Name).string_len(50).not_null())
                        .col(ColumnDef::new(CoffeeItems::TypeId).integer().not_null())
                        .col(
                            ColumnDef::new(CoffeeItems::QuantityInStock)
                                .decimal_len(10, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CoffeeItems::PricePerKg)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CoffeeItems::Description)
                                .string_len(200)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CoffeeItems::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_coffee_items_type_id")
                                .from(CoffeeItems::Table, CoffeeItems::TypeId)
                                .to(CoffeeTypes::Table, CoffeeTypes::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_coffee_items_type_id")
                        .table(CoffeeItems::Table)
                        .col(CoffeeItems::TypeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_coffee_items_quantity")
                        .table(CoffeeItems::Table)
                        .col(CoffeeItems::QuantityInStock)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CoffeeItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CoffeeItems {
        Table,
        Id,
        Name,
        TypeId,
        QuantityInStock,
        PricePerKg,
        Description,
        LastUpdated,
    }
}

mod m20240601_000003_create_order_statuses_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_order_statuses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderStatuses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStatuses::Id)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OrderStatuses::Code)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(OrderStatuses::Name).string_len(50).not_null())
                        .to_owned(),
                )
                .await?;

            // Ids are fixed; crate::entities::order_status::OrderStatusCode mirrors them.
            let seed = Query::insert()
                .into_table(OrderStatuses::Table)
                .columns([OrderStatuses::Id, OrderStatuses::Code, OrderStatuses::Name])
                .values_panic([1.into(), "pending".into(), "قيد الانتظار".into()])
                .values_panic([2.into(), "cancelled".into(), "ملغى".into()])
                .values_panic([3.into(), "completed".into(), "مكتمل".into()])
                .to_owned();

            manager.exec_stmt(seed).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderStatuses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderStatuses {
        Table,
        Id,
        Code,
        Name,
    }
}

mod m20240601_000004_create_orders_table {
    use super::m20240601_000003_create_order_statuses_table::OrderStatuses;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerName).string_len(50).not_null())
                        .col(ColumnDef::new(Orders::PhoneNumber).string_len(15).null())
                        .col(
                            ColumnDef::new(Orders::TotalPrice)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::StatusId).integer().not_null())
                        .col(ColumnDef::new(Orders::Notes).string_len(500).null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_status_id")
                                .from(Orders::Table, Orders::StatusId)
                                .to(OrderStatuses::Table, OrderStatuses::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        CustomerName,
        PhoneNumber,
        TotalPrice,
        StatusId,
        Notes,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240601_000005_create_order_lines_table {
    use super::m20240601_000002_create_coffee_items_table::CoffeeItems;
    use super::m20240601_000004_create_orders_table::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_order_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLines::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderLines::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderLines::CoffeeId).integer().not_null())
                        // Nullable for rows written before quantities were mandatory.
                        .col(ColumnDef::new(OrderLines::Quantity).decimal_len(10, 3).null())
                        .col(
                            ColumnDef::new(OrderLines::UnitPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_lines_order_id")
                                .from(OrderLines::Table, OrderLines::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_lines_coffee_id")
                                .from(OrderLines::Table, OrderLines::CoffeeId)
                                .to(CoffeeItems::Table, CoffeeItems::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_lines_order_id")
                        .table(OrderLines::Table)
                        .col(OrderLines::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_lines_coffee_id")
                        .table(OrderLines::Table)
                        .col(OrderLines::CoffeeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderLines {
        Table,
        Id,
        OrderId,
        CoffeeId,
        Quantity,
        UnitPrice,
    }
}
