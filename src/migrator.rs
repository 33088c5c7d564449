use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_clients_table::Migration),
            Box::new(m20240101_000002_create_products_table::Migration),
            Box::new(m20240101_000003_create_depots_table::Migration),
            Box::new(m20240101_000004_create_racks_table::Migration),
            Box::new(m20240101_000005_create_slots_table::Migration),
            Box::new(m20240101_000006_create_pallets_table::Migration),
            Box::new(m20240101_000007_create_shipments_table::Migration),
            Box::new(m20240101_000008_create_shipment_lines_table::Migration),
            Box::new(m20240101_000009_create_movements_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_clients_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Clients::LegalName).string().not_null())
                        .col(ColumnDef::new(Clients::TaxId).string().not_null())
                        .col(ColumnDef::new(Clients::ContactName).string().null())
                        .col(ColumnDef::new(Clients::Phone).string().null())
                        .col(ColumnDef::new(Clients::Email).string().null())
                        .col(
                            ColumnDef::new(Clients::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Clients::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_clients_tax_id")
                        .table(Clients::Table)
                        .col(Clients::TaxId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Clients {
        Table,
        Id,
        LegalName,
        TaxId,
        ContactName,
        Phone,
        Email,
        Active,
        CreatedAt,
    }
}

mod m20240101_000002_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Products::Code).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().not_null())
                        .col(ColumnDef::new(Products::UnitOfMeasure).string().not_null())
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_client_id")
                        .table(Products::Table)
                        .col(Products::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        ClientId,
        Code,
        Description,
        UnitOfMeasure,
        Active,
        CreatedAt,
    }
}

mod m20240101_000003_create_depots_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_depots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Depots::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Depots::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Depots::Name).string().not_null())
                        .col(ColumnDef::new(Depots::Address).string().null())
                        .col(
                            ColumnDef::new(Depots::TotalCapacity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Depots::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Depots::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Depots::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Depots {
        Table,
        Id,
        Name,
        Address,
        TotalCapacity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_racks_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_racks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Racks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Racks::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Racks::DepotId).uuid().not_null())
                        .col(ColumnDef::new(Racks::Code).string().not_null())
                        .col(ColumnDef::new(Racks::Rows).integer().not_null())
                        .col(ColumnDef::new(Racks::Columns).integer().not_null())
                        .col(ColumnDef::new(Racks::Depth).integer().not_null())
                        .col(ColumnDef::new(Racks::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_racks_depot_code")
                        .table(Racks::Table)
                        .col(Racks::DepotId)
                        .col(Racks::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Racks::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Racks {
        Table,
        Id,
        DepotId,
        Code,
        Rows,
        Columns,
        Depth,
        CreatedAt,
    }
}

mod m20240101_000005_create_slots_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_slots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Slots::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Slots::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Slots::RackId).uuid().not_null())
                        .col(ColumnDef::new(Slots::Row).integer().not_null())
                        .col(ColumnDef::new(Slots::Column).integer().not_null())
                        .col(ColumnDef::new(Slots::Depth).integer().not_null())
                        .col(ColumnDef::new(Slots::Code).string().not_null())
                        .col(ColumnDef::new(Slots::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Slots::PalletId).uuid().null())
                        .col(ColumnDef::new(Slots::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Coordinates are unique within a rack; the derived code follows.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_slots_rack_coordinates")
                        .table(Slots::Table)
                        .col(Slots::RackId)
                        .col(Slots::Row)
                        .col(Slots::Column)
                        .col(Slots::Depth)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_slots_code")
                        .table(Slots::Table)
                        .col(Slots::Code)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_slots_rack_status")
                        .table(Slots::Table)
                        .col(Slots::RackId)
                        .col(Slots::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Slots::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Slots {
        Table,
        Id,
        RackId,
        Row,
        Column,
        Depth,
        Code,
        Status,
        PalletId,
        UpdatedAt,
    }
}

mod m20240101_000006_create_pallets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_pallets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pallets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Pallets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Pallets::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Pallets::LotCode).string().not_null())
                        .col(ColumnDef::new(Pallets::Quantity).decimal().not_null())
                        .col(
                            ColumnDef::new(Pallets::Completeness)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Pallets::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Pallets::SlotId).uuid().null())
                        .col(ColumnDef::new(Pallets::EnteredAt).timestamp().not_null())
                        .col(ColumnDef::new(Pallets::ExitedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pallets_product_id")
                        .table(Pallets::Table)
                        .col(Pallets::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pallets_slot_id")
                        .table(Pallets::Table)
                        .col(Pallets::SlotId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pallets::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Pallets {
        Table,
        Id,
        ProductId,
        LotCode,
        Quantity,
        Completeness,
        Active,
        SlotId,
        EnteredAt,
        ExitedAt,
    }
}

mod m20240101_000007_create_shipments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_shipments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shipments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Shipments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::ShipmentType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::Origin)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipments::DocumentNumber).string().not_null())
                        .col(
                            ColumnDef::new(Shipments::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipments::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Shipments::DepotId).uuid().not_null())
                        .col(ColumnDef::new(Shipments::OperatorId).uuid().not_null())
                        .col(ColumnDef::new(Shipments::ApproverId).uuid().null())
                        .col(ColumnDef::new(Shipments::Notes).string().null())
                        .col(ColumnDef::new(Shipments::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipments_client_id")
                        .table(Shipments::Table)
                        .col(Shipments::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipments_depot_status")
                        .table(Shipments::Table)
                        .col(Shipments::DepotId)
                        .col(Shipments::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Shipments {
        Table,
        Id,
        ShipmentType,
        Origin,
        DocumentNumber,
        Status,
        ClientId,
        DepotId,
        OperatorId,
        ApproverId,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000008_create_shipment_lines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_shipment_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShipmentLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShipmentLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShipmentLines::ShipmentId).uuid().not_null())
                        .col(ColumnDef::new(ShipmentLines::Position).integer().not_null())
                        .col(ColumnDef::new(ShipmentLines::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ShipmentLines::LotCode).string().not_null())
                        .col(ColumnDef::new(ShipmentLines::Quantity).decimal().not_null())
                        .col(ColumnDef::new(ShipmentLines::PalletId).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipment_lines_shipment_id")
                        .table(ShipmentLines::Table)
                        .col(ShipmentLines::ShipmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShipmentLines::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ShipmentLines {
        Table,
        Id,
        ShipmentId,
        Position,
        ProductId,
        LotCode,
        Quantity,
        PalletId,
    }
}

mod m20240101_000009_create_movements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Movements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Movements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Movements::PalletId).uuid().not_null())
                        .col(ColumnDef::new(Movements::OriginSlotId).uuid().not_null())
                        .col(
                            ColumnDef::new(Movements::DestinationSlotId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Movements::OperatorId).uuid().not_null())
                        .col(ColumnDef::new(Movements::Reason).string().null())
                        .col(ColumnDef::new(Movements::MovedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_pallet_id")
                        .table(Movements::Table)
                        .col(Movements::PalletId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_moved_at")
                        .table(Movements::Table)
                        .col(Movements::MovedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Movements::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Movements {
        Table,
        Id,
        PalletId,
        OriginSlotId,
        DestinationSlotId,
        OperatorId,
        Reason,
        MovedAt,
    }
}
