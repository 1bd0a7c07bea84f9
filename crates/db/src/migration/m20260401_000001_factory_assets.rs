//! Factory asset register.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(FACTORY_ASSETS_SQL)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DROP_FACTORY_ASSETS_SQL)
            .await?;
        Ok(())
    }
}

const FACTORY_ASSETS_SQL: &str = r"
CREATE TYPE asset_type AS ENUM (
    'building', 'equipment', 'vehicle', 'furniture', 'electronics', 'other'
);

CREATE TABLE factory_assets (
    id                  UUID PRIMARY KEY,
    name                VARCHAR(200) NOT NULL,
    asset_type          asset_type NOT NULL,
    description         TEXT,
    purchase_price      NUMERIC(19, 2) NOT NULL,
    current_value       NUMERIC(19, 2) NOT NULL,
    purchase_date       DATE NOT NULL,
    location            VARCHAR(200),
    supplier            VARCHAR(255),
    warranty_expiry     DATE,
    is_active           BOOLEAN NOT NULL DEFAULT TRUE,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_asset_purchase_price CHECK (purchase_price >= 0),
    CONSTRAINT chk_asset_current_value CHECK (current_value >= 0),
    CONSTRAINT chk_asset_warranty CHECK (warranty_expiry IS NULL OR warranty_expiry >= purchase_date)
);

CREATE INDEX idx_factory_assets_active ON factory_assets(is_active);
";

const DROP_FACTORY_ASSETS_SQL: &str = r"
DROP TABLE IF EXISTS factory_assets CASCADE;
DROP TYPE IF EXISTS asset_type;
";
