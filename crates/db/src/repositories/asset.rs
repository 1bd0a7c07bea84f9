//! Factory asset register repository.

use chrono::Utc;
use kassa_core::assets::types::validate_value;
use kassa_core::assets::{AssetError, CreateAssetInput, FactoryAsset};
use kassa_shared::types::AssetId;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::factory_assets;
use crate::entities::sea_orm_active_enums::AssetType as DbAssetType;
use crate::error::RepositoryResult;

/// Factory asset repository.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    db: DatabaseConnection,
}

impl AssetRepository {
    /// Creates a new asset repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers an asset.
    ///
    /// # Errors
    ///
    /// Returns `AssetError` for a blank name, a bad value or a warranty that
    /// ends before the purchase.
    pub async fn create_asset(&self, input: CreateAssetInput) -> RepositoryResult<FactoryAsset> {
        input.validate()?;

        let now = Utc::now().into();
        let model = factory_assets::ActiveModel {
            id: Set(AssetId::new().into_inner()),
            name: Set(input.name.trim().to_string()),
            asset_type: Set(DbAssetType::from(input.asset_type)),
            description: Set(input.description),
            purchase_price: Set(input.purchase_price),
            current_value: Set(input.current_value),
            purchase_date: Set(input.purchase_date),
            location: Set(input.location),
            supplier: Set(input.supplier),
            warranty_expiry: Set(input.warranty_expiry),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            asset_id = %model.id,
            name = %model.name,
            value = %model.current_value,
            "Factory asset registered"
        );
        Ok(to_asset(model))
    }

    /// Gets an asset by ID.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::NotFound` if the asset does not exist.
    pub async fn get_asset(&self, id: AssetId) -> RepositoryResult<FactoryAsset> {
        let model = factory_assets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))?;
        Ok(to_asset(model))
    }

    /// Lists assets, most valuable first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_assets(&self, include_inactive: bool) -> RepositoryResult<Vec<FactoryAsset>> {
        let mut query = factory_assets::Entity::find();
        if !include_inactive {
            query = query.filter(factory_assets::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_desc(factory_assets::Column::CurrentValue)
            .order_by_asc(factory_assets::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_asset).collect())
    }

    /// Sets the current value of an active asset.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Inactive` or a value error.
    pub async fn revalue_asset(
        &self,
        id: AssetId,
        current_value: Decimal,
    ) -> RepositoryResult<FactoryAsset> {
        validate_value("current_value", current_value)?;

        let model = factory_assets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))?;
        if !model.is_active {
            return Err(AssetError::Inactive(id).into());
        }

        let previous = model.current_value;
        let mut active: factory_assets::ActiveModel = model.into();
        active.current_value = Set(current_value);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;

        tracing::info!(asset_id = %id, from = %previous, to = %current_value, "Factory asset revalued");
        Ok(to_asset(updated))
    }

    /// Writes an asset off. It stays listed but no longer counts toward totals.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::NotFound` if the asset does not exist.
    pub async fn retire_asset(&self, id: AssetId) -> RepositoryResult<FactoryAsset> {
        let model = factory_assets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        let mut active: factory_assets::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;

        tracing::info!(asset_id = %id, "Factory asset retired");
        Ok(to_asset(updated))
    }

    /// Sums the current value of active assets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_assets(&self) -> RepositoryResult<Decimal> {
        active_total(&self.db).await
    }
}

/// Sums the current value of active assets on `conn`.
pub(crate) async fn active_total<C>(conn: &C) -> RepositoryResult<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = factory_assets::Entity::find()
        .select_only()
        .column_as(Expr::col(factory_assets::Column::CurrentValue).sum(), "total")
        .filter(factory_assets::Column::IsActive.eq(true))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

fn to_asset(model: factory_assets::Model) -> FactoryAsset {
    FactoryAsset {
        id: AssetId::from_uuid(model.id),
        name: model.name,
        asset_type: model.asset_type.into(),
        description: model.description,
        purchase_price: model.purchase_price,
        current_value: model.current_value,
        purchase_date: model.purchase_date,
        location: model.location,
        supplier: model.supplier,
        warranty_expiry: model.warranty_expiry,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
