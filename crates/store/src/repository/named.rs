//! Lookups for entities identified by a unique `name`.
//!
//! Accounts, categories and tags share the same surface: exact lookup,
//! ordered listing and a case-insensitive substring search.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};

use crate::{ResultStore, StoreError, accounts, categories, tags};

use super::Repository;

/// An entity whose rows carry a unique, human-facing name.
pub trait NamedEntity: EntityTrait {
    fn name_column() -> Self::Column;

    fn name(model: &Self::Model) -> &str;
}

impl NamedEntity for accounts::Entity {
    fn name_column() -> Self::Column {
        accounts::Column::Name
    }

    fn name(model: &accounts::Model) -> &str {
        &model.name
    }
}

impl NamedEntity for categories::Entity {
    fn name_column() -> Self::Column {
        categories::Column::Name
    }

    fn name(model: &categories::Model) -> &str {
        &model.name
    }
}

impl NamedEntity for tags::Entity {
    fn name_column() -> Self::Column {
        tags::Column::Name
    }

    fn name(model: &tags::Model) -> &str {
        &model.name
    }
}

fn require_name(name: &str) -> ResultStore<&str> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidArgument(
            "name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

impl<E> Repository<'_, E>
where
    E: NamedEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
    for<'m> E::ActiveModel: From<&'m E::Model>,
{
    /// Exact-match lookup. Fails on a blank name before touching the database.
    pub async fn get_by_name(&self, name: &str) -> ResultStore<Option<E::Model>> {
        let name = require_name(name)?;
        Ok(E::find()
            .filter(E::name_column().eq(name))
            .one(self.connection())
            .await?)
    }

    pub async fn exists_by_name(&self, name: &str) -> ResultStore<bool> {
        let name = require_name(name)?;
        self.exists(E::name_column().eq(name)).await
    }

    pub async fn get_all_ordered_by_name(&self) -> ResultStore<Vec<E::Model>> {
        Ok(E::find()
            .order_by_asc(E::name_column())
            .all(self.connection())
            .await?)
    }

    /// Case-insensitive substring search, ordered by name.
    ///
    /// Case folding is Unicode-aware and runs in Rust over the ordered
    /// listing. The pattern is matched as given, surrounding spaces included,
    /// and `%` or `_` have no special meaning. A blank pattern returns every
    /// row, like [`get_all_ordered_by_name`](Self::get_all_ordered_by_name).
    pub async fn search_by_name(&self, pattern: &str) -> ResultStore<Vec<E::Model>> {
        let rows = self.get_all_ordered_by_name().await?;
        if pattern.trim().is_empty() {
            return Ok(rows);
        }

        let needle = pattern.to_lowercase();
        Ok(rows
            .into_iter()
            .filter(|row| E::name(row).to_lowercase().contains(&needle))
            .collect())
    }
}
