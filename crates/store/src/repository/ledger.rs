//! Queries shared by incomes and expenses.
//!
//! Every listing is ordered newest first. Date ranges include both bounds.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use crate::{Money, ResultStore, expenses, incomes};

use super::Repository;

/// An entity booked against one account under one category.
pub trait LedgerEntity: EntityTrait {
    fn id_column() -> Self::Column;
    fn account_column() -> Self::Column;
    fn category_column() -> Self::Column;
    fn amount_column() -> Self::Column;
    fn timestamp_column() -> Self::Column;
}

impl LedgerEntity for incomes::Entity {
    fn id_column() -> Self::Column {
        incomes::Column::Id
    }

    fn account_column() -> Self::Column {
        incomes::Column::AccountId
    }

    fn category_column() -> Self::Column {
        incomes::Column::CategoryId
    }

    fn amount_column() -> Self::Column {
        incomes::Column::Amount
    }

    fn timestamp_column() -> Self::Column {
        incomes::Column::Timestamp
    }
}

impl LedgerEntity for expenses::Entity {
    fn id_column() -> Self::Column {
        expenses::Column::Id
    }

    fn account_column() -> Self::Column {
        expenses::Column::AccountId
    }

    fn category_column() -> Self::Column {
        expenses::Column::CategoryId
    }

    fn amount_column() -> Self::Column {
        expenses::Column::Amount
    }

    fn timestamp_column() -> Self::Column {
        expenses::Column::Timestamp
    }
}

fn newest_first<E: LedgerEntity>(select: Select<E>) -> Select<E> {
    select
        .order_by_desc(E::timestamp_column())
        .order_by_desc(E::id_column())
}

impl<E> Repository<'_, E>
where
    E: LedgerEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
    for<'m> E::ActiveModel: From<&'m E::Model>,
{
    pub async fn get_all_ordered_by_date(&self) -> ResultStore<Vec<E::Model>> {
        Ok(newest_first(E::find()).all(self.connection()).await?)
    }

    pub async fn get_by_account(&self, account_id: Uuid) -> ResultStore<Vec<E::Model>> {
        Ok(newest_first(E::find().filter(E::account_column().eq(account_id)))
            .all(self.connection())
            .await?)
    }

    pub async fn get_by_category(&self, category_id: Uuid) -> ResultStore<Vec<E::Model>> {
        Ok(
            newest_first(E::find().filter(E::category_column().eq(category_id)))
                .all(self.connection())
                .await?,
        )
    }

    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultStore<Vec<E::Model>> {
        Ok(
            newest_first(E::find().filter(E::timestamp_column().between(start, end)))
                .all(self.connection())
                .await?,
        )
    }

    pub async fn get_by_account_and_date_range(
        &self,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultStore<Vec<E::Model>> {
        Ok(newest_first(
            E::find()
                .filter(E::account_column().eq(account_id))
                .filter(E::timestamp_column().between(start, end)),
        )
        .all(self.connection())
        .await?)
    }

    /// Sum of `amount` over the account's rows; zero when there are none.
    pub async fn get_total_by_account(&self, account_id: Uuid) -> ResultStore<Money> {
        self.total(E::find().filter(E::account_column().eq(account_id)))
            .await
    }

    /// Sum of `amount` over the category's rows; zero when there are none.
    pub async fn get_total_by_category(&self, category_id: Uuid) -> ResultStore<Money> {
        self.total(E::find().filter(E::category_column().eq(category_id)))
            .await
    }

    async fn total(&self, select: Select<E>) -> ResultStore<Money> {
        let amounts: Vec<Money> = select
            .select_only()
            .column(E::amount_column())
            .into_tuple()
            .all(self.connection())
            .await?;
        Money::try_sum(amounts)
    }
}
