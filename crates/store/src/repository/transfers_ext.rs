//! Transfer queries. Listings are ordered newest first; date ranges include
//! both bounds.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Select};
use uuid::Uuid;

use crate::{ResultStore, accounts, transfers};

use super::Repository;

fn newest_first(select: Select<transfers::Entity>) -> Select<transfers::Entity> {
    select
        .order_by_desc(transfers::Column::Timestamp)
        .order_by_desc(transfers::Column::Id)
}

/// Transfers where `account_id` is on either side.
fn touches_account(account_id: Uuid) -> Condition {
    Condition::any()
        .add(transfers::Column::OutgoingAccountId.eq(account_id))
        .add(transfers::Column::IncomingAccountId.eq(account_id))
}

impl Repository<'_, transfers::Entity> {
    pub async fn get_all_ordered_by_date(&self) -> ResultStore<Vec<transfers::Model>> {
        Ok(newest_first(transfers::Entity::find())
            .all(self.connection())
            .await?)
    }

    pub async fn get_by_outgoing_account(
        &self,
        account_id: Uuid,
    ) -> ResultStore<Vec<transfers::Model>> {
        Ok(newest_first(
            transfers::Entity::find()
                .filter(transfers::Column::OutgoingAccountId.eq(account_id)),
        )
        .all(self.connection())
        .await?)
    }

    pub async fn get_by_incoming_account(
        &self,
        account_id: Uuid,
    ) -> ResultStore<Vec<transfers::Model>> {
        Ok(newest_first(
            transfers::Entity::find()
                .filter(transfers::Column::IncomingAccountId.eq(account_id)),
        )
        .all(self.connection())
        .await?)
    }

    /// Union of outgoing and incoming transfers of the account, in one query.
    pub async fn get_by_account(&self, account_id: Uuid) -> ResultStore<Vec<transfers::Model>> {
        Ok(
            newest_first(transfers::Entity::find().filter(touches_account(account_id)))
                .all(self.connection())
                .await?,
        )
    }

    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultStore<Vec<transfers::Model>> {
        Ok(newest_first(
            transfers::Entity::find().filter(transfers::Column::Timestamp.between(start, end)),
        )
        .all(self.connection())
        .await?)
    }

    pub async fn get_by_account_and_date_range(
        &self,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultStore<Vec<transfers::Model>> {
        Ok(newest_first(
            transfers::Entity::find()
                .filter(touches_account(account_id))
                .filter(transfers::Column::Timestamp.between(start, end)),
        )
        .all(self.connection())
        .await?)
    }

    pub async fn outgoing_account(
        &self,
        transfer: &transfers::Model,
    ) -> ResultStore<Option<accounts::Model>> {
        Ok(transfer
            .find_linked(transfers::OutgoingAccountLink)
            .one(self.connection())
            .await?)
    }

    pub async fn incoming_account(
        &self,
        transfer: &transfers::Model,
    ) -> ResultStore<Option<accounts::Model>> {
        Ok(transfer
            .find_linked(transfers::IncomingAccountLink)
            .one(self.connection())
            .await?)
    }
}
