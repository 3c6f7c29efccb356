//! Transfers move money between two accounts.
//!
//! The two accounts are expected to differ. That rule is checked by the HTTP
//! layer; the table itself accepts a self-transfer.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub outgoing_account_id: Uuid,
    pub incoming_account_id: Uuid,
    pub amount: Money,
    pub timestamp: DateTimeUtc,
    pub comment: Option<String>,
}

impl Model {
    pub fn new(
        outgoing_account_id: Uuid,
        incoming_account_id: Uuid,
        amount: Money,
        timestamp: DateTimeUtc,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            outgoing_account_id,
            incoming_account_id,
            amount,
            timestamp,
            comment,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::OutgoingAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    OutgoingAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::IncomingAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    IncomingAccount,
}

/// Two relations point at `accounts`, so `Related` cannot be implemented;
/// these linked definitions load either side explicitly.
pub struct OutgoingAccountLink;

impl Linked for OutgoingAccountLink {
    type FromEntity = Entity;
    type ToEntity = super::accounts::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::OutgoingAccount.def()]
    }
}

pub struct IncomingAccountLink;

impl Linked for IncomingAccountLink {
    type FromEntity = Entity;
    type ToEntity = super::accounts::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::IncomingAccount.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for ActiveModel {
    fn from(value: &Model) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            outgoing_account_id: ActiveValue::Set(value.outgoing_account_id),
            incoming_account_id: ActiveValue::Set(value.incoming_account_id),
            amount: ActiveValue::Set(value.amount),
            timestamp: ActiveValue::Set(value.timestamp),
            comment: ActiveValue::Set(value.comment.clone()),
        }
    }
}
