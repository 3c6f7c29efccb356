//! Expenses: money leaving an account under a category, optionally tagged.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub account_id: Uuid,
    pub amount: Money,
    pub timestamp: DateTimeUtc,
    pub comment: Option<String>,
}

impl Model {
    pub fn new(
        category_id: Uuid,
        account_id: Uuid,
        amount: Money,
        timestamp: DateTimeUtc,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            account_id,
            amount,
            timestamp,
            comment,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Account,
    #[sea_orm(has_many = "super::expense_tags::Entity")]
    ExpenseTags,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::expense_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseTags.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::expense_tags::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::expense_tags::Relation::Expense.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for ActiveModel {
    fn from(value: &Model) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            category_id: ActiveValue::Set(value.category_id),
            account_id: ActiveValue::Set(value.account_id),
            amount: ActiveValue::Set(value.amount),
            timestamp: ActiveValue::Set(value.timestamp),
            comment: ActiveValue::Set(value.comment.clone()),
        }
    }
}
