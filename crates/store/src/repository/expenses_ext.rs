//! Tag links of expenses.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{ResultStore, expense_tags, expenses, tags};

use super::Repository;

impl Repository<'_, expenses::Entity> {
    /// Ids of the tags attached to `expense_id`.
    pub async fn tag_ids(&self, expense_id: Uuid) -> ResultStore<Vec<Uuid>> {
        let mut by_expense = self.tag_ids_for(&[expense_id]).await?;
        Ok(by_expense.remove(&expense_id).unwrap_or_default())
    }

    /// Tag ids of several expenses in a single query.
    ///
    /// Expenses without tags are absent from the map.
    pub async fn tag_ids_for(&self, expense_ids: &[Uuid]) -> ResultStore<HashMap<Uuid, Vec<Uuid>>> {
        if expense_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = expense_tags::Entity::find()
            .filter(expense_tags::Column::ExpenseId.is_in(expense_ids.iter().copied()))
            .order_by_asc(expense_tags::Column::TagId)
            .all(self.connection())
            .await?;

        let mut by_expense: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            by_expense.entry(link.expense_id).or_default().push(link.tag_id);
        }
        Ok(by_expense)
    }

    /// Tags attached to `expense`.
    pub async fn tags(&self, expense: &expenses::Model) -> ResultStore<Vec<tags::Model>> {
        self.find_related::<tags::Entity>(expense).await
    }

    /// Stages links from `expense_id` to each tag. Duplicate ids are linked once.
    pub fn stage_tags(&self, expense_id: Uuid, tag_ids: &[Uuid]) {
        let links = self.session().expense_tags();
        let mut seen = Vec::with_capacity(tag_ids.len());
        for tag_id in tag_ids {
            if seen.contains(tag_id) {
                continue;
            }
            seen.push(*tag_id);
            links.insert(&expense_tags::Model {
                expense_id,
                tag_id: *tag_id,
            });
        }
    }

    /// Stages the removal of every current link followed by the new ones.
    pub fn replace_tags(&self, expense_id: Uuid, tag_ids: &[Uuid]) {
        self.session()
            .expense_tags()
            .delete_with_filter(expense_tags::Column::ExpenseId.eq(expense_id));
        self.stage_tags(expense_id, tag_ids);
    }
}
