//! Category business logic - the category forest and what a user may log against.
//!
//! Categories form a forest through parent pointers. Retiring a category disables
//! it and everything below it; following a category unlocks every leaf below it.
//! Queries that need ancestry load all rows once into an in-memory index and walk
//! parent pointers in memory instead of issuing one query per level.

use crate::{
    config::categories::CategorySeed,
    core::{deadline::bounded, follow},
    entities::category,
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// A category as shown to users, with the title of its topmost ancestor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category id
    pub id: i64,
    /// Category title
    pub title: String,
    /// Title of the root ancestor, or the category's own title for roots
    pub root_title: String,
}

/// One node of the category forest, annotated for a requesting user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    /// Category id
    pub id: i64,
    /// Parent id, None for roots
    pub parent_id: Option<i64>,
    /// Category title
    pub title: String,
    /// Whether the category itself is retired
    pub is_retired: bool,
    /// Whether the requesting user follows this exact category
    pub is_followed: bool,
    /// Child nodes in ascending id order
    pub children: Vec<CategoryTree>,
}

/// Payload for [`create`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    /// Title of the new category
    pub title: String,
    /// Parent to attach to; None creates a root
    #[serde(default)]
    pub parent_id: Option<i64>,
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidTitle {
            message: "Category title cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// All category rows keyed by id, plus the set of ids that have children.
pub(crate) struct CategoryIndex {
    by_id: BTreeMap<i64, category::Model>,
    with_children: HashSet<i64>,
}

impl CategoryIndex {
    pub(crate) async fn load<C: ConnectionTrait>(db: &C) -> Result<Self> {
        let rows = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(db)
            .await?;
        Ok(Self::from_rows(rows))
    }

    pub(crate) fn from_rows(rows: Vec<category::Model>) -> Self {
        let with_children = rows.iter().filter_map(|row| row.parent_id).collect();
        let by_id = rows.into_iter().map(|row| (row.id, row)).collect();
        Self {
            by_id,
            with_children,
        }
    }

    fn is_leaf(&self, id: i64) -> bool {
        !self.with_children.contains(&id)
    }

    /// The category itself followed by each ancestor up to its root. Stops at a
    /// dangling parent id, and after one visit per row so a corrupt cycle cannot
    /// loop forever.
    fn ancestry(&self, id: i64) -> impl Iterator<Item = &category::Model> + '_ {
        let mut next = self.by_id.get(&id);
        let mut remaining = self.by_id.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let current = next?;
            next = current.parent_id.and_then(|parent| self.by_id.get(&parent));
            Some(current)
        })
    }

    fn view(&self, model: &category::Model) -> Category {
        let root_title = self
            .ancestry(model.id)
            .last()
            .map_or_else(|| model.title.clone(), |root| root.title.clone());
        Category {
            id: model.id,
            title: model.title.clone(),
            root_title,
        }
    }

    /// A category is unlocked when the user follows it or any ancestor and
    /// nothing on its ancestry (itself included) is retired.
    fn is_unlocked(&self, id: i64, followed: &HashSet<i64>) -> bool {
        let mut unlocked = false;
        for node in self.ancestry(id) {
            if node.is_retired {
                return false;
            }
            unlocked |= followed.contains(&node.id);
        }
        unlocked
    }

    fn leafs(&self, followed: &HashSet<i64>) -> Vec<Category> {
        self.by_id
            .values()
            .filter(|model| self.is_leaf(model.id) && self.is_unlocked(model.id, followed))
            .map(|model| self.view(model))
            .collect()
    }

    pub(crate) fn forest(&self, followed: &HashSet<i64>) -> Vec<CategoryTree> {
        let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut roots = Vec::new();

        for model in self.by_id.values() {
            match model.parent_id {
                None => roots.push(model.id),
                Some(parent_id) if self.by_id.contains_key(&parent_id) => {
                    children_of.entry(parent_id).or_default().push(model.id);
                }
                Some(parent_id) => {
                    warn!(
                        category_id = model.id,
                        parent_id, "dropping orphaned category from tree"
                    );
                }
            }
        }

        roots
            .into_iter()
            .filter_map(|id| self.assemble(id, &children_of, followed))
            .collect()
    }

    fn assemble(
        &self,
        id: i64,
        children_of: &HashMap<i64, Vec<i64>>,
        followed: &HashSet<i64>,
    ) -> Option<CategoryTree> {
        let model = self.by_id.get(&id)?;
        let children = children_of
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|child| self.assemble(*child, children_of, followed))
                    .collect()
            })
            .unwrap_or_default();

        Some(CategoryTree {
            id: model.id,
            parent_id: model.parent_id,
            title: model.title.clone(),
            is_retired: model.is_retired,
            is_followed: followed.contains(&model.id),
            children,
        })
    }
}

/// Walks parent pointers up from `model` with point lookups.
async fn root_title_of<C: ConnectionTrait>(db: &C, model: &category::Model) -> Result<String> {
    let mut current = model.clone();
    let mut visited = HashSet::from([current.id]);

    while let Some(parent_id) = current.parent_id {
        if !visited.insert(parent_id) {
            break;
        }
        match category::Entity::find_by_id(parent_id).one(db).await? {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Ok(current.title)
}

async fn view_of<C: ConnectionTrait>(db: &C, id: i64) -> Result<Category> {
    let model = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id })?;
    let root_title = root_title_of(db, &model).await?;
    Ok(Category {
        id: model.id,
        title: model.title,
        root_title,
    })
}

/// Creates a root category, or a child when `parent_id` is given.
///
/// The parent must exist. Returns the new category with its root ancestor's title.
#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, input: CreateCategoryInput) -> Result<Category> {
    bounded("create_category", async {
        let title = validate_title(&input.title)?;

        if let Some(parent_id) = input.parent_id {
            category::Entity::find_by_id(parent_id)
                .one(db)
                .await?
                .ok_or(Error::CategoryNotFound { id: parent_id })?;
        }

        let model = category::ActiveModel {
            title: Set(title),
            parent_id: Set(input.parent_id),
            is_retired: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await?;
        info!(category_id = model.id, "category created");

        let root_title = root_title_of(db, &model).await?;
        Ok(Category {
            id: model.id,
            title: model.title,
            root_title,
        })
    })
    .await
}

/// Renames a category.
#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: i64, title: &str) -> Result<Category> {
    bounded("update_category", async {
        let title = validate_title(title)?;

        let result = category::Entity::update_many()
            .col_expr(category::Column::Title, Expr::value(title))
            .filter(category::Column::Id.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::CategoryNotFound { id });
        }

        view_of(db, id).await
    })
    .await
}

/// Flips the retired flag of a category in one statement.
#[instrument(skip(db))]
pub async fn toggle_retire(db: &DatabaseConnection, id: i64) -> Result<()> {
    bounded("toggle_retire_category", async {
        let result = category::Entity::update_many()
            .col_expr(
                category::Column::IsRetired,
                Expr::col(category::Column::IsRetired).eq(false),
            )
            .filter(category::Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::NotToggled { id });
        }
        info!(category_id = id, "category retirement toggled");
        Ok(())
    })
    .await
}

/// Leaf categories the user may log time against, in ascending id order.
///
/// A leaf qualifies when the user follows it or one of its ancestors and no
/// category on its ancestry, the leaf included, is retired.
#[instrument(skip(db))]
pub async fn leafs(db: &DatabaseConnection, user_id: i64) -> Result<Vec<Category>> {
    bounded("category_leafs", async {
        let index = CategoryIndex::load(db).await?;
        let followed: HashSet<i64> = follow::followed_category_ids(db, user_id)
            .await?
            .into_iter()
            .collect();

        let leafs = index.leafs(&followed);
        debug!(user_id, count = leafs.len(), "resolved leaf categories");
        Ok(leafs)
    })
    .await
}

/// The whole category forest, retired nodes included, annotated with the
/// user's follow status.
#[instrument(skip(db))]
pub async fn tree(db: &DatabaseConnection, user_id: i64) -> Result<Vec<CategoryTree>> {
    bounded("category_tree", async {
        let index = CategoryIndex::load(db).await?;
        let followed: HashSet<i64> = follow::followed_category_ids(db, user_id)
            .await?
            .into_iter()
            .collect();
        Ok(index.forest(&followed))
    })
    .await
}

/// Looks up one category with its root title.
#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i64) -> Result<Category> {
    bounded("get_category", view_of(db, id)).await
}

/// Every category with its root title, in ascending id order.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection) -> Result<Vec<Category>> {
    bounded("list_categories", async {
        let index = CategoryIndex::load(db).await?;
        Ok(index.by_id.values().map(|model| index.view(model)).collect())
    })
    .await
}

/// Inserts the configured category tree when no categories exist yet.
///
/// Returns the number of categories inserted; zero when the table already had rows.
#[instrument(skip(db, seeds))]
pub async fn seed_categories(db: &DatabaseConnection, seeds: &[CategorySeed]) -> Result<usize> {
    let existing = category::Entity::find().count(db).await?;
    if existing > 0 {
        debug!(existing, "categories already present, skipping seed");
        return Ok(0);
    }

    let txn = db.begin().await?;
    let mut pending: Vec<(&CategorySeed, Option<i64>)> =
        seeds.iter().rev().map(|seed| (seed, None)).collect();
    let mut inserted = 0;

    while let Some((seed, parent_id)) = pending.pop() {
        let model = category::ActiveModel {
            title: Set(validate_title(&seed.title)?),
            parent_id: Set(parent_id),
            is_retired: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        inserted += 1;

        pending.extend(
            seed.children
                .iter()
                .rev()
                .map(|child| (child, Some(model.id))),
        );
    }

    txn.commit().await?;
    info!(inserted, "seeded categories from configuration");
    Ok(inserted)
}
