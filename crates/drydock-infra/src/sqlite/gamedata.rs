//! SQLite game-data catalogue implementation.
//!
//! Implements `GameDataRepository` from `drydock-core`. Items keep their
//! required skills in `item_required_skills`, ordered by `position`.

use std::collections::HashMap;

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use drydock_core::repository::gamedata::GameDataRepository;
use drydock_types::error::RepositoryError;
use drydock_types::gamedata::{
    GameDataBundle, GameDataImportSummary, ItemGroup, ItemType, ItemTypeId, MarketGroup,
    SKILL_CATEGORY_ID, SkillRequirement,
};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `GameDataRepository`.
pub struct SqliteGameDataRepository {
    pool: DatabasePool,
}

impl SqliteGameDataRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Attach required skills to item rows, preserving row order.
    async fn with_requirements(&self, rows: &[SqliteRow]) -> Result<Vec<ItemType>, RepositoryError> {
        let mut items = rows
            .iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        if items.is_empty() {
            return Ok(items);
        }

        let placeholders = vec!["?"; items.len()].join(", ");
        let sql = format!(
            "SELECT item_id, skill_id, level FROM item_required_skills
             WHERE item_id IN ({placeholders}) ORDER BY item_id, position"
        );
        let mut query = sqlx::query(&sql);
        for item in &items {
            query = query.bind(item.id);
        }
        let req_rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let mut requirements: HashMap<ItemTypeId, Vec<SkillRequirement>> = HashMap::new();
        for row in &req_rows {
            let item_id: ItemTypeId = row.try_get("item_id").map_err(query_err)?;
            let level: i64 = row.try_get("level").map_err(query_err)?;
            requirements.entry(item_id).or_default().push(SkillRequirement {
                skill_id: row.try_get("skill_id").map_err(query_err)?,
                level: to_u8(level, "required level")?,
            });
        }

        for item in &mut items {
            if let Some(reqs) = requirements.remove(&item.id) {
                item.required_skills = reqs;
            }
        }
        Ok(items)
    }
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn to_u8(value: i64, what: &str) -> Result<u8, RepositoryError> {
    u8::try_from(value).map_err(|_| RepositoryError::Query(format!("invalid {what}: {value}")))
}

fn item_from_row(row: &SqliteRow) -> Result<ItemType, RepositoryError> {
    let implant_slot: Option<i64> = row.try_get("implant_slot").map_err(query_err)?;
    Ok(ItemType {
        id: row.try_get("id").map_err(query_err)?,
        group_id: row.try_get("group_id").map_err(query_err)?,
        name: row.try_get("name").map_err(query_err)?,
        description: row.try_get("description").map_err(query_err)?,
        published: row.try_get("published").map_err(query_err)?,
        market_group_id: row.try_get("market_group_id").map_err(query_err)?,
        implant_slot: implant_slot.map(|s| to_u8(s, "implant slot")).transpose()?,
        required_skills: Vec::new(),
    })
}

fn group_from_row(row: &SqliteRow) -> Result<ItemGroup, RepositoryError> {
    Ok(ItemGroup {
        id: row.try_get("id").map_err(query_err)?,
        category_id: row.try_get("category_id").map_err(query_err)?,
        name: row.try_get("name").map_err(query_err)?,
        published: row.try_get("published").map_err(query_err)?,
    })
}

impl GameDataRepository for SqliteGameDataRepository {
    async fn get_item(&self, id: ItemTypeId) -> Result<Option<ItemType>, RepositoryError> {
        Ok(self.get_items(&[id]).await?.into_iter().next())
    }

    async fn get_items(&self, ids: &[ItemTypeId]) -> Result<Vec<ItemType>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM items WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        self.with_requirements(&rows).await
    }

    async fn get_group(&self, id: i64) -> Result<Option<ItemGroup>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM item_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;
        row.as_ref().map(group_from_row).transpose()
    }

    async fn groups_in_category(&self, category_id: i64) -> Result<Vec<ItemGroup>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM item_groups WHERE category_id = ? ORDER BY name")
            .bind(category_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;
        rows.iter().map(group_from_row).collect()
    }

    async fn items_in_group(&self, group_id: i64) -> Result<Vec<ItemType>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM items WHERE group_id = ? ORDER BY name")
            .bind(group_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;
        self.with_requirements(&rows).await
    }

    async fn get_market_group(&self, id: i64) -> Result<Option<MarketGroup>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM market_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => Ok(Some(MarketGroup {
                id: row.try_get("id").map_err(query_err)?,
                name: row.try_get("name").map_err(query_err)?,
                description: row.try_get("description").map_err(query_err)?,
            })),
            None => Ok(None),
        }
    }

    async fn skill_ids(&self) -> Result<Vec<ItemTypeId>, RepositoryError> {
        let rows: Vec<(ItemTypeId,)> = sqlx::query_as(
            "SELECT items.id FROM items
             JOIN item_groups ON item_groups.id = items.group_id
             WHERE item_groups.category_id = ?
             ORDER BY items.id",
        )
        .bind(SKILL_CATEGORY_ID)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn import_bundle(
        &self,
        bundle: &GameDataBundle,
    ) -> Result<GameDataImportSummary, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;
        let mut summary = GameDataImportSummary::default();

        for group in &bundle.market_groups {
            sqlx::query(
                "INSERT INTO market_groups (id, name, description) VALUES (?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, description = excluded.description",
            )
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.description)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
            summary.market_groups += 1;
        }

        for group in &bundle.groups {
            sqlx::query(
                "INSERT INTO item_groups (id, category_id, name, published) VALUES (?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET category_id = excluded.category_id,
                     name = excluded.name, published = excluded.published",
            )
            .bind(group.id)
            .bind(group.category_id)
            .bind(&group.name)
            .bind(group.published)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
            summary.groups += 1;
        }

        for item in &bundle.items {
            sqlx::query(
                "INSERT INTO items (id, group_id, name, description, published, market_group_id, implant_slot)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET group_id = excluded.group_id, name = excluded.name,
                     description = excluded.description, published = excluded.published,
                     market_group_id = excluded.market_group_id, implant_slot = excluded.implant_slot",
            )
            .bind(item.id)
            .bind(item.group_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.published)
            .bind(item.market_group_id)
            .bind(item.implant_slot.map(i64::from))
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

            sqlx::query("DELETE FROM item_required_skills WHERE item_id = ?")
                .bind(item.id)
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;

            for (position, req) in item.required_skills.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO item_required_skills (item_id, position, skill_id, level) VALUES (?, ?, ?, ?)",
                )
                .bind(item.id)
                .bind(position as i64)
                .bind(req.skill_id)
                .bind(i64::from(req.level))
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
                summary.requirements += 1;
            }
            summary.items += 1;
        }

        tx.commit().await.map_err(query_err)?;
        tracing::debug!(
            items = summary.items,
            groups = summary.groups,
            market_groups = summary.market_groups,
            "catalogue bundle written"
        );
        Ok(summary)
    }
}
