use std::collections::HashMap;

use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use super::models::Category;
use super::slug::{slugify, title_case};
use crate::error::AppError;
use crate::storage::{InventoryStorage, new_id, now_ts};

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

impl InventoryStorage {
    /// 全部分类（按名称排序），供表单下拉使用
    pub async fn list_category_options(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query("SELECT id, name, slug FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("list categories: {e}")))?;
        Ok(rows.iter().map(row_to_category).collect())
    }

    /// 批量查询多个商品的分类，避免逐条往返
    pub async fn categories_for_products(
        &self,
        product_ids: &[String],
    ) -> Result<HashMap<String, Vec<Category>>, AppError> {
        let mut map: HashMap<String, Vec<Category>> = HashMap::new();
        if product_ids.is_empty() {
            return Ok(map);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT cp.product_id, c.id, c.name, c.slug FROM category_product cp \
             JOIN categories c ON c.id = cp.category_id WHERE cp.product_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in product_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY c.name ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("query product categories: {e}")))?;
        for r in rows {
            let product_id: String = r.get("product_id");
            map.entry(product_id).or_default().push(row_to_category(&r));
        }
        Ok(map)
    }
}

/// 按名称同步商品的分类集合（在调用方事务内执行）。
///
/// 名称先 trim 并丢弃空值，按 slug 去重；不存在的分类以标题格式名称新建。
/// 空列表会清空商品的全部分类。返回按名称排序的最终分类。
pub async fn sync_for_product(
    conn: &mut SqliteConnection,
    product_id: &str,
    names: &[String],
) -> Result<Vec<Category>, AppError> {
    let mut wanted: Vec<(String, String)> = Vec::new();
    for raw in names {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }
        let slug = slugify(name);
        if slug.is_empty() || wanted.iter().any(|(s, _)| *s == slug) {
            continue;
        }
        wanted.push((slug, title_case(name)));
    }

    let mut categories = Vec::with_capacity(wanted.len());
    for (slug, name) in &wanted {
        let now = now_ts();
        sqlx::query(
            "INSERT OR IGNORE INTO categories(id, name, slug, created_at, updated_at) VALUES(?, ?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(name)
        .bind(slug)
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(format!("insert category: {e}")))?;

        let row = sqlx::query(
            "SELECT id, name, slug FROM categories WHERE slug = ? OR name = ? ORDER BY (slug = ?) DESC LIMIT 1",
        )
        .bind(slug)
        .bind(name)
        .bind(slug)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::Database(format!("load category {slug}: {e}")))?;
        let category = row_to_category(&row);
        if !categories.iter().any(|c: &Category| c.id == category.id) {
            categories.push(category);
        }
    }

    sqlx::query("DELETE FROM category_product WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(format!("clear product categories: {e}")))?;

    let now = now_ts();
    for c in &categories {
        sqlx::query(
            "INSERT INTO category_product(product_id, category_id, created_at) VALUES(?, ?, ?)",
        )
        .bind(product_id)
        .bind(&c.id)
        .bind(&now)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::Database(format!("attach category: {e}")))?;
    }

    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
}
