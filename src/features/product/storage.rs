use sqlx::{QueryBuilder, Row, Sqlite};

use super::models::{Product, ProductInput};
use crate::error::AppError;
use crate::features::category::storage::sync_for_product;
use crate::features::supplier::SupplierSummary;
use crate::pagination::PageRequest;
use crate::storage::{InventoryStorage, like_pattern, map_write_error, now_ts};

const PRODUCT_SELECT: &str = "SELECT p.id, p.supplier_id, p.name, p.sku, p.description, p.price, p.stock, \
     p.image_path, p.created_at, p.updated_at, \
     s.name AS supplier_name, s.email AS supplier_email, s.image_path AS supplier_image_path \
     FROM products p LEFT JOIN suppliers s ON s.id = p.supplier_id";

fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    let Some(search) = search else {
        return;
    };
    let pattern = like_pattern(search);
    qb.push(" WHERE (p.name LIKE ")
        .push_bind(pattern.clone())
        .push(" ESCAPE '\\' OR p.sku LIKE ")
        .push_bind(pattern)
        .push(" ESCAPE '\\')");
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Product {
    let supplier_id: String = row.get("supplier_id");
    let supplier = row
        .try_get::<Option<String>, _>("supplier_name")
        .ok()
        .flatten()
        .map(|name| SupplierSummary {
            id: supplier_id.clone(),
            name,
            email: row.try_get("supplier_email").ok().flatten(),
            image_path: row.try_get("supplier_image_path").ok().flatten(),
            image_url: None,
        });
    Product {
        id: row.get("id"),
        supplier_id,
        name: row.get("name"),
        sku: row.get("sku"),
        description: row.try_get("description").ok().flatten(),
        price: row.try_get("price").unwrap_or(0.0),
        stock: row.try_get("stock").unwrap_or(0),
        image_path: row.try_get("image_path").ok().flatten(),
        image_url: None,
        supplier,
        categories: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl InventoryStorage {
    /// 为一批商品填充分类
    async fn attach_categories(&self, mut products: Vec<Product>) -> Result<Vec<Product>, AppError> {
        let ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
        let mut map = self.categories_for_products(&ids).await?;
        for p in &mut products {
            p.categories = map.remove(&p.id).unwrap_or_default();
        }
        Ok(products)
    }

    async fn fetch_products(&self, mut qb: QueryBuilder<'_, Sqlite>, ctx: &str) -> Result<Vec<Product>, AppError> {
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("{ctx}: {e}")))?;
        self.attach_categories(rows.iter().map(row_to_product).collect())
            .await
    }

    /// 分页查询商品（按名称排序），search 匹配名称或 SKU
    pub async fn list_products(&self, req: &PageRequest) -> Result<(Vec<Product>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(1) AS c FROM products p");
        push_search(&mut count_qb, req.search.as_deref());
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("count products: {e}")))?
            .try_get("c")
            .unwrap_or(0);

        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        push_search(&mut qb, req.search.as_deref());
        qb.push(" ORDER BY p.name ASC, p.id ASC LIMIT ")
            .push_bind(req.limit())
            .push(" OFFSET ")
            .push_bind(req.offset());
        let items = self.fetch_products(qb, "list products").await?;
        Ok((items, total))
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.id = ").push_bind(id.to_string());
        Ok(self.fetch_products(qb, "get product").await?.into_iter().next())
    }

    /// 库存最低的商品（库存相同按名称）
    pub async fn low_stock_products(&self, limit: i64) -> Result<Vec<Product>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" ORDER BY p.stock ASC, p.name ASC LIMIT ").push_bind(limit);
        self.fetch_products(qb, "low stock products").await
    }

    /// 最近创建的商品
    pub async fn recent_products(&self, limit: i64) -> Result<Vec<Product>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ").push_bind(limit);
        self.fetch_products(qb, "recent products").await
    }

    /// 商品与供应商总数
    pub async fn inventory_totals(&self) -> Result<(i64, i64), AppError> {
        let row = sqlx::query(
            "SELECT (SELECT COUNT(1) FROM products) AS products, (SELECT COUNT(1) FROM suppliers) AS suppliers",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("inventory totals: {e}")))?;
        Ok((
            row.try_get("products").unwrap_or(0),
            row.try_get("suppliers").unwrap_or(0),
        ))
    }

    /// 新建商品并同步分类（同一事务）
    pub async fn insert_product(
        &self,
        id: &str,
        input: &ProductInput,
        image_path: Option<&str>,
    ) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("begin tx: {e}")))?;
        let now = now_ts();
        sqlx::query(
            "INSERT INTO products(id, supplier_id, name, sku, description, price, stock, image_path, created_at, updated_at) \
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&input.supplier_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(image_path)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "insert product"))?;

        sync_for_product(&mut tx, id, &input.categories).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("commit tx: {e}")))?;
        Ok(())
    }

    /// 更新商品并同步分类；记录不存在时返回 false
    pub async fn update_product(
        &self,
        id: &str,
        input: &ProductInput,
        image_path: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("begin tx: {e}")))?;
        let res = sqlx::query(
            "UPDATE products SET supplier_id = ?, name = ?, sku = ?, description = ?, price = ?, stock = ?, \
             image_path = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&input.supplier_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(image_path)
        .bind(now_ts())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "update product"))?;
        if res.rows_affected() == 0 {
            return Ok(false);
        }

        sync_for_product(&mut tx, id, &input.categories).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("commit tx: {e}")))?;
        Ok(true)
    }

    /// 删除商品，返回其图片路径；记录不存在时返回 None
    pub async fn delete_product(&self, id: &str) -> Result<Option<Option<String>>, AppError> {
        let row = sqlx::query("DELETE FROM products WHERE id = ? RETURNING image_path")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("delete product: {e}")))?;
        Ok(row.map(|r| r.try_get::<Option<String>, _>("image_path").ok().flatten()))
    }
}
