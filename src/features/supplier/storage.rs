use sqlx::{QueryBuilder, Row, Sqlite};

use super::models::{Supplier, SupplierInput, SupplierOption};
use crate::error::AppError;
use crate::pagination::PageRequest;
use crate::storage::{InventoryStorage, like_pattern, map_write_error, now_ts};

const SEARCH_COLUMNS: [&str; 5] = ["s.name", "s.contact_name", "s.email", "s.phone", "s.address"];

const SUPPLIER_COLUMNS: &str = "s.id, s.name, s.contact_name, s.email, s.phone, s.address, s.image_path, \
     s.created_at, s.updated_at, \
     (SELECT COUNT(1) FROM products p WHERE p.supplier_id = s.id) AS products_count";

fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    let Some(search) = search else {
        return;
    };
    let pattern = like_pattern(search);
    qb.push(" WHERE (");
    for (i, col) in SEARCH_COLUMNS.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*col)
            .push(" LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\'");
    }
    qb.push(")");
}

fn row_to_supplier(row: &sqlx::sqlite::SqliteRow) -> Supplier {
    Supplier {
        id: row.get("id"),
        name: row.get("name"),
        contact_name: row.try_get("contact_name").ok().flatten(),
        email: row.try_get("email").ok().flatten(),
        phone: row.try_get("phone").ok().flatten(),
        address: row.try_get("address").ok().flatten(),
        image_path: row.try_get("image_path").ok().flatten(),
        image_url: None,
        products_count: row.try_get("products_count").unwrap_or(0),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl InventoryStorage {
    /// 分页查询供应商（按名称排序），返回当前页与总数
    pub async fn list_suppliers(&self, req: &PageRequest) -> Result<(Vec<Supplier>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(1) AS c FROM suppliers s");
        push_search(&mut count_qb, req.search.as_deref());
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("count suppliers: {e}")))?
            .try_get("c")
            .unwrap_or(0);

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers s"));
        push_search(&mut qb, req.search.as_deref());
        qb.push(" ORDER BY s.name ASC, s.id ASC LIMIT ")
            .push_bind(req.limit())
            .push(" OFFSET ")
            .push_bind(req.offset());
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("list suppliers: {e}")))?;

        Ok((rows.iter().map(row_to_supplier).collect(), total))
    }

    /// 全部供应商的下拉项（`image_url` 由调用方填充）
    pub async fn list_supplier_options(&self) -> Result<Vec<(SupplierOption, Option<String>)>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, contact_name, email, phone, image_path FROM suppliers ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("list supplier options: {e}")))?;

        Ok(rows
            .iter()
            .map(|r| {
                let option = SupplierOption {
                    id: r.get("id"),
                    name: r.get("name"),
                    contact_name: r.try_get("contact_name").ok().flatten(),
                    email: r.try_get("email").ok().flatten(),
                    phone: r.try_get("phone").ok().flatten(),
                    image_url: None,
                };
                (option, r.try_get("image_path").ok().flatten())
            })
            .collect())
    }

    pub async fn get_supplier(&self, id: &str) -> Result<Option<Supplier>, AppError> {
        let row = sqlx::query(&format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers s WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("get supplier: {e}")))?;
        Ok(row.as_ref().map(row_to_supplier))
    }

    pub async fn supplier_exists(&self, id: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 AS one FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("check supplier: {e}")))?;
        Ok(row.is_some())
    }

    pub async fn insert_supplier(
        &self,
        id: &str,
        input: &SupplierInput,
        image_path: Option<&str>,
    ) -> Result<(), AppError> {
        let now = now_ts();
        sqlx::query(
            "INSERT INTO suppliers(id, name, contact_name, email, phone, address, image_path, created_at, updated_at) \
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(image_path)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "insert supplier"))?;
        Ok(())
    }

    /// 更新供应商；记录不存在时返回 false
    pub async fn update_supplier(
        &self,
        id: &str,
        input: &SupplierInput,
        image_path: Option<&str>,
    ) -> Result<bool, AppError> {
        let res = sqlx::query(
            "UPDATE suppliers SET name = ?, contact_name = ?, email = ?, phone = ?, address = ?, \
             image_path = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(image_path)
        .bind(now_ts())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update supplier"))?;
        Ok(res.rows_affected() > 0)
    }

    /// 删除供应商（商品级联删除），返回需要清理的图片路径；记录不存在时返回 None
    pub async fn delete_supplier(&self, id: &str) -> Result<Option<Vec<String>>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("begin tx: {e}")))?;

        let Some(row) = sqlx::query("SELECT image_path FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("load supplier: {e}")))?
        else {
            return Ok(None);
        };

        let mut paths: Vec<String> = Vec::new();
        if let Some(p) = row.try_get::<Option<String>, _>("image_path").ok().flatten() {
            paths.push(p);
        }
        let product_rows = sqlx::query(
            "SELECT image_path FROM products WHERE supplier_id = ? AND image_path IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("load supplier products: {e}")))?;
        paths.extend(
            product_rows
                .iter()
                .filter_map(|r| r.try_get::<Option<String>, _>("image_path").ok().flatten()),
        );

        sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("delete supplier: {e}")))?;
        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("commit tx: {e}")))?;

        Ok(Some(paths))
    }
}
