use std::path::Path;
use std::str::FromStr;

use sqlx::{
    ConnectOptions, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

use crate::error::AppError;

/// 库存数据的 SQLite 存储（供应商、商品、分类）。
///
/// 各业务模块通过 `impl InventoryStorage` 扩展自己的查询，连接池在它们之间共享。
#[derive(Clone)]
pub struct InventoryStorage {
    pub pool: SqlitePool,
}

impl InventoryStorage {
    pub async fn connect_sqlite(path: &str, wal: bool) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Internal(format!("创建数据库目录失败: {e}")))?;
        }
        let opt = SqliteConnectOptions::new()
            .filename(Path::new(path))
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(if wal {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            })
            .synchronous(SqliteSynchronous::Normal)
            .log_statements(tracing::log::LevelFilter::Off);
        let pool = SqlitePool::connect_with(opt)
            .await
            .map_err(|e| AppError::Database(format!("sqlite connect: {e}")))?;
        Ok(Self { pool })
    }

    /// 内存数据库（测试用）。单连接，保证所有查询看到同一份数据。
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Database(format!("sqlite options: {e}")))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| AppError::Database(format!("sqlite connect: {e}")))?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS suppliers (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          contact_name TEXT,
          email TEXT UNIQUE,
          phone TEXT,
          address TEXT,
          image_path TEXT,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_suppliers_name ON suppliers(name);

        CREATE TABLE IF NOT EXISTS products (
          id TEXT PRIMARY KEY,
          supplier_id TEXT NOT NULL,
          name TEXT NOT NULL,
          sku TEXT NOT NULL UNIQUE,
          description TEXT,
          price REAL NOT NULL DEFAULT 0,
          stock INTEGER NOT NULL DEFAULT 0,
          image_path TEXT,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          FOREIGN KEY (supplier_id) REFERENCES suppliers(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_products_supplier_id ON products(supplier_id);
        CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
        CREATE INDEX IF NOT EXISTS idx_products_stock ON products(stock);
        CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at);

        CREATE TABLE IF NOT EXISTS categories (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL UNIQUE,
          slug TEXT NOT NULL UNIQUE,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS category_product (
          product_id TEXT NOT NULL,
          category_id TEXT NOT NULL,
          created_at TEXT NOT NULL,
          PRIMARY KEY (product_id, category_id),
          FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE,
          FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_category_product_category_id ON category_product(category_id);
        "#;

        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("init schema: {e}")))?;
        Ok(())
    }
}

/// 统一的时间戳格式（RFC3339，微秒精度，UTC），保证按字符串排序即按时间排序
pub fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// 新记录主键：时间有序 UUID
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// 若错误是唯一约束冲突，返回冲突列名（如 `sku`、`email`）
pub fn unique_violation_column(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if !db.is_unique_violation() {
        return None;
    }
    // SQLite: "UNIQUE constraint failed: products.sku"
    db.message()
        .rsplit(':')
        .next()
        .and_then(|cols| cols.split(',').next())
        .and_then(|col| col.trim().rsplit('.').next())
        .map(|c| c.to_string())
}

/// 写操作错误映射：唯一约束冲突落到对应字段上，其余视为数据库错误
pub fn map_write_error(err: sqlx::Error, ctx: &str) -> AppError {
    match unique_violation_column(&err) {
        Some(col) => AppError::field(col.clone(), format!("{col} 已被占用")),
        None => AppError::Database(format!("{ctx}: {err}")),
    }
}

/// 把 LIKE 通配符转义（配合 `ESCAPE '\'` 使用）
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
