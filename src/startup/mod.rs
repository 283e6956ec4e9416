/// 启动检查：目录、数据库、表结构
pub mod checks;

pub use checks::run_startup_checks;
