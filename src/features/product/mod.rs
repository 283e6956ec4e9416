pub mod handler;
pub mod models;
pub mod service;
pub mod storage;

pub use handler::create_product_router;
pub use models::Product;
