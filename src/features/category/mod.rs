pub mod handler;
pub mod models;
pub mod slug;
pub mod storage;

pub use handler::create_category_router;
pub use models::Category;
