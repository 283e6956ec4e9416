pub mod handler;
pub mod models;
pub mod service;
pub mod storage;

pub use handler::create_supplier_router;
pub use models::{Supplier, SupplierOption, SupplierSummary};
