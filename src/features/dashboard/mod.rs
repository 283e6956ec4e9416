pub mod handler;

pub use handler::{DashboardResponse, create_dashboard_router};
