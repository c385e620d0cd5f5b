pub mod ids;
pub mod manager;

pub use ids::{IdGenerator, UuidIdGenerator, COLOR_NAMES, TOKEN_LEN};
pub use manager::SessionManager;
