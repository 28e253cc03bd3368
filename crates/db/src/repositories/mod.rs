//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Methods
//! that only read or write one statement take `&PgPool`; building blocks
//! meant to run inside a caller's transaction take `&mut PgConnection`.

pub mod admin_repo;
pub mod banner_repo;
pub mod draw_repo;
pub mod item_repo;
pub mod ownership_repo;
pub mod trade_repo;
pub mod user_repo;

pub use admin_repo::AdminRepo;
pub use banner_repo::BannerRepo;
pub use draw_repo::DrawRepo;
pub use item_repo::ItemRepo;
pub use ownership_repo::OwnershipRepo;
pub use trade_repo::TradeRepo;
pub use user_repo::UserRepo;
