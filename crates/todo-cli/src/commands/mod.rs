//! Command implementations.

pub mod create;
pub mod delete;
pub mod health;
pub mod read;
pub mod search;
pub mod update;

pub use self::create::execute_create;
pub use self::delete::execute_delete;
pub use self::health::execute_health;
pub use self::read::execute_read;
pub use self::search::execute_search;
pub use self::update::execute_update;
