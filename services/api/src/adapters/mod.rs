pub mod content;
pub mod db;
pub mod memory;

pub use content::JsonContentResolver;
pub use db::DbAdapter;
pub use memory::InMemoryProgressStore;
