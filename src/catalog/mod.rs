pub mod catalog;
pub mod loader;
pub mod store;

pub use catalog::Catalog;
pub use loader::{load, load_from_documents, CatalogLoader};
pub use store::{CatalogProvider, CatalogStore};
