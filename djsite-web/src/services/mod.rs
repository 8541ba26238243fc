//! Service layer: catalog reading, set pipelines and order sync

pub mod catalog;
pub mod duration_probe;
pub mod reorder_sync;
pub mod set_pipeline;

pub use catalog::{load_public_catalog, CatalogEntry};
pub use reorder_sync::save_order;
pub use set_pipeline::{FileUpload, SetForm, SetPipeline};
