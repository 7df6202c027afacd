//! Scripts under test
//!
//! - **Catalog** - the fixed scripts carried by the probe transaction
//! - **Destinations** - template matching and address derivation for any script

pub mod catalog;
pub mod destinations;

pub use catalog::{catalog, catalog_of, CatalogScript};
pub use destinations::{classify, extract_destinations, Destinations, ScriptTemplate};
