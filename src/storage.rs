pub mod catalog;
pub mod snapshot;

pub use catalog::{Catalog, Summary};
pub use snapshot::{Diagnostic, Level, Load, LoadError};
