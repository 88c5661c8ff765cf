//! Layer reading and schema validation for Strata.
//!
//! Every configuration layer is a TOML file parsed into a raw key/value
//! tree ([`Tree`]) and then checked against the schema for its
//! [`LayerKind`]. Validation reports the offending field as a dotted path
//! together with the file it came from.

pub mod error;
pub mod layer;
pub mod reader;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use layer::{ConfigLayer, LayerKind, Tree};
pub use reader::{parse_layer, read_layer};
pub use validation::validate_layer;
