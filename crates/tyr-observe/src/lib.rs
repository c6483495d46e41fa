//! Debug-only exports for the layout type graph.
//!
//! Nothing here participates in mutation logic; these views exist so humans
//! can look at a graph between simplification steps.

pub mod dot;
pub mod error;
pub mod json;

pub use dot::{eq_class_annotator, write_dot, NodeAnnotator};
pub use error::ObserveError;
pub use json::{dump_json, EdgeRecord, GraphDump, NodeRecord};
