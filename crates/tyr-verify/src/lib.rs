//! Verification suite for the layout type graph.
//!
//! A battery of whole-graph consistency checks run between simplification
//! steps, plus the SCC decomposition the DAG checks are built on.

pub mod scc;
pub mod structural;

pub use scc::{has_cycle, sccs};
pub use structural::{Check, Diagnostic, Verifier};
