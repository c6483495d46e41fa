//! Core layout type graph engine for decompiler type recovery.
//!
//! Candidate memory layouts observed in a program's intermediate
//! representation are modeled as graph nodes, related by typed links
//! (equality, inheritance, embedded instance, pointer). This crate owns the
//! mutable graph and its surgery primitives: merging nodes, removing them,
//! and rehoming edges with offset rebasing, all while keeping adjacency
//! mirrored and a union-find of merged identifiers consistent.

pub mod eqclass;
pub mod error;
pub mod graph;

pub use eqclass::EqClasses;
pub use error::GraphError;
pub use graph::filter::EdgeFilter;
pub use graph::node::{InterferingInfo, LayoutNode, Link, NodeId};
pub use graph::tag::{LinkTag, OffsetExpr, TagId, TagKind};
pub use graph::LayoutGraph;
