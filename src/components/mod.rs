//! UI components.

pub mod algorithms;
pub mod force_graph;
pub mod overview;
pub mod queries;
pub mod schema;
