//! Test harness for end-to-end inspection scenarios.
//!
//! Builds synthetic triangle-soup parts, simulates pointer clicks against
//! them and checks what the inspection session records and exports.
//!
//! # Key Components
//!
//! - [`InspectionBench`]: fluent API for scripting a session
//! - [`fixtures`]: plates with through holes
//! - [`soup`]: triangle soups with a brute-force ray probe
//! - [`stl`]: STL encoding of soups
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod fixtures;
pub mod helpers;
pub mod soup;
pub mod stl;
pub mod workflow;

pub use helpers::HarnessError;
pub use soup::{Triangle, TriangleSoup};
pub use workflow::InspectionBench;
