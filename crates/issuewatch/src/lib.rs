//! Top-level facade crate for issuewatch.
//!
//! Re-exports the core primitives and the exporter library so users can depend on a single crate.

pub mod core {
    pub use issuewatch_core::*;
}

pub mod exporter {
    pub use issuewatch_exporter::*;
}
