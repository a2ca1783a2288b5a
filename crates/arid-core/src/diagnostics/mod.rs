//! Diagnostics for fitted linear models

mod vif;

pub use vif::compute_vif;
