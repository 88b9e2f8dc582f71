//! Numeric helpers shared by the acquisition and model code.

pub mod safe_cast;
