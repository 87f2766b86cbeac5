//! sandpane library exports

pub mod core;
pub mod replay;
pub mod runtime;
pub mod sandbox;

#[cfg(test)]
pub mod test_support;
