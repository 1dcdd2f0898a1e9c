//! Lazy constraint storage.
//!
//! Cuts here come from constraint handlers during enforcement; see
//! [`crate::handler`].

mod pool;

pub use pool::{CutPool, CutPoolStats, PooledCut};
