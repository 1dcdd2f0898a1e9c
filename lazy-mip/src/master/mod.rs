//! LP relaxation of the search.

mod backend;
mod lp_backend;

pub use backend::{CutOrigin, LinearCut, MasterBackend, MasterResult, MasterStatus};
pub use lp_backend::SimplexMasterBackend;
