//! Variables, constraints, compiled problems and results.

mod expr;
mod problem;
mod solution;

pub use expr::{cons, ConsBuilder, Constraint, LinExpr, RowSense, VarId};
pub use problem::{MipProblem, ObjSense, VarData, VarType};
pub use solution::{
    relative_gap, Incumbent, IncumbentSource, IncumbentTracker, MipSolution, MipStatus,
};
