//! Mixed-integer programming with lazy constraints.
//!
//! Branch-and-bound over LP relaxations solved by `minilp`, with a
//! constraint-handler extension point for constraints that are too many to
//! state up front. Handlers see every integral LP solution and may cut it
//! off; every candidate incumbent is validated through them.
//!
//! # Example
//!
//! ```ignore
//! use lazy_mip::{cons, LinExpr, Model, ObjSense};
//!
//! let mut model = Model::new("cover");
//! let x = model.add_binary("x", 1.0);
//! let y = model.add_binary("y", 2.0);
//! model.add_cons(cons().coef(x, 1.0).coef(y, 1.0).ge(1.0));
//! model.set_objective(&LinExpr::new().with(x, 1.0).with(y, 2.0), ObjSense::Minimize)?;
//!
//! let sol = model.optimize()?;
//! println!("{} {}", sol.status, sol.obj_val);
//! ```

#![warn(missing_docs)]

pub mod cuts;
pub mod error;
pub mod handler;
pub mod master;
pub mod model;
pub mod presolve;
pub mod search;
pub mod settings;
mod solver;

pub use error::{MipError, MipResult};
pub use handler::{
    ConstraintHandler, EnforceContext, EnforceResult, Feasibility, LockTable, SolutionView,
};
pub use model::{
    cons, ConsBuilder, Constraint, IncumbentSource, LinExpr, MipSolution, MipStatus, ObjSense,
    RowSense, VarId, VarType,
};
pub use settings::{BranchingRule, MipSettings, NodeSelection};
pub use solver::Model;
