//! Symmetric TSP with lazy subtour elimination.
//!
//! The model has one binary variable per edge of the complete graph and a
//! degree-2 row per vertex. Connectivity is enforced lazily: whenever the
//! host reaches an integral LP solution, [`SubtourEliminator`] computes the
//! connected components of the selected edges and adds
//! `sum_{u<v in S} x(u,v) <= |S| - 1` for every component `S` if there is
//! more than one.
//!
//! # Example
//!
//! ```ignore
//! use tsp_sec::{solve_tsp, TspInstance, TspSettings};
//!
//! let instance = TspInstance::from_fn(1..=6, |&a, &b| {
//!     if (a <= 3) == (b <= 3) { 1.0 } else { 10.0 }
//! })?;
//! let sol = solve_tsp(&instance, &TspSettings::default())?;
//! println!("cost {} tour {:?}", sol.cost, sol.tour);
//! ```

#![warn(missing_docs)]

pub mod components;
pub mod conshdlr;
pub mod driver;
pub mod edge;
pub mod error;
pub mod formulation;
pub mod instance;
pub mod settings;
pub mod subtour;

pub use conshdlr::{SubtourCounters, SubtourEliminator, SubtourMode, SubtourStats};
pub use driver::{solve_tsp, TspSolution, TspStats};
pub use edge::Edge;
pub use error::{TspError, TspResult};
pub use formulation::{create_tsp, EdgeVars, TspModel};
pub use instance::TspInstance;
pub use settings::TspSettings;
pub use subtour::Connectivity;
