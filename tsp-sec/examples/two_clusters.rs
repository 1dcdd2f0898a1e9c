//! Solve a six-city instance made of two tight clusters.
//!
//! Run with `RUST_LOG=debug` to see the subtour cuts as they are added.

use tsp_sec::{solve_tsp, TspError, TspInstance, TspSettings};

fn main() -> Result<(), TspError> {
    env_logger::init();

    let instance = TspInstance::from_fn(1..=6u32, |&a, &b| {
        if (a <= 3) == (b <= 3) {
            1.0
        } else {
            10.0
        }
    })?;

    let sol = solve_tsp(&instance, &TspSettings::verbose())?;

    println!("status: {:?}", sol.status);
    println!("cost:   {}", sol.cost);
    println!("tour:   {:?}", sol.tour);
    for (a, b) in &sol.edges {
        println!("  {} - {}", a, b);
    }
    println!(
        "{} nodes, {} subtour cuts, {} ms",
        sol.stats.nodes_explored, sol.stats.subtour.cuts_generated, sol.stats.solve_time_ms
    );
    Ok(())
}
