//! Solves the layer order of a small accordion fold and prints it.
//!
//! Usage:
//! ```text
//! cargo run --example fold_in_half
//! RUST_LOG=foldlayer=debug cargo run --example fold_in_half
//! ```

use foldlayer::math::Point2;
use foldlayer::{Assignment, LayerError, Mesh, SolveLayers};

/// A 3x1 strip folded twice into a unit square: face 0 at the bottom,
/// face 1 turned over on it, face 2 upright on top.
fn accordion() -> Result<Mesh, LayerError> {
    let coords = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
    ];
    let edges = vec![
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 0],
        [1, 4],
        [4, 5],
        [5, 2],
        [4, 6],
        [6, 7],
        [7, 5],
    ];
    let assignment = "B V B B B M B B B B"
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<Assignment>, _>>()?;
    let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2], vec![4, 6, 7, 5]];
    Mesh::new_2d(&coords, edges, assignment, faces)
}

fn main() -> Result<(), LayerError> {
    // Default: WARN for everything, INFO for foldlayer.
    // Override with RUST_LOG env var (e.g. RUST_LOG=foldlayer=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("foldlayer=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mesh = accordion()?;
    let solution = SolveLayers::new(&mesh).execute()?;

    println!("faces_winding: {:?}", solution.faces_winding);
    println!("root:");
    for (pair, order) in solution.root.iter() {
        println!("  \"{pair}\": {}", order.sign());
    }
    println!("branch lists: {}", solution.branches.len());
    println!("orderings: {}", solution.count());

    if let Some(first) = solution.solution(0) {
        let face_orders: Vec<[i64; 3]> = solution
            .face_orders(&first)
            .iter()
            .map(|o| [i64::from(o.f), i64::from(o.g), i64::from(o.s)])
            .collect();
        println!("faceOrders: {face_orders:?}");
    }
    Ok(())
}
