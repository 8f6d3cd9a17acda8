use std::collections::HashSet;

use fabsim_navigation::{FloorGrid, GridPoint, Obstacle, PathPlanner, WorldPoint};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .init();

    // 20x20 fab floor with six 2x2 equipment footprints
    let equipment = [(-5.0, -5.0), (0.0, -5.0), (5.0, -5.0), (-5.0, 0.0), (0.0, 0.0), (5.0, 0.0)];
    let obstacles: Vec<Obstacle> = equipment
        .iter()
        .map(|&(x, z)| Obstacle::new(x, z, 2.0, 2.0))
        .collect();
    let grid = FloorGrid::build(20.0, 20.0, 1.0, &obstacles)?;

    let start = WorldPoint::new(-9.5, -0.5);
    let end = WorldPoint::new(9.5, -0.5);
    println!("{}", grid);
    println!("Start: {}, Goal: {}", start, end);

    let result = PathPlanner::new(&grid).find_path_detailed(start, end)?;
    println!("\n{}", result);

    if !result.is_success() {
        println!("\nNo path found.");
        return Ok(());
    }

    println!("{}", result.path.metrics());
    let on_route: HashSet<GridPoint> = result.cells.iter().copied().collect();
    let start_cell = grid.world_to_cell(start)?;
    let goal_cell = grid.world_to_cell(end)?;

    println!("\nGrid with path:");
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let p = GridPoint::new(col, row);
            let glyph = if p == start_cell {
                'S'
            } else if p == goal_cell {
                'G'
            } else if on_route.contains(&p) {
                '*'
            } else if !grid.is_walkable(col, row)? {
                'X'
            } else {
                '.'
            };
            print!("{} ", glyph);
        }
        println!();
    }

    Ok(())
}
