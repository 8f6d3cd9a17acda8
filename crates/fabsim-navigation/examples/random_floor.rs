use fabsim_navigation::{FloorGrid, Obstacle, PathPlanner, WorldPoint};
use rand::Rng;

fn main() {
    // 30x30 floor at 1.5 pitch with 40 randomly placed machines
    let mut rng = rand::rng();
    let obstacles: Vec<Obstacle> = (0..40)
        .map(|_| {
            Obstacle::new(
                rng.random_range(-14.0..14.0),
                rng.random_range(-14.0..14.0),
                rng.random_range(0.5..3.0),
                rng.random_range(0.5..3.0),
            )
        })
        .collect();

    let grid = match FloorGrid::build(30.0, 30.0, 1.5, &obstacles) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Failed to build floor grid: {}", e);
            return;
        }
    };
    println!("{}", grid);
    println!("Blocked cells: {}", grid.blocked_count());

    let planner = PathPlanner::new(&grid);
    let requests = [
        (WorldPoint::new(-14.0, -14.0), WorldPoint::new(14.0, 14.0)),
        (WorldPoint::new(-14.0, 14.0), WorldPoint::new(14.0, -14.0)),
        (WorldPoint::new(0.0, 0.0), WorldPoint::new(20.0, 0.0)), // off the floor
    ];

    for (i, (start, end)) in requests.iter().enumerate() {
        match planner.find_path(*start, *end) {
            Ok(path) if path.is_empty() => println!("Request {}: {} -> {}: no path", i, start, end),
            Ok(path) => println!("Request {}: {} -> {}: {}", i, start, end, path.metrics()),
            Err(e) => println!("Request {}: {} -> {}: invalid point ({})", i, start, end, e),
        }
    }
}
