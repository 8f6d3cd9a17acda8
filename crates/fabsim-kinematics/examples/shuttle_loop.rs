use fabsim_kinematics::*;

fn main() {
    let x_min = -15.0;
    let x_max = 15.0;
    let speed = 0.05; // distance per tick
    let starts = [-15.0, -5.0, 5.0];
    let num_ticks = 1_400;

    let rail = match RailSegment::new(x_min, x_max) {
        Ok(rail) => rail,
        Err(e) => {
            eprintln!("Failed to create rail: {:?}", e);
            return;
        }
    };

    let mut shuttles = Vec::new();
    for &x in &starts {
        match rail.place(x, Direction::Forward, speed) {
            Ok(shuttle) => shuttles.push(shuttle),
            Err(e) => {
                eprintln!("Failed to place shuttle at {}: {:?}", x, e);
                return;
            }
        }
    }

    let mut model = match RailMotionModel::new(rail, shuttles) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Failed to build fleet: {:?}", e);
            return;
        }
    };

    println!("Initializing simulation...");
    println!("  {}", model.rail());
    for (i, shuttle) in model.shuttles().iter().enumerate() {
        let eta = rail.ticks_until_reversal(shuttle);
        println!("    Shuttle {}: {} (first reversal in {:?} ticks)", i, shuttle, eta);
    }
    println!("  Num Ticks: {}", num_ticks);
    println!("\nSimulating...");

    let mut previous = model.snapshot();
    for _ in 0..num_ticks {
        model.advance_all();
        for (i, (before, after)) in previous.shuttles.iter().zip(model.shuttles()).enumerate() {
            if before.direction != after.direction {
                println!("Tick {:>5}: shuttle {} reversed at x = {:.3}, now heading {}", model.tick(), i, after.x, after.direction);
            }
        }
        previous = model.snapshot();
    }

    println!("\nSimulation complete.");
    println!("Final state: {:?}", model.snapshot());
}
