//! Fractures the surface of a cube and prints the planned seeds.
//!
//! Run with `cargo run --example fracture_cube`. Override logging with
//! `RUST_LOG` (e.g. `RUST_LOG=voxel_fracture=trace`).

use voxel_fracture::math::Point3;
use voxel_fracture::{FractureJob, FractureParams, Location, RandomMode};

fn main() -> voxel_fracture::Result<()> {
    // Default: WARN for everything, INFO for voxel_fracture.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("voxel_fracture=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let vertices: Vec<Point3> = (0..8)
        .map(|i| {
            Point3::new(
                f64::from(i & 1),
                f64::from((i >> 1) & 1),
                f64::from((i >> 2) & 1),
            )
        })
        .collect();
    let faces = [
        [0, 1, 3],
        [0, 3, 2],
        [4, 7, 5],
        [4, 6, 7],
        [0, 4, 5],
        [0, 5, 1],
        [2, 3, 7],
        [2, 7, 6],
        [0, 2, 6],
        [0, 6, 4],
        [1, 5, 7],
        [1, 7, 3],
    ];

    let params = FractureParams {
        subdivisions: [32, 32, 32],
        num_seeds: 6,
        random_mode: RandomMode::Halton,
        location: Location::Outer,
        num_samples: 4_000,
        num_impacts: 3,
        num_near_seeds: 12,
        spreading: 2.0,
        ..FractureParams::default()
    };

    let mut job = FractureJob::from_mesh(&vertices, &faces, params)?;
    for seed in job.plan_seeds()? {
        println!(
            "({:>2}, {:>2}, {:>2}) fragment {:>3} sub {}",
            seed.coord.x,
            seed.coord.y,
            seed.coord.z,
            seed.base_id(),
            seed.sub_id()
        );
    }
    Ok(())
}
