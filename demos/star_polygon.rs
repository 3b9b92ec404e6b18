use rand::prelude::*;
use seidel::{BuildConfig, Location, Point, PointLocator, TrapezoidalMap};
use std::f64::consts::PI;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    // Star with 200 branches
    let n = 200;
    let polygon: Vec<_> = (0..2 * n)
        .map(|i| {
            let angle = 0.1 + PI * i as f64 / n as f64;
            let radius = if i % 2 == 0 { 1. } else { 0.5 };
            [radius * angle.cos(), radius * angle.sin()]
        })
        .collect();

    let trap_map = TrapezoidalMap::from_polygon(polygon, BuildConfig::default())?;
    println!("{}", trap_map.stats()?);

    let mut rng = rand::thread_rng();
    let query: Vec<_> = (0..420_000)
        .map(|_| [rng.gen::<f64>() * 2. - 1., rng.gen::<f64>() * 2. - 1.])
        .collect();

    let res = trap_map.par_locate_many(&query);
    let inside = res.iter().flatten().count();
    println!("{} of {} points are inside the star", inside, query.len());

    match trap_map.locate(&Point::new(0., 0.))? {
        Location::Trapezoid(trap) => println!("The center is in {}", trap),
        Location::Vertex(point) => println!("The center is the vertex {}", point),
        Location::Edge(edge) => println!("The center is on the edge {}", edge),
    }

    Ok(())
}
