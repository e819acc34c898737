//! Measure choosing a corridor and relaxing a shared integration field over
//! it for a group crossing a row of four sectors
//!

use bevy::prelude::*;
use bevy_sector_navigation::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generate a 4x2 block of sectors with scattered resource deposits
fn prepare_world() -> NavigationWorld {
	let mut world = NavigationWorld::default();
	for row in 0..2 {
		for column in 0..4 {
			world.generate_sector(SectorID::new(column, row));
		}
	}
	let mut rng = StdRng::seed_from_u64(3);
	let res = DEFAULT_MAP_RES as i32;
	for y in 0..2 * res {
		for x in 1..4 * res - 1 {
			if rng.random_bool(0.08) {
				let _ = world.set_cell_occupant(IVec2::new(x, y), Some(CellOccupant::Resource(0)));
			}
		}
	}
	world
}

/// Select the corridor and compute the flow field a group would follow
fn corridor(world: &NavigationWorld, from: IVec2, destination: IVec2) -> Option<FlowFieldCorridor> {
	let sectors = select_corridor(world, from, destination)?;
	FlowFieldCorridor::compute(world, destination, &sectors, default_cost)
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(50);
	let world = prepare_world();
	let res = DEFAULT_MAP_RES as i32;
	let from = IVec2::new(0, res);
	let destination = IVec2::new(4 * res - 1, res);
	group.bench_function("calc_corridor", |b| {
		b.iter(|| corridor(black_box(&world), black_box(from), black_box(destination)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
