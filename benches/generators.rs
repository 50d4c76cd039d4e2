use criterion::{criterion_group, criterion_main, Criterion};
use mazeviz::{
    generators::RecursiveBacktracker,
    grid::Grid,
    units::{CellPixels, ColumnsCount, RowsCount},
};
use rand::{SeedableRng, XorShiftRng};

fn bench_recursive_backtracker_32(c: &mut Criterion) {
    c.bench_function("recursive_backtracker_32", |b| {
        b.iter(|| {
            let mut grid = Grid::new(ColumnsCount(32), RowsCount(32), CellPixels(10)).unwrap();
            let rng = XorShiftRng::from_seed([0x1234_5678, 0x9e37_79b9, 0x85eb_ca6b, 0xc2b2_ae35]);
            let mut generator = RecursiveBacktracker::with_rng(&grid, rng);
            generator.step(&mut grid, 8 * 32 * 32);
            assert!(generator.is_complete());
            grid
        })
    });
}

fn bench_recursive_backtracker_single_steps_32(c: &mut Criterion) {
    c.bench_function("recursive_backtracker_single_steps_32", |b| {
        b.iter(|| {
            let mut grid = Grid::new(ColumnsCount(32), RowsCount(32), CellPixels(10)).unwrap();
            let rng = XorShiftRng::from_seed([0x8765_4321, 0x9e37_79b9, 0x85eb_ca6b, 0xc2b2_ae35]);
            let mut generator = RecursiveBacktracker::with_rng(&grid, rng);
            while !generator.is_complete() {
                generator.step(&mut grid, 1);
            }
            grid
        })
    });
}

criterion_group!(benches,
                 bench_recursive_backtracker_32,
                 bench_recursive_backtracker_single_steps_32);
criterion_main!(benches);
