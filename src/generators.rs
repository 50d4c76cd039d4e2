use rand::{self, Rng, XorShiftRng};

use crate::cells::GridCoordinate;
use crate::grid::Grid;

/// Incremental randomized depth-first maze generator, the iterative
/// "recursive backtracker".
///
/// The walk starts in one corner and repeatedly carves a passage to a random
/// unvisited neighbour, pushing the abandoned cell onto an explicit stack.
/// When the walk runs out of unvisited neighbours it pops the stack instead,
/// retreating along the carved corridor until a cell with unvisited
/// neighbours turns up again. Every step either carves a new passage or pops
/// the stack, so the generator always terminates, leaving a perfect maze: a
/// spanning tree of the grid with exactly `cells - 1` carved walls.
///
/// The walk advances one step per `step` call so a frame loop can animate it
/// at whatever pace it likes.
pub struct RecursiveBacktracker {
    current: GridCoordinate,
    stack: Vec<GridCoordinate>,
    visited_steps: usize,
    cells_count: usize,
    rng: XorShiftRng,
}

impl RecursiveBacktracker {
    /// A generator for the given grid, starting in the north west corner.
    pub fn new(grid: &Grid) -> RecursiveBacktracker {
        RecursiveBacktracker::with_rng(grid, rand::weak_rng())
    }

    /// As `new` but with a caller supplied random number generator, for
    /// reproducible runs.
    pub fn with_rng(grid: &Grid, rng: XorShiftRng) -> RecursiveBacktracker {
        let start = GridCoordinate::new(0, 0);
        RecursiveBacktracker {
            current: start,
            // The start cell seeds the stack: generation is complete once
            // the walk has retreated all the way back out of it.
            stack: vec![start],
            visited_steps: 0,
            cells_count: grid.size(),
            rng,
        }
    }

    /// Advance the walk by up to `count` single steps on `grid` (the grid
    /// this generator was created for), stopping early when generation
    /// completes. `count` must be positive.
    pub fn step(&mut self, grid: &mut Grid, count: usize) {
        assert!(count > 0, "step count must be positive");
        for _ in 0..count {
            if self.is_complete() {
                return;
            }
            self.step_once(grid);
        }
    }

    /// The stack has emptied: every cell has been visited and the walk has
    /// retreated back out of the start cell.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.stack.is_empty()
    }

    /// Approximate completion percentage in `[0, 100]`.
    ///
    /// The underlying counter steps back on every forward carve and only
    /// regains ground as the walk retreats, so this is a coarse progress
    /// indicator, not a strict monotonic percentage. It reaches exactly 100
    /// on completion.
    pub fn progression(&self) -> f64 {
        self.visited_steps as f64 * 100.0 / self.cells_count as f64
    }

    /// The cell the walk is standing on, for highlight rendering.
    #[inline]
    pub fn current(&self) -> GridCoordinate {
        self.current
    }

    fn step_once(&mut self, grid: &mut Grid) {
        grid.cell_mut(self.current)
            .expect("generator walked off its grid")
            .visit();
        self.visited_steps += 1;

        let neighbours = grid.unvisited_neighbours(self.current);
        if !neighbours.is_empty() {
            let next = neighbours[self.rng.gen::<usize>() % neighbours.len()];
            grid.remove_wall_between(self.current, next);
            grid.cell_mut(self.current)
                .expect("generator walked off its grid")
                .stack();
            self.stack.push(self.current);
            // The walk re-visits this cell when it backtracks; give the
            // progression counter the step back until then.
            self.visited_steps -= 1;
            self.current = next;
        } else if let Some(previous) = self.stack.pop() {
            grid.cell_mut(previous)
                .expect("generator walked off its grid")
                .unstack();
            self.current = previous;
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::{GridDirection, ALL_DIRECTIONS};
    use crate::units::{CellPixels, ColumnsCount, RowsCount};
    use quickcheck::{quickcheck, TestResult};
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn test_grid(cols: usize, rows: usize) -> Grid {
        Grid::new(ColumnsCount(cols), RowsCount(rows), CellPixels(10))
            .expect("valid test dimensions")
    }

    fn seeded_rng(seed: u32) -> XorShiftRng {
        XorShiftRng::from_seed([seed, 0x9e37_79b9, 0x85eb_ca6b, 0xc2b2_ae35])
    }

    fn run_to_completion(grid: &mut Grid, generator: &mut RecursiveBacktracker) {
        let step_limit = 4 * grid.size() + 4;
        for _ in 0..step_limit {
            if generator.is_complete() {
                return;
            }
            generator.step(grid, 1);
        }
        panic!("generator failed to terminate within {} steps", step_limit);
    }

    /// Shared walls carved open, counting each wall once via its east/south side.
    fn carved_wall_count(grid: &Grid) -> usize {
        grid.iter()
            .map(|coord| {
                let east = grid.is_neighbour_open(coord, GridDirection::East) as usize;
                let south = grid.is_neighbour_open(coord, GridDirection::South) as usize;
                east + south
            })
            .sum()
    }

    /// Cells reachable from the origin by walking carved passages only.
    fn reachable_cell_count(grid: &Grid) -> usize {
        let origin = GridCoordinate::new(0, 0);
        let mut seen: HashSet<GridCoordinate> = HashSet::new();
        seen.insert(origin);
        let mut frontier = vec![origin];
        while let Some(coord) = frontier.pop() {
            for neighbour in grid.connected_neighbours(coord).iter() {
                if seen.insert(*neighbour) {
                    frontier.push(*neighbour);
                }
            }
        }
        seen.len()
    }

    fn assert_reciprocal_walls(grid: &Grid) {
        for coord in grid.iter() {
            let cell = grid.cell(coord).unwrap();
            for dir in ALL_DIRECTIONS.iter() {
                if let Some(adjacent) = grid.neighbour_at_direction(coord, *dir) {
                    let other = grid.cell(adjacent).unwrap();
                    assert_eq!(cell.is_wall(*dir),
                               other.is_wall(crate::cells::opposite_direction(*dir)),
                               "walls disagree between {} and {}",
                               coord,
                               adjacent);
                }
            }
        }
    }

    #[test]
    fn single_cell_grid_completes_in_one_step() {
        let mut g = test_grid(1, 1);
        let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(1));
        assert!(!generator.is_complete());

        generator.step(&mut g, 1);

        assert!(generator.is_complete());
        assert!(g.cell(GridCoordinate::new(0, 0)).unwrap().is_visited());
        assert_eq!(carved_wall_count(&g), 0);
        assert_eq!(generator.progression(), 100.0);
    }

    #[test]
    fn two_by_one_grid_carves_exactly_the_shared_wall() {
        let mut g = test_grid(2, 1);
        let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(2));
        run_to_completion(&mut g, &mut generator);

        assert_eq!(carved_wall_count(&g), 1);
        assert!(!g.cell(GridCoordinate::new(0, 0)).unwrap().is_wall(GridDirection::East));
        assert!(!g.cell(GridCoordinate::new(1, 0)).unwrap().is_wall(GridDirection::West));
    }

    #[test]
    fn completed_generation_leaves_a_spanning_tree() {
        for (cols, rows, seed) in [(5, 5, 3), (8, 3, 4), (1, 9, 5), (16, 16, 6)].iter() {
            let mut g = test_grid(*cols, *rows);
            let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(*seed));
            run_to_completion(&mut g, &mut generator);

            let cells = g.size();
            assert!(g.iter().all(|coord| g.cell(coord).unwrap().is_visited()));
            assert_eq!(carved_wall_count(&g), cells - 1);
            assert_eq!(reachable_cell_count(&g), cells);
            // connected with cells - 1 edges: acyclic follows
        }
    }

    #[test]
    fn walls_agree_on_both_sides_throughout_generation() {
        let mut g = test_grid(4, 4);
        let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(7));
        let step_limit = 4 * g.size() + 4;
        for _ in 0..step_limit {
            if generator.is_complete() {
                break;
            }
            generator.step(&mut g, 1);
            assert_reciprocal_walls(&g);
        }
        assert!(generator.is_complete());
    }

    #[test]
    fn no_cell_stays_stacked_after_completion() {
        let mut g = test_grid(6, 6);
        let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(8));
        run_to_completion(&mut g, &mut generator);
        assert!(g.iter().all(|coord| !g.cell(coord).unwrap().is_stacked()));
    }

    #[test]
    fn batched_stepping_short_circuits_once_complete() {
        let mut g = test_grid(3, 3);
        let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(9));
        // far more steps than generation can use
        let generous_step_count = 10 * g.size();
        generator.step(&mut g, generous_step_count);
        assert!(generator.is_complete());
        assert_eq!(generator.progression(), 100.0);

        // stepping a finished generator is a no-op
        generator.step(&mut g, 5);
        assert!(generator.is_complete());
    }

    #[test]
    fn progression_stays_within_bounds() {
        let mut g = test_grid(5, 4);
        let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(10));
        let step_limit = 4 * g.size() + 4;
        for _ in 0..step_limit {
            if generator.is_complete() {
                break;
            }
            generator.step(&mut g, 1);
            let p = generator.progression();
            assert!(p >= 0.0 && p <= 100.0, "progression {} out of bounds", p);
        }
        assert_eq!(generator.progression(), 100.0);
    }

    #[test]
    fn quickcheck_spanning_tree_for_arbitrary_dimensions() {
        fn property(cols: usize, rows: usize, seed: u32) -> TestResult {
            let (cols, rows) = (cols % 12 + 1, rows % 12 + 1);

            let mut g = test_grid(cols, rows);
            let mut generator = RecursiveBacktracker::with_rng(&g, seeded_rng(seed));
            run_to_completion(&mut g, &mut generator);

            let cells = g.size();
            let tree = g.iter().all(|coord| g.cell(coord).unwrap().is_visited()) &&
                       carved_wall_count(&g) == cells - 1 &&
                       reachable_cell_count(&g) == cells;
            assert_reciprocal_walls(&g);
            TestResult::from_bool(tree)
        }
        quickcheck(property as fn(usize, usize, u32) -> TestResult);
    }
}
