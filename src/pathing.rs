use itertools::Itertools;
use rand::XorShiftRng;

use crate::cells::GridCoordinate;
use crate::grid::Grid;
use crate::units::{ColumnsCount, RowsCount};
use crate::utils::{self, FnvHashMap, FnvHashSet};

/// Per-cell search bookkeeping: best known cost from the start (`g`),
/// heuristic estimate to the end (`h`), their sum (`f`), the back-link the
/// best route arrived through and how many passages that route crossed.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g: f64,
    h: f64,
    f: f64,
    parent: Option<GridCoordinate>,
    length: usize,
}

/// The best outgoing link recorded for one cell on a walked best-path chain.
/// `since` is the tick the link first pointed at its current child, `last_seen`
/// the most recent tick it was walked over.
#[derive(Debug, Clone, Copy)]
struct StableLink {
    to: GridCoordinate,
    since: u64,
    last_seen: u64,
}

/// Incremental A* route search over a generated maze, with a stabilized
/// best-path prefix for flicker free rendering.
///
/// The search expands one open node per step so a frame loop can animate the
/// frontier. The node with the cheapest best-guess route from the start is
/// expanded next, which makes the head of the best-path chain jump between
/// rival branches while the search is undecided. Rendering that live chain
/// directly flickers badly, so alongside the search a settled prefix of the
/// chain is grown: a link only enters the prefix once it has pointed at the
/// same child for `stable_min_duration` ticks while sitting on the live
/// chain. The prefix trades a little rendering lag for never being yanked
/// back and forth, and renderers may copy it at any tick boundary.
///
/// The pathfinder only ever reads the grid. It must be created after maze
/// generation completes and stepped against that same grid.
#[derive(Debug)]
pub struct Pathfinder {
    start: GridCoordinate,
    end: GridCoordinate,
    nodes: FnvHashMap<GridCoordinate, SearchNode>,
    open: Vec<GridCoordinate>,
    closed: FnvHashSet<GridCoordinate>,
    current: GridCoordinate,
    winner: Option<GridCoordinate>,
    tick: u64,
    stable_links: FnvHashMap<GridCoordinate, StableLink>,
    stable_path: Vec<GridCoordinate>,
    stable_min_duration: u64,
    final_path: Vec<GridCoordinate>,
    render_budget: usize,
}

impl Pathfinder {
    /// A search between two endpoints on `grid`.
    ///
    /// Explicit endpoints are bounds checked (`None` on failure). Missing
    /// endpoints are sampled uniformly; a sampled end is re-drawn until it
    /// sits further from the start than a quarter of the smaller grid
    /// dimension, so the route is not trivially short.
    pub fn new(grid: &Grid,
               start: Option<GridCoordinate>,
               end: Option<GridCoordinate>,
               rng: &mut XorShiftRng)
               -> Option<Pathfinder> {

        let start = match start {
            Some(coord) => {
                if !grid.is_valid_coordinate(coord) {
                    return None;
                }
                coord
            }
            None => grid.random_cell(rng),
        };
        let end = match end {
            Some(coord) => {
                if !grid.is_valid_coordinate(coord) {
                    return None;
                }
                coord
            }
            None => sample_distant_end(grid, start, rng),
        };

        let (ColumnsCount(cols), RowsCount(rows)) = (grid.columns(), grid.rows());
        let min_dimension = cols.min(rows);

        let mut nodes = utils::fnv_hashmap(grid.size());
        nodes.insert(start,
                     SearchNode {
                         g: 0.0,
                         h: 0.0,
                         f: 0.0,
                         parent: None,
                         length: 0,
                     });

        Some(Pathfinder {
            start,
            end,
            nodes,
            open: vec![start],
            closed: utils::fnv_hashset(grid.size()),
            current: start,
            winner: None,
            tick: 0,
            stable_links: utils::fnv_hashmap(grid.size()),
            stable_path: vec![start],
            stable_min_duration: (min_dimension / 2).max(1) as u64,
            final_path: Vec::new(),
            render_budget: (min_dimension / 4).max(1),
        })
    }

    #[inline]
    pub fn start(&self) -> GridCoordinate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> GridCoordinate {
        self.end
    }

    /// Advance the search by up to `count` single steps against `grid` (the
    /// generated grid this search was created for), stopping early once the
    /// route is found, settled and fully rendered. `count` must be positive.
    pub fn step(&mut self, grid: &Grid, count: usize) {
        assert!(count > 0, "step count must be positive");
        for _ in 0..count {
            if self.path_found() && self.is_final_path_fully_rendered() {
                return;
            }
            self.step_once(grid);
        }
    }

    /// Has the search reached the end cell? The settled path may still be
    /// catching up; see `path_found`.
    #[inline]
    pub fn end_reached(&self) -> bool {
        self.winner.is_some()
    }

    /// The route is complete once the end cell has been reached *and* the
    /// settled prefix has caught up with it, leaving nothing unstabilized.
    pub fn path_found(&self) -> bool {
        match self.winner {
            Some(winner) => *self.settled_frontier() == winner,
            None => false,
        }
    }

    /// Has the final-path render walk made it from the winner back to the
    /// start?
    pub fn is_final_path_fully_rendered(&self) -> bool {
        self.final_path.last().map_or(false, |&tail| tail == self.start)
    }

    /// Passages crossed by the best route found so far (the final route once
    /// the end has been reached).
    pub fn path_length(&self) -> usize {
        self.nodes[&self.best_node()].length
    }

    /// Discovered but not yet expanded cells, in insertion order.
    #[inline]
    pub fn open_cells(&self) -> &[GridCoordinate] {
        &self.open
    }

    /// Expanded cells, whose route cost from the start is final.
    #[inline]
    pub fn closed_cells(&self) -> &FnvHashSet<GridCoordinate> {
        &self.closed
    }

    /// The settled best-path prefix, start first. Only ever appended to, so
    /// it is safe to copy for rendering at any tick boundary.
    #[inline]
    pub fn stable_path(&self) -> &[GridCoordinate] {
        &self.stable_path
    }

    /// The final route rendered so far, winner first, growing towards the
    /// start under the per-tick render budget. Empty until the end is
    /// reached.
    #[inline]
    pub fn final_path(&self) -> &[GridCoordinate] {
        &self.final_path
    }

    /// The start-to-current-best chain. Changes freely while the search is
    /// undecided; renderers wanting stability should prefer `stable_path`.
    pub fn live_path(&self) -> Vec<GridCoordinate> {
        self.chain_to_start(self.best_node())
    }

    fn step_once(&mut self, grid: &Grid) {
        self.tick += 1;

        if self.winner.is_some() {
            // Settle phase: the route is known, the settled prefix and the
            // final-path render walk still have ground to cover.
            self.refresh_stable_links();
            self.advance_stable_frontier();
            self.advance_final_path();
            return;
        }

        let cur = self.cheapest_open_node()
            .expect("open set exhausted before reaching the end cell: \
                     the grid is not a connected maze");
        self.current = cur;

        if cur == self.end {
            // The winner stays in the open list; nothing reads the open
            // list again once a winner is recorded.
            self.winner = Some(cur);
            self.reconcile_settled_path();
            self.final_path.push(cur);
            self.refresh_stable_links();
            self.advance_stable_frontier();
            self.advance_final_path();
            return;
        }

        self.open.retain(|&coord| coord != cur);
        self.closed.insert(cur);

        let (cur_g, cur_length) = {
            let node = &self.nodes[&cur];
            (node.g, node.length)
        };

        for &neighbour in grid.connected_neighbours(cur).iter() {
            if self.closed.contains(&neighbour) {
                continue;
            }

            let tentative_g = cur_g + cur.euclidean_distance(neighbour);
            let best_g = self.nodes.get(&neighbour).map_or(f64::INFINITY, |node| node.g);
            if tentative_g >= best_g {
                continue;
            }

            let h = neighbour.euclidean_distance(self.end);
            self.nodes.insert(neighbour,
                              SearchNode {
                                  g: tentative_g,
                                  h,
                                  f: tentative_g + h,
                                  parent: Some(cur),
                                  length: cur_length + 1,
                              });
            if !self.open.contains(&neighbour) {
                self.open.push(neighbour);
            }
        }

        self.refresh_stable_links();
        self.advance_stable_frontier();
    }

    /// The open node with the lowest `f`; ties broken by lower `h`, then by
    /// earliest insertion. A fixed tie-break so runs over the same maze
    /// expand the same cells in the same order.
    fn cheapest_open_node(&self) -> Option<GridCoordinate> {
        self.open
            .iter()
            .cloned()
            .fold1(|best, candidate| {
                let (b, c) = (&self.nodes[&best], &self.nodes[&candidate]);
                if c.f < b.f || (c.f == b.f && c.h < b.h) {
                    candidate
                } else {
                    best
                }
            })
    }

    #[inline]
    fn best_node(&self) -> GridCoordinate {
        self.winner.unwrap_or(self.current)
    }

    fn settled_frontier(&self) -> &GridCoordinate {
        self.stable_path.last().expect("settled path always holds the start cell")
    }

    /// Walk back from the current best node refreshing the best-link table,
    /// stopping at the settled frontier (or at the start when the frontier
    /// is not on this chain).
    fn refresh_stable_links(&mut self) {
        let frontier = *self.settled_frontier();
        let tick = self.tick;
        let mut child = self.best_node();
        while child != frontier {
            let parent = match self.nodes[&child].parent {
                Some(parent) => parent,
                None => break, // reached the start
            };
            let link = self.stable_links
                .entry(parent)
                .or_insert(StableLink {
                    to: child,
                    since: tick,
                    last_seen: tick,
                });
            if link.to == child {
                link.last_seen = tick;
            } else {
                *link = StableLink {
                    to: child,
                    since: tick,
                    last_seen: tick,
                };
            }
            child = parent;
        }
    }

    /// Append to the settled prefix while the frontier's recorded link was
    /// walked over this tick and has pointed at the same child for at least
    /// `stable_min_duration` ticks. Requiring the link to have been walked
    /// this tick pins the frontier to the live chain, so it cannot wander
    /// down a branch the search has abandoned.
    fn advance_stable_frontier(&mut self) {
        let head = self.best_node();
        loop {
            let frontier = *self.settled_frontier();
            if frontier == head {
                break;
            }
            match self.stable_links.get(&frontier) {
                Some(link) if link.last_seen == self.tick &&
                              self.tick - link.since >= self.stable_min_duration => {
                    self.stable_path.push(link.to);
                }
                _ => break,
            }
        }
    }

    /// The winner's parent chain is final; if the settled prefix ever crept
    /// onto a branch the search later abandoned, cut it back to the shared
    /// prefix. Expected to be a no-op given the live-chain advance rule.
    fn reconcile_settled_path(&mut self) {
        let winner = self.winner.expect("reconciling the settled path requires a winner");
        let chain = self.chain_to_start(winner);
        let shared = self.stable_path
            .iter()
            .zip(chain.iter())
            .take_while(|&(a, b)| a == b)
            .count();
        self.stable_path.truncate(shared.max(1));
    }

    fn advance_final_path(&mut self) {
        for _ in 0..self.render_budget {
            let tail = match self.final_path.last() {
                Some(&tail) => tail,
                None => return,
            };
            if tail == self.start {
                return;
            }
            let parent = self.nodes[&tail]
                .parent
                .expect("final path walk hit a parentless cell before the start");
            self.final_path.push(parent);
        }
    }

    fn chain_to_start(&self, coord: GridCoordinate) -> Vec<GridCoordinate> {
        let mut chain = vec![coord];
        let mut current = coord;
        while let Some(parent) = self.nodes[&current].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }
}

/// A uniformly drawn end cell further from `start` than a quarter of the
/// smaller grid dimension (integer division). A single-cell grid has no such
/// cell; the start is returned as the end.
fn sample_distant_end(grid: &Grid,
                      start: GridCoordinate,
                      rng: &mut XorShiftRng)
                      -> GridCoordinate {
    let (ColumnsCount(cols), RowsCount(rows)) = (grid.columns(), grid.rows());
    let minimum_distance = (cols.min(rows) / 4) as f64;

    let mut end = grid.random_cell(rng);
    if grid.size() > 1 {
        while start.euclidean_distance(end) <= minimum_distance {
            end = grid.random_cell(rng);
        }
    }
    end
}
