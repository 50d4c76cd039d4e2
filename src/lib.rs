//! **mazeviz** is an incremental maze generation and route finding engine
//! for animated visualisations.
//!
//! The engine is stepped: callers advance the maze generator and then the
//! pathfinder by discrete steps per frame and read grid/search state back for
//! drawing. Nothing in here blocks, draws or spawns threads.

pub mod cells;
pub mod displays;
pub mod generators;
pub mod grid;
pub mod pathing;
pub mod units;
mod utils;

pub use crate::utils::{FnvHashMap, FnvHashSet};
