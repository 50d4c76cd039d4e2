use crate::cells::{CoordinateSmallVec, GridCoordinate};
use crate::utils::FnvHashSet;

/// Render the contents of one grid cell as text.
///
/// Implementations are injected into a `Grid` (`Grid::set_grid_display`) and
/// consulted by its `fmt::Display` rendering. The returned String should be
/// 3 glyphs long, padded if required.
pub trait GridDisplay {
    fn render_cell_body(&self, _: GridCoordinate) -> String {
        String::from("   ")
    }
}

/// Marks every cell on a path with a dot.
#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<GridCoordinate>,
}

impl PathDisplay {
    pub fn new(path: &[GridCoordinate]) -> Self {
        PathDisplay { on_path_coordinates: path.iter().cloned().collect() }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

/// Marks route start and end cells with `S` and `E`.
#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}

impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }

    pub fn single_start_and_end(start: GridCoordinate,
                                end: GridCoordinate)
                                -> StartEndPointsDisplay {
        let as_small_vec = |coord: GridCoordinate| [coord].iter().cloned().collect();
        StartEndPointsDisplay::new(as_small_vec(start), as_small_vec(end))
    }
}

impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        let contains_coordinate =
            |coordinates: &CoordinateSmallVec| coordinates.iter().any(|&c| c == coord);

        if contains_coordinate(&self.start_coordinates) {
            String::from(" S ")
        } else if contains_coordinate(&self.end_coordinates) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::grid::Grid;
    use crate::units::{CellPixels, ColumnsCount, RowsCount};
    use std::rc::Rc;

    #[test]
    fn path_display_marks_path_cells() {
        let path = [GridCoordinate::new(0, 0), GridCoordinate::new(1, 0)];
        let display = PathDisplay::new(&path);
        assert_eq!(display.render_cell_body(GridCoordinate::new(0, 0)), " . ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 0)), " . ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 1)), "   ");
    }

    #[test]
    fn start_end_display_marks_endpoints() {
        let display = StartEndPointsDisplay::single_start_and_end(GridCoordinate::new(0, 0),
                                                                  GridCoordinate::new(1, 1));
        assert_eq!(display.render_cell_body(GridCoordinate::new(0, 0)), " S ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 1)), " E ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 0)), "   ");
    }

    #[test]
    fn injected_display_shows_up_in_grid_rendering() {
        let mut g = Grid::new(ColumnsCount(2), RowsCount(1), CellPixels(10))
            .expect("valid test dimensions");
        g.remove_wall_between(GridCoordinate::new(0, 0), GridCoordinate::new(1, 0));

        let path = [GridCoordinate::new(0, 0), GridCoordinate::new(1, 0)];
        g.set_grid_display(Some(Rc::new(PathDisplay::new(&path)) as Rc<dyn GridDisplay>));

        assert_eq!(format!("{}", g), "┌───────┐\n│ .   . │\n└───────┘\n");
    }
}
