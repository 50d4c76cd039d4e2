use rand::{Rng, XorShiftRng};
use std::fmt;
use std::rc::Rc;

use crate::cells::{offset_coordinate, opposite_direction, Cell, CoordinateSmallVec,
                   GridCoordinate, GridDirection, ALL_DIRECTIONS};
use crate::displays::GridDisplay;
use crate::units::{CellPixels, ColumnsCount, RowsCount};

/// Dense rectangular grid of `Cell`s, row-major.
///
/// The shape is fixed at construction; only the wall flags and the
/// generator's visitation marks on individual cells ever change. Coordinates
/// outside `[0, cols) × [0, rows)` are a routine "no cell" condition, not an
/// error.
pub struct Grid {
    columns: ColumnsCount,
    rows: RowsCount,
    cell_pixels: CellPixels,
    cells: Vec<Cell>,
    grid_display: Option<Rc<dyn GridDisplay>>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: columns: {:?}, rows: {:?}, cell_pixels: {:?}",
               self.columns,
               self.rows,
               self.cell_pixels)
    }
}

impl Grid {
    /// A grid of `columns * rows` cells, every wall present, nothing visited.
    /// `None` when either dimension is zero.
    pub fn new(columns: ColumnsCount, rows: RowsCount, cell_pixels: CellPixels) -> Option<Grid> {
        let (ColumnsCount(cols), RowsCount(rows_count)) = (columns, rows);
        if cols == 0 || rows_count == 0 {
            return None;
        }

        let cells = (0..cols * rows_count)
            .map(|index| Cell::new(index_to_grid_coordinate(cols, index)))
            .collect();

        Some(Grid {
            columns,
            rows,
            cell_pixels,
            cells,
            grid_display: None,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.columns.0 * self.rows.0
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    /// Rendering hint for collaborators that draw this grid to a screen.
    #[inline]
    pub fn cell_pixels(&self) -> CellPixels {
        self.cell_pixels
    }

    #[inline]
    pub fn set_grid_display(&mut self, grid_display: Option<Rc<dyn GridDisplay>>) {
        self.grid_display = grid_display;
    }

    #[inline]
    pub fn grid_display(&self) -> &Option<Rc<dyn GridDisplay>> {
        &self.grid_display
    }

    /// Bounds-checked cell lookup.
    pub fn cell(&self, coord: GridCoordinate) -> Option<&Cell> {
        match self.cell_index(coord) {
            Some(index) => Some(&self.cells[index]),
            None => None,
        }
    }

    pub(crate) fn cell_mut(&mut self, coord: GridCoordinate) -> Option<&mut Cell> {
        match self.cell_index(coord) {
            Some(index) => Some(&mut self.cells[index]),
            None => None,
        }
    }

    /// The axis-adjacent in-bounds cells not yet visited by the generator.
    /// Wall state is ignored: this is the generation-time neighbour query.
    pub fn unvisited_neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&dir| self.neighbour_at_direction(coord, dir))
            .filter(|&adjacent| {
                self.cell(adjacent).map_or(false, |cell| !cell.is_visited())
            })
            .collect()
    }

    /// The axis-adjacent in-bounds cells with no wall between them and
    /// `coord`, checked through the neighbour's side of the shared wall.
    /// This is the pathfinding-time neighbour query.
    pub fn connected_neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&dir| {
                self.neighbour_at_direction(coord, dir).and_then(|adjacent| {
                    self.cell(adjacent).and_then(|cell| {
                        if cell.is_wall(opposite_direction(dir)) {
                            None
                        } else {
                            Some(adjacent)
                        }
                    })
                })
            })
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  direction: GridDirection)
                                  -> Option<GridCoordinate> {
        let neighbour_coord = offset_coordinate(coord, direction);
        if self.is_valid_coordinate(neighbour_coord) {
            Some(neighbour_coord)
        } else {
            None
        }
    }

    /// Carve a passage: clear both reciprocal wall flags between two adjacent
    /// cells.
    ///
    /// Panics unless `a` and `b` are both in bounds and exactly one unit
    /// apart along exactly one axis. Only ever called on cells the generator
    /// just selected as neighbours of one another, so a violation is a
    /// programming error, not an input error.
    pub fn remove_wall_between(&mut self, a: GridCoordinate, b: GridCoordinate) {
        let direction = match (b.x - a.x, b.y - a.y) {
            (0, -1) => GridDirection::North,
            (0, 1) => GridDirection::South,
            (1, 0) => GridDirection::East,
            (-1, 0) => GridDirection::West,
            _ => panic!("cannot remove a wall between non-adjacent cells {} and {}", a, b),
        };

        self.cell_mut(a)
            .expect("wall removal from a cell outside the grid")
            .remove_wall(direction);
        self.cell_mut(b)
            .expect("wall removal from a cell outside the grid")
            .remove_wall(opposite_direction(direction));
    }

    /// Is the passage from `coord` towards `direction` carved open?
    /// False when there is no cell on the far side.
    pub fn is_neighbour_open(&self, coord: GridCoordinate, direction: GridDirection) -> bool {
        self.neighbour_at_direction(coord, direction).is_some() &&
        self.cell(coord).map_or(false, |cell| !cell.is_wall(direction))
    }

    pub fn random_cell(&self, rng: &mut XorShiftRng) -> GridCoordinate {
        let index = rng.gen::<usize>() % self.size();
        index_to_grid_coordinate(self.columns.0, index)
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            row_width: self.columns.0,
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Row,
            current_index: 0,
            row_width: self.columns.0,
            column_height: self.rows.0,
        }
    }

    pub fn iter_column(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Column,
            current_index: 0,
            row_width: self.columns.0,
            column_height: self.rows.0,
        }
    }

    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        coord.x >= 0 && coord.y >= 0 && (coord.x as usize) < self.columns.0 &&
        (coord.y as usize) < self.rows.0
    }

    fn cell_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some((coord.y as usize * self.columns.0) + coord.x as usize)
        } else {
            None
        }
    }

    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        self.grid_display
            .as_ref()
            .map_or_else(|| String::from("   "),
                         |display| display.render_cell_body(coord))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        const WALL_L: &str = "╴";
        const WALL_R: &str = "╶";
        const WALL_U: &str = "╵";
        const WALL_D: &str = "╷";
        const WALL_LR_3: &str = "───";
        const WALL_LR: &str = "─";
        const WALL_UD: &str = "│";
        const WALL_LD: &str = "┐";
        const WALL_RU: &str = "└";
        const WALL_LU: &str = "┘";
        const WALL_RD: &str = "┌";
        const WALL_LRU: &str = "┴";
        const WALL_LRD: &str = "┬";
        const WALL_LRUD: &str = "┼";
        const WALL_RUD: &str = "├";
        const WALL_LUD: &str = "┤";

        let columns_count = self.columns.0;
        let rows_count = self.rows.0;

        // The north most boundary is a special case: nothing above feeds
        // into its corner pieces.
        let mut output = String::from(WALL_RD);
        for x in 0..columns_count {
            let coord = GridCoordinate::new(x as isize, 0);
            output.push_str(WALL_LR_3);
            if self.is_neighbour_open(coord, GridDirection::East) {
                output.push_str(WALL_LR);
            } else if x == columns_count - 1 {
                output.push_str(WALL_LD);
            } else {
                output.push_str(WALL_LRD);
            }
        }
        output.push_str("\n");

        for (index_row, row) in self.iter_row().enumerate() {

            let is_last_row = index_row == rows_count - 1;

            // The top section of each cell was rendered by the previous row,
            // so each row renders its cell bodies and its southern boundary.
            let mut row_middle_section_render = String::from(WALL_UD);
            let mut row_bottom_section_render = String::from("");

            for (index_column, cell_coord) in row.into_iter().enumerate() {

                let is_first_column = index_column == 0;
                let is_last_column = index_column == columns_count - 1;
                let east_open = self.is_neighbour_open(cell_coord, GridDirection::East);
                let south_open = self.is_neighbour_open(cell_coord, GridDirection::South);

                row_middle_section_render.push_str(self.render_cell_body(cell_coord).as_ref());
                row_middle_section_render.push_str(if east_open { " " } else { WALL_UD });

                if is_first_column {
                    row_bottom_section_render = if is_last_row {
                        String::from(WALL_RU)
                    } else if south_open {
                        String::from(WALL_UD)
                    } else {
                        String::from(WALL_RUD)
                    };
                }
                row_bottom_section_render.push_str(if south_open { "   " } else { WALL_LR_3 });

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => {
                        if east_open {
                            WALL_LR
                        } else {
                            WALL_LRU
                        }
                    }
                    (false, true) => {
                        if south_open {
                            WALL_UD
                        } else {
                            WALL_LUD
                        }
                    }
                    (false, false) => {
                        let access_se_from_east =
                            self.neighbour_at_direction(cell_coord, GridDirection::East)
                                .map_or(false,
                                        |c| self.is_neighbour_open(c, GridDirection::South));
                        let access_se_from_south =
                            self.neighbour_at_direction(cell_coord, GridDirection::South)
                                .map_or(false,
                                        |c| self.is_neighbour_open(c, GridDirection::East));
                        let show_right_section = !access_se_from_east;
                        let show_down_section = !access_se_from_south;
                        let show_up_section = !east_open;
                        let show_left_section = !south_open;

                        match (show_left_section,
                               show_right_section,
                               show_up_section,
                               show_down_section) {
                            (true, true, true, true) => WALL_LRUD,
                            (true, true, true, false) => WALL_LRU,
                            (true, true, false, true) => WALL_LRD,
                            (true, false, true, true) => WALL_LUD,
                            (false, true, true, true) => WALL_RUD,
                            (true, true, false, false) => WALL_LR,
                            (false, false, true, true) => WALL_UD,
                            (false, true, true, false) => WALL_RU,
                            (true, false, false, true) => WALL_LD,
                            (true, false, true, false) => WALL_LU,
                            (false, true, false, true) => WALL_RD,
                            (true, false, false, false) => WALL_L,
                            (false, true, false, false) => WALL_R,
                            (false, false, true, false) => WALL_U,
                            (false, false, false, true) => WALL_D,
                            _ => " ",
                        }
                    }
                };
                row_bottom_section_render.push_str(corner);
            }

            output.push_str(row_middle_section_render.as_ref());
            output.push_str("\n");
            output.push_str(row_bottom_section_render.as_ref());
            output.push_str("\n");
        }

        write!(f, "{}", output)
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = GridCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    row_width: usize,
    cells_count: usize,
}
impl Iterator for CellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = index_to_grid_coordinate(self.row_width, self.current_cell_number);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}

#[derive(Debug, Copy, Clone)]
enum BatchIterType {
    Row,
    Column,
}

/// Iterator over whole rows (or whole columns) of coordinates at a time.
#[derive(Debug, Copy, Clone)]
pub struct BatchIter {
    iter_type: BatchIterType,
    current_index: usize,
    row_width: usize,
    column_height: usize,
}
impl Iterator for BatchIter {
    type Item = Vec<GridCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        let (batches_count, batch_length) = match self.iter_type {
            BatchIterType::Row => (self.column_height, self.row_width),
            BatchIterType::Column => (self.row_width, self.column_height),
        };
        if self.current_index < batches_count {
            let coords = (0..batch_length)
                .map(|i| {
                    if let BatchIterType::Row = self.iter_type {
                        GridCoordinate::new(i as isize, self.current_index as isize)
                    } else {
                        GridCoordinate::new(self.current_index as isize, i as isize)
                    }
                })
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches_count = match self.iter_type {
            BatchIterType::Row => self.column_height,
            BatchIterType::Column => self.row_width,
        };
        let remaining = batches_count - self.current_index;
        (remaining, Some(remaining))
    }
}

fn index_to_grid_coordinate(row_width: usize, one_dimensional_index: usize) -> GridCoordinate {
    let y = one_dimensional_index / row_width;
    let x = one_dimensional_index - (y * row_width);
    GridCoordinate {
        x: x as isize,
        y: y as isize,
    }
}
