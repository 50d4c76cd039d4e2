#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RowsCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct ColumnsCount(pub usize);

/// Side length in pixels of one grid cell when a rendering collaborator draws
/// the grid. Per-grid configuration data; the engine itself never reads it.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct CellPixels(pub usize);
