use docopt::Docopt;
use mazeviz::{
    cells::GridCoordinate,
    displays::{GridDisplay, PathDisplay, StartEndPointsDisplay},
    generators::RecursiveBacktracker,
    grid::Grid,
    pathing::Pathfinder,
    units::{CellPixels, ColumnsCount, RowsCount},
};
use rand::{SeedableRng, XorShiftRng};
use serde_derive::Deserialize;
use std::{
    fs::File,
    io,
    io::prelude::*,
    rc::Rc
};

const USAGE: &str = "Mazeviz

Generates a maze with the stepped backtracker, routes between two points with
the stepped A* search and renders the result as text. The same engine the
animated front ends drive, minus the window.

Usage:
    mazeviz_driver -h | --help
    mazeviz_driver [--grid-width=<w> --grid-height=<h>] [--cell-pixels=<n>] [--steps-per-tick=<n>] [--seed=<s>] [--start-point-x=<x> --start-point-y=<y>] [--end-point-x=<e1> --end-point-y=<e2>] [--text-out=<path>] [--show-progress]

Options:
    -h --help              Show this screen.
    --grid-width=<w>       The grid width in a w*h grid [default: 20].
    --grid-height=<h>      The grid height in a w*h grid [default: 20].
    --cell-pixels=<n>      Pixel count a rendering collaborator should draw one cell with [default: 10].
    --steps-per-tick=<n>   Simulation steps per driver tick, the animation speed control [default: 1].
    --seed=<s>             Seed for the random number generators, for reproducible mazes.
    --start-point-x=<x>    x coordinate of the route start. Sampled if not given.
    --start-point-y=<y>    y coordinate of the route start. Sampled if not given.
    --end-point-x=<e1>     x coordinate of the route end. Sampled if not given.
    --end-point-y=<e2>     y coordinate of the route end. Sampled if not given.
    --text-out=<path>      Output file path for the textual rendering of the routed maze.
    --show-progress        Print generation and search progress lines while stepping.
";

#[derive(Debug, Deserialize)]
struct DriverArgs {
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_cell_pixels: usize,
    flag_steps_per_tick: usize,
    flag_seed: Option<u32>,
    flag_start_point_x: Option<isize>,
    flag_start_point_y: Option<isize>,
    flag_end_point_x: Option<isize>,
    flag_end_point_y: Option<isize>,
    flag_text_out: String,
    flag_show_progress: bool,
}

mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: DriverArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let mut grid = Grid::new(ColumnsCount(args.flag_grid_width),
                             RowsCount(args.flag_grid_height),
                             CellPixels(args.flag_cell_pixels))
        .ok_or("grid dimensions must both be positive")?;

    let (generation_rng, mut endpoint_rng) = driver_rngs(args.flag_seed);

    generate_maze(&mut grid, generation_rng, &args);

    let pathfinder = route_maze(&grid, &mut endpoint_rng, &args)?;

    render_route(&mut grid, &pathfinder, &args)
}

fn driver_rngs(seed: Option<u32>) -> (XorShiftRng, XorShiftRng) {
    match seed {
        Some(seed) => {
            let rng_for = |stream: u32| {
                XorShiftRng::from_seed([seed, stream, 0x9e37_79b9, 0x85eb_ca6b])
            };
            (rng_for(1), rng_for(2))
        }
        None => (rand::weak_rng(), rand::weak_rng()),
    }
}

fn generate_maze(grid: &mut Grid, rng: XorShiftRng, args: &DriverArgs) {
    let mut generator = RecursiveBacktracker::with_rng(grid, rng);

    let mut ticks = 0usize;
    while !generator.is_complete() {
        generator.step(grid, args.flag_steps_per_tick);
        ticks += 1;
        if args.flag_show_progress && ticks % 256 == 0 {
            println!("generating: {:5.1}%", generator.progression());
        }
    }
    if args.flag_show_progress {
        println!("generated in {} ticks", ticks);
    }
}

fn route_maze(grid: &Grid, rng: &mut XorShiftRng, args: &DriverArgs) -> Result<Pathfinder> {

    let explicit_point = |x: Option<isize>, y: Option<isize>| match (x, y) {
        (Some(x), Some(y)) => Some(GridCoordinate::new(x, y)),
        _ => None,
    };
    let start = explicit_point(args.flag_start_point_x, args.flag_start_point_y);
    let end = explicit_point(args.flag_end_point_x, args.flag_end_point_y);

    let mut pathfinder = Pathfinder::new(grid, start, end, rng)
        .ok_or("start and end points must be inside the grid")?;

    let mut ticks = 0usize;
    while !(pathfinder.path_found() && pathfinder.is_final_path_fully_rendered()) {
        pathfinder.step(grid, args.flag_steps_per_tick);
        ticks += 1;
        if args.flag_show_progress && ticks % 256 == 0 {
            println!("searching: {} open / {} closed / {} settled",
                     pathfinder.open_cells().len(),
                     pathfinder.closed_cells().len(),
                     pathfinder.stable_path().len());
        }
    }
    if args.flag_show_progress {
        println!("routed in {} ticks", ticks);
    }

    Ok(pathfinder)
}

fn render_route(grid: &mut Grid, pathfinder: &Pathfinder, args: &DriverArgs) -> Result<()> {

    // A degenerate start==end route has no line to draw, mark the endpoints
    // instead.
    if pathfinder.path_length() > 0 {
        let display = Rc::new(PathDisplay::new(pathfinder.final_path()));
        grid.set_grid_display(Some(display as Rc<dyn GridDisplay>));
    } else {
        let display = Rc::new(StartEndPointsDisplay::single_start_and_end(pathfinder.start(),
                                                                          pathfinder.end()));
        grid.set_grid_display(Some(display as Rc<dyn GridDisplay>));
    }

    let rendered = format!("{}route: {} -> {}, length {}\n",
                           grid,
                           pathfinder.start(),
                           pathfinder.end(),
                           pathfinder.path_length());

    if args.flag_text_out.is_empty() {
        print!("{}", rendered);
    } else {
        write_text_to_file(&rendered, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
