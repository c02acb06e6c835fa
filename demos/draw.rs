/// Visual debugger for the refiner: walks the viewer along a line, refines
/// once per position and draws a frame after every pass.
use clap::Parser;
use lod_mesh::{
    Insertion, LodConfig, Mesh, MeshBuilder, MeshError, Observer, PassStats, Point, RefineConfig,
    Refiner, TriangleId,
};
use rand::{rngs::StdRng, SeedableRng};
use utils::{draw_svg, mesh_to_svg};
mod utils;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// outer triangle corners as x0 y0 x1 y1 x2 y2
    #[arg(long, num_args = 6, default_values_t = [0., 0., 1000., 0., 500., 1000.])]
    corners: Vec<f64>,

    /// viewer position of the first pass
    #[arg(long, num_args = 2, default_values_t = [500., 300.])]
    from: Vec<f64>,

    /// viewer position of the last pass
    #[arg(long, num_args = 2, default_values_t = [500., 300.])]
    to: Vec<f64>,

    #[arg(long, default_value = "1")]
    passes: usize,

    #[arg(long, default_value = "100")]
    render_distance: f64,

    #[arg(long, default_value = "5")]
    close_resolution: f64,

    #[arg(long, default_value = "100000")]
    budget: usize,

    /// random points inserted before the first pass
    #[arg(long, default_value = "0")]
    seed_points: usize,

    #[arg(long, default_value = "0")]
    rng_seed: u64,

    /// final mesh as svg
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    /// directory receiving one svg per pass
    #[arg(long)]
    frames: Option<std::path::PathBuf>,

    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let corners = [
        Point::new(args.corners[0], args.corners[1]),
        Point::new(args.corners[2], args.corners[3]),
        Point::new(args.corners[4], args.corners[5]),
    ];
    let mut mesh = match MeshBuilder::new(corners).build() {
        Ok(mesh) => mesh,
        Err(err) => {
            eprintln!("cannot build mesh: {err}");
            std::process::exit(1);
        }
    };
    let accepted = mesh.insert_random(&mut StdRng::seed_from_u64(args.rng_seed), args.seed_points);
    println!("{accepted} of {} seed points accepted", args.seed_points);

    let lod = match LodConfig::new(args.render_distance, args.close_resolution) {
        Ok(lod) => lod,
        Err(err) => {
            eprintln!("invalid level of detail: {err}");
            std::process::exit(1);
        }
    };
    let mut refiner = Refiner::new(RefineConfig::new(lod).insertion_budget(args.budget));
    let mut observer = DrawObserver::new(&args);

    let from = Point::new(args.from[0], args.from[1]);
    let to = Point::new(args.to[0], args.to[1]);
    let passes = args.passes.max(1);

    let start = std::time::Instant::now();
    for pass in 0..passes {
        let t = if passes == 1 {
            0.
        } else {
            pass as f64 / (passes - 1) as f64
        };
        let viewer = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
        refiner.refine_with_observer(&mut mesh, &viewer, &mut observer);
    }
    println!(
        "{:?} for {passes} passes, {} vertices, {} triangles",
        start.elapsed(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    if args.debug {
        if let Err(err) = mesh.validate() {
            println!("invalid mesh: {err}");
        }
    }

    if let Some(dir) = &args.frames {
        observer.save(dir);
    }
    if let Some(output) = args.output {
        draw_svg(&mesh, Some(refiner.viewer()), output);
    }
}

struct DrawObserver {
    debug: bool,
    keep_frames: bool,

    viewer: Point,
    inserted: u64,
    rejected: u64,
    split: u64,
    evaluated: u64,

    /// svgs
    frames: Vec<String>,
}

impl DrawObserver {
    fn new(args: &Args) -> Self {
        Self {
            debug: args.debug,
            keep_frames: args.frames.is_some(),
            viewer: Point::default(),
            inserted: 0,
            rejected: 0,
            split: 0,
            evaluated: 0,
            frames: vec![],
        }
    }

    fn save(&self, dir: &std::path::Path) {
        std::fs::create_dir_all(dir).unwrap();
        for (i, frame) in self.frames.iter().enumerate() {
            std::fs::write(dir.join(format!("frame_{i:04}.svg")), frame).unwrap();
        }
        println!("{} frames written to {}", self.frames.len(), dir.display());
    }
}

impl Observer for DrawObserver {
    fn vertex_inserted(&mut self, insertion: &Insertion, _mesh: &Mesh) {
        self.inserted += 1;
        if self.debug {
            println!(
                "vertex {} replaced {} triangles with {}",
                insertion.vertex.as_usize(),
                insertion.removed.len(),
                insertion.created.len()
            );
        }
    }

    fn insertion_rejected(&mut self, point: lod_mesh::Barycentric, error: &MeshError, _mesh: &Mesh) {
        self.rejected += 1;
        if self.debug {
            println!("rejected {point:?}: {error}");
        }
    }

    fn pass_started(&mut self, viewer: Point, mesh: &Mesh) {
        self.viewer = viewer;
        println!(
            "pass at ({:.1}, {:.1}) over {} triangles",
            viewer.x,
            viewer.y,
            mesh.triangle_count()
        );
    }

    fn candidate_evaluated(&mut self, _triangle_id: TriangleId, _level: u32, split: bool, _mesh: &Mesh) {
        self.evaluated += 1;
        if split {
            self.split += 1;
        }
    }

    fn pass_done(&mut self, stats: &PassStats, mesh: &Mesh) {
        println!(
            "pass done: {} evaluated, {} inserted, {} dropped, totals {}/{}/{}/{}",
            stats.evaluated,
            stats.inserted,
            stats.dropped,
            self.evaluated,
            self.split,
            self.inserted,
            self.rejected
        );
        if self.keep_frames {
            self.frames
                .push(mesh_to_svg(mesh, Some(self.viewer)).to_string());
        }
    }
}
