// Local modules
mod aggregate;
mod base;
mod camera;
mod color;
mod integrator;
mod interval;
mod material;
mod matrix;
mod point;
mod progress;
mod ray;
mod scene;
mod shape;
mod texture;
mod transform;
mod utils;
mod vector;

use clap::{App, Arg};
use std::{fs, io, io::Write, path, process, sync::mpsc, sync::Arc, sync::Mutex, thread};

use crate::aggregate::Aggregate;
use crate::color::RGB;
use crate::progress::Progress;
use crate::scene::Scene;

fn main() {
    let matches = App::new("pathtracer")
        .arg(
            Arg::with_name("thread-count")
                .short("t")
                .long("thread-count")
                .value_name("THREAD_COUNT")
                .help("Number of threads to use while tracing")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("OUT_FILEPATH")
                .help("File to write the PPM image to (stdout if omitted)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("SCENE_FILE")
                .help("The scene specification to render")
                .required(true)
                .index(1),
        )
        .get_matches();

    let num_threads = match matches
        .value_of("thread-count")
        .unwrap_or("4")
        .parse::<u32>()
    {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("thread-count requires a valid positive integer");
            process::exit(1);
        }
    };

    let scene_path = path::Path::new(matches.value_of("SCENE_FILE").unwrap());
    let scene_str = match fs::read_to_string(scene_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read scene file {:?}: {}", scene_path, e);
            process::exit(1);
        }
    };
    let spec_dir = scene_path.parent().unwrap_or_else(|| path::Path::new("/"));
    let scene = match scene::deserialize(&scene_str, spec_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to parse scene: {}", e);
            process::exit(1);
        }
    };
    let scene = Arc::new(scene);

    let width = scene.camera.image_width();
    let height = scene.camera.image_height();

    let colors = Arc::new(Mutex::new(vec![RGB::black(); (width * height) as usize]));

    let (tx, rx) = {
        let (temp_tx, temp_rx) = mpsc::channel();
        (temp_tx, Arc::new(Mutex::new(temp_rx)))
    };

    let progress_tracker = Arc::new(Mutex::new(Progress::new(
        height,
        Arc::new(Mutex::new(io::stderr())),
    )));

    let mut threads = Vec::new();
    for _ in 0..(num_threads - 1_u32) {
        let thread_scene = Arc::clone(&scene);
        let thread_rx = Arc::clone(&rx);
        let thread_colors = Arc::clone(&colors);
        let thread_progress = Arc::clone(&progress_tracker);
        threads.push(thread::spawn(move || {
            render_rows(&thread_scene, &thread_rx, &thread_colors, &thread_progress)
        }));
    }

    for y in 0..height {
        tx.send(y)
            .expect("Main thread failed to send scanline index into queue.");
    }
    drop(tx);

    render_rows(&scene, &rx, &colors, &progress_tracker);
    for t in threads {
        t.join().expect("Failed to finalize a tracing thread.");
    }
    progress_tracker.lock().unwrap().done();

    let write_result = match matches.value_of("output") {
        Some(out_path) => fs::File::create(out_path)
            .map_err(|e| e.to_string())
            .and_then(|f| {
                write_ppm(f, width, height, &colors.lock().unwrap()).map_err(|e| e.to_string())
            }),
        None => write_ppm(io::stdout(), width, height, &colors.lock().unwrap())
            .map_err(|e| e.to_string()),
    };
    if let Err(e) = write_result {
        eprintln!("Failed to write output image: {}", e);
        process::exit(1);
    }
}

// Each unit of work is one scanline: every thread pulls row indices off
// the shared queue until it's drained, rendering all samples for that
// row before moving on, which keeps the progress diagnostic row-grained.
fn render_rows(
    thread_scene: &Scene,
    thread_rx: &Mutex<mpsc::Receiver<u32>>,
    thread_colors: &Mutex<Vec<RGB>>,
    thread_progress: &Mutex<Progress>,
) {
    let width = thread_scene.camera.image_width();
    let samples = thread_scene.camera.samples_per_pixel();
    let max_bounces = thread_scene.camera.max_bounces();
    let mut workspace = thread_scene.shape_aggregate.get_workspace();

    loop {
        let y = match thread_rx
            .lock()
            .expect("Thread failed acquiring lock on input data queue.")
            .recv()
        {
            Ok(y) => y,
            Err(_) => break,
        };

        let mut row = vec![RGB::black(); width as usize];
        for x in 0..width {
            let mut accum = RGB::black();
            for s in 0..samples {
                let r = thread_scene.camera.get_ray(x, y, s);
                accum = accum
                    + integrator::trace(&r, &*thread_scene.shape_aggregate, &mut workspace, max_bounces);
            }
            row[x as usize] = accum / samples as f64;
        }

        {
            let out_colors = &mut (*thread_colors
                .lock()
                .expect("Thread failed to acquire output data lock."));
            let row_start = (y * width) as usize;
            for x in 0..width as usize {
                out_colors[row_start + x] = row[x];
            }
        }

        thread_progress.lock().unwrap().scanline_done();
    }
}

fn write_ppm<W: Write>(mut out: W, width: u32, height: u32, colors: &[RGB]) -> io::Result<()> {
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", width, height)?;
    writeln!(out, "255")?;
    for y in 0..height {
        for x in 0..width {
            let (r, g, b) = colors[(y * width + x) as usize].to_ppm_triple();
            write!(out, "{} {} {} ", r, g, b)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
