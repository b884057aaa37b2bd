use frame_locator::config::load_config;
use frame_locator::image::io::{load_volume_raw, write_json_file};
use frame_locator::{CheckStatus, FrameLocator};
use nalgebra::Point3;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| "Usage: frame-locator <config.json>".to_string())?;
    let config = load_config(&config_path)?;

    let src = &config.volume;
    let volume = load_volume_raw(&src.path, src.geometry, src.rescale)?
        .with_background(src.background);
    let locator = FrameLocator::new(&volume, config.locator_params.clone());

    let points: Vec<Point3<f64>> = config
        .points
        .iter()
        .map(|p| Point3::new(p[0], p[1], p[2]))
        .collect();
    let reports = locator.locate_all(&points);

    for report in &reports {
        let [x, y, z] = report.point;
        let c = &report.coordinates;
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
        println!(
            "({x:.1}, {y:.1}, {z:.1}) lat={} vrt={} lng={} [{}] {:.1} ms",
            fmt(c.lateral),
            fmt(c.vertical),
            fmt(c.longitudinal),
            match report.status {
                CheckStatus::Found => "found",
                CheckStatus::NoLongitudinal => "no longitudinal",
                CheckStatus::NotFound => "not found",
            },
            report.elapsed_ms
        );
        for failure in &report.failures {
            println!("    {failure}");
        }
    }

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &reports)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}
