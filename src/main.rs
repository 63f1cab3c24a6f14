use std::error::Error;
use std::fs;
use std::time::Instant;

use clap::Parser;
use log::info;

use whitted::raytracing::parser::{ParsedScene, SceneParser};
use whitted::raytracing::world::RenderOptions;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file
    scene: String,
    /// the path where the rendered image is saved
    #[arg(short, long, default_value = "output.png")]
    output: String,
    /// the number of rays shot per pixel
    #[arg(short, long, default_value_t = 1)]
    sample_rate: u32,
    /// apply gamma correction to the final image
    #[arg(long, default_value_t = false)]
    gamma_correction: bool,
    /// scan every object per ray instead of building the bounding volume hierarchy
    #[arg(long, default_value_t = false)]
    disable_hierarchy: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let content = fs::read_to_string(&args.scene)?;
    let ParsedScene {
        mut camera,
        mut scene,
    } = match SceneParser::new(&content).parse_scene() {
        Ok(parsed) => parsed,
        Err(error) => {
            error.print_error_location(&content);
            return Err(Box::new(error));
        }
    };
    info!(
        "loaded {} with {} objects and {} lights",
        args.scene,
        scene.objects.len(),
        scene.lights.len()
    );

    let options = RenderOptions {
        use_hierarchy: !args.disable_hierarchy,
        sample_rate: args.sample_rate.max(1),
    };
    let start = Instant::now();
    scene.render(&mut camera, &options);
    let total_time = start.elapsed();

    camera.to_image(args.gamma_correction).save(&args.output)?;
    println!("Rendered {} in {:?}", args.output, total_time);
    Ok(())
}
