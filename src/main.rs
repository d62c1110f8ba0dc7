use std::process::ExitCode;

use glint::{
    cli::{Arguments, Parser},
    render::{RenderConfig, Renderer},
    scene,
};

fn main() -> ExitCode {
    // Parsing cli args
    let cli_args = Arguments::parse();

    env_logger::Builder::new()
        .filter_level(cli_args.verbosity.log_level_filter())
        .init();

    // Get scene
    let scene::LoadedScene {
        world,
        camera,
        mut film,
    } = match scene::load(&cli_args.scene) {
        Ok(scene) => scene,
        Err(why) => {
            log::error!("Failed to load scene: {why}");
            return ExitCode::FAILURE;
        }
    };

    // command line overrides the scene file
    if let Some(output) = cli_args.output {
        film.output = output;
    }
    if let Some(samples) = cli_args.samples_per_pixel {
        film.samples_per_pixel = samples;
    }

    let renderer = Renderer::new(RenderConfig {
        threads: cli_args.threads,
        max_depth: cli_args.bounce_depth,
        seed: cli_args.seed,
        ..RenderConfig::default()
    });

    let framebuffer = match renderer.render(&world, &camera, &film) {
        Ok(framebuffer) => framebuffer,
        Err(why) => {
            log::error!("Failed to render: {why}");
            return ExitCode::FAILURE;
        }
    };

    // write image to file
    match framebuffer.save(&film.output) {
        Ok(()) => {
            println!("Image written to {:?}", &film.output);
            ExitCode::SUCCESS
        }
        Err(why) => {
            log::error!("Failed to write {:?}: {why}", &film.output);
            ExitCode::FAILURE
        }
    }
}
