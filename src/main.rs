use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;
use sandbox_core::{load_config, save_config, SandboxConfig, SandboxPlugin, SceneVisualsPlugin};
use sandbox_physics::{PhysicsDebugPlugin, PhysicsDebugRender};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rigid-body character sandbox", long_about = None)]
struct Args {
    /// JSON config with physics, movement and prop settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the default config to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
    /// Start with the physics wireframe hidden (F1 toggles it)
    #[arg(long)]
    no_debug_render: bool,
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.dump_config {
        if let Err(e) = save_config(&SandboxConfig::default(), path) {
            eprintln!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
        return;
    }

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Physics Sandbox".into(),
            ..default()
        }),
        ..default()
    }));

    // After DefaultPlugins so the log subscriber is installed.
    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                SandboxConfig::default()
            }
        },
        None => SandboxConfig::default(),
    };

    app.add_plugins(SandboxPlugin::new(config))
        .add_plugins(SceneVisualsPlugin)
        .add_plugins(PhysicsDebugPlugin)
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)));

    if args.no_debug_render {
        app.world_mut().resource_mut::<PhysicsDebugRender>().enabled = false;
    }

    app.run();
}
