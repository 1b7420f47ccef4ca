//! A tiny orrery: a sun, a planet and a moon, each spinning in its parent's
//! frame. Prints the moon's world position as the sun turns, then reparents
//! the moon to the sun both ways to show the difference.
//!
//! Run with `RUST_LOG=debug cargo run --example orbits` to see the hierarchy log.

use std::f32::consts::TAU;
use tucan_transform::*;

struct Name(&'static str);

fn main() -> Result<()> {
    env_logger::init();

    let mut scene = TransformHierarchy::new();

    let sun = scene.spawn_with(Transform::new().uniform_scale(2.0), (Name("sun"),));
    let planet = scene.spawn_with(
        Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
        (Name("planet"),),
    );
    let moon = scene.spawn_with(
        Transform::from_position(Vec3::new(1.5, 0.0, 0.0)).uniform_scale(0.25),
        (Name("moon"),),
    );

    // Local offsets are authored relative to each parent.
    scene.set_parent(planet, Some(sun), false)?;
    scene.set_parent(moon, Some(planet), false)?;

    let steps = 8;
    for step in 0..=steps {
        let angle = TAU * step as f32 / steps as f32;
        scene.set_local_orientation(sun, Quat::from_rotation_y(angle))?;
        scene.set_local_orientation(planet, Quat::from_rotation_y(angle * 4.0))?;

        let world = scene.world(moon)?;
        println!(
            "t={step:>2}  moon at ({:>7.3}, {:>7.3}, {:>7.3})  scale {:.3}",
            world.position.x, world.position.y, world.position.z, world.scale.x
        );
    }

    let before = scene.world(moon)?.position;
    scene.set_parent(moon, Some(sun), true)?;
    println!(
        "moved moon under sun keeping its pose: {:?} -> {:?}",
        before,
        scene.world(moon)?.position
    );

    scene.set_parent(moon, Some(planet), false)?;
    println!(
        "moved moon back under planet keeping local values: now at {:?}",
        scene.world(moon)?.position
    );

    for entity in scene.descendants(sun)? {
        let name = scene.component::<Name>(entity).map(|n| n.0).unwrap_or("?");
        let depth = scene.ancestors(entity)?.len();
        println!("{}{name}", "  ".repeat(depth));
    }

    let uniforms = scene.all_model_uniforms()?;
    println!(
        "{} model uniforms, {} bytes ready for upload",
        uniforms.len(),
        bytemuck::cast_slice::<ModelUniforms, u8>(&uniforms).len()
    );

    Ok(())
}
