//! Ship, projectile and stage meshes plus the highlight glow tint.
//!
//! | System                         | Purpose                                          |
//! |--------------------------------|--------------------------------------------------|
//! | `attach_ship_mesh_system`      | Hull `Mesh2d` + per-ship material on `ShipMesh`  |
//! | `ship_glow_tint_system`        | Lerp the ship material toward the glow colour    |
//! | `attach_projectile_mesh_system`| Disc on every new `PlayerProjectile`             |
//! | `attach_stage_mesh_system`     | Discs on new hazards and fuel capsules           |
//!
//! Each ship gets its own `ColorMaterial` so tinting one never affects
//! another.  The handle lives in [`ShipMaterial`] on the ship root.

use super::state::{HighlightGlow, PlayerProjectile, ShipMesh};
use crate::config::ShipConfig;
use crate::particles::circle_mesh;
use crate::stage::{FuelCapsule, Hazard};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

/// The ship's own material instance, on the ship root.
#[derive(Component, Debug, Clone)]
pub struct ShipMaterial(pub Handle<ColorMaterial>);

pub struct ShipRenderPlugin;

impl Plugin for ShipRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                attach_ship_mesh_system,
                ship_glow_tint_system.after(attach_ship_mesh_system),
                attach_projectile_mesh_system,
                attach_stage_mesh_system,
            ),
        );
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Triangle-fan mesh of a convex polygon given counter-clockwise.
pub fn polygon_mesh(vertices: &[Vec2]) -> Mesh {
    let n = vertices.len();
    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| [v.x, v.y, 0.0]).collect();
    let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; n];
    let extent = vertices
        .iter()
        .fold(1.0_f32, |m, v| m.max(v.x.abs()).max(v.y.abs()));
    let uvs: Vec<[f32; 2]> = vertices
        .iter()
        .map(|v| [v.x / (2.0 * extent) + 0.5, v.y / (2.0 * extent) + 0.5])
        .collect();

    let mut indices: Vec<u32> = Vec::with_capacity(n.saturating_sub(2) * 3);
    for i in 1..n.saturating_sub(1) as u32 {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// `base` moved toward `glow` by `t` in sRGB space.
pub fn glow_tint(base: [f32; 3], glow: [f32; 3], t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: f32, b: f32| a + (b - a) * t;
    Color::srgb(
        mix(base[0], glow[0]),
        mix(base[1], glow[1]),
        mix(base[2], glow[2]),
    )
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Give every new [`ShipMesh`] its hull mesh and a fresh material instance.
pub fn attach_ship_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &ShipMesh, &ChildOf), Added<ShipMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<ShipConfig>,
) {
    for (entity, ship_mesh, child_of) in query.iter() {
        let mesh_handle = meshes.add(polygon_mesh(&ship_mesh.hull));
        let mat_handle = materials.add(ColorMaterial::from_color(config.base_color()));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh_handle), MeshMaterial2d(mat_handle.clone())));
        commands
            .entity(child_of.parent())
            .insert(ShipMaterial(mat_handle));
    }
}

/// Tint each ship's material by its normalised glow value.
pub fn ship_glow_tint_system(
    query: Query<(&HighlightGlow, &ShipMaterial), Changed<HighlightGlow>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<ShipConfig>,
) {
    for (glow, material) in query.iter() {
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.color = glow_tint(config.base_color, config.glow_color, glow.normalized());
        }
    }
}

/// Attach a disc to every newly-fired projectile.  One mesh and material are
/// shared by all projectiles of a frame.
pub fn attach_projectile_mesh_system(
    mut commands: Commands,
    query: Query<Entity, Added<PlayerProjectile>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<ShipConfig>,
) {
    if query.is_empty() {
        return;
    }
    let Some(spec) = config.projectile.as_ref() else {
        return;
    };
    let [r, g, b] = spec.color;
    let mesh_handle = meshes.add(circle_mesh(spec.collider_radius, 10));
    let mat_handle = materials.add(ColorMaterial::from_color(Color::srgb(r, g, b)));
    for entity in query.iter() {
        commands.entity(entity).insert((
            Mesh2d(mesh_handle.clone()),
            MeshMaterial2d(mat_handle.clone()),
        ));
    }
}

/// Attach discs to new hazards (rock grey) and fuel capsules (green).
#[allow(clippy::type_complexity)]
pub fn attach_stage_mesh_system(
    mut commands: Commands,
    q_hazards: Query<(Entity, &Hazard), Added<Hazard>>,
    q_fuel: Query<Entity, Added<FuelCapsule>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<ShipConfig>,
) {
    if !q_hazards.is_empty() {
        let rock = materials.add(ColorMaterial::from_color(Color::srgb(0.42, 0.36, 0.32)));
        for (entity, hazard) in q_hazards.iter() {
            let mesh = meshes.add(circle_mesh(hazard.radius, 7));
            commands
                .entity(entity)
                .insert((Mesh2d(mesh), MeshMaterial2d(rock.clone())));
        }
    }
    if !q_fuel.is_empty() {
        let mesh = meshes.add(circle_mesh(config.fuel_capsule_radius, 12));
        let green = materials.add(ColorMaterial::from_color(Color::srgb(0.35, 0.95, 0.45)));
        for entity in q_fuel.iter() {
            commands
                .entity(entity)
                .insert((Mesh2d(mesh.clone()), MeshMaterial2d(green.clone())));
        }
    }
}
