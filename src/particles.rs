//! Particle effects: the ship's engine exhaust and its explosion.
//!
//! ## Design
//!
//! Particles are lightweight ECS entities with a [`Particle`] component that
//! stores velocity, age and colour.  Effects are described by a
//! [`ParticleTemplate`] from the ship config:
//!
//! - [`spawn_burst`] emits `template.count` particles at once (explosion).
//! - A [`ParticleEmitter`] component emits `template.rate` particles per
//!   second from its entity's world transform (engine thrust).  The emitter
//!   is a child of the ship, so it disappears with it.
//!
//! | System                        | Plugin                   | Purpose                                |
//! |-------------------------------|--------------------------|----------------------------------------|
//! | `particle_emitter_system`     | `ParticlesPlugin`        | Emit from continuous emitters          |
//! | `particle_motion_system`      | `ParticlesPlugin`        | Move, age and despawn particles        |
//! | `attach_particle_mesh_system` | `ParticleRenderPlugin`   | Attach `Mesh2d` to fresh particles     |
//! | `particle_fade_system`        | `ParticleRenderPlugin`   | Fade each particle's material alpha    |
//!
//! The render half is a separate plugin so the simulation half runs under
//! `MinimalPlugins` in tests.  A single shared circle mesh
//! ([`ParticleMesh`]) is created once; each particle gets its own
//! `ColorMaterial` so its alpha can fade individually.

use crate::config::ParticleTemplate;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;

/// Shared unit-circle mesh used by all particle entities.
#[derive(Resource)]
pub struct ParticleMesh(pub Handle<Mesh>);

/// Short-lived visual particle entity.
#[derive(Component)]
pub struct Particle {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    pub age: f32,
    /// Entity is despawned when `age >= lifetime`.
    pub lifetime: f32,
    /// Base colour (sRGB, 0–1).
    pub color: [f32; 3],
    /// `None` until `attach_particle_mesh_system` runs.
    pub material: Option<Handle<ColorMaterial>>,
}

/// Continuous emitter; emits along its world +X within `template.spread_deg`.
#[derive(Component, Debug, Clone)]
pub struct ParticleEmitter {
    pub template: ParticleTemplate,
    /// Fractional particles carried over between frames.
    pub accumulator: f32,
}

impl ParticleEmitter {
    pub fn new(template: ParticleTemplate) -> Self {
        Self {
            template,
            accumulator: 0.0,
        }
    }

    /// Whole particles due after `dt` seconds.
    pub fn due(&mut self, dt: f32) -> u32 {
        self.accumulator += self.template.rate.max(0.0) * dt;
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        whole as u32
    }
}

// ── Plugins ───────────────────────────────────────────────────────────────────

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (particle_emitter_system, particle_motion_system).chain(),
        );
    }
}

pub struct ParticleRenderPlugin;

impl Plugin for ParticleRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_particle_mesh).add_systems(
            Update,
            (attach_particle_mesh_system, particle_fade_system)
                .chain()
                .after(particle_motion_system),
        );
    }
}

// ── Spawn helpers ─────────────────────────────────────────────────────────────

/// Spawn a single particle following `template` around `heading` (radians).
fn spawn_particle(
    commands: &mut Commands,
    rng: &mut impl Rng,
    pos: Vec2,
    heading: f32,
    template: &ParticleTemplate,
) {
    let spread = template.spread_deg.to_radians();
    let angle = if spread > 0.0 {
        heading + rng.gen_range(-spread..=spread)
    } else {
        heading
    };
    let speed = if template.speed_max > template.speed_min {
        rng.gen_range(template.speed_min..template.speed_max)
    } else {
        template.speed_min
    };
    let velocity = Vec2::from_angle(angle) * speed;
    let lifetime = template.lifetime * rng.gen_range(0.7_f32..1.0_f32);

    commands.spawn((
        Particle {
            velocity,
            age: 0.0,
            lifetime,
            color: template.color,
            material: None,
        },
        Transform::from_translation(pos.extend(0.9)).with_scale(Vec3::splat(template.size)),
        Visibility::default(),
    ));
}

/// Spawn a one-shot burst of `template.count` particles at `pos`.
///
/// `heading` is the centre of the emission cone in radians; bursts with a
/// 180° spread ignore it.
pub fn spawn_burst(commands: &mut Commands, pos: Vec2, heading: f32, template: &ParticleTemplate) {
    let mut rng = rand::thread_rng();
    for _ in 0..template.count {
        spawn_particle(commands, &mut rng, pos, heading, template);
    }
}

// ── Simulation systems ────────────────────────────────────────────────────────

/// Emit due particles from every [`ParticleEmitter`] at its world transform.
pub fn particle_emitter_system(
    mut commands: Commands,
    mut emitters: Query<(&GlobalTransform, &mut ParticleEmitter)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();
    for (global, mut emitter) in emitters.iter_mut() {
        let due = emitter.due(dt);
        if due == 0 {
            continue;
        }
        let (_, rotation, translation) = global.to_scale_rotation_translation();
        let forward = rotation.mul_vec3(Vec3::X).truncate();
        let heading = forward.y.atan2(forward.x);
        for _ in 0..due {
            spawn_particle(
                &mut commands,
                &mut rng,
                translation.truncate(),
                heading,
                &emitter.template,
            );
        }
    }
}

/// Advance all particles and despawn the expired ones.
pub fn particle_motion_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut particle) in query.iter_mut() {
        particle.age += dt;
        if particle.age >= particle.lifetime {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;
    }
}

// ── Render systems ────────────────────────────────────────────────────────────

fn init_particle_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(1.0, 6));
    commands.insert_resource(ParticleMesh(handle));
}

/// Attach `Mesh2d` + `MeshMaterial2d` to every newly-spawned [`Particle`].
pub fn attach_particle_mesh_system(
    mut commands: Commands,
    particle_mesh: Res<ParticleMesh>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Particle), Added<Particle>>,
) {
    for (entity, mut particle) in query.iter_mut() {
        let [r, g, b] = particle.color;
        let mat_handle = materials.add(ColorMaterial::from_color(Color::srgba(r, g, b, 1.0)));
        particle.material = Some(mat_handle.clone());
        commands
            .entity(entity)
            .insert((Mesh2d(particle_mesh.0.clone()), MeshMaterial2d(mat_handle)));
    }
}

/// Quadratic ease-out alpha: bright at birth, rapid fade at the end.
pub fn particle_fade_system(
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<&Particle>,
) {
    for particle in query.iter() {
        let Some(ref handle) = particle.material else {
            continue;
        };
        let t = (particle.age / particle.lifetime).clamp(0.0, 1.0);
        let alpha = (1.0 - t).powi(2);
        if let Some(mat) = materials.get_mut(handle) {
            let [r, g, b] = particle.color;
            mat.color = Color::srgba(r, g, b, alpha);
        }
    }
}

/// Build a filled regular polygon approximating a circle.
pub(crate) fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        positions.push([x, y, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        let v1 = i + 1;
        let v2 = (i + 1) % n as u32 + 1;
        indices.extend_from_slice(&[0, v1, v2]);
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

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn emitter_carries_fractional_particles() {
        let mut emitter = ParticleEmitter::new(ParticleTemplate {
            rate: 10.0,
            ..ParticleTemplate::engine_thrust()
        });
        assert_eq!(emitter.due(0.05), 0);
        assert_eq!(emitter.due(0.05), 1);
        assert_eq!(emitter.due(0.25), 2);
    }

    #[test]
    fn burst_spawns_template_count() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let template = ParticleTemplate {
            count: 12,
            ..ParticleTemplate::explosion()
        };
        app.world_mut()
            .run_system_once(move |mut commands: Commands| {
                spawn_burst(&mut commands, Vec2::ZERO, 0.0, &template);
            })
            .unwrap();

        let count = app
            .world_mut()
            .query::<&Particle>()
            .iter(app.world())
            .count();
        assert_eq!(count, 12);
    }

    #[test]
    fn expired_particles_are_despawned() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, particle_motion_system);
        app.world_mut().spawn((
            Particle {
                velocity: Vec2::ZERO,
                age: 1.0,
                lifetime: 0.5,
                color: [1.0; 3],
                material: None,
            },
            Transform::default(),
        ));

        app.update();

        let count = app
            .world_mut()
            .query::<&Particle>()
            .iter(app.world())
            .count();
        assert_eq!(count, 0);
    }
}
