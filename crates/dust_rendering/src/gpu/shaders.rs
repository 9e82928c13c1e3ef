//! Dissolve Shaders
//!
//! Two WGSL modules sharing one prelude:
//! 1. Simulate - compute pass, reads `current`, writes `feedback`
//! 2. Render - instanced quads drawn from `current`, textured from the snapshot
//!
//! ```text
//!   current ──► simulate ──► feedback        (one record per invocation)
//!      │
//!      └──────► vs_main / fs_main ──► surface (4-vertex strip per particle)
//! ```
//!
//! On init frames both passes call `initial_particle` instead of reading the
//! buffer, so the first frame shows freshly seeded particles.
//!
//! Particles release left to right: a particle's age starts at a negative
//! delay proportional to its x position, and it neither moves nor fades
//! until the age crosses zero.

/// Shared types, bindings-free helpers and the seeding function.
const PRELUDE_WGSL: &str = r#"
struct DustUniforms {
    size: vec2<f32>,
    time: f32,
    delta_time: f32,
    init: u32,
    diameter: u32,
    seed: f32,
    region_count: u32,
    particle_count: u32,
    pad0: u32,
    pad1: u32,
    pad2: u32,
    regions: array<vec4<i32>, 64>,
}

struct Particle {
    position: vec2<f32>,
    velocity: vec2<f32>,
    age: f32,
    duration: f32,
}

struct Cell {
    origin: vec2<f32>,
    found: bool,
}

@group(0) @binding(0) var<uniform> dust: DustUniforms;

// PCG hash
fn pcg(value: u32) -> u32 {
    let state = value * 747796405u + 2891336453u;
    let word = ((state >> ((state >> 28u) + 4u)) ^ state) * 277803737u;
    return (word >> 22u) ^ word;
}

// Uniform float in [0, 1) per particle and channel, varied by the session seed.
fn random01(index: u32, channel: u32) -> f32 {
    let salt = u32(dust.seed * 256.0) * 2654435761u;
    return f32(pcg(index * 4u + channel + salt) & 0x00ffffffu) / 16777216.0;
}

// Top-left corner of the index-th cell, walking regions in order, row-major.
fn cell_origin(index: u32) -> Cell {
    let d = i32(max(dust.diameter, 1u));
    var remaining = index;
    var cell: Cell;
    cell.found = false;
    for (var r = 0u; r < min(dust.region_count, 64u); r = r + 1u) {
        let rect = dust.regions[r];
        let columns = u32(max(rect.z / d, 0));
        let rows = u32(max(rect.w / d, 0));
        let cells = columns * rows;
        if (remaining < cells) {
            let column = i32(remaining % columns);
            let row = i32(remaining / columns);
            cell.origin = vec2<f32>(f32(rect.x + column * d), f32(rect.y + row * d));
            cell.found = true;
            return cell;
        }
        remaining = remaining - cells;
    }
    return cell;
}

fn initial_particle(index: u32) -> Particle {
    let cell = cell_origin(index);
    let radius = f32(max(dust.diameter, 1u)) * 0.5;
    var p: Particle;
    p.position = cell.origin + vec2<f32>(radius, radius);
    p.velocity = vec2<f32>(
        15.0 + 45.0 * random01(index, 0u),
        -(25.0 + 75.0 * random01(index, 1u))
    );
    p.duration = 0.55 + 0.45 * random01(index, 3u);
    p.age = -(p.position.x / max(dust.size.x, 1.0)) * 0.5 - random01(index, 2u) * 0.1;
    if (!cell.found) {
        p.age = p.duration;
    }
    return p;
}
"#;

const SIMULATE_WGSL: &str = r#"
@group(0) @binding(1) var<storage, read> particles_in: array<Particle>;
@group(0) @binding(2) var<storage, read_write> particles_out: array<Particle>;

@compute @workgroup_size(64)
fn simulate(@builtin(global_invocation_id) id: vec3<u32>) {
    let index = id.x;
    if (index >= dust.particle_count || index >= arrayLength(&particles_out)) {
        return;
    }

    var p: Particle;
    if (dust.init != 0u) {
        p = initial_particle(index);
    } else {
        p = particles_in[index];
    }

    if (p.age >= 0.0) {
        let phase = dust.time * 3.0 + f32(index) * 0.37;
        let swirl = vec2<f32>(sin(phase), cos(phase * 1.3)) * 12.0;
        p.velocity = p.velocity + (vec2<f32>(8.0, -30.0) + swirl) * dust.delta_time;
        p.position = p.position + p.velocity * dust.delta_time;
    }
    p.age = p.age + dust.delta_time;

    particles_out[index] = p;
}
"#;

const RENDER_WGSL: &str = r#"
@group(0) @binding(1) var snapshot: texture_2d<f32>;
@group(0) @binding(2) var snapshot_sampler: sampler;

struct ParticleInput {
    @location(0) position: vec2<f32>,
    @location(1) velocity: vec2<f32>,
    @location(2) age: f32,
    @location(3) duration: f32,
}

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) alpha: f32,
}

@vertex
fn vs_main(
    @builtin(vertex_index) corner: u32,
    @builtin(instance_index) instance: u32,
    particle: ParticleInput,
) -> VertexOutput {
    var p = Particle(particle.position, particle.velocity, particle.age, particle.duration);
    if (dust.init != 0u) {
        p = initial_particle(instance);
    }

    // Strip order: (0,0) (1,0) (0,1) (1,1)
    let offset = vec2<f32>(f32(corner & 1u), f32(corner >> 1u));
    let d = f32(max(dust.diameter, 1u));
    let pixel = p.position + (offset - vec2<f32>(0.5, 0.5)) * d;
    let extent = max(dust.size, vec2<f32>(1.0, 1.0));

    var output: VertexOutput;
    output.clip = vec4<f32>(pixel.x / extent.x * 2.0 - 1.0, 1.0 - pixel.y / extent.y * 2.0, 0.0, 1.0);

    let cell = cell_origin(instance);
    let texel = cell.origin + offset * d;
    output.uv = texel / vec2<f32>(textureDimensions(snapshot));

    let fade = 1.0 - max(p.age, 0.0) / max(p.duration, 0.001);
    output.alpha = select(0.0, clamp(fade, 0.0, 1.0), cell.found);
    return output;
}

@fragment
fn fs_main(varyings: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(snapshot, snapshot_sampler, varyings.uv);
    let alpha = color.a * varyings.alpha;
    if (alpha <= 0.0) {
        discard;
    }
    // Premultiplied output
    return vec4<f32>(color.rgb * alpha, alpha);
}
"#;

/// Entry point of the simulate pass.
pub const SIMULATE_ENTRY: &str = "simulate";
/// Vertex entry point of the render pass.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment entry point of the render pass.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL sources for the dissolve program.
pub struct DustShaders;

impl DustShaders {
    /// Simulate (compute) module.
    #[must_use]
    pub fn simulate_source() -> String {
        format!("{PRELUDE_WGSL}{SIMULATE_WGSL}")
    }

    /// Render (vertex + fragment) module.
    #[must_use]
    pub fn render_source() -> String {
        format!("{PRELUDE_WGSL}{RENDER_WGSL}")
    }
}
