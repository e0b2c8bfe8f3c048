//! WGSL sources for the render pipelines.
//!
//! Both draw camera-facing quads, six vertices per instance, sized in
//! pixels with perspective attenuation. The uniform structs must match
//! [`crate::uniforms`] byte for byte.

/// Morph particles: collapse/expand between the origin and the target shape.
pub const MORPH_SHADER: &str = r#"
struct FrameUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec3<f32>,
    time: f32,
    viewport: vec2<f32>,
    expansion: f32,
    point_size: f32,
    color_variation: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> u: FrameUniforms;

struct MorphIn {
    @location(0) position: vec3<f32>,
    @location(1) scale: f32,
    @location(2) scatter: vec3<f32>,
    @location(3) phase: f32,
    @location(4) destination: vec3<f32>,
};

struct MorphOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) alpha: f32,
    @location(2) phase: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, p: MorphIn) -> MorphOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    var pos = mix(vec3<f32>(0.0), p.destination, u.expansion);

    let wave = sin(u.time * 1.5 + p.phase + pos.y * 0.05) * 0.8;
    let pulse = sin(u.time * 3.0 + p.phase) * 0.3;
    pos.x += wave * u.expansion;
    pos.y += cos(u.time * 1.2 + p.phase + pos.x * 0.05) * 0.6 * u.expansion;
    pos.z += sin(u.time * 0.8 + p.phase) * 0.4 * u.expansion;

    let clip = u.view_proj * u.model * vec4<f32>(pos, 1.0);
    let depth = max(clip.w, 0.001);
    let size_px = u.point_size * p.scale * (1.0 + pulse * 0.2) * (400.0 / depth);

    var out: MorphOut;
    out.clip_position = clip + vec4<f32>(corner * size_px / u.viewport * clip.w, 0.0, 0.0);
    out.corner = corner;
    out.alpha = (u.expansion * 0.7 + 0.3) * (1.0 - depth * 0.001);
    out.phase = p.phase;
    return out;
}

@fragment
fn fs_main(in: MorphOut) -> @location(0) vec4<f32> {
    let r = length(in.corner) * 0.5;
    if (r > 0.5) {
        discard;
    }

    let glow1 = pow(max(1.0 - r * 2.0, 0.0), 2.5);
    let glow2 = pow(max(1.0 - r * 1.5, 0.0), 4.0);
    let glow = mix(glow1, glow2, 0.5);

    let shifted = vec3<f32>(u.color.b, u.color.r, u.color.g);
    var color = mix(u.color, shifted, sin(in.phase + u.time * 0.5) * u.color_variation);
    let core = 1.0 - smoothstep(0.0, 0.2, r);
    color = mix(color, vec3<f32>(1.0), core * 0.5);

    return vec4<f32>(color, max(in.alpha, 0.0) * glow);
}
"#;

/// Stars, trail points and rune sigils. `mode` selects the animation.
pub const SPRITE_SHADER: &str = r#"
struct SpriteUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    time: f32,
    opacity: f32,
    rotation: f32,
    size_scale: f32,
    viewport: vec2<f32>,
    mode: u32,
    _pad: u32,
};

const MODE_STAR: u32 = 0u;
const MODE_TRAIL: u32 = 1u;

@group(0) @binding(0)
var<uniform> u: SpriteUniforms;

struct SpriteIn {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
    @location(3) phase: f32,
};

struct SpriteOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec3<f32>,
    @location(2) alpha: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, s: SpriteIn) -> SpriteOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    var pos = s.position;
    var size = s.size;
    var alpha = u.opacity;

    if (u.mode == MODE_STAR) {
        let twinkle = sin(u.time * 3.0 + pos.x * 0.01 + pos.y * 0.01) * 0.4 + 0.6;
        size *= twinkle;
        alpha *= twinkle * 0.6;
    } else if (u.mode == MODE_TRAIL) {
        alpha *= s.size / 5.0;
    } else {
        let c = cos(u.rotation);
        let sn = sin(u.rotation);
        pos = vec3<f32>(pos.x * c - pos.y * sn, pos.x * sn + pos.y * c, pos.z);
        pos *= sin(u.time * 2.0 + s.phase) * 0.1 + 1.0;
        pos.z += sin(u.time * 3.0 + s.phase + pos.x * 0.05) * 3.0;
        size *= sin(u.time * 4.0 + s.phase) * 0.3 + 1.0;
    }

    let clip = u.view_proj * u.model * vec4<f32>(pos, 1.0);
    let depth = max(clip.w, 0.001);
    let size_px = size * (u.size_scale / depth);

    var out: SpriteOut;
    out.clip_position = clip + vec4<f32>(corner * size_px / u.viewport * clip.w, 0.0, 0.0);
    out.corner = corner;
    out.color = s.color;
    out.alpha = alpha;
    return out;
}

@fragment
fn fs_main(in: SpriteOut) -> @location(0) vec4<f32> {
    let r = length(in.corner) * 0.5;
    if (r > 0.5) {
        discard;
    }

    let edge = max(1.0 - r * 2.0, 0.0);
    var color = in.color;
    var glow = edge;

    if (u.mode == MODE_STAR) {
        glow = pow(edge, 2.0);
    } else if (u.mode != MODE_TRAIL) {
        glow = pow(edge, 1.5);
        let core = 1.0 - smoothstep(0.0, 0.2, r);
        color = mix(color, vec3<f32>(1.0), core * 0.5);
    }

    return vec4<f32>(color, in.alpha * glow);
}
"#;

/// Ambient field of the rune scene: drift, pointer attraction and marquee.
pub const FIELD_SHADER: &str = r#"
struct FieldUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    time: f32,
    strength: f32,
    pointer: vec2<f32>,
    marquee: f32,
    marquee_phase: f32,
    viewport: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> u: FieldUniforms;

struct FieldIn {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
    @location(3) phase: f32,
    @location(4) velocity: vec3<f32>,
};

struct FieldOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec3<f32>,
};

const ATTRACT_RADIUS: f32 = 0.5;
const ATTRACT_FORCE: f32 = 50.0;
const TWO_PI: f32 = 6.28318;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, p: FieldIn) -> FieldOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    var pos = p.position + p.velocity * (sin(u.time * 2.0 + p.phase) * 2.0);

    // Pointer space is NDC; the field spans roughly +-150 world units.
    let to_pointer = u.pointer - pos.xy * 0.01;
    let dist = length(to_pointer);
    if (dist < ATTRACT_RADIUS && dist > 0.0) {
        let force = (ATTRACT_RADIUS - dist) * u.strength * ATTRACT_FORCE;
        let pulled = pos.xy + to_pointer / dist * force;
        pos = vec3<f32>(pulled, pos.z);
    }

    var color = p.color;
    if (u.marquee > 0.0) {
        let radius = length(pos.xy);
        let angle = atan2(pos.y, pos.x) + u.marquee_phase * 0.5;
        pos = vec3<f32>(cos(angle) * radius, sin(angle) * radius, pos.z);
        let hue = fract((angle + u.marquee_phase) / TWO_PI);
        color = mix(p.color, vec3<f32>(1.0, hue, 0.0), u.marquee * 0.5);
    }

    let clip = u.view_proj * u.model * vec4<f32>(pos, 1.0);
    let depth = max(clip.w, 0.001);
    let pulse = sin(u.time * 3.0 + p.phase) * 0.3 + 1.0;
    let size_px = p.size * pulse * (300.0 / depth);

    var out: FieldOut;
    out.clip_position = clip + vec4<f32>(corner * size_px / u.viewport * clip.w, 0.0, 0.0);
    out.corner = corner;
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: FieldOut) -> @location(0) vec4<f32> {
    let r = length(in.corner) * 0.5;
    if (r > 0.5) {
        discard;
    }

    let glow1 = pow(max(1.0 - r * 2.0, 0.0), 2.0);
    let glow2 = pow(max(1.0 - r * 1.5, 0.0), 4.0);
    let glow = mix(glow1, glow2, 0.5);

    let core = 1.0 - smoothstep(0.0, 0.15, r);
    let color = mix(in.color, vec3<f32>(1.0), core * 0.6);

    return vec4<f32>(color, 0.8 * glow);
}
"#;
