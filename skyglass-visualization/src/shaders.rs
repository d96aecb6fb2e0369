//! WGSL sources for the mesh and skybox pipelines

/// Bindings shared by the mesh and skybox shaders (group 0)
const SHARED_BINDINGS: &str = r#"
struct FrameUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal: mat3x3<f32>,
    eye_position: vec3<f32>,
    texture_mode: u32,
};

struct Light {
    position: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
};

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(0) @binding(1) var<uniform> light: Light;
@group(0) @binding(2) var sky_texture: texture_cube<f32>;
@group(0) @binding(3) var sky_sampler: sampler;
"#;

/// Mesh triangles and edges. `fs_surface` switches on the texture mode;
/// `fs_edge` always uses Phong lighting so edge colors come from the
/// material.
const MESH_BODY: &str = r#"
struct Material {
    ambient: vec3<f32>,
    shininess: f32,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
};

@group(1) @binding(0) var<uniform> material: Material;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) view_position: vec3<f32>,
};

const REFRACTION_RATIO: f32 = 0.6579;

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    let world = frame.model * vec4<f32>(position, 1.0);
    let view_position = frame.view * world;
    out.clip_position = frame.projection * view_position;
    out.world_position = world.xyz;
    out.world_normal = frame.normal * normal;
    out.view_position = view_position.xyz;
    return out;
}

fn safe_normalize(v: vec3<f32>) -> vec3<f32> {
    let len = length(v);
    if len > 0.0 {
        return v / len;
    }
    return vec3<f32>(0.0);
}

fn phong(view_position: vec3<f32>, world_normal: vec3<f32>) -> vec3<f32> {
    let n = safe_normalize((frame.view * vec4<f32>(world_normal, 0.0)).xyz);
    let l = normalize(light.position - view_position);
    let v = normalize(-view_position);
    let r = reflect(-l, n);

    let diffuse = max(dot(n, l), 0.0);
    var specular = 0.0;
    if diffuse > 0.0 {
        specular = pow(max(dot(r, v), 0.0), material.shininess);
    }

    return light.ambient * material.ambient
        + light.diffuse * material.diffuse * diffuse
        + light.specular * material.specular * specular;
}

@fragment
fn fs_surface(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = safe_normalize(in.world_normal);
    let incident = normalize(in.world_position - frame.eye_position);

    let reflected = textureSample(sky_texture, sky_sampler, reflect(incident, n));
    let refracted = textureSample(sky_texture, sky_sampler, refract(incident, n, REFRACTION_RATIO));

    switch frame.texture_mode {
        case 0u: {
            return reflected;
        }
        case 1u: {
            return refracted;
        }
        default: {
            return vec4<f32>(phong(in.view_position, in.world_normal), 1.0);
        }
    }
}

@fragment
fn fs_edge(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(phong(in.view_position, in.world_normal), 1.0);
}
"#;

/// Environment cube sampled by direction from the origin
const SKYBOX_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.projection * frame.view * vec4<f32>(position, 1.0);
    out.direction = position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_texture, sky_sampler, in.direction);
}
"#;

/// Full WGSL source of the mesh shader
pub fn mesh_shader_source() -> String {
    format!("{}{}", SHARED_BINDINGS, MESH_BODY)
}

/// Full WGSL source of the skybox shader
pub fn skybox_shader_source() -> String {
    format!("{}{}", SHARED_BINDINGS, SKYBOX_BODY)
}
