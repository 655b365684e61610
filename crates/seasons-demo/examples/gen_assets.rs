//! Generate a complete procedural asset directory for the seasons demo.
//!
//! Run with: cargo run -p seasons-demo --example gen_assets [-- <out_dir>]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use glam::Vec3;
use image::{Rgba, RgbaImage};

const TERRAIN_SIZE: u32 = 257;
const TEXTURE_SIZE: u32 = 256;
const SKY_SIZE: u32 = 128;
const SPRITE_SIZE: u32 = 64;

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    for sub in ["textures", "models", "skymaps", "particles"] {
        std::fs::create_dir_all(out_dir.join(sub)).expect("Failed to create asset directory");
    }

    generate_heightmap(&out_dir);
    generate_terrain_textures(&out_dir.join("textures"));
    generate_skymaps(&out_dir.join("skymaps"));
    generate_sprites(&out_dir.join("particles"));
    generate_trees(&out_dir.join("models"));

    println!("Generated assets in {}", out_dir.display());
}

/// Simple pseudo-random hash for deterministic noise
fn hash(x: u32, y: u32, seed: u32) -> f32 {
    let n = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1274126177));
    let n = (n ^ (n >> 13)).wrapping_mul(1103515245);
    let n = n ^ (n >> 16);
    (n & 0x7FFFFFFF) as f32 / 0x7FFFFFFF as f32
}

fn smooth_noise(x: f32, y: f32, seed: u32) -> f32 {
    let ix = x.floor() as i32;
    let iy = y.floor() as i32;
    let fx = x - x.floor();
    let fy = y - y.floor();

    let fx = fx * fx * (3.0 - 2.0 * fx);
    let fy = fy * fy * (3.0 - 2.0 * fy);

    let n00 = hash(ix as u32, iy as u32, seed);
    let n10 = hash((ix + 1) as u32, iy as u32, seed);
    let n01 = hash(ix as u32, (iy + 1) as u32, seed);
    let n11 = hash((ix + 1) as u32, (iy + 1) as u32, seed);

    let nx0 = n00 + (n10 - n00) * fx;
    let nx1 = n01 + (n11 - n01) * fx;
    nx0 + (nx1 - nx0) * fy
}

fn fbm(x: f32, y: f32, octaves: u32, seed: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for i in 0..octaves {
        value += amplitude * smooth_noise(x * frequency, y * frequency, seed + i * 7);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

fn save(img: &RgbaImage, dir: &Path, name: &str) {
    img.save(dir.join(name)).unwrap();
    println!("  {name} ({}x{})", img.width(), img.height());
}

/// Rolling hills that rise towards the far edges, written as raw 8-bit samples
fn generate_heightmap(out_dir: &Path) {
    let mut bytes = Vec::with_capacity((TERRAIN_SIZE * TERRAIN_SIZE) as usize);
    let center = (TERRAIN_SIZE - 1) as f32 * 0.5;
    for z in 0..TERRAIN_SIZE {
        for x in 0..TERRAIN_SIZE {
            let hills = fbm(x as f32 / 32.0, z as f32 / 32.0, 5, 11);
            let dx = (x as f32 - center) / center;
            let dz = (z as f32 - center) / center;
            let rim = (dx * dx + dz * dz).sqrt().min(1.0);
            bytes.push(to_u8(hills * 0.6 + rim * rim * 0.4));
        }
    }
    std::fs::write(out_dir.join("heightmap3.raw"), &bytes).unwrap();
    println!("  heightmap3.raw ({TERRAIN_SIZE}x{TERRAIN_SIZE})");
}

/// Noisy ground texture around a base colour
fn ground(base: [f32; 3], variation: f32, seed: u32) -> RgbaImage {
    let mut img = RgbaImage::new(TEXTURE_SIZE, TEXTURE_SIZE);
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            let coarse = fbm(x as f32 * 0.05, y as f32 * 0.05, 4, seed);
            let detail = hash(x, y, seed + 1);
            let v = 0.75 + (coarse - 0.5) * variation + (detail - 0.5) * 0.1;
            img.put_pixel(
                x,
                y,
                Rgba([to_u8(base[0] * v), to_u8(base[1] * v), to_u8(base[2] * v), 255]),
            );
        }
    }
    img
}

/// Layer weights in RGB. Layer 0 covers the lowlands, layer 2 the slopes.
fn blend_map(seed: u32, low_bias: f32) -> RgbaImage {
    let mut img = RgbaImage::new(TEXTURE_SIZE, TEXTURE_SIZE);
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            let n = fbm(x as f32 / 48.0, y as f32 / 48.0, 4, seed);
            let w0 = (low_bias - n).max(0.0) * 2.0;
            let w2 = (n - 0.55).max(0.0) * 3.0;
            let w1 = (1.0 - w0 - w2).max(0.0);
            let sum = (w0 + w1 + w2).max(f32::EPSILON);
            img.put_pixel(
                x,
                y,
                Rgba([to_u8(w0 / sum), to_u8(w1 / sum), to_u8(w2 / sum), 255]),
            );
        }
    }
    img
}

fn generate_terrain_textures(out_dir: &Path) {
    let layers: [(&str, [f32; 3], f32); 7] = [
        ("grass0.png", [0.35, 0.62, 0.22], 0.4),
        ("dark_grass.png", [0.2, 0.4, 0.14], 0.5),
        ("grass.png", [0.45, 0.58, 0.28], 0.6),
        ("leaves.png", [0.78, 0.42, 0.14], 0.8),
        ("snow.png", [0.94, 0.95, 0.98], 0.15),
        ("frozen_ground.png", [0.48, 0.46, 0.5], 0.5),
        ("ice.png", [0.7, 0.82, 0.92], 0.3),
    ];
    for (i, (name, base, variation)) in layers.iter().enumerate() {
        save(&ground(*base, *variation, 100 + i as u32 * 13), out_dir, name);
    }

    let blends = [
        ("blendSpring.png", 0.5),
        ("blendSummer.png", 0.42),
        ("blendAutumn.png", 0.55),
        ("blendWinter.png", 0.6),
    ];
    for (i, (name, bias)) in blends.iter().enumerate() {
        save(&blend_map(200 + i as u32, *bias), out_dir, name);
    }

    // Dim grey highlight with a specular power of 16 in alpha
    let spec = RgbaImage::from_pixel(TEXTURE_SIZE, TEXTURE_SIZE, Rgba([40, 40, 40, 16]));
    save(&spec, out_dir, "defaultspec.png");
}

/// Face suffixes in cube layer order, with the direction at each face's
/// centre and the directions of its +u and +v texture axes
const CUBE_FACES: [(&str, [f32; 3], [f32; 3], [f32; 3]); 6] = [
    ("px", [1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
    ("nx", [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    ("py", [0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ("ny", [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ("pz", [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ("nz", [0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
];

/// Vertical gradient from `horizon` to `zenith` with soft cloud noise
fn generate_skymaps(out_dir: &Path) {
    let skies = [
        ("SpringSkymap", [0.75, 0.85, 0.95], [0.3, 0.55, 0.9], 0.5),
        ("SummerSkymap", [0.85, 0.9, 1.0], [0.15, 0.4, 0.85], 0.2),
        ("AutumnSkymap", [0.95, 0.78, 0.6], [0.35, 0.4, 0.6], 0.6),
        ("WinterSkymap", [0.88, 0.9, 0.93], [0.55, 0.6, 0.7], 0.8),
    ];

    for (name, horizon, zenith, cloudiness) in skies {
        let horizon = Vec3::from(horizon);
        let zenith = Vec3::from(zenith);
        for (suffix, center, u_axis, v_axis) in CUBE_FACES {
            let (center, u_axis, v_axis) =
                (Vec3::from(center), Vec3::from(u_axis), Vec3::from(v_axis));
            let mut img = RgbaImage::new(SKY_SIZE, SKY_SIZE);
            for y in 0..SKY_SIZE {
                for x in 0..SKY_SIZE {
                    let u = (x as f32 + 0.5) / SKY_SIZE as f32 * 2.0 - 1.0;
                    let v = (y as f32 + 0.5) / SKY_SIZE as f32 * 2.0 - 1.0;
                    let dir = (center + u_axis * u + v_axis * v).normalize();

                    let t = dir.y.max(0.0).sqrt();
                    let mut color = horizon.lerp(zenith, t);
                    if dir.y > 0.05 {
                        // Project onto a cloud plane above the viewer
                        let px = dir.x / dir.y;
                        let pz = dir.z / dir.y;
                        let cloud = fbm(px * 2.0 + 50.0, pz * 2.0 + 50.0, 4, 7);
                        let cover = ((cloud - (1.0 - cloudiness)) * 3.0).clamp(0.0, 1.0);
                        color = color.lerp(Vec3::splat(0.97), cover * t.min(0.8));
                    }
                    img.put_pixel(
                        x,
                        y,
                        Rgba([to_u8(color.x), to_u8(color.y), to_u8(color.z), 255]),
                    );
                }
            }
            save(&img, out_dir, &format!("{name}_{suffix}.png"));
        }
    }
}

/// Sprite whose alpha is `shape(u, v)` with u and v in [-1, 1]
fn sprite(color: [u8; 3], shape: impl Fn(f32, f32) -> f32) -> RgbaImage {
    let mut img = RgbaImage::new(SPRITE_SIZE, SPRITE_SIZE);
    for y in 0..SPRITE_SIZE {
        for x in 0..SPRITE_SIZE {
            let u = (x as f32 + 0.5) / SPRITE_SIZE as f32 * 2.0 - 1.0;
            let v = (y as f32 + 0.5) / SPRITE_SIZE as f32 * 2.0 - 1.0;
            let a = to_u8(shape(u, v));
            img.put_pixel(x, y, Rgba([color[0], color[1], color[2], a]));
        }
    }
    img
}

fn generate_sprites(out_dir: &Path) {
    // Thin vertical streak, brightest in the middle
    let raindrop = sprite([170, 190, 230], |u, v| {
        let width = (1.0 - (u / 0.15).abs()).max(0.0);
        width * (1.0 - v.abs()).max(0.0) * 0.8
    });
    save(&raindrop, out_dir, "raindrop.png");

    // Pointed ellipse with a darker midrib
    let leaf = sprite([200, 95, 30], |u, v| {
        let r = (u / 0.55).powi(2) + v.powi(2);
        let body = if r < 1.0 && u.abs() < 0.55 * (1.0 - v.abs()).sqrt() { 1.0 } else { 0.0 };
        if u.abs() < 0.04 { body * 0.7 } else { body }
    });
    save(&leaf, out_dir, "tumbling_leaf.png");

    // Soft disc with six faint arms
    let snowflake = sprite([255, 255, 255], |u, v| {
        let r = (u * u + v * v).sqrt();
        let angle = v.atan2(u);
        let arms = (angle * 3.0).cos().abs().powi(8) * (1.0 - r).max(0.0);
        ((1.0 - r * 1.6).max(0.0) + arms * 0.6).min(1.0)
    });
    save(&snowflake, out_dir, "snowflake.png");
}

/// Axis-aligned box appended to an m3d vertex/triangle list
struct MeshBuilder {
    vertices: Vec<(Vec3, Vec3, Vec3, [f32; 2])>,
    triangles: Vec<([u32; 3], u32)>,
}

impl MeshBuilder {
    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Add a box between `min` and `max`. Faces wind clockwise seen from
    /// outside, in a left-handed frame.
    fn add_box(&mut self, min: Vec3, max: Vec3, subset: u32) {
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        let faces = [
            (Vec3::X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::Z),
            (Vec3::NEG_Y, Vec3::NEG_Z),
            (Vec3::Z, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y),
        ];

        for (normal, up) in faces {
            let right = up.cross(-normal);
            let c = center + normal * half;
            let r = right * half;
            let u = up * half;
            let corners = [
                (c - r + u, [0.0, 0.0]),
                (c + r + u, [1.0, 0.0]),
                (c + r - u, [1.0, 1.0]),
                (c - r - u, [0.0, 1.0]),
            ];
            let base = self.vertices.len() as u32;
            for (pos, uv) in corners {
                self.vertices.push((pos, right, normal, uv));
            }
            self.triangles.push(([base, base + 1, base + 2], subset));
            self.triangles.push(([base, base + 2, base + 3], subset));
        }
    }

    fn to_m3d(&self, subsets: &[(&str, &str, &str, f32)]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "***************m3d-File-Header***************");
        let _ = writeln!(out, "#Subsets {}", subsets.len());
        let _ = writeln!(out, "#Vertices {}", self.vertices.len());
        let _ = writeln!(out, "#Triangles {}", self.triangles.len());
        let _ = writeln!(out);
        let _ = writeln!(out, "***************SubsetInfo*********************");
        for (diffuse, spec, normal, reflect) in subsets {
            let _ = writeln!(
                out,
                "{diffuse} {spec} {normal} Reflectivity: {reflect} {reflect} {reflect}"
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "***************Vertices***********************");
        for (p, t, n, uv) in &self.vertices {
            let _ = writeln!(
                out,
                "Position: {} {} {} Tangent: {} {} {} Normal: {} {} {} Tex-Coords: {} {}",
                p.x, p.y, p.z, t.x, t.y, t.z, n.x, n.y, n.z, uv[0], uv[1]
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "***************Triangles**********************");
        for ([a, b, c], subset) in &self.triangles {
            let _ = writeln!(out, "{a} {b} {c} {subset}");
        }
        out
    }
}

/// Trunk plus stacked canopy boxes. Subset 0 is bark, subset 1 foliage.
fn tree_mesh(canopy: bool) -> MeshBuilder {
    let mut mesh = MeshBuilder::new();
    mesh.add_box(Vec3::new(-0.2, 0.0, -0.2), Vec3::new(0.2, 3.2, 0.2), 0);
    if canopy {
        mesh.add_box(Vec3::new(-1.4, 2.2, -1.4), Vec3::new(1.4, 3.4, 1.4), 1);
        mesh.add_box(Vec3::new(-1.0, 3.4, -1.0), Vec3::new(1.0, 4.4, 1.0), 1);
        mesh.add_box(Vec3::new(-0.5, 4.4, -0.5), Vec3::new(0.5, 5.0, 0.5), 1);
    } else {
        // Bare branches
        mesh.add_box(Vec3::new(-1.2, 2.4, -0.1), Vec3::new(1.2, 2.6, 0.1), 1);
        mesh.add_box(Vec3::new(-0.1, 3.0, -1.0), Vec3::new(0.1, 3.2, 1.0), 1);
    }
    mesh
}

fn flat_normal_map() -> RgbaImage {
    RgbaImage::from_pixel(64, 64, Rgba([128, 128, 255, 255]))
}

fn generate_trees(out_dir: &Path) {
    save(&ground([0.4, 0.28, 0.17], 0.7, 300), out_dir, "bark.png");
    save(
        &RgbaImage::from_pixel(64, 64, Rgba([20, 20, 20, 8])),
        out_dir,
        "bark_spec.png",
    );
    save(&flat_normal_map(), out_dir, "bark_nmap.png");

    let foliage = [
        ("leaf.png", [0.25, 0.55, 0.2]),
        ("leaf_autumn.png", [0.85, 0.45, 0.12]),
        ("leaf_winter.png", [0.35, 0.27, 0.2]),
    ];
    for (i, (name, base)) in foliage.iter().enumerate() {
        save(&ground(*base, 0.8, 310 + i as u32), out_dir, name);
    }
    save(
        &RgbaImage::from_pixel(64, 64, Rgba([60, 60, 60, 32])),
        out_dir,
        "leaf_spec.png",
    );
    save(&flat_normal_map(), out_dir, "leaf_nmap.png");

    let trees = [
        ("tree.m3d", "leaf.png", true),
        ("tree_autumn.m3d", "leaf_autumn.png", true),
        ("tree_winter.m3d", "leaf_winter.png", false),
    ];
    for (name, leaf, canopy) in trees {
        let m3d = tree_mesh(canopy).to_m3d(&[
            ("bark.png", "bark_spec.png", "bark_nmap.png", 0.0),
            (leaf, "leaf_spec.png", "leaf_nmap.png", 0.1),
        ]);
        std::fs::write(out_dir.join(name), m3d).unwrap();
        println!("  {name}");
    }
}
