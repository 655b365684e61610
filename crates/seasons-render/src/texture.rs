//! Texture loading: single images, sprite arrays, cube maps and the random table

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::context::{create_checked, RenderError};

/// Cube map face suffixes in wgpu layer order (+X, -X, +Y, -Y, +Z, -Z)
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// A GPU-resident texture with its view and sampler
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// How texel values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour data (diffuse maps, sprites, sky)
    Srgb,
    /// Non-colour data (normal, specular and blend maps)
    Linear,
}

impl ColorSpace {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

fn open_rgba(path: &Path) -> Result<RgbaImage, RenderError> {
    let img = image::open(path).map_err(|e| RenderError::asset(path.display().to_string(), e))?;
    Ok(img.to_rgba8())
}

fn repeat_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{} Sampler", label)),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        ..Default::default()
    })
}

/// Reject images the device cannot hold before anything reaches the GPU
fn check_fits(
    label: &str,
    (width, height): (u32, u32),
    layers: u32,
    limits: &wgpu::Limits,
) -> Result<(), RenderError> {
    let max = limits.max_texture_dimension_2d;
    if width == 0 || height == 0 {
        return Err(RenderError::asset(label, "image is empty"));
    }
    if width > max || height > max {
        return Err(RenderError::asset(
            label,
            format!("{width}x{height} exceeds the device limit of {max}"),
        ));
    }
    if layers > limits.max_texture_array_layers {
        return Err(RenderError::asset(
            label,
            format!(
                "{layers} layers exceed the device limit of {}",
                limits.max_texture_array_layers
            ),
        ));
    }
    Ok(())
}

/// Upload equally sized RGBA layers as one texture, inside error scopes
fn upload_layers(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    layers: &[RgbaImage],
    format: wgpu::TextureFormat,
) -> Result<wgpu::Texture, RenderError> {
    let (width, height) = layers.first().map(|l| l.dimensions()).unwrap_or((1, 1));
    check_fits(label, (width, height), layers.len() as u32, &device.limits())?;
    let data: Vec<u8> = layers.iter().flat_map(|l| l.as_raw().iter().copied()).collect();

    create_checked(device, label, || {
        device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: layers.len() as u32,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        )
    })
}

/// Load every path and check they share one size
fn open_layers(paths: &[PathBuf]) -> Result<Vec<RgbaImage>, RenderError> {
    let layers = paths
        .iter()
        .map(|p| open_rgba(p))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(first) = layers.first() {
        let expected = first.dimensions();
        for (path, layer) in paths.iter().zip(&layers) {
            if layer.dimensions() != expected {
                return Err(RenderError::asset(
                    path.display().to_string(),
                    format!(
                        "layer is {}x{} but the first layer is {}x{}",
                        layer.width(),
                        layer.height(),
                        expected.0,
                        expected.1
                    ),
                ));
            }
        }
    }
    Ok(layers)
}

/// Load a 2D texture from an image file on disk
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    color_space: ColorSpace,
) -> Result<GpuTexture, RenderError> {
    let rgba = open_rgba(path)?;
    let label = path.display().to_string();
    let texture = upload_layers(device, queue, &label, &[rgba], color_space.format())?;
    let (view, sampler) = create_checked(device, &label, || {
        (
            texture.create_view(&wgpu::TextureViewDescriptor::default()),
            repeat_sampler(device, &label),
        )
    })?;
    debug!(path = %label, "Loaded texture");

    Ok(GpuTexture {
        texture,
        view,
        sampler,
    })
}

/// Load equally sized sprite images into one 2D texture array
pub fn load_texture_array(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    paths: &[PathBuf],
) -> Result<GpuTexture, RenderError> {
    if paths.is_empty() {
        return Err(RenderError::asset("<texture array>", "no layers given"));
    }
    let layers = open_layers(paths)?;

    let texture = upload_layers(
        device,
        queue,
        "Sprite Array",
        &layers,
        ColorSpace::Srgb.format(),
    )?;
    let (view, sampler) = create_checked(device, "Sprite Array", || {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Sprite Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Array Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        (view, sampler)
    })?;

    Ok(GpuTexture {
        texture,
        view,
        sampler,
    })
}

/// Paths of the six faces of cube map `name` inside `dir`
pub fn cube_face_paths(dir: &Path, name: &str) -> Vec<PathBuf> {
    CUBE_FACES
        .iter()
        .map(|face| dir.join(format!("{name}_{face}.png")))
        .collect()
}

/// Load a cube map from six square face images
pub fn load_cubemap(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    dir: &Path,
    name: &str,
) -> Result<GpuTexture, RenderError> {
    let paths = cube_face_paths(dir, name);
    let faces = open_layers(&paths)?;
    if let Some(face) = faces.first() {
        if face.width() != face.height() {
            return Err(RenderError::asset(
                paths[0].display().to_string(),
                "cube map faces must be square",
            ));
        }
    }

    let texture = upload_layers(device, queue, name, &faces, ColorSpace::Srgb.format())?;
    let (view, sampler) = create_checked(device, name, || {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{name} Cube View")),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{name} Cube Sampler")),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });
        (view, sampler)
    })?;
    debug!(name, "Loaded cube map");

    Ok(GpuTexture {
        texture,
        view,
        sampler,
    })
}

/// 1D `Rgba32Float` texture holding a table of random vectors.
/// Read with `textureLoad`, so it has no sampler.
pub fn create_random_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    values: &[[f32; 4]],
) -> Result<(wgpu::Texture, wgpu::TextureView), RenderError> {
    let width = values.len() as u32;
    if width == 0 || width > device.limits().max_texture_dimension_1d {
        return Err(RenderError::asset(
            "Random Texture",
            format!("{width} entries do not fit a 1D texture"),
        ));
    }

    create_checked(device, "random texture", || {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Random Texture"),
                size: wgpu::Extent3d {
                    width,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D1,
                format: wgpu::TextureFormat::Rgba32Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            bytemuck::cast_slice(values),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_follow_layer_order() {
        let paths = cube_face_paths(Path::new("assets/skymap"), "WinterSkymap");
        assert_eq!(paths.len(), 6);
        assert_eq!(paths[0], Path::new("assets/skymap/WinterSkymap_px.png"));
        assert_eq!(paths[3], Path::new("assets/skymap/WinterSkymap_ny.png"));
        assert_eq!(paths[5], Path::new("assets/skymap/WinterSkymap_nz.png"));
    }

    #[test]
    fn oversized_images_fail_before_upload() {
        let limits = wgpu::Limits::downlevel_defaults();
        let max = limits.max_texture_dimension_2d;

        assert!(check_fits("bark.png", (256, 256), 1, &limits).is_ok());
        assert!(check_fits("bark.png", (max, max), 1, &limits).is_ok());

        let err = check_fits("bark.png", (max + 1, 16), 1, &limits).unwrap_err();
        assert!(matches!(err, RenderError::Asset { ref path, .. } if path == "bark.png"));
        assert!(check_fits("sky", (16, max + 1), 6, &limits).is_err());
        assert!(check_fits("empty.png", (0, 4), 1, &limits).is_err());
        assert!(check_fits(
            "sprites",
            (64, 64),
            limits.max_texture_array_layers + 1,
            &limits
        )
        .is_err());
    }

    #[test]
    fn missing_image_is_an_asset_error() {
        let err = open_rgba(Path::new("no/such/texture.png")).unwrap_err();
        assert!(matches!(err, RenderError::Asset { .. }));
    }
}
