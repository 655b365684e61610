//! wgpu render context setup

use std::sync::Arc;

use seasons_core::SeasonsError;
use thiserror::Error;
use tracing::info;
use winit::window::Window;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),
    #[error("Failed to get adapter")]
    AdapterNotFound,
    #[error("Failed to create device: {0}")]
    DeviceCreation(String),
    #[error("Surface error: {0}")]
    SurfaceError(String),
    #[error("Failed to read render buffer: {0}")]
    BufferReadFailed(String),
    #[error("GPU validation failed while creating {what}: {message}")]
    Validation { what: String, message: String },
    #[error("GPU out of memory while creating {what}")]
    OutOfMemory { what: String },
    #[error("Depth map is already bound as a render target")]
    DepthMapAlreadyBound,
    #[error("Pass order violated: {0}")]
    PassOrder(String),
    #[error("Failed to load '{path}': {message}")]
    Asset { path: String, message: String },
    #[error(transparent)]
    Core(#[from] SeasonsError),
}

impl RenderError {
    pub fn asset(path: impl Into<String>, message: impl ToString) -> Self {
        RenderError::Asset {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl From<RenderError> for SeasonsError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Core(inner) => inner,
            RenderError::Asset { path, message } => {
                SeasonsError::AssetError(format!("{path}: {message}"))
            }
            other => SeasonsError::RenderError(other.to_string()),
        }
    }
}

/// Run GPU resource creation inside validation and out-of-memory error
/// scopes, turning any captured error into a `RenderError`.
pub fn create_checked<T>(
    device: &wgpu::Device,
    what: &str,
    create: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = create();

    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    if let Some(err) = validation {
        return Err(RenderError::Validation {
            what: what.to_string(),
            message: err.to_string(),
        });
    }
    if out_of_memory.is_some() {
        return Err(RenderError::OutOfMemory {
            what: what.to_string(),
        });
    }
    Ok(value)
}

/// Borrowed handles every scene component is built and rendered with.
///
/// Both the windowed and the headless context hand one of these out, so
/// components never reach for global device state.
#[derive(Clone, Copy)]
pub struct Gpu<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Colour target format
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl Gpu<'_> {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Colour and depth attachments for one frame
pub struct FrameTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

/// wgpu render context containing device, queue, and surface
pub struct RenderContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
}

impl RenderContext {
    /// Create a new render context for a window
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        let (adapter, device, queue) =
            open_device(&instance, Some(&surface), "Seasons Device").await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::SurfaceCreation("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (depth_texture, depth_view) =
            create_depth_texture(&device, config.width, config.height, "Depth Texture");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            depth_view,
        })
    }

    /// Resize the surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (depth_texture, depth_view) = create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Reconfigure the surface at its current size (after `Lost`/`Outdated`)
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    pub fn gpu(&self) -> Gpu<'_> {
        Gpu {
            device: &self.device,
            queue: &self.queue,
            format: self.config.format,
            width: self.config.width,
            height: self.config.height,
        }
    }

    /// Get aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.size.width as f32 / self.size.height as f32
    }
}

/// Pick an adapter (compatible with `surface` when given) and open a device on it
pub(crate) async fn open_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    label: &str,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RenderError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(RenderError::AdapterNotFound)?;

    info!(adapter = %adapter.get_info().name, "Using GPU adapter");

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| RenderError::DeviceCreation(e.to_string()))?;

    Ok((adapter, device, queue))
}

/// Depth32Float target that can also be sampled
pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    label: &str,
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    };

    let desc = wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    };

    let texture = device.create_texture(&desc);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    (texture, view)
}
