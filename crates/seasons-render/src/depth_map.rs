//! Offscreen depth-only render target used for shadow mapping.
//!
//! A depth map is written between [`DepthMap::begin`] and [`DepthMap::end`]
//! and sampled through [`DepthMap::depth_map`] afterwards. The begin/end
//! bracket is tracked at runtime: while a [`DepthPass`] is alive the map
//! cannot be opened again.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};

use crate::context::RenderError;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Open/closed flag for a begin/end pair
#[derive(Debug, Default)]
pub struct DepthBracket {
    open: Cell<bool>,
}

impl DepthBracket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the bracket. Fails if it is already open.
    pub fn acquire(&self) -> Result<BracketToken<'_>, RenderError> {
        if self.open.replace(true) {
            return Err(RenderError::DepthMapAlreadyBound);
        }
        Ok(BracketToken { bracket: self })
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }
}

/// Proof that a bracket is open; closes it on drop
#[derive(Debug)]
pub struct BracketToken<'a> {
    bracket: &'a DepthBracket,
}

impl Drop for BracketToken<'_> {
    fn drop(&mut self) {
        self.bracket.open.set(false);
    }
}

/// Viewport rectangle matching the map size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// Depth texture with a write view, a sampling view and a comparison sampler
pub struct DepthMap {
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
    write_view: wgpu::TextureView,
    sample_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    viewport: Viewport,
    bracket: DepthBracket,
}

impl DepthMap {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Map"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let write_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Depth Map Write View"),
            ..Default::default()
        });
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Depth Map Sample View"),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        // Comparison sampler for hardware PCF
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Depth Map Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            width,
            height,
            _texture: texture,
            write_view,
            sample_view,
            sampler,
            viewport: Viewport {
                x: 0.0,
                y: 0.0,
                width: width as f32,
                height: height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            },
            bracket: DepthBracket::new(),
        }
    }

    /// Start a depth-only pass into this map: no colour target, depth
    /// cleared to 1.0, viewport set to the map size.
    pub fn begin<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> Result<DepthPass<'a>, RenderError> {
        let token = self.bracket.acquire()?;

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Depth Map Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.write_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let vp = self.viewport;
        pass.set_viewport(vp.x, vp.y, vp.width, vp.height, vp.min_depth, vp.max_depth);

        Ok(DepthPass {
            pass,
            _token: token,
        })
    }

    /// Finish the pass and close the bracket
    pub fn end(&self, pass: DepthPass<'_>) {
        drop(pass);
    }

    /// Read-only view for sampling in the lit pass
    pub fn depth_map(&self) -> &wgpu::TextureView {
        &self.sample_view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_bound(&self) -> bool {
        self.bracket.is_open()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A live depth-only render pass. Dereferences to the wrapped
/// `wgpu::RenderPass`; dropping it ends the pass and closes the bracket.
pub struct DepthPass<'a> {
    // Dropped before the token so the pass is closed first
    pass: wgpu::RenderPass<'a>,
    _token: BracketToken<'a>,
}

impl<'a> Deref for DepthPass<'a> {
    type Target = wgpu::RenderPass<'a>;

    fn deref(&self) -> &Self::Target {
        &self.pass
    }
}

impl DerefMut for DepthPass<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_open() {
        let bracket = DepthBracket::new();
        let token = bracket.acquire().unwrap();
        assert!(bracket.is_open());
        assert!(matches!(
            bracket.acquire(),
            Err(RenderError::DepthMapAlreadyBound)
        ));
        drop(token);
        assert!(!bracket.is_open());
    }

    #[test]
    fn bracket_reopens_after_close() {
        let bracket = DepthBracket::new();
        for _ in 0..3 {
            let token = bracket.acquire().unwrap();
            drop(token);
        }
        assert!(!bracket.is_open());
    }

    #[test]
    fn failed_acquire_keeps_bracket_open() {
        let bracket = DepthBracket::new();
        let _token = bracket.acquire().unwrap();
        let _ = bracket.acquire();
        assert!(bracket.is_open());
    }
}
