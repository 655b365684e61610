//! Offscreen context used by `--capture`: same scene, no window, the final
//! colour target read back into a PNG.

use std::path::Path;

use tracing::info;

use crate::context::{create_depth_texture, open_device, FrameTarget, Gpu, RenderError};

const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub struct HeadlessContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub width: u32,
    pub height: u32,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl HeadlessContext {
    pub async fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let width = width.max(1);
        let height = height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let (_adapter, device, queue) =
            open_device(&instance, None, "Seasons Capture Device").await?;

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Colour"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (depth_texture, depth_view) =
            create_depth_texture(&device, width, height, "Capture Depth");

        Ok(Self {
            device,
            queue,
            width,
            height,
            color_texture,
            color_view,
            _depth_texture: depth_texture,
            depth_view,
        })
    }

    pub fn gpu(&self) -> Gpu<'_> {
        Gpu {
            device: &self.device,
            queue: &self.queue,
            format: CAPTURE_FORMAT,
            width: self.width,
            height: self.height,
        }
    }

    pub fn target(&self) -> FrameTarget<'_> {
        FrameTarget {
            color: &self.color_view,
            depth: &self.depth_view,
        }
    }

    /// Copy the colour target into a mappable buffer and return tight RGBA rows
    pub fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        let row_bytes = self.width * 4;
        let padded_row = padded_row_bytes(row_bytes);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback"),
            size: u64::from(padded_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            self.color_texture.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            extent(self.width, self.height),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            strip_row_padding(&mapped, row_bytes as usize, padded_row as usize)
        };
        readback.unmap();
        Ok(pixels)
    }

    /// Read the colour target back and write it as a PNG
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let pixels = self.read_pixels()?;
        let image = image::RgbaImage::from_raw(self.width, self.height, pixels).ok_or_else(|| {
            RenderError::BufferReadFailed("pixel buffer does not match the target size".into())
        })?;
        image
            .save(path)
            .map_err(|e| RenderError::asset(path.display().to_string(), e))?;
        info!(path = %path.display(), width = self.width, height = self.height, "Saved capture");
        Ok(())
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn padded_row_bytes(row_bytes: u32) -> u32 {
    row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

fn strip_row_padding(data: &[u8], row_bytes: usize, padded_row: usize) -> Vec<u8> {
    data.chunks(padded_row)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_row_bytes(256), 256);
        assert_eq!(padded_row_bytes(800 * 4), 3328);
        assert_eq!(padded_row_bytes(4), 256);
    }

    #[test]
    fn padding_is_dropped_per_row() {
        let mut data = vec![1u8, 2, 3, 4];
        data.resize(256, 0);
        data.extend_from_slice(&[5, 6, 7, 8]);
        data.resize(512, 0);
        assert_eq!(strip_row_padding(&data, 4, 256), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
