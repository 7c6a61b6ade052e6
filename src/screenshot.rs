use std::path::{Path, PathBuf};

use crate::gpu::GpuContext;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Path for a new screenshot inside `dir`, stamped with local time so
/// repeated captures never collide.
pub fn timestamped_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("spincube-{}.png", stamp))
}

/// Render one pass into a readable texture and return tightly-packed RGBA
/// pixels. `encode` receives the encoder and the capture target view.
pub fn capture_pass(
    gpu: &GpuContext,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    encode: impl FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
) -> Result<Vec<u8>> {
    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("capture target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // COPY_BYTES_PER_ROW_ALIGNMENT padding for the readback buffer.
    let bytes_per_row = padded_bytes_per_row(width);
    let buffer = gpu.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("capture readback"),
        size: bytes_per_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("capture encoder"),
        });

    encode(&mut encoder, &view);

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: None,
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    gpu.queue().submit(std::iter::once(encoder.finish()));

    let padded = gpu.read_buffer_sync(&buffer)?;
    Ok(unpad_rows(&padded, width, height, format))
}

pub fn save_png(path: &Path, width: u32, height: u32, rgba: Vec<u8>) -> Result<()> {
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or("Pixel buffer does not match image dimensions")?;
    image.save(path)?;
    Ok(())
}

fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strip row padding and swizzle BGRA surfaces into RGBA.
fn unpad_rows(padded: &[u8], width: u32, height: u32, format: wgpu::TextureFormat) -> Vec<u8> {
    let bytes_per_row = padded_bytes_per_row(width) as usize;
    let row_len = width as usize * 4;
    let swap_bgr = matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    );

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * bytes_per_row;
        let row_bytes = &padded[start..start + row_len];
        if swap_bgr {
            for px in row_bytes.chunks_exact(4) {
                pixels.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        } else {
            pixels.extend_from_slice(row_bytes);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamped_path_shape() {
        let path = timestamped_path(Path::new("/tmp"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("spincube-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn row_padding_rounds_to_alignment() {
        // 100 px * 4 = 400 bytes, next 256 multiple is 512.
        assert_eq!(padded_bytes_per_row(100), 512);
        // Already aligned stays put.
        assert_eq!(padded_bytes_per_row(64), 256);
    }

    #[test]
    fn unpad_strips_padding_and_swaps_bgra() {
        let width = 1u32;
        let height = 2u32;
        let bytes_per_row = padded_bytes_per_row(width) as usize;

        let mut padded = vec![0u8; bytes_per_row * height as usize];
        padded[..4].copy_from_slice(&[10, 20, 30, 255]);
        padded[bytes_per_row..bytes_per_row + 4].copy_from_slice(&[1, 2, 3, 255]);

        let rgba = unpad_rows(&padded, width, height, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(rgba, vec![30, 20, 10, 255, 3, 2, 1, 255]);

        let rgba = unpad_rows(&padded, width, height, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(rgba, vec![10, 20, 30, 255, 1, 2, 3, 255]);
    }
}
