use std::sync::Arc;
use wgpu::{Adapter, Buffer, Device, DeviceDescriptor, Instance, Queue, Surface};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Shared GPU handles for the renderer and the post-processing chain.
///
/// Device and queue are wrapped in Arc so the bloom chain and the overlay can
/// hold their own handles without lifetime plumbing. Creation is also the
/// capability check: if no adapter or device can be acquired, the error
/// surfaces here and the demo shows its warning instead of starting.
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Acquire adapter, device, and queue compatible with the given window
    /// surface. The surface must come from `instance`.
    pub async fn new_with_surface(instance: &Instance, surface: &Surface<'_>) -> Result<Self> {
        let adapter = Self::request_adapter(instance, surface).await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = Self::request_device(&adapter).await?;

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Synchronously read back a mapped buffer, used by screenshot capture.
    ///
    /// WARNING: blocks the calling thread until the GPU finishes.
    pub fn read_buffer_sync(&self, buffer: &Buffer) -> Result<Vec<u8>> {
        let buffer_slice = buffer.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });

        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .ok();

        match receiver.recv() {
            Ok(Ok(())) => {
                let data = buffer_slice.get_mapped_range();
                let result = data.to_vec();
                drop(data);
                buffer.unmap();
                Ok(result)
            }
            Ok(Err(e)) => Err(format!("Buffer mapping failed: {:?}", e).into()),
            Err(_) => Err("Channel closed before receiving result".into()),
        }
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| format!("No compatible graphics adapter: {:?}", e).into())
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("spincube device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| format!("Failed to create device: {:?}", e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_cheaply_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GpuContext>();
    }
}
