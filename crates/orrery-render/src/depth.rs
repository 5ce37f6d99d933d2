//! Reverse-Z depth: cleared to 0.0 (far), nearer fragments win with `GreaterEqual`.

pub struct DepthBuffer {
    /// `Depth32Float`, sized to the surface.
    pub texture: wgpu::Texture,
    /// Depth attachment of the scene pass.
    pub view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const CLEAR_VALUE: f32 = 0.0;
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene-depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }

    /// Match a new surface size; the old texture is destroyed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.size == (width.max(1), height.max(1)) {
            return;
        }
        let old = std::mem::replace(self, Self::new(device, width, height));
        old.texture.destroy();
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Bodies and rings: test and write.
    pub fn depth_stencil_state() -> wgpu::DepthStencilState {
        depth_state(true, Self::COMPARE_FUNCTION)
    }

    /// The starfield: always passes, writes nothing, so anything drawn later covers it.
    pub fn ignore_depth_state() -> wgpu::DepthStencilState {
        depth_state(false, wgpu::CompareFunction::Always)
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DepthBuffer::FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_body_state_is_reverse_z() {
        let state = DepthBuffer::depth_stencil_state();
        assert_eq!(state.format, wgpu::TextureFormat::Depth32Float);
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert_eq!(DepthBuffer::CLEAR_VALUE, 0.0);
    }

    #[test]
    fn test_background_state_never_occludes() {
        let state = DepthBuffer::ignore_depth_state();
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn test_resize_tracks_surface() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 0, 0);
        assert_eq!(depth.size(), (1, 1));

        depth.resize(&device, 1200, 800);
        assert_eq!(depth.size(), (1200, 800));
        assert_eq!(depth.texture.width(), 1200);
    }
}
