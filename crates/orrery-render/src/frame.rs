//! One presented frame.
//!
//! The whole scene goes through a single pass that clears color and the
//! reverse-Z depth buffer; pipelines decide per draw whether depth matters.

use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};

/// Opaque clear color from an RGB triple in `0..=1`.
pub fn clear_color_from_rgb([r, g, b]: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: 1.0,
    }
}

fn color_ops(clear: wgpu::Color) -> wgpu::Operations<wgpu::Color> {
    wgpu::Operations {
        load: wgpu::LoadOp::Clear(clear),
        store: wgpu::StoreOp::Store,
    }
}

/// Depth is only needed while the pass runs.
fn depth_ops() -> wgpu::Operations<f32> {
    wgpu::Operations {
        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
        store: wgpu::StoreOp::Discard,
    }
}

/// Acquired surface texture plus the encoder recording into it.
///
/// Dropping a frame without [`Frame::present`] throws the commands away.
pub struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    target: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

impl Frame {
    pub fn begin(ctx: &RenderContext) -> Result<Self, SurfaceError> {
        let surface_texture = ctx.get_current_texture()?;
        let target = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });
        Ok(Self {
            surface_texture,
            target,
            encoder,
        })
    }

    /// The scene pass: color cleared to `clear`, depth cleared to the far plane.
    pub fn scene_pass<'a>(
        &'a mut self,
        clear: wgpu::Color,
        depth: &'a DepthBuffer,
    ) -> wgpu::RenderPass<'a> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("solar-system"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target,
                resolve_target: None,
                ops: color_ops(clear),
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(depth_ops()),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    pub fn present(self, queue: &wgpu::Queue) {
        queue.submit(Some(self.encoder.finish()));
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_is_opaque() {
        let color = clear_color_from_rgb([0.5, 0.25, 0.0]);
        assert_eq!((color.r, color.g, color.b, color.a), (0.5, 0.25, 0.0, 1.0));
    }

    #[test]
    fn test_color_is_cleared_and_kept() {
        let ops = color_ops(wgpu::Color::RED);
        assert_eq!(ops.load, wgpu::LoadOp::Clear(wgpu::Color::RED));
        assert_eq!(ops.store, wgpu::StoreOp::Store);
    }

    #[test]
    fn test_depth_clears_to_far_plane() {
        let ops = depth_ops();
        assert_eq!(ops.load, wgpu::LoadOp::Clear(0.0));
        assert_eq!(ops.store, wgpu::StoreOp::Discard);
    }
}
