//! Device, queue and window surface.

use std::sync::Arc;

use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no GPU adapter can present to this window")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("GPU device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("window surface could not be created: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("the adapter reports no surface formats")]
    UnsupportedSurface,
}

/// Why a frame could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Still lost after one reconfigure.
    #[error("surface lost")]
    Lost,

    #[error("out of memory")]
    OutOfMemory,

    /// Skip this frame and try again.
    #[error("timed out acquiring the next frame")]
    Timeout,
}

/// Format, present mode and alpha mode picked from what the surface supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSettings {
    /// sRGB when the surface offers one.
    pub format: wgpu::TextureFormat,
    /// `Fifo` with vsync, else the lowest-latency mode offered.
    pub present_mode: wgpu::PresentMode,
    /// `Opaque` when supported, else the first mode offered.
    pub alpha_mode: wgpu::CompositeAlphaMode,
}

impl SurfaceSettings {
    /// First sRGB format, else the first offered.
    /// `vsync` keeps `Fifo`; otherwise `Mailbox`, then `Immediate`, if offered.
    pub fn choose(caps: &wgpu::SurfaceCapabilities, vsync: bool) -> Option<Self> {
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())?;

        let present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
                .into_iter()
                .find(|mode| caps.present_modes.contains(mode))
                .unwrap_or(wgpu::PresentMode::Fifo)
        };

        let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
            wgpu::CompositeAlphaMode::Opaque
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        Some(Self {
            format,
            present_mode,
            alpha_mode,
        })
    }

    fn configuration(&self, width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: width.max(1),
            height: height.max(1),
            present_mode: self.present_mode,
            alpha_mode: self.alpha_mode,
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        }
    }
}

pub struct RenderContext {
    /// Logical device every resource is created on.
    pub device: wgpu::Device,
    /// Submission queue.
    pub queue: wgpu::Queue,
    /// Owns an `Arc` of the window, hence `'static`.
    pub surface: wgpu::Surface<'static>,
    /// Current size and present mode; updated by `resize`.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Target format of every scene pipeline.
    pub surface_format: wgpu::TextureFormat,
    /// Adapter name and backend, for the startup log.
    pub adapter_info: wgpu::AdapterInfo,
}

impl RenderContext {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let adapter_info = adapter.get_info();
        log::info!(
            "Using {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orrery-device"),
                ..Default::default()
            })
            .await?;

        let settings = SurfaceSettings::choose(&surface.get_capabilities(&adapter), vsync)
            .ok_or(RenderContextError::UnsupportedSurface)?;
        let surface_config = settings.configuration(size.width, size.height);
        surface.configure(&device, &surface_config);
        log::debug!(
            "Surface {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            settings.format,
            settings.present_mode
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            surface_format: settings.format,
            adapter_info,
        })
    }

    /// Zero sizes (minimised window) are clamped to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Next swapchain image. Lost or outdated surfaces are reconfigured and retried once.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Timeout) => Err(SurfaceError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceError::OutOfMemory),
            Err(err) => {
                log::warn!("Surface {err}, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
        }
    }
}

/// Blocks on [`RenderContext::new`] with `pollster`.
pub fn init_render_context_blocking(
    window: Arc<Window>,
    vsync: bool,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, vsync))
}

/// Headless device for tests; `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, PresentMode, TextureFormat};

    fn caps(
        formats: &[TextureFormat],
        present_modes: &[PresentMode],
        alpha_modes: &[CompositeAlphaMode],
    ) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            present_modes: present_modes.to_vec(),
            alpha_modes: alpha_modes.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prefers_first_srgb_format() {
        let c = caps(
            &[
                TextureFormat::Bgra8Unorm,
                TextureFormat::Bgra8UnormSrgb,
                TextureFormat::Rgba8UnormSrgb,
            ],
            &[PresentMode::Fifo],
            &[CompositeAlphaMode::Opaque],
        );
        let settings = SurfaceSettings::choose(&c, true).unwrap();
        assert_eq!(settings.format, TextureFormat::Bgra8UnormSrgb);
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let c = caps(
            &[TextureFormat::Rgba8Unorm, TextureFormat::Bgra8Unorm],
            &[PresentMode::Fifo],
            &[],
        );
        let settings = SurfaceSettings::choose(&c, true).unwrap();
        assert_eq!(settings.format, TextureFormat::Rgba8Unorm);
        assert_eq!(settings.alpha_mode, CompositeAlphaMode::Auto);
    }

    #[test]
    fn test_no_formats_is_unsupported() {
        assert!(SurfaceSettings::choose(&caps(&[], &[PresentMode::Fifo], &[]), true).is_none());
    }

    #[test]
    fn test_present_mode_selection() {
        let all = [PresentMode::Fifo, PresentMode::Immediate, PresentMode::Mailbox];
        let pick = |modes: &[PresentMode], vsync| {
            SurfaceSettings::choose(&caps(&[TextureFormat::Bgra8UnormSrgb], modes, &[]), vsync)
                .unwrap()
                .present_mode
        };
        assert_eq!(pick(&all, true), PresentMode::Fifo);
        assert_eq!(pick(&all, false), PresentMode::Mailbox);
        assert_eq!(
            pick(&[PresentMode::Fifo, PresentMode::Immediate], false),
            PresentMode::Immediate
        );
        assert_eq!(pick(&[PresentMode::Fifo], false), PresentMode::Fifo);
    }

    #[test]
    fn test_opaque_alpha_preferred() {
        let c = caps(
            &[TextureFormat::Bgra8UnormSrgb],
            &[PresentMode::Fifo],
            &[CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Opaque],
        );
        assert_eq!(
            SurfaceSettings::choose(&c, true).unwrap().alpha_mode,
            CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn test_configuration_clamps_zero_size() {
        let settings = SurfaceSettings {
            format: TextureFormat::Bgra8UnormSrgb,
            present_mode: PresentMode::Fifo,
            alpha_mode: CompositeAlphaMode::Opaque,
        };
        let config = settings.configuration(0, 0);
        assert_eq!((config.width, config.height), (1, 1));
        assert_eq!(config.present_mode, PresentMode::Fifo);
    }
}
