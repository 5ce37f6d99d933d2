//! Draws one frame of the solar system.
//!
//! The sphere is generated and uploaded once and shared by every body; each
//! draw item gets one slot of the instance buffer holding its model matrix.
//! Inside a single pass the background goes first (never occluding), then
//! the emissive sun, then the lit bodies and rings.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use orrery_config::Config;
use orrery_mesh::generate_uv_sphere;
use orrery_render::{
    BackgroundPipeline, BodyInstance, BufferAllocator, Camera, ColorSpace, DepthBuffer,
    EmissivePipeline, Frame, IndexData, InstanceBuffer, LitPipeline, ManagedTexture, MeshBuffer,
    Placeholder, RenderContext, SceneShader, SceneUniform, ShaderLibrary, SurfaceError,
    TextureManager, clear_color_from_rgb, instance_range, narrow_indices,
    scene_bind_group_layout,
};
use orrery_scene::{
    BACKGROUND_TEXTURE, BodyTextures, DrawItem, LightParams, Shading, SolarSystem,
};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// The parts of [`Config`] the renderer reads at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// Longitude and latitude segments of the shared sphere.
    pub sphere_segments: u32,
    /// Texture files, plus optional shader overrides under `shaders/`.
    pub asset_dir: PathBuf,
    /// Fills the frame where the starfield is missing.
    pub clear_color: wgpu::Color,
}

impl RendererSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sphere_segments: config.scene.sphere_segments,
            asset_dir: config.scene.asset_dir.clone(),
            clear_color: clear_color_from_rgb(config.render.clear_color),
        }
    }
}

pub struct SolarSystemRenderer {
    sphere: MeshBuffer,
    lit: LitPipeline,
    emissive: EmissivePipeline,
    background: BackgroundPipeline,
    depth: DepthBuffer,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    instances: InstanceBuffer,
    /// Body textures keyed by their file name under the asset dir.
    textures: TextureManager,
    /// `None` when the starfield failed to load; the clear color shows instead.
    background_texture: Option<Arc<ManagedTexture>>,
    materials: HashMap<BodyTextures, wgpu::BindGroup>,
    clear_color: wgpu::Color,
}

impl SolarSystemRenderer {
    /// Build every GPU resource the scene needs, including all textures.
    ///
    /// Missing texture files do not fail construction: they are logged and
    /// replaced by placeholders.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: (u32, u32),
        system: &SolarSystem,
        settings: &RendererSettings,
    ) -> Result<Self, AppError> {
        let segments = settings.sphere_segments;
        let mesh = generate_uv_sphere(segments, segments, 1.0)?;
        let allocator = BufferAllocator::new(device);
        let narrow = narrow_indices(&mesh.indices, mesh.vertex_count());
        let indices = match &narrow {
            Some(short) => IndexData::U16(short),
            None => IndexData::U32(&mesh.indices),
        };
        let index_format = indices.format();
        let sphere = allocator.create_mesh("sphere", mesh.vertex_bytes(), indices)?;
        debug!(
            "Uploaded sphere: {} vertices, {} indices ({:?})",
            mesh.vertex_count(),
            mesh.index_count(),
            index_format
        );

        let mut shaders =
            ShaderLibrary::new().with_override_dir(settings.asset_dir.join("shaders"));
        shaders.compile_all(device)?;
        let mut textures = TextureManager::new(device);

        let scene_layout = scene_bind_group_layout(device);
        let lit = LitPipeline::new(
            device,
            &*shaders.get(SceneShader::Lit)?,
            surface_format,
            &scene_layout,
        );
        let emissive = EmissivePipeline::new(
            device,
            &*shaders.get(SceneShader::Emissive)?,
            surface_format,
            &scene_layout,
            textures.bind_group_layout(),
        );
        let background = BackgroundPipeline::new(
            device,
            &*shaders.get(SceneShader::Background)?,
            surface_format,
            textures.bind_group_layout(),
        );

        let scene_buffer = allocator.create_uniform_buffer(
            "scene-uniform",
            &SceneUniform::new(&Camera::default(), &system.light()),
        );
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-bind-group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // One slot per body plus the ring.
        let instances = InstanceBuffer::new(device, system.bodies().len() + 1);

        let background_texture = match textures.load_file(
            device,
            queue,
            BACKGROUND_TEXTURE,
            &settings.asset_dir.join(BACKGROUND_TEXTURE),
            ColorSpace::Srgb,
        ) {
            Ok(texture) => Some(texture),
            Err(err) => {
                warn!("{err}; drawing without a background");
                None
            }
        };

        for (path, fallback) in texture_fallbacks(system) {
            textures.load_file_or_placeholder(
                device,
                queue,
                path,
                &settings.asset_dir.join(path),
                fallback,
            );
        }
        let no_specular = textures.placeholder(device, queue, Placeholder::Specular);

        let mut materials = HashMap::new();
        for body in system.bodies() {
            if body.shading == Shading::Lit {
                let ring = body.ring.map(|r| BodyTextures::diffuse(r.texture));
                for set in std::iter::once(body.textures).chain(ring) {
                    if materials.contains_key(&set) {
                        continue;
                    }
                    let diffuse = texture_for(&textures, set.diffuse, &no_specular);
                    let specular = set
                        .specular
                        .map(|p| texture_for(&textures, p, &no_specular))
                        .unwrap_or_else(|| Arc::clone(&no_specular));
                    let bind_group = lit.create_material_bind_group(
                        device,
                        set.diffuse,
                        &diffuse,
                        &specular,
                        textures.sampler(),
                    );
                    materials.insert(set, bind_group);
                }
            }
        }

        info!(
            "Renderer ready: {} bodies, {} textures, {} materials",
            system.bodies().len(),
            textures.len(),
            materials.len()
        );

        Ok(Self {
            sphere,
            lit,
            emissive,
            background,
            depth: DepthBuffer::new(device, size.0, size.1),
            scene_buffer,
            scene_bind_group,
            instances,
            textures,
            background_texture,
            materials,
            clear_color: settings.clear_color,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Upload this frame's uniforms and instances, then record, submit and present.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        camera: &Camera,
        light: &LightParams,
        items: &[DrawItem],
    ) -> Result<(), SurfaceError> {
        self.write_frame_data(&ctx.device, &ctx.queue, camera, light, items);

        let mut frame = Frame::begin(ctx)?;
        {
            let mut pass = frame.scene_pass(self.clear_color, &self.depth);

            if let Some(stars) = &self.background_texture {
                self.background.draw(&mut pass, &stars.bind_group);
            }

            let (emissive, lit) = partition_by_shading(items);

            if !emissive.is_empty() {
                pass.set_pipeline(&self.emissive.pipeline);
                pass.set_bind_group(0, &self.scene_bind_group, &[]);
                self.sphere.bind(&mut pass);
                self.instances.bind(&mut pass);
                for i in emissive {
                    let Some(texture) = self.textures.get(items[i].textures.diffuse) else {
                        continue;
                    };
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                    self.sphere.draw_instances(&mut pass, instance_range(i));
                }
            }

            if !lit.is_empty() {
                pass.set_pipeline(&self.lit.pipeline);
                pass.set_bind_group(0, &self.scene_bind_group, &[]);
                self.sphere.bind(&mut pass);
                self.instances.bind(&mut pass);
                for i in lit {
                    let Some(material) = self.materials.get(&items[i].textures) else {
                        continue;
                    };
                    pass.set_bind_group(1, material, &[]);
                    self.sphere.draw_instances(&mut pass, instance_range(i));
                }
            }
        }

        frame.present(&ctx.queue);
        Ok(())
    }

    /// Release every buffer and texture. Consuming `self` makes a second call impossible.
    pub fn teardown(mut self) {
        self.sphere.destroy();
        self.background.destroy();
        self.instances.destroy();
        self.scene_buffer.destroy();
        self.depth.texture.destroy();
        self.background_texture = None;
        self.textures.destroy_all();
        info!("Renderer resources released");
    }

    fn write_frame_data(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        light: &LightParams,
        items: &[DrawItem],
    ) {
        let instances: Vec<BodyInstance> = items.iter().map(|i| BodyInstance::new(i.model)).collect();
        self.instances.write(device, queue, &instances);
        queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::bytes_of(&SceneUniform::new(camera, light)),
        );
    }
}

/// Every body texture with the placeholder used if it fails to load.
/// The background is handled separately.
pub fn texture_fallbacks(system: &SolarSystem) -> Vec<(&'static str, Placeholder)> {
    let specular: HashSet<&str> = system
        .bodies()
        .iter()
        .filter_map(|b| b.textures.specular)
        .collect();
    system
        .texture_paths()
        .into_iter()
        .filter(|p| *p != BACKGROUND_TEXTURE)
        .map(|p| {
            let fallback = if specular.contains(p) {
                Placeholder::Specular
            } else {
                Placeholder::Diffuse
            };
            (p, fallback)
        })
        .collect()
}

/// Indices of emissive and lit items, each in table order.
pub fn partition_by_shading(items: &[DrawItem]) -> (Vec<usize>, Vec<usize>) {
    (0..items.len()).partition(|&i| items[i].shading == Shading::Emissive)
}

fn texture_for(
    textures: &TextureManager,
    path: &str,
    fallback: &Arc<ManagedTexture>,
) -> Arc<ManagedTexture> {
    textures.get(path).unwrap_or_else(|| Arc::clone(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_scene::DrawKind;

    fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
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

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.scene.sphere_segments = 24;
        config.render.clear_color = [0.5, 0.25, 0.0];
        let settings = RendererSettings::from_config(&config);
        assert_eq!(settings.sphere_segments, 24);
        assert_eq!(settings.asset_dir, config.scene.asset_dir);
        assert_eq!(settings.clear_color.r, 0.5);
        assert_eq!(settings.clear_color.g, 0.25);
        assert_eq!(settings.clear_color.a, 1.0);
    }

    #[test]
    fn test_specular_maps_fall_back_to_black() {
        let system = SolarSystem::default();
        let fallbacks = texture_fallbacks(&system);
        assert_eq!(fallbacks.len(), system.texture_paths().len() - 1);
        assert!(fallbacks.iter().all(|(p, _)| *p != BACKGROUND_TEXTURE));

        let kind = |name: &str| {
            fallbacks
                .iter()
                .find(|(p, _)| *p == name)
                .map(|(_, k)| *k)
        };
        assert_eq!(kind("earth_specular.png"), Some(Placeholder::Specular));
        assert_eq!(kind("earth.png"), Some(Placeholder::Diffuse));
        assert_eq!(kind("saturn_ring.png"), Some(Placeholder::Diffuse));
    }

    #[test]
    fn test_sun_is_drawn_before_lit_bodies() {
        let items = SolarSystem::default().evaluate(3.0);
        let (emissive, lit) = partition_by_shading(&items);
        assert_eq!(emissive.len(), 1);
        assert_eq!(emissive.len() + lit.len(), items.len());
        assert!(lit.windows(2).all(|w| w[0] < w[1]));
        let ring = lit
            .iter()
            .position(|&i| items[i].kind == DrawKind::Ring)
            .unwrap();
        assert_eq!(items[lit[ring]].body, items[lit[ring - 1]].body);
    }

    #[test]
    fn test_renderer_builds_with_missing_assets() {
        let Some((device, queue)) = headless_device() else {
            return;
        };
        let assets = tempfile::tempdir().unwrap();
        let settings = RendererSettings {
            sphere_segments: 8,
            asset_dir: assets.path().to_path_buf(),
            clear_color: wgpu::Color::BLACK,
        };
        let system = SolarSystem::default();
        let renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            (64, 64),
            &system,
            &settings,
        )
        .unwrap();

        assert!(renderer.background_texture.is_none());
        for (path, fallback) in texture_fallbacks(&system) {
            let texture = renderer.textures.get(path).unwrap();
            let placeholder = renderer.textures.get(fallback.cache_key()).unwrap();
            assert!(Arc::ptr_eq(&texture, &placeholder), "{path}");
        }
        // Earth, moon, mercury, venus, mars, jupiter, saturn, ring, uranus, neptune.
        assert_eq!(renderer.materials.len(), 10);
        renderer.teardown();
    }
}
