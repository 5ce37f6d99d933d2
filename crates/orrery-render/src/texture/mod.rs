//! Sampled textures: decoding, upload with a full mip chain, and a path-keyed cache.
//!
//! [`TextureManager`] owns every texture the renderer samples. Textures are
//! cached by name, so asking twice for the same name returns the same
//! [`Arc<ManagedTexture>`]. Loading is fallible; callers that must keep
//! drawing use [`TextureManager::load_file_or_placeholder`], which settles
//! on a file or a placeholder through [`resolve_texture`] before any GPU work.

mod decode;
mod mipmap;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use decode::{ColorSpace, TexturePixels, mip_level_count, upload_format};

use mipmap::MipGenerator;

pub struct ManagedTexture {
    /// Level 0 plus any generated mips.
    pub texture: wgpu::Texture,
    /// Covers every mip level.
    pub view: wgpu::TextureView,
    /// Texture + shared sampler, laid out per [`TextureManager::bind_group_layout`].
    pub bind_group: wgpu::BindGroup,
    /// Width and height of level 0.
    pub dimensions: (u32, u32),
    /// Upload format; see [`upload_format`].
    pub format: wgpu::TextureFormat,
    /// 1 for placeholders and textures created without mips.
    pub mip_level_count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("{width}x{height} {format:?} needs {expected} bytes, got {actual}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },

    #[error("empty texture ({width}x{height})")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture failed to load at path {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Stand-in for a texture file that could not be loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Magenta, so a missing diffuse map is obvious on screen.
    Diffuse,
    /// Black: no specular highlight.
    Specular,
}

impl Placeholder {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Placeholder::Diffuse => [255, 0, 255, 255],
            Placeholder::Specular => [0, 0, 0, 255],
        }
    }

    pub fn cache_key(self) -> &'static str {
        match self {
            Placeholder::Diffuse => "placeholder:diffuse",
            Placeholder::Specular => "placeholder:specular",
        }
    }

    /// Diffuse maps are color, specular maps are intensity data.
    pub fn color_space(self) -> ColorSpace {
        match self {
            Placeholder::Diffuse => ColorSpace::Srgb,
            Placeholder::Specular => ColorSpace::Linear,
        }
    }
}

/// What a texture file resolved to on the CPU.
#[derive(Debug, PartialEq)]
pub enum TextureSource {
    /// Decoded and validated, ready to upload.
    File(TexturePixels),
    /// The file was unusable; draw with this instead.
    Placeholder(Placeholder),
}

/// Decode `path` in the color space of `fallback`'s role, or settle on the
/// placeholder. A failure is logged with the path.
pub fn resolve_texture(path: &Path, fallback: Placeholder) -> TextureSource {
    let decoded = TexturePixels::open(path, fallback.color_space())
        .and_then(|pixels| pixels.validate().map(|()| pixels));
    match decoded {
        Ok(pixels) => TextureSource::File(pixels),
        Err(err) => {
            log::warn!("{err}; using {fallback:?} placeholder");
            TextureSource::Placeholder(fallback)
        }
    }
}

pub struct TextureManager {
    cache: HashMap<String, Arc<ManagedTexture>>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    mips: MipGenerator,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("single-texture-layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        Self {
            cache: HashMap::new(),
            sampler,
            bind_group_layout,
            mips: MipGenerator::new(device),
        }
    }

    /// Upload `pixels` under `name`, or hand back what is already cached there.
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        pixels: &TexturePixels,
        with_mips: bool,
    ) -> Result<Arc<ManagedTexture>, TextureError> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Arc::clone(cached));
        }
        pixels.validate()?;

        let level_count = if with_mips {
            mip_level_count(pixels.width, pixels.height)
        } else {
            1
        };
        let size = wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        };
        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        if level_count > 1 {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: pixels.format,
            usage,
            view_formats: &[],
        });

        queue.write_texture(
            texture.as_image_copy(),
            &pixels.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixels.bytes_per_row()),
                rows_per_image: Some(pixels.height),
            },
            size,
        );
        self.mips.generate(device, queue, &texture, level_count);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.bind_view(device, name, &view);

        log::debug!(
            "Uploaded '{name}' {}x{} {:?} with {level_count} mip levels",
            pixels.width,
            pixels.height,
            pixels.format
        );
        let managed = Arc::new(ManagedTexture {
            texture,
            view,
            bind_group,
            dimensions: (pixels.width, pixels.height),
            format: pixels.format,
            mip_level_count: level_count,
        });
        self.cache.insert(name.to_owned(), Arc::clone(&managed));
        Ok(managed)
    }

    /// Decode an image file and upload it under `name` with a full mip chain.
    pub fn load_file(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        path: &Path,
        space: ColorSpace,
    ) -> Result<Arc<ManagedTexture>, TextureError> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Arc::clone(cached));
        }
        let pixels = TexturePixels::open(path, space)?;
        self.create_texture(device, queue, name, &pixels, true)
    }

    /// Like [`TextureManager::load_file`], but an unusable file yields a 1×1
    /// placeholder, which is then also what [`TextureManager::get`] returns for `name`.
    pub fn load_file_or_placeholder(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        path: &Path,
        fallback: Placeholder,
    ) -> Arc<ManagedTexture> {
        if let Some(cached) = self.cache.get(name) {
            return Arc::clone(cached);
        }
        let uploaded = match resolve_texture(path, fallback) {
            TextureSource::File(pixels) => self
                .create_texture(device, queue, name, &pixels, true)
                .map_err(|err| log::warn!("{err}; using {fallback:?} placeholder"))
                .ok(),
            TextureSource::Placeholder(_) => None,
        };
        uploaded.unwrap_or_else(|| {
            let placeholder = self.placeholder(device, queue, fallback);
            self.cache.insert(name.to_owned(), Arc::clone(&placeholder));
            placeholder
        })
    }

    pub fn placeholder(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        kind: Placeholder,
    ) -> Arc<ManagedTexture> {
        if let Some(cached) = self.cache.get(kind.cache_key()) {
            return Arc::clone(cached);
        }
        let pixels = TexturePixels::solid(kind.rgba(), kind.color_space());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(kind.cache_key()),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: pixels.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            &pixels.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixels.bytes_per_row()),
                rows_per_image: None,
            },
            texture.size(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.bind_view(device, kind.cache_key(), &view);
        let managed = Arc::new(ManagedTexture {
            texture,
            view,
            bind_group,
            dimensions: (1, 1),
            format: pixels.format,
            mip_level_count: 1,
        });
        self.cache.insert(kind.cache_key().to_owned(), Arc::clone(&managed));
        managed
    }

    /// The texture cached under `name`, which may be a placeholder standing in for a file.
    pub fn get(&self, name: &str) -> Option<Arc<ManagedTexture>> {
        self.cache.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Destroy every cached texture and empty the cache.
    ///
    /// Outstanding `Arc`s stay valid as handles but must not be sampled again.
    pub fn destroy_all(&mut self) {
        let count = self.cache.len();
        // A placeholder aliased under several names is destroyed once per name.
        for texture in self.cache.values() {
            texture.texture.destroy();
        }
        self.cache.clear();
        log::debug!("Destroyed {count} cached textures");
    }

    /// Layout of every [`ManagedTexture::bind_group`]: texture at 0, sampler at 1.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Trilinear, repeating on U and V.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    fn bind_view(&self, device: &wgpu::Device, label: &str, view: &wgpu::TextureView) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    fn rgba(width: u32, height: u32) -> TexturePixels {
        TexturePixels::new(
            vec![255; (width * height * 4) as usize],
            width,
            height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        )
    }

    #[test]
    fn test_placeholder_colors_and_keys() {
        assert_eq!(Placeholder::Diffuse.rgba(), [255, 0, 255, 255]);
        assert_eq!(Placeholder::Specular.rgba(), [0, 0, 0, 255]);
        assert_ne!(Placeholder::Diffuse.cache_key(), Placeholder::Specular.cache_key());
        assert_eq!(Placeholder::Specular.color_space(), ColorSpace::Linear);
    }

    #[test]
    fn test_missing_or_corrupt_file_resolves_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_texture(&dir.path().join("absent.png"), Placeholder::Diffuse),
            TextureSource::Placeholder(Placeholder::Diffuse)
        );

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"\x89PNG truncated").unwrap();
        assert_eq!(
            resolve_texture(&corrupt, Placeholder::Specular),
            TextureSource::Placeholder(Placeholder::Specular)
        );

        // The placeholder itself is always uploadable.
        let solid = TexturePixels::solid(Placeholder::Diffuse.rgba(), ColorSpace::Srgb);
        assert!(solid.validate().is_ok());
    }

    #[test]
    fn test_specular_file_resolves_to_linear_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocean_mask.png");
        image::RgbImage::from_pixel(4, 2, image::Rgb([90, 90, 90]))
            .save(&path)
            .unwrap();

        let TextureSource::File(specular) = resolve_texture(&path, Placeholder::Specular) else {
            panic!("readable file fell back to a placeholder");
        };
        assert_eq!(specular.format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!((specular.width, specular.height), (4, 2));

        let TextureSource::File(diffuse) = resolve_texture(&path, Placeholder::Diffuse) else {
            panic!("readable file fell back to a placeholder");
        };
        assert_eq!(diffuse.format, wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn test_create_texture_without_mips() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let tex = manager
            .create_texture(&device, &queue, "flat", &rgba(4, 4), false)
            .unwrap();
        assert_eq!(tex.dimensions, (4, 4));
        assert_eq!(tex.mip_level_count, 1);
    }

    #[test]
    fn test_create_texture_rejects_invalid_pixels() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let mut short = rgba(4, 4);
        short.data.truncate(32);
        let result = manager.create_texture(&device, &queue, "short", &short, false);
        assert!(matches!(result, Err(TextureError::DataSizeMismatch { .. })));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_load_file_builds_mip_chain_and_caches_by_name() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planet.png");
        image::RgbImage::from_pixel(64, 32, image::Rgb([200, 100, 50]))
            .save(&path)
            .unwrap();

        let mut manager = TextureManager::new(&device);
        let a = manager
            .load_file(&device, &queue, "planet", &path, ColorSpace::Srgb)
            .unwrap();
        let b = manager
            .load_file(&device, &queue, "planet", &path, ColorSpace::Srgb)
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &manager.get("planet").unwrap()));
        assert_eq!(a.mip_level_count, 7);
        assert_eq!(a.format, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_single_channel_file_uploads_r8() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specular.png");
        image::GrayImage::from_pixel(16, 16, image::Luma([128]))
            .save(&path)
            .unwrap();

        let mut manager = TextureManager::new(&device);
        let tex = manager
            .load_file(&device, &queue, "specular", &path, ColorSpace::Linear)
            .unwrap();
        assert_eq!(tex.format, wgpu::TextureFormat::R8Unorm);
        assert_eq!(tex.mip_level_count, 5);
    }

    #[test]
    fn test_missing_file_falls_back_to_placeholder() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let path = Path::new("does/not/exist.png");

        assert!(
            manager
                .load_file(&device, &queue, "lost", path, ColorSpace::Srgb)
                .is_err()
        );
        let tex =
            manager.load_file_or_placeholder(&device, &queue, "lost", path, Placeholder::Specular);
        assert_eq!(tex.dimensions, (1, 1));
        assert_eq!(tex.format, wgpu::TextureFormat::Rgba8Unorm);
        let again = manager.placeholder(&device, &queue, Placeholder::Specular);
        assert!(Arc::ptr_eq(&tex, &again));
        assert!(Arc::ptr_eq(&tex, &manager.get("lost").unwrap()));
    }

    #[test]
    fn test_destroy_all_empties_cache() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        manager
            .create_texture(&device, &queue, "removable", &rgba(2, 2), false)
            .unwrap();
        manager.placeholder(&device, &queue, Placeholder::Diffuse);
        assert_eq!(manager.len(), 2);

        manager.destroy_all();
        assert!(manager.get("removable").is_none());
        assert!(manager.is_empty());
        assert!(manager.get(Placeholder::Diffuse.cache_key()).is_none());
    }
}
