//! Upload of configured scene textures.

use orbiter_scene::{ColorSpace, TextureData, TextureSettings, WrapMode};

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Pixel data length doesn't match the dimensions.
    #[error("texture `{name}` has {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    DataSizeMismatch {
        name: String,
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Width or height is zero.
    #[error("texture `{name}` has zero dimensions {width}x{height}")]
    ZeroDimensions { name: String, width: u32, height: u32 },
}

/// A texture on the GPU with the sampler its settings ask for.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

pub fn texture_format(color_space: ColorSpace) -> wgpu::TextureFormat {
    match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
    }
}

/// Sampler descriptor for `settings`. Anisotropic filtering requires linear
/// filtering on every axis, which is always used here.
pub fn sampler_descriptor<'a>(label: &'a str, settings: &TextureSettings) -> wgpu::SamplerDescriptor<'a> {
    let address = address_mode(settings.wrap);
    wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        anisotropy_clamp: settings.anisotropy.max(1),
        ..Default::default()
    }
}

fn validate(data: &TextureData) -> Result<(), TextureError> {
    if data.width == 0 || data.height == 0 {
        return Err(TextureError::ZeroDimensions {
            name: data.name.clone(),
            width: data.width,
            height: data.height,
        });
    }
    let expected = data.width as usize * data.height as usize * 4;
    if data.rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            name: data.name.clone(),
            actual: data.rgba.len(),
            expected,
            width: data.width,
            height: data.height,
        });
    }
    Ok(())
}

impl GpuTexture {
    /// Upload `data` as a single-level 2D texture.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
    ) -> Result<Self, TextureError> {
        validate(data)?;

        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&data.name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(data.settings.color_space),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor(&data.name, &data.settings));
        log::debug!(
            "Uploaded texture {} ({}x{}, {:?}, {:?} mapping)",
            data.name,
            data.width,
            data.height,
            data.settings.color_space,
            data.settings.mapping
        );

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// A 1x1 texture holding one RGBA value, for bodies without a given map.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        rgba: [u8; 4],
        color_space: ColorSpace,
    ) -> Result<Self, TextureError> {
        let data = TextureData {
            name: name.to_string(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
            settings: TextureSettings {
                color_space,
                ..TextureSettings::default()
            },
        };
        Self::upload(device, queue, &data)
    }
}
