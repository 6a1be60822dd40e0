/// Texture trait, texture descriptor, and texture info

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    R8G8B8_UNORM,
    RG32_FLOAT,
    RGBA32_FLOAT,
    RGB32_FLOAT,
    D32_FLOAT,
}

impl TextureFormat {
    /// Returns true for formats whose channels are floating point.
    ///
    /// Used to pick the gamma applied when sampling environment images:
    /// float (HDR) data is linear, 8-bit data is assumed gamma-encoded.
    pub fn is_floating_point(&self) -> bool {
        matches!(
            self,
            TextureFormat::RG32_FLOAT
                | TextureFormat::RGBA32_FLOAT
                | TextureFormat::RGB32_FLOAT
                | TextureFormat::D32_FLOAT
        )
    }

    /// Returns true for depth formats
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT)
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both
    SampledAndRenderTarget,
    /// Texture can be used as depth attachment (and sampled for shadow tests)
    DepthStencil,
}

// ===== TEXTURE DATA =====

/// Data for a single layer of a texture array
#[derive(Debug, Clone)]
pub struct TextureLayerData {
    /// Target layer index (0-based)
    pub layer: u32,
    /// Raw pixel bytes for this layer
    pub data: Vec<u8>,
}

/// Data to upload to a texture at creation time
#[derive(Debug, Clone)]
pub enum TextureData {
    /// Single image data (for simple textures, or layer 0 of an array)
    Single(Vec<u8>),

    /// Per-layer data for array textures.
    /// Only the layers listed are uploaded; others remain uninitialized.
    Layers(Vec<TextureLayerData>),
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Number of array layers (1 = simple 2D texture, >1 = texture array)
    pub array_layers: u32,
    /// Number of mipmap levels (1 = no mipmaps)
    pub mip_levels: u32,
    /// Enable linear filtering when sampling
    pub linear_filtering: bool,
    /// Optional initial data to upload at creation time
    pub data: Option<TextureData>,
}

impl TextureDesc {
    /// Descriptor for a plain sampled 2D texture with no mipmaps
    pub fn sampled_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            usage: TextureUsage::Sampled,
            array_layers: 1,
            mip_levels: 1,
            linear_filtering: true,
            data: None,
        }
    }
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture.
///
/// Returned by `Texture::info()` to query texture properties
/// without exposing backend-specific details.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Number of array layers (1 = simple 2D texture, >1 = texture array)
    pub array_layers: u32,
    /// Number of mipmap levels
    pub mip_levels: u32,
}

impl TextureInfo {
    /// Returns true if this texture is a texture array (array_layers > 1)
    pub fn is_array(&self) -> bool {
        self.array_layers > 1
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The texture is automatically destroyed when dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
