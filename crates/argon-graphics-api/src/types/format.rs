#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Abstract pixel formats, translated one-to-one onto native equivalents by
/// the backend. `*_TYPELESS` variants share a native format with their typed
/// siblings and therefore do not round-trip; this is an accepted lossy
/// mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(non_camel_case_types)]
pub enum Format {
    UNDEFINED,
    R8_UNORM,
    R8_SNORM,
    R8_UINT,
    R8_SINT,
    R8G8_UNORM,
    R8G8_SNORM,
    R8G8_UINT,
    R8G8_SINT,
    R8G8B8A8_UNORM,
    R8G8B8A8_SNORM,
    R8G8B8A8_UINT,
    R8G8B8A8_SINT,
    R8G8B8A8_SRGB,
    R8G8B8A8_TYPELESS,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_TYPELESS,
    R16_UNORM,
    R16_SNORM,
    R16_UINT,
    R16_SINT,
    R16_SFLOAT,
    R16G16_UNORM,
    R16G16_SNORM,
    R16G16_UINT,
    R16G16_SINT,
    R16G16_SFLOAT,
    R16G16B16A16_UNORM,
    R16G16B16A16_SNORM,
    R16G16B16A16_UINT,
    R16G16B16A16_SINT,
    R16G16B16A16_SFLOAT,
    R16G16B16A16_TYPELESS,
    R32_UINT,
    R32_SINT,
    R32_SFLOAT,
    R32_TYPELESS,
    R32G32_UINT,
    R32G32_SINT,
    R32G32_SFLOAT,
    R32G32B32A32_UINT,
    R32G32B32A32_SINT,
    R32G32B32A32_SFLOAT,
    R32G32B32A32_TYPELESS,
    R10G10B10A2_UNORM,
    R11G11B10_UFLOAT,
    D16_UNORM,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT,
    BC1_RGBA_UNORM_BLOCK,
    BC1_RGBA_SRGB_BLOCK,
    BC3_UNORM_BLOCK,
    BC3_SRGB_BLOCK,
    BC4_UNORM_BLOCK,
    BC5_UNORM_BLOCK,
    BC7_UNORM_BLOCK,
    BC7_SRGB_BLOCK,
}

impl Default for Format {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl Format {
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            Self::D16_UNORM | Self::D32_SFLOAT | Self::D24_UNORM_S8_UINT | Self::D32_SFLOAT_S8_UINT
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(self, Self::D24_UNORM_S8_UINT | Self::D32_SFLOAT_S8_UINT)
    }

    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            Self::BC1_RGBA_UNORM_BLOCK
                | Self::BC1_RGBA_SRGB_BLOCK
                | Self::BC3_UNORM_BLOCK
                | Self::BC3_SRGB_BLOCK
                | Self::BC4_UNORM_BLOCK
                | Self::BC5_UNORM_BLOCK
                | Self::BC7_UNORM_BLOCK
                | Self::BC7_SRGB_BLOCK
        )
    }

    /// Typeless formats alias the native format of their typed sibling.
    pub fn is_typeless(self) -> bool {
        matches!(
            self,
            Self::R8G8B8A8_TYPELESS
                | Self::B8G8R8A8_TYPELESS
                | Self::R16G16B16A16_TYPELESS
                | Self::R32_TYPELESS
                | Self::R32G32B32A32_TYPELESS
        )
    }

    /// The typed format a typeless variant collapses onto.
    pub fn typeless_canonical(self) -> Self {
        match self {
            Self::R8G8B8A8_TYPELESS => Self::R8G8B8A8_UNORM,
            Self::B8G8R8A8_TYPELESS => Self::B8G8R8A8_UNORM,
            Self::R16G16B16A16_TYPELESS => Self::R16G16B16A16_SFLOAT,
            Self::R32_TYPELESS => Self::R32_SFLOAT,
            Self::R32G32B32A32_TYPELESS => Self::R32G32B32A32_SFLOAT,
            other => other,
        }
    }
}
