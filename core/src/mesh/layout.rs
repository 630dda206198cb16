//! Vertex attribute semantics and formats.
//!
//! A vertex attribute is described by *what* it means ([`VertexAttributeSemantic`])
//! and *how* each element is stored ([`VertexAttributeFormat`]). Where the
//! element lives inside a vertex buffer is described separately by
//! [`MeshAttributeData`](super::MeshAttributeData).

use std::fmt;

/// Semantic meaning of a vertex attribute.
///
/// Semantics are used to match mesh attributes with shader inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexAttributeSemantic {
    /// Vertex position (float2 or float3).
    Position,
    /// Vertex normal (typically float3).
    Normal,
    /// Vertex tangent (typically float4, w = handedness).
    Tangent,
    /// Texture coordinates set 0 (typically float2).
    TexCoord0,
    /// Texture coordinates set 1 (typically float2).
    TexCoord1,
    /// Vertex color (typically float4 or unorm4).
    Color,
    /// Bone indices for skinning (typically uint4).
    Joints,
    /// Bone weights for skinning (typically float4).
    Weights,
    /// Application-defined attribute.
    Custom(u16),
}

impl fmt::Display for VertexAttributeSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(id) => write!(f, "Custom({id})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Storage kind of a single component of a [`VertexAttributeFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// 32-bit IEEE float.
    Float32,
    /// 16-bit IEEE half float.
    Float16,
    /// 32-bit signed integer, not normalized.
    Int32,
    /// 32-bit unsigned integer, not normalized.
    Uint32,
    /// 8-bit unsigned integer normalized to `[0, 1]`.
    Unorm8,
    /// 8-bit signed integer normalized to `[-1, 1]`.
    Snorm8,
    /// 16-bit unsigned integer normalized to `[0, 1]`.
    Unorm16,
    /// 16-bit signed integer normalized to `[-1, 1]`.
    Snorm16,
}

impl ComponentKind {
    /// Size of one component in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 | Self::Uint32 => 4,
            Self::Float16 | Self::Unorm16 | Self::Snorm16 => 2,
            Self::Unorm8 | Self::Snorm8 => 1,
        }
    }

    /// Whether components of this kind decode to a float value.
    ///
    /// Plain integers do not; they are indices or bit patterns.
    pub fn is_float_convertible(&self) -> bool {
        !matches!(self, Self::Int32 | Self::Uint32)
    }
}

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Single 32-bit signed integer.
    Int,
    /// Two 32-bit signed integers.
    Int2,
    /// Three 32-bit signed integers.
    Int3,
    /// Four 32-bit signed integers.
    Int4,
    /// Single 32-bit unsigned integer.
    Uint,
    /// Two 32-bit unsigned integers.
    Uint2,
    /// Three 32-bit unsigned integers.
    Uint3,
    /// Four 32-bit unsigned integers.
    Uint4,
    /// Four 8-bit unsigned integers (normalized to 0.0-1.0).
    Unorm8x4,
    /// Four 8-bit signed integers (normalized to -1.0-1.0).
    Snorm8x4,
    /// Two 16-bit unsigned integers (normalized to 0.0-1.0).
    Unorm16x2,
    /// Two 16-bit signed integers (normalized to -1.0-1.0).
    Snorm16x2,
    /// Four 16-bit unsigned integers (normalized to 0.0-1.0).
    Unorm16x4,
    /// Four 16-bit signed integers (normalized to -1.0-1.0).
    Snorm16x4,
    /// Two 16-bit half floats.
    Float16x2,
    /// Four 16-bit half floats.
    Float16x4,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of this format.
    pub fn size(&self) -> usize {
        self.component_kind().size() * self.component_count()
    }

    /// Number of components in one element.
    pub fn component_count(&self) -> usize {
        match self {
            Self::Float | Self::Int | Self::Uint => 1,
            Self::Float2 | Self::Int2 | Self::Uint2 => 2,
            Self::Unorm16x2 | Self::Snorm16x2 | Self::Float16x2 => 2,
            Self::Float3 | Self::Int3 | Self::Uint3 => 3,
            Self::Float4 | Self::Int4 | Self::Uint4 => 4,
            Self::Unorm8x4 | Self::Snorm8x4 => 4,
            Self::Unorm16x4 | Self::Snorm16x4 | Self::Float16x4 => 4,
        }
    }

    /// Storage kind shared by every component.
    pub fn component_kind(&self) -> ComponentKind {
        match self {
            Self::Float | Self::Float2 | Self::Float3 | Self::Float4 => ComponentKind::Float32,
            Self::Int | Self::Int2 | Self::Int3 | Self::Int4 => ComponentKind::Int32,
            Self::Uint | Self::Uint2 | Self::Uint3 | Self::Uint4 => ComponentKind::Uint32,
            Self::Unorm8x4 => ComponentKind::Unorm8,
            Self::Snorm8x4 => ComponentKind::Snorm8,
            Self::Unorm16x2 | Self::Unorm16x4 => ComponentKind::Unorm16,
            Self::Snorm16x2 | Self::Snorm16x4 => ComponentKind::Snorm16,
            Self::Float16x2 | Self::Float16x4 => ComponentKind::Float16,
        }
    }

    /// Whether elements of this format can be decoded into floats.
    pub fn is_float_convertible(&self) -> bool {
        self.component_kind().is_float_convertible()
    }
}
