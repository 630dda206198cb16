//! Typed, copying accessors for [`MeshData`] attributes.
//!
//! Every accessor decodes the stored format into `f32` components, so a mesh
//! with `Float2` positions, half-float texture coordinates or `Unorm8x4`
//! colors reads the same way as one storing plain floats.

use crate::math::packing;

use super::data::MeshData;
use super::layout::{ComponentKind, VertexAttributeFormat, VertexAttributeSemantic};

/// Decode one element into up to four float components.
///
/// Missing components are left as in `fill`.
fn decode_element(format: VertexAttributeFormat, bytes: &[u8], fill: [f32; 4]) -> [f32; 4] {
    let kind = format.component_kind();
    let size = kind.size();
    let mut out = fill;
    for (c, value) in out.iter_mut().enumerate().take(format.component_count()) {
        let src = &bytes[c * size..(c + 1) * size];
        *value = match kind {
            ComponentKind::Float32 => bytemuck::pod_read_unaligned::<f32>(src),
            ComponentKind::Float16 => {
                packing::unpack_half(bytemuck::pod_read_unaligned::<u16>(src))
            }
            ComponentKind::Unorm8 => packing::unpack(src[0]),
            ComponentKind::Snorm8 => packing::unpack(src[0] as i8),
            ComponentKind::Unorm16 => packing::unpack(bytemuck::pod_read_unaligned::<u16>(src)),
            ComponentKind::Snorm16 => packing::unpack(bytemuck::pod_read_unaligned::<i16>(src)),
            ComponentKind::Int32 | ComponentKind::Uint32 => {
                unreachable!("integer formats are rejected before decoding")
            }
        };
    }
    out
}

impl MeshData<'_> {
    /// Decode attribute `id` into `N` float components per vertex.
    ///
    /// Components the format doesn't store are taken from `fill`.
    ///
    /// # Panics
    ///
    /// If `id` is out of range or the format stores plain integers.
    pub fn attribute_as_floats<const N: usize>(&self, id: usize, fill: [f32; N]) -> Vec<[f32; N]> {
        let attr = *self.attribute(id);
        assert!(
            attr.format.is_float_convertible(),
            "MeshData::attribute_as_floats(): attribute {} ({}) has integer format {:?}",
            id,
            attr.semantic,
            attr.format
        );
        let mut fill4 = [0.0f32; 4];
        for (dst, src) in fill4.iter_mut().zip(fill.iter()) {
            *dst = *src;
        }

        let data = self.vertex_data();
        (0..attr.vertex_count)
            .map(|vertex| {
                let decoded = decode_element(attr.format, &data[attr.element_range(vertex)], fill4);
                let mut out = fill;
                for (dst, src) in out.iter_mut().zip(decoded.iter()) {
                    *dst = *src;
                }
                out
            })
            .collect()
    }

    fn required_attribute(&self, semantic: VertexAttributeSemantic, caller: &str) -> usize {
        match self.attribute_id(semantic) {
            Some(id) => id,
            None => panic!("MeshData::{caller}(): the mesh has no {semantic} attribute"),
        }
    }

    /// Positions as 2D vectors; a third component, if any, is dropped.
    pub fn positions2d(&self) -> Vec<[f32; 2]> {
        let id = self.required_attribute(VertexAttributeSemantic::Position, "positions2d");
        self.attribute_as_floats(id, [0.0; 2])
    }

    /// Positions as 3D vectors; 2D positions get a zero Z.
    pub fn positions3d(&self) -> Vec<[f32; 3]> {
        let id = self.required_attribute(VertexAttributeSemantic::Position, "positions3d");
        self.attribute_as_floats(id, [0.0; 3])
    }

    /// Normals as 3D vectors.
    pub fn normals(&self) -> Vec<[f32; 3]> {
        let id = self.required_attribute(VertexAttributeSemantic::Normal, "normals");
        self.attribute_as_floats(id, [0.0; 3])
    }

    /// Tangents as 4D vectors; a missing handedness defaults to `1.0`.
    pub fn tangents(&self) -> Vec<[f32; 4]> {
        let id = self.required_attribute(VertexAttributeSemantic::Tangent, "tangents");
        self.attribute_as_floats(id, [0.0, 0.0, 0.0, 1.0])
    }

    /// First texture coordinate set as 2D vectors.
    pub fn texture_coordinates2d(&self) -> Vec<[f32; 2]> {
        let id = self.required_attribute(VertexAttributeSemantic::TexCoord0, "texture_coordinates2d");
        self.attribute_as_floats(id, [0.0; 2])
    }

    /// Colors as RGBA; RGB colors get an alpha of `1.0`.
    pub fn colors(&self) -> Vec<[f32; 4]> {
        let id = self.required_attribute(VertexAttributeSemantic::Color, "colors");
        self.attribute_as_floats(id, [0.0, 0.0, 0.0, 1.0])
    }
}
