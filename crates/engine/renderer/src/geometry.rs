//! Static vertex data for the leaf quad and the skybox cube

use crate::device::{VertexAttribute, VertexLayout};

/// Leaf quad drawn as a 4-vertex triangle strip
///
/// Per vertex: position (3), uv (2), normal (3), tangent (3). The normals
/// lean outward so the quad shades like a gently curved leaf.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 44] = [
    // position         uv          normal               tangent
    -1.0, -1.0, 0.0,    0.0, 0.0,   -0.25, -0.25, 1.0,   1.0, 0.0, 0.0,
    -1.0,  1.0, 0.0,    0.0, 1.0,   -0.25,  0.25, 1.0,   1.0, 0.0, 0.0,
     1.0, -1.0, 0.0,    1.0, 0.0,    0.25, -0.25, 1.0,   1.0, 0.0, 0.0,
     1.0,  1.0, 0.0,    1.0, 1.0,    0.25,  0.25, 1.0,   1.0, 0.0, 0.0,
];

pub const QUAD_VERTEX_COUNT: i32 = 4;

const QUAD_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute { location: 0, components: 3, offset: 0 },
    VertexAttribute { location: 1, components: 3, offset: 5 },
    VertexAttribute { location: 2, components: 2, offset: 3 },
    VertexAttribute { location: 3, components: 3, offset: 8 },
];

/// Attribute locations: 0 position, 1 normal, 2 uv, 3 tangent
pub const QUAD_LAYOUT: VertexLayout<'static> = VertexLayout {
    stride: 11,
    attributes: &QUAD_ATTRIBUTES,
};

/// Unit cube wound to be visible from the inside
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
];

pub const SKYBOX_VERTEX_COUNT: i32 = 36;

const SKYBOX_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    location: 0,
    components: 3,
    offset: 0,
}];

pub const SKYBOX_LAYOUT: VertexLayout<'static> = VertexLayout {
    stride: 3,
    attributes: &SKYBOX_ATTRIBUTES,
};
