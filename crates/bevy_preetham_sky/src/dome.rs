use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

const CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0], // 0
    [1.0, -1.0, -1.0],  // 1
    [1.0, 1.0, -1.0],   // 2
    [-1.0, 1.0, -1.0],  // 3
    [-1.0, -1.0, 1.0],  // 4
    [1.0, -1.0, 1.0],   // 5
    [1.0, 1.0, 1.0],    // 6
    [-1.0, 1.0, 1.0],   // 7
];

/// Two triangles per face, wound so each face is visible from inside the box.
const TRIANGLES: [[u32; 3]; 12] = [
    // Front (z+)
    [4, 6, 5],
    [4, 7, 6],
    // Back (z-)
    [1, 3, 0],
    [1, 2, 3],
    // Right (x+)
    [5, 2, 1],
    [5, 6, 2],
    // Left (x-)
    [0, 7, 4],
    [0, 3, 7],
    // Top (y+)
    [7, 2, 6],
    [7, 3, 2],
    // Bottom (y-)
    [0, 5, 1],
    [0, 4, 5],
];

/// Unit box with inward-facing triangles; the sky shader only needs positions.
pub fn sky_box_mesh() -> Mesh {
    let indices: Vec<u32> = TRIANGLES.iter().flatten().copied().collect();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, CORNERS.to_vec())
        .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_twelve_triangles() {
        let mesh = sky_box_mesh();
        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(36));
    }

    #[test]
    fn faces_point_inward() {
        for tri in TRIANGLES {
            let [a, b, c] = tri.map(|i| Vec3::from_array(CORNERS[i as usize]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) < 0.0, "triangle {tri:?} faces outward");
        }
    }
}
