use gl::types::{GLfloat, GLint, GLsizei, GLuint};
use itertools::Itertools;

/// floats per vertex; positions are the only attribute
pub const POSITION_WIDTH: GLint = 3;
pub const VERTEX_STRIDE: GLsizei = 3;

pub const TRIANGLE_VERTICES: [GLfloat; 9] = [
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.0, 0.5, 0.0,
];

/// Four corners of the rectangle, each stored once.
pub const QUAD_VERTICES: [GLfloat; 12] = [
    0.5, 0.5, 0.0, // top right
    0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5, 0.5, 0.0, // top left
];

/// Two triangles sharing the 1-3 diagonal.
pub const QUAD_INDICES: [GLuint; 6] = [
    0, 1, 3, //
    1, 2, 3,
];

pub type Position = (GLfloat, GLfloat, GLfloat);

pub fn positions(vertices: &[GLfloat]) -> impl Iterator<Item = Position> + '_ {
    vertices.iter().copied().tuples()
}

/// Resolve an index list into triangles.  `None` if any index points past the vertices.
pub fn triangles(vertices: &[GLfloat], indices: &[GLuint]) -> Option<Vec<[Position; 3]>> {
    let corners: Vec<Position> = positions(vertices).collect();
    indices
        .iter()
        .map(|&i| corners.get(i as usize).copied())
        .tuples()
        .map(|(a, b, c)| Some([a?, b?, c?]))
        .collect()
}

/// Signed area in the xy plane, positive when counter-clockwise.
pub fn signed_area(triangle: &[Position; 3]) -> GLfloat {
    let [(x0, y0, _), (x1, y1, _), (x2, y2, _)] = *triangle;
    ((x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0)) * 0.5
}

/// Strict containment in the xy plane, either winding.
pub fn contains(triangle: &[Position; 3], x: GLfloat, y: GLfloat) -> bool {
    let [a, b, c] = *triangle;
    let side = |(x0, y0, _): Position, (x1, y1, _): Position| {
        (x1 - x0) * (y - y0) - (x - x0) * (y1 - y0)
    };
    let (d0, d1, d2) = (side(a, b), side(b, c), side(c, a));
    (d0 > 0.0 && d1 > 0.0 && d2 > 0.0) || (d0 < 0.0 && d1 < 0.0 && d2 < 0.0)
}

#[cfg(test)]
mod test {
    use super::*;

    const EPSILON: GLfloat = 1e-6;

    #[test]
    fn triangle_is_one_counter_clockwise_triangle() {
        let verts: Vec<_> = positions(&TRIANGLE_VERTICES).collect();
        assert_eq!(verts.len(), 3);
        let tri = [verts[0], verts[1], verts[2]];
        assert!((signed_area(&tri) - 0.5).abs() < EPSILON);
        assert!(contains(&tri, 0.0, 0.0));
    }

    #[test]
    fn quad_has_four_distinct_vertices_all_used() {
        let verts: Vec<_> = positions(&QUAD_VERTICES).collect();
        assert_eq!(verts.len(), 4);
        for (i, a) in verts.iter().enumerate() {
            for b in &verts[i + 1..] {
                assert_ne!(a, b);
            }
        }
        for i in 0..4 {
            assert!(QUAD_INDICES.contains(&i));
        }
    }

    #[test]
    fn quad_indices_make_two_triangles_covering_the_square() {
        let tris = triangles(&QUAD_VERTICES, &QUAD_INDICES).unwrap();
        assert_eq!(tris.len(), 2);
        assert_ne!(tris[0], tris[1]);

        let total: GLfloat = tris.iter().map(|t| signed_area(t).abs()).sum();
        assert!((total - 1.0).abs() < EPSILON);

        // same winding for both halves
        assert_eq!(
            signed_area(&tris[0]).signum(),
            signed_area(&tris[1]).signum()
        );

        // every sample strictly inside the square, off the shared diagonal, is covered once
        let steps = 40;
        for i in 0..steps {
            for j in 0..steps {
                let x = -0.5 + (i as GLfloat + 0.5) / steps as GLfloat;
                let y = -0.5 + (j as GLfloat + 0.25) / steps as GLfloat;
                if (x + y).abs() < 1e-3 {
                    continue;
                }
                let hits = tris.iter().filter(|t| contains(t, x, y)).count();
                assert_eq!(hits, 1, "({}, {}) covered {} times", x, y, hits);
            }
        }

        // nothing outside
        for &(x, y) in &[(0.6, 0.0), (-0.6, 0.0), (0.0, 0.6), (0.0, -0.6)] {
            assert!(tris.iter().all(|t| !contains(t, x, y)));
        }
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        assert!(triangles(&QUAD_VERTICES, &[0, 1, 4]).is_none());
    }
}
