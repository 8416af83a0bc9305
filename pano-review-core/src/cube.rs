//! Mapping from per-face normalized bounding boxes to 3D quadrilaterals on
//! the interior of the viewer's cube.
//!
//! Each face is described by one declarative [`FaceBasis`] entry and every
//! face goes through the same generic transform, so the renderer and the
//! conversion side can never disagree on where a box sits. The mapper is
//! total: bbox components are clamped, unknown face names fall back to
//! `front`, and degenerate boxes yield zero-area quads instead of errors.

use glam::Vec3;

use crate::model::{BboxXywh, Face};

/// Half-extent of the viewer cube in world units.
pub const DEFAULT_HALF_EXTENT: f32 = 500.0;

/// Quads sit this fraction of the half-extent inside the face plane so they
/// never z-fight the face texture.
pub const FACE_INSET_RATIO: f32 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// How one cube face embeds its image plane in world space.
///
/// `horiz` carries the cx-driven image axis and `vert` the cy-driven one
/// (already flipped so +v is world-up on the side faces). The sign columns
/// encode the texture-authoring mirror: viewed from inside the cube the
/// horizontal orientation alternates between opposing faces, so `back` and
/// `right` mirror cx relative to `front`/`left`, and `bottom` mirrors the
/// cy-driven axis relative to `top`.
#[derive(Debug, Clone, Copy)]
struct FaceBasis {
    fixed_axis: Axis,
    fixed_sign: f32,
    horiz_axis: Axis,
    horiz_sign: f32,
    vert_axis: Axis,
    vert_sign: f32,
}

const fn basis_for(face: Face) -> FaceBasis {
    match face {
        Face::Front => FaceBasis {
            fixed_axis: Axis::Z,
            fixed_sign: 1.0,
            horiz_axis: Axis::X,
            horiz_sign: 1.0,
            vert_axis: Axis::Y,
            vert_sign: 1.0,
        },
        Face::Back => FaceBasis {
            fixed_axis: Axis::Z,
            fixed_sign: -1.0,
            horiz_axis: Axis::X,
            horiz_sign: -1.0,
            vert_axis: Axis::Y,
            vert_sign: 1.0,
        },
        Face::Left => FaceBasis {
            fixed_axis: Axis::X,
            fixed_sign: -1.0,
            horiz_axis: Axis::Z,
            horiz_sign: 1.0,
            vert_axis: Axis::Y,
            vert_sign: 1.0,
        },
        Face::Right => FaceBasis {
            fixed_axis: Axis::X,
            fixed_sign: 1.0,
            horiz_axis: Axis::Z,
            horiz_sign: -1.0,
            vert_axis: Axis::Y,
            vert_sign: 1.0,
        },
        Face::Top => FaceBasis {
            fixed_axis: Axis::Y,
            fixed_sign: 1.0,
            horiz_axis: Axis::X,
            horiz_sign: 1.0,
            vert_axis: Axis::Z,
            vert_sign: 1.0,
        },
        Face::Bottom => FaceBasis {
            fixed_axis: Axis::Y,
            fixed_sign: -1.0,
            horiz_axis: Axis::X,
            horiz_sign: 1.0,
            vert_axis: Axis::Z,
            vert_sign: -1.0,
        },
    }
}

/// Outward unit normal of a face.
pub fn face_normal(face: Face) -> Vec3 {
    let b = basis_for(face);
    b.fixed_axis.unit() * b.fixed_sign
}

/// Map a normalized bbox on `face` to four corners of a quadrilateral lying
/// just inside that face's plane of a cube with the given half-extent.
///
/// Corners come back in a fixed cycle that is clockwise as seen from inside
/// the cube, for every face.
pub fn face_quad(face: Face, bbox: BboxXywh, half_extent: f32) -> [Vec3; 4] {
    let b = bbox.clamped();
    let basis = basis_for(face);

    // Image center in in-plane units: cx maps left-to-right, cy is inverted
    // because image rows grow downward while world Y grows upward.
    let u = (b.cx() - 0.5) * 2.0 * half_extent;
    let v = (0.5 - b.cy()) * 2.0 * half_extent;
    let half_w = b.w() * half_extent;
    let half_h = b.h() * half_extent;

    let normal = basis.fixed_axis.unit() * basis.fixed_sign;
    let hv = basis.horiz_axis.unit() * basis.horiz_sign;
    let vv = basis.vert_axis.unit() * basis.vert_sign;

    let plane = half_extent * (1.0 - FACE_INSET_RATIO);
    let center = normal * plane + hv * u + vv * v;

    // Corner cycle in (h, v) offsets; reversed when the basis is left-handed
    // with respect to the outward normal so the winding stays clockwise from
    // the inside on every face.
    let cycle: [(f32, f32); 4] = if hv.cross(vv).dot(normal) >= 0.0 {
        [(-1.0, 1.0), (1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)]
    } else {
        [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
    };

    cycle.map(|(dh, dv)| center + hv * (dh * half_w) + vv * (dv * half_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const L: f32 = DEFAULT_HALF_EXTENT;

    fn axis_index(axis: Axis) -> usize {
        match axis {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[test]
    fn quads_lie_just_inside_their_face_plane() {
        let bbox = BboxXywh::new(0.3, 0.7, 0.2, 0.1);
        for face in Face::ALL {
            let basis = basis_for(face);
            let quad = face_quad(face, bbox, L);
            let idx = axis_index(basis.fixed_axis);
            for p in quad {
                assert_relative_eq!(
                    p[idx],
                    basis.fixed_sign * (L - L * FACE_INSET_RATIO),
                    epsilon = 1e-3
                );
            }
        }
    }

    #[test]
    fn in_plane_extents_match_bbox_dimensions() {
        let cases = [
            BboxXywh::new(0.5, 0.5, 0.2, 0.2),
            BboxXywh::new(0.1, 0.9, 0.6, 0.05),
            BboxXywh::new(0.0, 0.0, 1.0, 1.0),
        ];
        for face in Face::ALL {
            for bbox in cases {
                let quad = face_quad(face, bbox, L);
                let edge_h = (quad[1] - quad[0]).length();
                let edge_v = (quad[3] - quad[0]).length();
                assert_relative_eq!(edge_h, bbox.w() * 2.0 * L, epsilon = 1e-2);
                assert_relative_eq!(edge_v, bbox.h() * 2.0 * L, epsilon = 1e-2);
            }
        }
    }

    #[test]
    fn degenerate_boxes_yield_zero_area_quads() {
        for face in Face::ALL {
            for bbox in [
                BboxXywh::new(0.5, 0.5, 0.0, 0.2),
                BboxXywh::new(0.5, 0.5, 0.2, 0.0),
                BboxXywh::new(0.5, 0.5, 0.0, 0.0),
            ] {
                let quad = face_quad(face, bbox, L);
                let area = (quad[1] - quad[0]).cross(quad[3] - quad[0]).length();
                assert_relative_eq!(area, 0.0, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn winding_is_clockwise_from_inside_on_every_face() {
        let bbox = BboxXywh::new(0.4, 0.4, 0.3, 0.2);
        for face in Face::ALL {
            let quad = face_quad(face, bbox, L);
            // Corner cross product points along the outward normal exactly
            // when the cycle appears clockwise to a viewer at the origin.
            let n = (quad[1] - quad[0]).cross(quad[3] - quad[0]);
            assert!(
                n.dot(face_normal(face)) > 0.0,
                "face {face} winds the wrong way"
            );
        }
    }

    #[test]
    fn front_quad_matches_hand_derived_corners() {
        // bbox centered at (0.5, 0.5) with w=h=0.2 on a 500 half-extent cube:
        // a 200x200 square centered on the face, 1 unit inside z=+500.
        let quad = face_quad(Face::Front, BboxXywh::new(0.5, 0.5, 0.2, 0.2), L);
        let z = L - L * FACE_INSET_RATIO;
        let expected = [
            Vec3::new(-100.0, 100.0, z),
            Vec3::new(100.0, 100.0, z),
            Vec3::new(100.0, -100.0, z),
            Vec3::new(-100.0, -100.0, z),
        ];
        for (got, want) in quad.iter().zip(expected.iter()) {
            assert!(got.distance(*want) < 1e-2, "got {got}, want {want}");
        }
    }

    #[test]
    fn back_and_right_mirror_the_horizontal_axis() {
        // An off-center box at cx=0.75 lands at +X on the front face but at
        // -X on the back face; likewise +Z flips to -Z between left and right.
        let bbox = BboxXywh::new(0.75, 0.5, 0.1, 0.1);

        let front = face_quad(Face::Front, bbox, L);
        let back = face_quad(Face::Back, bbox, L);
        let front_cx: f32 = front.iter().map(|p| p.x).sum::<f32>() / 4.0;
        let back_cx: f32 = back.iter().map(|p| p.x).sum::<f32>() / 4.0;
        assert_relative_eq!(front_cx, 250.0, epsilon = 1e-2);
        assert_relative_eq!(back_cx, -250.0, epsilon = 1e-2);

        let left = face_quad(Face::Left, bbox, L);
        let right = face_quad(Face::Right, bbox, L);
        let left_cz: f32 = left.iter().map(|p| p.z).sum::<f32>() / 4.0;
        let right_cz: f32 = right.iter().map(|p| p.z).sum::<f32>() / 4.0;
        assert_relative_eq!(left_cz, 250.0, epsilon = 1e-2);
        assert_relative_eq!(right_cz, -250.0, epsilon = 1e-2);
    }

    #[test]
    fn bottom_mirrors_the_vertical_axis_against_top() {
        // cy=0.25 is the upper half of the image: +Z on top, -Z on bottom.
        let bbox = BboxXywh::new(0.5, 0.25, 0.1, 0.1);
        let top = face_quad(Face::Top, bbox, L);
        let bottom = face_quad(Face::Bottom, bbox, L);
        let top_cz: f32 = top.iter().map(|p| p.z).sum::<f32>() / 4.0;
        let bottom_cz: f32 = bottom.iter().map(|p| p.z).sum::<f32>() / 4.0;
        assert_relative_eq!(top_cz, 250.0, epsilon = 1e-2);
        assert_relative_eq!(bottom_cz, -250.0, epsilon = 1e-2);
    }

    #[test]
    fn out_of_range_bbox_components_are_clamped_before_mapping() {
        // Detector mocks emit pixel-space boxes well outside [0,1]; they must
        // map like a fully clamped box, not explode off the cube.
        let wild = face_quad(Face::Front, BboxXywh::new(120.0, -3.0, 60.0, 2.0), L);
        let clamped = face_quad(Face::Front, BboxXywh::new(1.0, 0.0, 1.0, 1.0), L);
        for (a, b) in wild.iter().zip(clamped.iter()) {
            assert!(a.distance(*b) < 1e-3);
        }
    }

    #[test]
    fn unknown_faces_map_exactly_like_front() {
        let bbox = BboxXywh::new(0.3, 0.6, 0.25, 0.15);
        let front = face_quad(Face::Front, bbox, L);
        for name in ["up", "down", "skyward", ""] {
            let quad = face_quad(Face::parse(name), bbox, L);
            assert_eq!(quad, front);
        }
    }
}
