// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structural operations: relabel, grow and divide
//!
//! Growth places a regular-tetrahedron apex over a face. With collision checking
//! on, the candidate tetrahedron is tested against every live face with the open
//! intersection kernel, and against every existing vertex for containment.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::face::FaceId;
use super::tetra_mesh::TetraMesh;
use crate::error::MeshResult;
use crate::geometry::{intersects, BoundingBox, Plane};
use crate::grammar::Label;

/// Vertices deeper than this inside a candidate tetrahedron block its growth
pub const SEPARATION_TOLERANCE: f64 = 1e-10;

/// Why a growth was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The candidate tetrahedron would overlap existing geometry
    Collision,
    /// The face has no area, so it has no normal to grow along
    DegenerateFace,
}

/// Result of [`TetraMesh::grow_face`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowOutcome {
    Grown { apex: usize, faces: [FaceId; 3] },
    Blocked(BlockReason),
}

impl GrowOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GrowOutcome::Blocked(_))
    }
}

/// Candidate tetrahedron: three side faces plus the reversed base
struct Candidate {
    triangles: [[Point3<f64>; 3]; 4],
    planes: [Plane; 4],
    bbox: BoundingBox,
}

impl Candidate {
    fn new(base: [Point3<f64>; 3], apex: Point3<f64>) -> Option<Self> {
        let [v0, v1, v2] = base;
        let triangles = [[v0, v1, apex], [v1, v2, apex], [v0, apex, v2], [v0, v2, v1]];

        let planes = [
            Plane::from_triangle(&triangles[0])?,
            Plane::from_triangle(&triangles[1])?,
            Plane::from_triangle(&triangles[2])?,
            Plane::from_triangle(&triangles[3])?,
        ];

        Some(Self {
            triangles,
            planes,
            bbox: BoundingBox::from_points(&[v0, v1, v2, apex]),
        })
    }

    /// Largest signed distance to the candidate's face planes; negative inside
    fn separation(&self, point: &Point3<f64>) -> f64 {
        self.planes
            .iter()
            .map(|plane| plane.signed_distance(point))
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl<'g> TetraMesh<'g> {
    /// Overwrite a face's label and put it back on the queue
    pub fn relabel_face(&mut self, id: FaceId, label: Label) -> MeshResult<()> {
        self.live_face(id)?;
        self.faces[id.0].label = label;
        self.queue.push_back(id);
        Ok(())
    }

    /// Grow a tetrahedron over a face.
    ///
    /// The base face stays in the mesh; three side faces carrying `labels` are added
    /// and enqueued. A blocked growth leaves the mesh untouched.
    pub fn grow_face(&mut self, id: FaceId, labels: [Label; 3]) -> MeshResult<GrowOutcome> {
        let face = self.live_face(id)?;
        let [i0, i1, i2] = face.vertices;
        let base = face.positions(&self.vertices);

        let Some(normal) = face.unit_normal(&self.vertices) else {
            tracing::debug!(face = %id, "cannot grow a degenerate face");
            return Ok(GrowOutcome::Blocked(BlockReason::DegenerateFace));
        };

        let edges = face.edge_lengths(&self.vertices);
        let height = edges.iter().sum::<f64>() / 3.0 * (2.0_f64 / 3.0).sqrt();
        let apex = face.centroid(&self.vertices) + normal * height;

        if self.check_collision {
            let Some(candidate) = Candidate::new(base, apex) else {
                tracing::debug!(face = %id, "candidate tetrahedron is degenerate");
                return Ok(GrowOutcome::Blocked(BlockReason::DegenerateFace));
            };
            if self.collides(id, [i0, i1, i2], &candidate) {
                tracing::debug!(face = %id, "growth blocked by collision");
                return Ok(GrowOutcome::Blocked(BlockReason::Collision));
            }
        }

        let apex = self.add_vertex(apex);
        let faces = [
            self.push_face(labels[0], [i0, i1, apex]),
            self.push_face(labels[1], [i1, i2, apex]),
            self.push_face(labels[2], [i0, apex, i2]),
        ];

        Ok(GrowOutcome::Grown { apex, faces })
    }

    /// Split a face into four at its edge midpoints.
    ///
    /// Labels go to the `v0` corner, the `v1` corner, the centre face and the
    /// `v2` corner, in that order.
    /// The original face is tombstoned; its handle stays valid but is never
    /// processed again.
    pub fn divide_face(&mut self, id: FaceId, labels: [Label; 4]) -> MeshResult<[FaceId; 4]> {
        let face = self.live_face(id)?;
        let [i0, i1, i2] = face.vertices;
        let [v0, v1, v2] = face.positions(&self.vertices);

        let m01 = self.add_vertex(nalgebra::center(&v0, &v1));
        let m12 = self.add_vertex(nalgebra::center(&v1, &v2));
        let m20 = self.add_vertex(nalgebra::center(&v2, &v0));

        self.faces[id.0].removed = true;
        self.live_faces -= 1;

        Ok([
            self.push_face(labels[0], [i0, m01, m20]),
            self.push_face(labels[1], [m01, i1, m12]),
            self.push_face(labels[2], [m01, m12, m20]),
            self.push_face(labels[3], [m20, m12, i2]),
        ])
    }

    fn collides(&self, base_id: FaceId, base: [usize; 3], candidate: &Candidate) -> bool {
        for (id, face) in self.faces() {
            if id == base_id {
                continue;
            }

            let triangle = face.positions(&self.vertices);
            if !candidate.bbox.overlaps(&BoundingBox::from_points(&triangle)) {
                continue;
            }
            let Some(plane) = Plane::from_triangle(&triangle) else {
                continue;
            };

            let hit = candidate
                .triangles
                .iter()
                .zip(&candidate.planes)
                .any(|(tri, p)| intersects(tri, &p.normal, p.offset, &triangle, &plane.normal, plane.offset));
            if hit {
                return true;
            }
        }

        self.vertices
            .iter()
            .enumerate()
            .filter(|(i, _)| !base.contains(i))
            .any(|(_, vertex)| candidate.separation(vertex) < -SEPARATION_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::grammar::{Grammar, Production};
    use crate::mesh::RuleOutcome;
    use approx::assert_relative_eq;

    #[test]
    fn test_grow_adds_three_faces_and_one_vertex() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();

        let outcome = mesh.grow_face(FaceId(0), ['D', 'B', 'F']).unwrap();
        let GrowOutcome::Grown { apex, faces } = outcome else {
            panic!("growth should succeed on the seed");
        };

        assert_eq!(apex, 4);
        assert_eq!(faces, [FaceId(4), FaceId(5), FaceId(6)]);
        assert_eq!(mesh.face_count(), 7);
        assert_eq!(mesh.vertex_count(), 5);

        // the new tetrahedron is regular for an equilateral base
        for lengths in mesh.edge_lengths() {
            for length in lengths {
                assert_relative_eq!(length, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_grow_apex_sits_on_the_outward_side() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();
        let base = mesh.face(FaceId(2)).unwrap().clone();
        let normal = base.unit_normal(mesh.vertices()).unwrap();
        let centroid = base.centroid(mesh.vertices());

        let GrowOutcome::Grown { apex, .. } = mesh.grow_face(FaceId(2), ['A', 'A', 'A']).unwrap() else {
            panic!("growth should succeed");
        };

        let offset = mesh.vertices()[apex] - centroid;
        assert_relative_eq!(offset.norm(), (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(offset.normalize().dot(&normal), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_divide_replaces_one_face_with_four() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();

        let faces = mesh.divide_face(FaceId(0), ['D', 'D', 'D', 'G']).unwrap();

        assert_eq!(faces, [FaceId(4), FaceId(5), FaceId(6), FaceId(7)]);
        assert_eq!(mesh.face_count(), 7);
        assert_eq!(mesh.vertex_count(), 7);
        assert!(mesh.face(FaceId(0)).unwrap().is_removed());
        assert_eq!(mesh.faces().count(), 7);

        // corner faces keep the parent's orientation
        let parent_normal = mesh.face(FaceId(0)).unwrap().unit_normal(mesh.vertices()).unwrap();
        for id in faces {
            let normal = mesh.face(id).unwrap().unit_normal(mesh.vertices()).unwrap();
            assert_relative_eq!(normal, parent_normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_divide_labels_centre_before_last_corner() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();
        let [v0, v1, v2] = mesh.face(FaceId(0)).unwrap().vertices();

        let [a, b, c, d] = mesh.divide_face(FaceId(0), ['A', 'B', 'C', 'D']).unwrap();
        let child = |id: FaceId| mesh.face(id).unwrap();

        assert_eq!(child(a).label(), 'A');
        assert!(child(a).vertices().contains(&v0));
        assert_eq!(child(b).label(), 'B');
        assert!(child(b).vertices().contains(&v1));

        // the third label lands on the centre face, which holds only midpoints
        assert_eq!(child(c).label(), 'C');
        assert!(child(c).vertices().iter().all(|&i| i >= 4));
        assert_eq!(child(d).label(), 'D');
        assert!(child(d).vertices().contains(&v2));

        assert_eq!(&mesh.queued_labels()[4..], &['A', 'B', 'C', 'D']);
    }

    #[test]
    fn test_divided_neighbours_share_midpoints() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();

        // faces 0 and 1 share the edge v0-v2
        mesh.divide_face(FaceId(0), ['A', 'A', 'A', 'A']).unwrap();
        mesh.divide_face(FaceId(1), ['A', 'A', 'A', 'A']).unwrap();

        assert_eq!(mesh.vertex_count(), 4 + 3 + 2);
    }

    #[test]
    fn test_removed_face_cannot_be_reused() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();
        mesh.divide_face(FaceId(3), ['A', 'B', 'C', 'D']).unwrap();

        assert_eq!(mesh.relabel_face(FaceId(3), 'A'), Err(MeshError::RemovedFace(3)));
        assert_eq!(
            mesh.grow_face(FaceId(3), ['A', 'B', 'C']),
            Err(MeshError::RemovedFace(3))
        );
        assert_eq!(
            mesh.divide_face(FaceId(42), ['A', 'B', 'C', 'D']),
            Err(MeshError::FaceOutOfRange { index: 42, len: 8 })
        );
    }

    #[test]
    fn test_queue_skips_removed_faces() {
        let mut grammar = Grammar::with_default_alphabet();
        for label in ['A', 'B', 'C', 'D'] {
            grammar.add_rule(label, Production::Relabel('A')).unwrap();
        }
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();
        mesh.divide_face(FaceId(0), ['B', 'B', 'B', 'B']).unwrap();

        // the head of the queue was the divided face
        assert!(matches!(
            mesh.apply_rule().unwrap(),
            RuleOutcome::Relabeled { face: FaceId(1), from: 'B', .. }
        ));
    }

    #[test]
    fn test_relabel_requeues_the_face() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();

        mesh.relabel_face(FaceId(0), 'G').unwrap();
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.queued_labels(), vec!['G', 'B', 'C', 'D', 'G']);
    }

    #[test]
    fn test_degenerate_face_is_blocked() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();
        let far = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let id = mesh.add_face('A', [0, 1, far]).unwrap();

        assert_eq!(
            mesh.grow_face(id, ['A', 'B', 'C']).unwrap(),
            GrowOutcome::Blocked(BlockReason::DegenerateFace)
        );
        assert_eq!(mesh.vertex_count(), 5);
    }

    /// Fan of regular tetrahedra around the seed edge v0-v1
    fn grow_fan(mesh: &mut TetraMesh<'_>) {
        let mut face = FaceId(0);
        for _ in 0..4 {
            match mesh.grow_face(face, ['A', 'A', 'A']).unwrap() {
                GrowOutcome::Grown { faces, .. } => face = faces[0],
                GrowOutcome::Blocked(reason) => panic!("fan growth blocked: {:?}", reason),
            }
        }
    }

    #[test]
    fn test_collision_blocks_overlapping_growth() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();
        grow_fan(&mut mesh);

        let faces = mesh.face_count();
        let vertices = mesh.vertex_count();
        let queued = mesh.queue_len();

        // face 3 shares the edge v0-v1 and grows into the last fan tetrahedron
        assert_eq!(
            mesh.grow_face(FaceId(3), ['B', 'B', 'B']).unwrap(),
            GrowOutcome::Blocked(BlockReason::Collision)
        );
        assert_eq!(mesh.face_count(), faces);
        assert_eq!(mesh.vertex_count(), vertices);
        assert_eq!(mesh.queue_len(), queued);
    }

    #[test]
    fn test_growth_without_collision_checks_overlaps() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();
        grow_fan(&mut mesh);

        let faces = mesh.face_count();
        assert!(!mesh.grow_face(FaceId(3), ['B', 'B', 'B']).unwrap().is_blocked());
        assert_eq!(mesh.face_count(), faces + 3);
    }

    #[test]
    fn test_vertex_inside_candidate_blocks_growth() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();

        // a lone vertex just above the centroid of face 0, on its outward side
        let face = mesh.face(FaceId(0)).unwrap().clone();
        let inside = face.centroid(mesh.vertices()) + face.unit_normal(mesh.vertices()).unwrap() * 0.1;
        mesh.add_vertex(inside);

        assert_eq!(
            mesh.grow_face(FaceId(0), ['A', 'A', 'A']).unwrap(),
            GrowOutcome::Blocked(BlockReason::Collision)
        );
    }
}
