// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tetrahedral mesh grown by a grammar
//!
//! The mesh stores deduplicated vertices, an arena of labeled faces and a FIFO
//! production queue. Each call to [`TetraMesh::apply_rule`] takes the face at the
//! head of the queue and applies the rule its label maps to. Queue order decides
//! growth order, so a given grammar always yields the same geometry.

use std::collections::VecDeque;

use ahash::AHashMap;
use nalgebra::Point3;

use super::face::{Face, FaceId};
use super::growth::{BlockReason, GrowOutcome};
use crate::error::{MeshError, MeshResult};
use crate::grammar::{Grammar, Label, Production};

/// Result of one rule application
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleOutcome {
    Relabeled { face: FaceId, from: Label, to: Label },
    Grown { face: FaceId, apex: usize, faces: [FaceId; 3] },
    Blocked { face: FaceId, reason: BlockReason },
    Divided { face: FaceId, faces: [FaceId; 4] },
    /// Nothing left in the production queue
    Exhausted,
}

/// Tally of outcomes over several rule applications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthStats {
    pub relabels: usize,
    pub grows: usize,
    pub blocked: usize,
    pub divides: usize,
    pub exhausted: usize,
}

impl GrowthStats {
    pub fn record(&mut self, outcome: &RuleOutcome) {
        match outcome {
            RuleOutcome::Relabeled { .. } => self.relabels += 1,
            RuleOutcome::Grown { .. } => self.grows += 1,
            RuleOutcome::Blocked { .. } => self.blocked += 1,
            RuleOutcome::Divided { .. } => self.divides += 1,
            RuleOutcome::Exhausted => self.exhausted += 1,
        }
    }

    /// Rule applications that consumed a queued face
    pub fn applied(&self) -> usize {
        self.relabels + self.grows + self.blocked + self.divides
    }
}

/// Mesh of labeled triangular faces grown from a regular tetrahedron
#[derive(Debug, Clone)]
pub struct TetraMesh<'g> {
    pub(super) vertices: Vec<Point3<f64>>,
    vertex_index: AHashMap<[u64; 3], usize>,
    pub(super) faces: Vec<Face>,
    pub(super) live_faces: usize,
    pub(super) queue: VecDeque<FaceId>,
    grammar: &'g Grammar,
    pub(super) check_collision: bool,
}

impl<'g> TetraMesh<'g> {
    /// Seed a regular tetrahedron whose faces carry the first four alphabet labels
    pub fn new(grammar: &'g Grammar, check_collision: bool) -> MeshResult<Self> {
        let alphabet = grammar.alphabet();
        if alphabet.len() < 4 {
            return Err(MeshError::SeedAlphabet(alphabet.len()));
        }

        let mut mesh = Self {
            vertices: Vec::new(),
            vertex_index: AHashMap::new(),
            faces: Vec::new(),
            live_faces: 0,
            queue: VecDeque::new(),
            grammar,
            check_collision,
        };

        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = mesh.add_vertex(Point3::new(0.5, 0.0, 3.0_f64.sqrt() / 2.0));
        let v3 = mesh.add_vertex(Point3::new(
            0.5,
            (2.0_f64 / 3.0).sqrt(),
            (1.0_f64 / 12.0).sqrt(),
        ));

        mesh.push_face(alphabet[0], [v0, v1, v2]);
        mesh.push_face(alphabet[1], [v0, v2, v3]);
        mesh.push_face(alphabet[2], [v1, v3, v2]);
        mesh.push_face(alphabet[3], [v0, v3, v1]);

        Ok(mesh)
    }

    /// Add a vertex, returning the index of an identical existing vertex if present
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        // `+ 0.0` folds -0.0 into 0.0 so both map to the same key
        let key = [position.x, position.y, position.z].map(|c| (c + 0.0).to_bits());
        if let Some(&index) = self.vertex_index.get(&key) {
            return index;
        }

        let index = self.vertices.len();
        self.vertices.push(position);
        self.vertex_index.insert(key, index);
        index
    }

    /// Add a face over existing vertices and enqueue it
    pub fn add_face(&mut self, label: Label, vertices: [usize; 3]) -> MeshResult<FaceId> {
        let len = self.vertices.len();
        if let Some(&index) = vertices.iter().find(|&&i| i >= len) {
            return Err(MeshError::VertexOutOfRange { index, len });
        }
        Ok(self.push_face(label, vertices))
    }

    pub(super) fn push_face(&mut self, label: Label, vertices: [usize; 3]) -> FaceId {
        let id = FaceId(self.faces.len());
        self.faces.push(Face::new(label, vertices));
        self.live_faces += 1;
        self.queue.push_back(id);
        id
    }

    /// Face slot by handle, including removed faces
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0)
    }

    /// Face by handle, rejecting out-of-range and removed faces
    pub(super) fn live_face(&self, id: FaceId) -> MeshResult<&Face> {
        let face = self.faces.get(id.0).ok_or(MeshError::FaceOutOfRange {
            index: id.0,
            len: self.faces.len(),
        })?;
        if face.removed {
            return Err(MeshError::RemovedFace(id.0));
        }
        Ok(face)
    }

    /// Live faces with their handles, in creation order
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| !face.removed)
            .map(|(i, face)| (FaceId(i), face))
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live faces
    pub fn face_count(&self) -> usize {
        self.live_faces
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Labels of the queued faces, head first, read at their current value
    pub fn queued_labels(&self) -> Vec<Label> {
        self.queue.iter().map(|id| self.faces[id.0].label).collect()
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn checks_collision(&self) -> bool {
        self.check_collision
    }

    /// Corner positions of every live face, in stored vertex order
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        let vertices = &self.vertices;
        self.faces().map(move |(_, face)| face.positions(vertices))
    }

    /// Edge lengths of every live face
    pub fn edge_lengths(&self) -> Vec<[f64; 3]> {
        self.faces()
            .map(|(_, face)| face.edge_lengths(&self.vertices))
            .collect()
    }

    /// Apply the rule for the face at the head of the queue.
    ///
    /// Handles of faces removed by a direct [`TetraMesh::divide_face`] call are
    /// skipped. A missing rule means the grammar is not total and is an error.
    pub fn apply_rule(&mut self) -> MeshResult<RuleOutcome> {
        let (id, label) = loop {
            let Some(id) = self.queue.pop_front() else {
                return Ok(RuleOutcome::Exhausted);
            };
            let face = &self.faces[id.0];
            if face.removed {
                tracing::trace!(face = %id, "skipping removed face");
                continue;
            }
            break (id, face.label);
        };

        let production = *self.grammar.rule(label).ok_or(MeshError::MissingRule(label))?;
        tracing::trace!(face = %id, %label, rule = %production, "applying rule");

        let outcome = match production {
            Production::Relabel(to) => {
                self.relabel_face(id, to)?;
                RuleOutcome::Relabeled { face: id, from: label, to }
            }
            Production::Grow(labels) => match self.grow_face(id, labels)? {
                GrowOutcome::Grown { apex, faces } => RuleOutcome::Grown { face: id, apex, faces },
                GrowOutcome::Blocked(reason) => RuleOutcome::Blocked { face: id, reason },
            },
            Production::Divide(labels) => {
                let faces = self.divide_face(id, labels)?;
                RuleOutcome::Divided { face: id, faces }
            }
        };

        Ok(outcome)
    }

    /// Apply `iterations` rules, stopping early once the queue is empty
    pub fn apply_rules(&mut self, iterations: usize) -> MeshResult<GrowthStats> {
        let mut stats = GrowthStats::default();
        for _ in 0..iterations {
            let outcome = self.apply_rule()?;
            stats.record(&outcome);
            if outcome == RuleOutcome::Exhausted {
                break;
            }
        }

        tracing::debug!(
            faces = self.face_count(),
            vertices = self.vertex_count(),
            grows = stats.grows,
            blocked = stats.blocked,
            divides = stats.divides,
            relabels = stats.relabels,
            "applied rules"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangles_intersect;
    use crate::grammar::Operation;

    #[test]
    fn test_seed_tetrahedron() {
        let grammar = Grammar::example();
        let mesh = TetraMesh::new(&grammar, true).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.queued_labels(), vec!['A', 'B', 'C', 'D']);

        // every face normal points away from the opposite vertex
        let centroid = Point3::from(
            mesh.vertices().iter().fold(nalgebra::Vector3::zeros(), |acc, v| acc + v.coords) / 4.0,
        );
        for (_, face) in mesh.faces() {
            let normal = face.unit_normal(mesh.vertices()).unwrap();
            assert!(normal.dot(&(face.centroid(mesh.vertices()) - centroid)) > 0.0);
        }
    }

    #[test]
    fn test_seed_faces_do_not_collide() {
        let grammar = Grammar::example();
        let mesh = TetraMesh::new(&grammar, true).unwrap();
        let triangles: Vec<_> = mesh.triangles().collect();

        for i in 0..triangles.len() {
            for j in (i + 1)..triangles.len() {
                assert!(!triangles_intersect(&triangles[i], &triangles[j]));
            }
        }
    }

    #[test]
    fn test_seed_needs_four_labels() {
        let grammar = Grammar::new(vec!['A', 'B', 'C'], Operation::ALL.to_vec());
        assert_eq!(
            TetraMesh::new(&grammar, false).unwrap_err(),
            MeshError::SeedAlphabet(3)
        );
    }

    #[test]
    fn test_vertex_dedup() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();

        let first = mesh.add_vertex(Point3::new(2.0, 3.0, 4.0));
        let count = mesh.vertex_count();
        let second = mesh.add_vertex(Point3::new(2.0, 3.0, 4.0));

        assert_eq!(first, second);
        assert_eq!(mesh.vertex_count(), count);
        assert_eq!(mesh.add_vertex(Point3::new(-0.0, 0.0, 0.0)), 0);
        assert_ne!(mesh.add_vertex(Point3::new(2.0, 3.0, 4.000001)), first);
    }

    #[test]
    fn test_add_face_checks_vertex_range() {
        let grammar = Grammar::example();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();

        assert_eq!(
            mesh.add_face('A', [0, 1, 9]),
            Err(MeshError::VertexOutOfRange { index: 9, len: 4 })
        );
        let id = mesh.add_face('E', [0, 1, 3]).unwrap();
        assert_eq!(id, FaceId(4));
        assert_eq!(mesh.queued_labels().last(), Some(&'E'));
    }

    #[test]
    fn test_missing_rule_is_an_error() {
        let mut grammar = Grammar::with_default_alphabet();
        grammar.add_rule('A', Production::Relabel('B')).unwrap();
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();

        assert!(matches!(
            mesh.apply_rule().unwrap(),
            RuleOutcome::Relabeled { from: 'A', to: 'B', .. }
        ));
        assert_eq!(mesh.apply_rule(), Err(MeshError::MissingRule('B')));
    }

    #[test]
    fn test_first_rule_of_partial_grammar() {
        let mut grammar = Grammar::with_default_alphabet();
        grammar.add_rule_parts('A', "grow", &['D', 'B', 'F']).unwrap();
        grammar.add_rule_parts('B', "grow", &['A', 'D', 'F']).unwrap();
        grammar.add_rule_parts('D', "relabel", &['D']).unwrap();
        let mut mesh = TetraMesh::new(&grammar, true).unwrap();

        let outcome = mesh.apply_rule().unwrap();

        assert!(matches!(outcome, RuleOutcome::Grown { face: FaceId(0), apex: 4, .. }));
        assert_eq!(mesh.face_count(), 7);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.queued_labels(), vec!['B', 'C', 'D', 'D', 'B', 'F']);
        assert!(!mesh.queued_labels().contains(&'A'));
    }

    #[test]
    fn test_example_grammar_growth_is_deterministic() {
        let grammar = Grammar::example();
        let mut a = TetraMesh::new(&grammar, true).unwrap();
        let mut b = TetraMesh::new(&grammar, true).unwrap();

        let stats = a.apply_rules(40).unwrap();
        b.apply_rules(40).unwrap();

        assert_eq!(stats.applied(), 40);
        assert_eq!(a.vertices(), b.vertices());
        assert_eq!(a.face_count(), b.face_count());
        assert_eq!(
            a.face_count(),
            4 + 3 * (stats.grows + stats.divides)
        );
    }

    #[test]
    fn test_empty_queue_is_exhausted() {
        let mut grammar = Grammar::with_default_alphabet();
        for label in ['A', 'B', 'C', 'D'] {
            grammar.add_rule(label, Production::Grow(['A', 'B', 'C'])).unwrap();
        }
        let mut mesh = TetraMesh::new(&grammar, false).unwrap();
        mesh.queue.clear();

        assert_eq!(mesh.apply_rule().unwrap(), RuleOutcome::Exhausted);
        let stats = mesh.apply_rules(10).unwrap();
        assert_eq!(stats.exhausted, 1);
        assert_eq!(stats.applied(), 0);
    }
}
