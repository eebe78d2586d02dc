// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle surface export (binary STL, Wavefront OBJ)
//!
//! Every live face yields exactly one triangle in its stored vertex order, so
//! outward normals survive the round trip.

use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::mesh::TetraMesh;

/// Supported surface formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Stl,
    Obj,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Stl => "stl",
            ExportFormat::Obj => "obj",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(ExportFormat::Stl),
            "obj" => Ok(ExportFormat::Obj),
            other => anyhow::bail!("unknown export format '{}' (expected stl or obj)", other),
        }
    }
}

/// Write `mesh` to `path` in `format`
pub fn export(mesh: &TetraMesh<'_>, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Stl => export_stl(mesh, path),
        ExportFormat::Obj => export_obj(mesh, path),
    }
}

/// Write a binary STL file
pub fn export_stl(mesh: &TetraMesh<'_>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer)?;
    writer.flush().context("Failed to flush STL file")?;
    Ok(())
}

/// Write binary STL to any writer
pub fn write_stl<W: Write>(mesh: &TetraMesh<'_>, writer: &mut W) -> Result<()> {
    use stl_io::{Normal, Triangle};

    let vertices = mesh.vertices();
    let triangles: Vec<Triangle> = mesh
        .faces()
        .map(|(_, face)| {
            // zero-area faces get a zero normal
            let normal = face.unit_normal(vertices).unwrap_or_else(Vector3::zeros);
            let [v0, v1, v2] = face.positions(vertices);

            Triangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [stl_vertex(&v0), stl_vertex(&v1), stl_vertex(&v2)],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter()).context("Failed to write STL data")?;
    Ok(())
}

fn stl_vertex(p: &Point3<f64>) -> stl_io::Vertex {
    stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])
}

/// Write a Wavefront OBJ file
pub fn export_obj(mesh: &TetraMesh<'_>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create OBJ file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer).with_context(|| format!("Failed to write OBJ file: {:?}", path))?;
    writer.flush().context("Failed to flush OBJ file")?;
    Ok(())
}

/// Write OBJ text to any writer; face labels are kept as groups
pub fn write_obj<W: Write>(mesh: &TetraMesh<'_>, writer: &mut W) -> Result<()> {
    writeln!(writer, "# tetragen {}", crate::VERSION)?;
    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for (id, face) in mesh.faces() {
        let [a, b, c] = face.vertices();
        writeln!(writer, "g {}_{}", face.label(), id.index())?;
        // OBJ indices are 1-based
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

/// Read the triangles of an STL file back as `f64` points
pub fn read_stl_triangles(path: impl AsRef<Path>) -> Result<Vec<[Point3<f64>; 3]>> {
    let path = path.as_ref();
    let mut file = File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    let stl = stl_io::read_stl(&mut file).context("Failed to read STL file")?;

    let point = |i: usize| {
        let v = &stl.vertices[i];
        Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)
    };
    Ok(stl
        .faces
        .iter()
        .map(|face| face.vertices.map(&point))
        .collect())
}
