// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh export and grammar persistence

mod export;
pub mod records;

pub use export::{
    export, export_obj, export_stl, read_stl_triangles, write_obj, write_stl, ExportFormat,
};
pub use records::{append_generation, read_grammar_rows, write_population, GrammarRow};
