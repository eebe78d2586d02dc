// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use colored::*;
use std::time::Duration;

use crate::evolution::{GenerationStats, RunSummary};
use crate::mesh::{GrowthStats, TetraMesh};

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// One line per evaluated generation
    pub fn report_generation(stats: &GenerationStats) {
        println!(
            "  {} {:>4} | {} {} | {} {} | {} {}",
            "gen".bright_black(),
            stats.generation,
            "best".bright_black(),
            format!("{:.5}", stats.best).green(),
            "mean".bright_black(),
            format!("{:.5}", stats.mean).cyan(),
            "worst".bright_black(),
            format!("{:.5}", stats.worst).yellow()
        );
    }

    /// Final result of an evolution run
    pub fn report_summary(summary: &RunSummary, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Seed:".bold(), summary.seed.to_string().cyan());
        if let Some(dir) = &summary.run_dir {
            println!("{} {}", "Output:".bold(), dir.display().to_string().cyan());
        }
        println!("{}", "━".repeat(80).bright_black());

        if let Some(fitness) = summary.best.fitness {
            println!("{} {}", "Best fitness:".bold(), format!("{:.6}", fitness).green().bold());
        }
        println!("\n{}", "Best grammar:".bold());
        for (lhs, production) in summary.best.grammar.rules() {
            println!("  {} {} {}", lhs.to_string().cyan(), "->".bright_black(), production);
        }

        println!(
            "\n  {} {} | {} {}",
            "Generations:".bright_black(),
            summary.history.len().to_string().cyan(),
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a single grown mesh
    pub fn report_mesh(mesh: &TetraMesh<'_>, stats: &GrowthStats, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{}", "Grown mesh".bold());
        println!("{}", "━".repeat(80).bright_black());
        println!("  {} {}", "Vertices:".bright_black(), mesh.vertex_count().to_string().cyan());
        println!("  {} {}", "Faces:".bright_black(), mesh.face_count().to_string().cyan());
        println!(
            "  {} {}",
            "Hull volume:".bright_black(),
            format!("{:.6}", mesh.convex_hull_volume()).cyan()
        );
        let bounds = mesh.bounding_box();
        let (size, center) = (bounds.size(), bounds.center());
        println!(
            "  {} {:.3} x {:.3} x {:.3} around ({:.3}, {:.3}, {:.3})",
            "Bounds:".bright_black(),
            size.x,
            size.y,
            size.z,
            center.x,
            center.y,
            center.z
        );
        println!(
            "  {} {} grown, {} blocked, {} divided, {} relabeled",
            "Rules:".bright_black(),
            stats.grows.to_string().green(),
            stats.blocked.to_string().red(),
            stats.divides.to_string().cyan(),
            stats.relabels
        );
        if stats.exhausted > 0 {
            println!("  {}", "Production queue ran dry".yellow());
        }
        println!("  {} {}", "Time:".bright_black(), Self::format_duration(duration).yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
