//! Render `.d2` sources to PNG with an external `d2` executable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// One source file and the image it renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramJob {
    /// `.d2` source.
    pub source: PathBuf,
    /// PNG destination.
    pub target: PathBuf,
}

/// Outcome of a rendering pass.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Images written successfully.
    pub rendered: Vec<PathBuf>,
    /// Sources that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl RenderReport {
    /// Whether every job succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the `.d2` files directly inside `input`, sorted by name, paired with their PNG targets
/// in `output`.
pub fn plan_jobs(input: &Path, output: &Path) -> io::Result<Vec<DiagramJob>> {
    let mut jobs = Vec::new();
    let walker = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "d2") {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let mut target = output.join(stem);
        target.set_extension("png");
        jobs.push(DiagramJob {
            source: path.to_path_buf(),
            target,
        });
    }
    Ok(jobs)
}

/// Render every diagram in `input` into `output` using `d2_bin`.
///
/// A failing file is recorded in the report and the remaining files are still rendered. Only a
/// missing input directory or an uncreatable output directory aborts the pass.
pub fn render_all(input: &Path, output: &Path, d2_bin: &Path) -> io::Result<RenderReport> {
    fs::create_dir_all(output)?;
    let mut report = RenderReport::default();
    for job in plan_jobs(input, output)? {
        match render(&job, d2_bin) {
            Ok(()) => {
                tracing::info!(target = %job.target.display(), "Diagram generated");
                report.rendered.push(job.target);
            }
            Err(reason) => {
                tracing::error!(
                    source = %job.source.display(),
                    %reason,
                    "Diagram generation failed"
                );
                report.failed.push((job.source, reason));
            }
        }
    }
    Ok(report)
}

fn render(job: &DiagramJob, d2_bin: &Path) -> Result<(), String> {
    let output = Command::new(d2_bin)
        .arg(&job.source)
        .arg(&job.target)
        .output()
        .map_err(|err| format!("failed to run {}: {err}", d2_bin.display()))?;
    if output.status.success() {
        Ok(())
    } else {
        let bin = d2_bin.display();
        let status = output.status;
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("{bin} exited with {status}: {}", stderr.trim()))
    }
}
