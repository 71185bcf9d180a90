use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use fuzzyserve::model::ModelKind;
use fuzzyserve::tooling::{fetch_schema, offline_schema, render_all, write_schema};

#[derive(Parser)]
#[command(
    name = "fuzzyserve-tools",
    about = "Auxiliary tasks: diagram rendering and OpenAPI export"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every `.d2` file in the input directory to PNG.
    Diagrams {
        #[arg(long, default_value = "diagrams")]
        input: PathBuf,
        #[arg(long, default_value = "docs/.attachments")]
        output: PathBuf,
        #[arg(long, default_value = "d2")]
        d2_bin: PathBuf,
    },
    /// Save the OpenAPI schema of a running server, or the built-in one with `--offline`.
    Openapi {
        #[arg(long, default_value = "http://127.0.0.1:8000/openapi.json")]
        url: String,
        #[arg(long, default_value = "openapi.json")]
        output: PathBuf,
        #[arg(long)]
        offline: bool,
        #[arg(long, value_enum, default_value_t = Variant::Wash)]
        variant: Variant,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    Wash,
    Lesson,
}

impl From<Variant> for ModelKind {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Wash => ModelKind::WashTime,
            Variant::Lesson => ModelKind::LessonDifficulty,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Diagrams {
            input,
            output,
            d2_bin,
        } => {
            let dir = input.display();
            let report = render_all(&input, &output, &d2_bin)
                .with_context(|| format!("failed to render diagrams from {dir}"))?;
            for path in &report.rendered {
                println!("Diagram generated successfully: {}", path.display());
            }
            for (path, reason) in &report.failed {
                eprintln!("Error generating diagram {}: {reason}", path.display());
            }
            if !report.is_success() {
                let total = report.failed.len() + report.rendered.len();
                bail!("{} of {total} diagrams failed", report.failed.len());
            }
            Ok(())
        }
        Command::Openapi {
            url,
            output,
            offline,
            variant,
        } => {
            let schema = if offline {
                offline_schema(variant.into())?
            } else {
                fetch_schema(&url)
                    .await
                    .with_context(|| format!("failed to fetch schema from {url}"))?
            };
            write_schema(&output, &schema)?;
            println!("OpenAPI schema written to {}", output.display());
            Ok(())
        }
    }
}
