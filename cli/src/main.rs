//! docweave CLI - document reconstruction from layout dumps

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docweave::pipeline::TableInput;
use docweave::{render, DocumentBuilder, DocumentInput, JsonFormat, PageSelection, PipelineConfig};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docweave")]
#[command(version)]
#[command(about = "Rebuild structured documents from detected layout regions", long_about = None)]
struct Cli {
    /// Input page dump (JSON)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Pipeline configuration file (JSON, partial overrides allowed)
    #[arg(short, long, global = true, value_name = "FILE", env = "DOCWEAVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write LaTeX, JSON and statistics into a directory
    Convert {
        /// Input page dump
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert a page dump to a LaTeX document
    #[command(alias = "tex")]
    Latex {
        /// Input page dump
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write page and element statistics to this file
        #[arg(long, value_name = "FILE")]
        meta: Option<PathBuf>,

        /// Emit a title block from the document info
        #[arg(long)]
        title_block: bool,

        /// Only page bodies, without preamble
        #[arg(long)]
        body_only: bool,

        /// Write image paths relative to this directory
        #[arg(long, value_name = "DIR")]
        image_base: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert a page dump to the JSON element model
    Json {
        /// Input page dump
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document statistics
    Info {
        /// Input page dump
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Reconstruct table grids from a detection dump (no OCR)
    Grid {
        /// Detection dump: image size plus detected regions
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Some(Commands::Convert { input, output }) => cmd_convert(&input, output.as_deref(), config),
        Some(Commands::Latex {
            input,
            output,
            meta,
            title_block,
            body_only,
            image_base,
            pages,
        }) => cmd_latex(
            &input,
            output.as_deref(),
            config,
            LatexArgs {
                meta,
                title_block,
                body_only,
                image_base,
                pages,
            },
        ),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), config, compact),
        Some(Commands::Info { input }) => cmd_info(&input, config),
        Some(Commands::Grid {
            input,
            output,
            compact,
        }) => cmd_grid(&input, output.as_deref(), config, compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), config)
            } else {
                println!("{}", "Usage: docweave <FILE> [OUTPUT]".yellow());
                println!("       docweave --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Options of the `latex` command beyond input and output.
#[derive(Default)]
struct LatexArgs {
    meta: Option<PathBuf>,
    title_block: bool,
    body_only: bool,
    image_base: Option<PathBuf>,
    pages: Option<String>,
}

fn load_config(path: Option<&Path>) -> CliResult<PipelineConfig> {
    match path {
        Some(p) => {
            log::debug!("loading configuration from {}", p.display());
            Ok(PipelineConfig::load(p)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn build(input: &Path, config: &PipelineConfig) -> CliResult<docweave::Document> {
    let dump = DocumentInput::load(input)?;
    Ok(DocumentBuilder::with_config(config)?.build_document(&dump))
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_convert(input: &Path, output: Option<&Path>, config: Option<&Path>) -> CliResult<()> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Building document...");
    let mut config = load_config(config)?;
    config.render = config.render.with_image_base(&output_dir);
    let doc = build(input, &config)?;
    pb.inc(1);

    pb.set_message("Generating LaTeX...");
    let rendered = render::to_latex_with_stats(&doc, &config.render)?;
    fs::write(output_dir.join("document.tex"), &rendered.content)?;
    pb.inc(1);

    pb.set_message("Generating JSON...");
    let json = render::to_json(&doc, JsonFormat::Pretty)?;
    fs::write(output_dir.join("content.json"), &json)?;
    pb.inc(1);

    pb.set_message("Writing statistics...");
    let meta = meta_json(&doc, &rendered.stats)?;
    fs::write(output_dir.join("meta.json"), &meta)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} document.tex", "├─".dimmed());
    println!("  {} content.json", "├─".dimmed());
    println!("  {} meta.json", "└─".dimmed());

    Ok(())
}

fn cmd_latex(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    args: LatexArgs,
) -> CliResult<()> {
    let page_selection = if let Some(p) = args.pages.as_deref() {
        PageSelection::parse(p)?
    } else {
        PageSelection::All
    };

    let mut config = load_config(config)?;
    if args.body_only {
        config.render = config.render.without_document();
    }
    config.render = config.render.with_pages(page_selection);
    if args.title_block {
        config.render = config.render.with_title_block(true);
    }
    if let Some(dir) = args.image_base {
        config.render = config.render.with_image_base(dir);
    }

    let doc = build(input, &config)?;
    let rendered = render::to_latex_with_stats(&doc, &config.render)?;

    if let Some(path) = args.meta {
        fs::write(&path, meta_json(&doc, &rendered.stats)?)?;
        log::info!("statistics written to {}", path.display());
    }

    write_output(output, &rendered.content)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let config = load_config(config)?;
    let doc = build(input, &config)?;
    let json = render::to_json(&doc, json_format(compact))?;
    write_output(output, &json)
}

fn cmd_info(input: &Path, config: Option<&Path>) -> CliResult<()> {
    let config = load_config(config)?;
    let doc = build(input, &config)?;
    let stats = doc.stats();
    let rendered = render::to_latex_with_stats(&doc, &render::RenderOptions::body_only())?;
    let counts = rendered.stats;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());
    if let Some(ref title) = stats.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = stats.author {
        println!("{}: {}", "Author".bold(), author);
    }
    println!("{}: {}", "Date".bold(), stats.date);

    println!();
    println!("{}", "Input Blocks".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for page in &stats.pages {
        println!(
            "{} {:>3}: {} blocks ({} text, {} markup, {} image)",
            "Page".bold(),
            page.page,
            page.blocks,
            page.text_blocks,
            page.latex_blocks,
            page.image_blocks
        );
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Headings".bold(), counts.heading_count);
    println!("{}: {}", "Paragraphs".bold(), counts.paragraph_count);
    println!("{}: {}", "List items".bold(), counts.list_item_count);
    println!("{}: {}", "Theorems/proofs".bold(), counts.environment_count);
    println!("{}: {}", "Math".bold(), counts.math_count);
    println!("{}: {}", "Tables".bold(), counts.table_count);
    println!("{}: {}", "Images".bold(), counts.image_count);
    println!("{}: {}", "Words".bold(), counts.word_count);

    Ok(())
}

fn cmd_grid(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let config = load_config(config)?;
    let dump: TableInput = serde_json::from_str(&fs::read_to_string(input)?)?;
    let tables = dump.reconstruct(&config.grid_reconstructor());
    log::info!("{} tables reconstructed", tables.len());

    let json = match json_format(compact) {
        JsonFormat::Pretty => serde_json::to_string_pretty(&tables)?,
        JsonFormat::Compact => serde_json::to_string(&tables)?,
    };
    write_output(output, &json)
}

fn meta_json(doc: &docweave::Document, counts: &render::RenderStats) -> CliResult<String> {
    let meta = serde_json::json!({
        "document": doc.stats(),
        "elements": counts,
    });
    Ok(serde_json::to_string_pretty(&meta)?)
}

fn cmd_version() {
    println!("{} {}", "docweave".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document structure reconstruction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DUMP: &str = r#"{
        "info": {"title": "Notes", "author": "A. Author"},
        "pages": [
            {
                "blocks": [
                    {"bbox": {"x0": 0.1, "y0": 0.40, "x1": 0.9, "y1": 0.42}},
                    {"bbox": {"x0": 0.1, "y0": 0.44, "x1": 0.9, "y1": 0.46}},
                    {"bbox": {"x0": 0.2, "y0": 0.50, "x1": 0.8, "y1": 0.55}, "block_type": "math"}
                ],
                "contents": [
                    {"text": "Experimental"},
                    {"text": "Results"},
                    {"latex": "E = mc^2"}
                ]
            },
            {
                "blocks": [{"bbox": {"x0": 0.1, "y0": 0.3, "x1": 0.9, "y1": 0.35}}],
                "contents": [{"text": "Second page text."}]
            }
        ]
    }"#;

    fn write_dump(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("pages.json");
        fs::write(&path, DUMP).unwrap();
        path
    }

    #[test]
    fn test_latex_with_meta() {
        let dir = TempDir::new().unwrap();
        let input = write_dump(&dir);
        let out = dir.path().join("doc.tex");
        let meta = dir.path().join("meta.json");

        let args = LatexArgs {
            meta: Some(meta.clone()),
            title_block: true,
            ..Default::default()
        };
        cmd_latex(&input, Some(&out), None, args).unwrap();

        let latex = fs::read_to_string(&out).unwrap();
        assert!(latex.contains("\\title{Notes}"));
        assert!(latex.contains("Experimental Results"));
        assert!(latex.contains("E = mc^2"));

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&meta).unwrap()).unwrap();
        assert_eq!(meta["document"]["pages"][0]["blocks"], 3);
        assert_eq!(meta["document"]["pages"][0]["latex_blocks"], 1);
        assert_eq!(meta["elements"]["math_count"], 1);
    }

    #[test]
    fn test_latex_body_only_pages() {
        let dir = TempDir::new().unwrap();
        let input = write_dump(&dir);
        let out = dir.path().join("page2.tex");

        let args = LatexArgs {
            body_only: true,
            pages: Some("2".to_string()),
            ..Default::default()
        };
        cmd_latex(&input, Some(&out), None, args).unwrap();

        let latex = fs::read_to_string(&out).unwrap();
        assert!(!latex.contains("\\documentclass"));
        assert!(latex.starts_with("% Page 2"));
        assert!(latex.contains("Second page text."));
    }

    #[test]
    fn test_body_only_keeps_config_render_options() {
        let dir = TempDir::new().unwrap();
        let input = write_dump(&dir);
        let config = dir.path().join("config.json");
        fs::write(&config, r#"{"render": {"page_comments": false}}"#).unwrap();
        let out = dir.path().join("page2.tex");

        let args = LatexArgs {
            body_only: true,
            pages: Some("2".to_string()),
            ..Default::default()
        };
        cmd_latex(&input, Some(&out), Some(&config), args).unwrap();

        let latex = fs::read_to_string(&out).unwrap();
        assert!(!latex.contains("% Page"));
        assert!(!latex.contains("\\newpage"));
        assert!(latex.starts_with("Second page text."));
    }

    #[test]
    fn test_invalid_page_range() {
        let dir = TempDir::new().unwrap();
        let input = write_dump(&dir);
        let args = LatexArgs {
            pages: Some("5-2".to_string()),
            ..Default::default()
        };
        assert!(cmd_latex(&input, None, None, args).is_err());
    }

    #[test]
    fn test_convert_writes_all_outputs() {
        let dir = TempDir::new().unwrap();
        let input = write_dump(&dir);
        let out_dir = dir.path().join("out");

        cmd_convert(&input, Some(&out_dir), None).unwrap();

        assert!(out_dir.join("document.tex").exists());
        assert!(out_dir.join("content.json").exists());
        assert!(out_dir.join("meta.json").exists());
    }

    #[test]
    fn test_config_override() {
        let dir = TempDir::new().unwrap();
        let input = write_dump(&dir);
        let config = dir.path().join("config.json");
        fs::write(&config, r#"{"parallel": false, "render": {"page_comments": false}}"#).unwrap();
        let out = dir.path().join("doc.json");

        cmd_json(&input, Some(&out), Some(&config), true).unwrap();
        let json = fs::read_to_string(&out).unwrap();
        assert!(json.contains(r#""type":"math""#));

        assert!(!load_config(Some(&config)).unwrap().parallel);
    }

    #[test]
    fn test_bad_config_is_error() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, r#"{"grid": {"containment_ratio": 2.0}}"#).unwrap();
        assert!(load_config(Some(&config)).is_err());
    }

    #[test]
    fn test_grid_command() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("detections.json");
        fs::write(
            &input,
            r#"{
                "image": {"width": 400, "height": 200},
                "detections": [
                    {"bbox": {"x0": 0, "y0": 0, "x1": 200, "y1": 40}, "kind": "table", "score": 0.9},
                    {"bbox": {"x0": 0, "y0": 0, "x1": 200, "y1": 20}, "kind": "row", "score": 0.9},
                    {"bbox": {"x0": 0, "y0": 20, "x1": 200, "y1": 40}, "kind": "row", "score": 0.9},
                    {"bbox": {"x0": 0, "y0": 0, "x1": 100, "y1": 40}, "kind": "column", "score": 0.9},
                    {"bbox": {"x0": 100, "y0": 0, "x1": 200, "y1": 40}, "kind": "column", "score": 0.9}
                ]
            }"#,
        )
        .unwrap();
        let out = dir.path().join("tables.json");

        cmd_grid(&input, Some(&out), None, true).unwrap();

        let tables: Vec<docweave::Table> =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cells.len(), 4);
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(cmd_info(&missing, None).is_err());
    }
}
