//! epub2cbz - Convert image-based EPUBs to CBZ

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use epub2cbz::{
    CbzConfig, ConversionReport, ConvertConfig, Converter, Epub, NullSink, convert_epub_with,
};

#[derive(Parser)]
#[command(name = "epub2cbz")]
#[command(version, about = "Convert image-based EPUBs to CBZ", long_about = None)]
#[command(after_help = "EXAMPLES:
    epub2cbz manga.epub                 Write manga.cbz next to the input
    epub2cbz manga.epub out/vol1.cbz    Write to an explicit path
    epub2cbz --dry-run --json book.epub List the pages as JSON")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output CBZ file (default: INPUT with a .cbz extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Deflate page entries instead of storing them
    #[arg(long)]
    deflate: bool,

    /// Deflate level
    #[arg(
        long,
        value_name = "N",
        requires = "deflate",
        value_parser = clap::value_parser!(i64).range(0..=9)
    )]
    level: Option<i64>,

    /// Also follow SVG <image> references
    #[arg(long)]
    svg: bool,

    /// Do not detect a cover; pages follow the reading order only
    #[arg(long)]
    no_cover: bool,

    /// Resolve and list pages without writing an archive
    #[arg(long)]
    dry_run: bool,

    /// Print the conversion report as JSON
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.quiet {
        "epub2cbz=warn"
    } else if cli.verbose {
        "epub2cbz=debug"
    } else {
        "epub2cbz=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::new().with_config(
        ConvertConfig::default()
            .with_detect_cover(!cli.no_cover)
            .with_svg_image_refs(cli.svg),
    );

    let (report, output) = if cli.dry_run {
        let mut epub = Epub::open(&cli.input)?;
        let report = converter.convert(&epub.package, &mut epub.content, &mut NullSink)?;
        (report, None)
    } else {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| cli.input.with_extension("cbz"));
        let cbz = if cli.deflate {
            CbzConfig::deflated(cli.level)
        } else {
            CbzConfig::default()
        };
        let report = convert_epub_with(&cli.input, &output, &converter, cbz)?;
        (report, Some(output))
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !cli.quiet {
        print_summary(&report, output.as_deref());
    }
    Ok(())
}

fn print_summary(report: &ConversionReport, output: Option<&Path>) {
    if let Some(title) = &report.title {
        println!("Title: {title}");
    }
    match &report.cover {
        Some(cover) => println!("Cover: {} ({})", cover.item.href, cover.strategy),
        None => println!("Cover: none"),
    }
    match output {
        Some(path) => println!("Wrote {} pages to {}", report.pages.len(), path.display()),
        None => {
            for page in &report.pages {
                println!("{} <- {}", page.filename, page.href);
            }
            println!("{} pages", report.pages.len());
        }
    }
}
