use clap::{Parser, Subcommand, ValueEnum};
use photogrid::{config, grid, layout, naming, output, processor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Shared flags for commands that generate images.
#[derive(clap::Args, Clone)]
struct GenerateArgs {
    /// Regenerate variants even when all expected outputs already exist
    #[arg(long)]
    force: bool,

    /// Stop the batch at the first failed image
    #[arg(long)]
    fail_fast: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photogrid")]
#[command(about = "Image variants and grid placement for photo portfolios")]
#[command(long_about = "\
Image variants and grid placement for photo portfolios

Every photo is identified by the first 12 hex characters of its content
SHA-256. Variants are generated once per identity and cached by filename:

  processed/
  ├── a1b2c3d4e5f6/
  │   ├── a1b2c3d4e5f6-480w.webp
  │   ├── a1b2c3d4e5f6-800w.webp
  │   ├── a1b2c3d4e5f6-1200w.webp
  │   └── a1b2c3d4e5f6-1920w.webp
  └── .thumbs/
      └── thumb-a1b2c3d4e5f6.webp

Grid layouts bind photos to rectangles on desktop and mobile grids and are
validated for bounds and overlap before any generation:

  { \"grid_width\": 12,
    \"placements\": [{ \"photo_ref\": \"a1b2c3d4e5f6\",
                     \"position\": { \"top_left_x\": 1, \"top_left_y\": 1,
                                   \"bottom_right_x\": 6, \"bottom_right_y\": 2 } }] }

Configuration comes from config.toml in the source directory.
Run 'photogrid gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Source photos directory
    #[arg(long, default_value = "photos", global = true)]
    source: PathBuf,

    /// Output directory for generated variants and thumbnails
    #[arg(long, default_value = "processed", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate variants and thumbnails for every photo in the source directory
    Process(GenerateArgs),
    /// Validate a grid layout, then generate variants for every photo it references
    Build {
        /// Grid layout file (JSON)
        #[arg(long)]
        layout: PathBuf,
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Validate a grid layout file without generating anything
    Validate {
        /// Grid layout file (JSON)
        #[arg(long)]
        layout: PathBuf,
    },
    /// Compute a packed layout for the source photos and print it as JSON
    Layout {
        /// Packing algorithm
        #[arg(long, value_enum, default_value_t = LayoutMode::Justified)]
        mode: LayoutMode,
    },
    /// Validate configuration (and optionally a layout) without writing
    Check {
        /// Grid layout file (JSON)
        #[arg(long)]
        layout: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutMode {
    Justified,
    Grid,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Process(generate) => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            let sources = processor::collect_sources(&cli.source)?;
            run_batch(&sources, &cli.output, &site_config, &generate)?;
        }
        Command::Build { layout, generate } => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            let gallery = read_layout(&layout)?;
            gallery.validate()?;
            let sources = resolve_referenced_photos(&gallery, &cli.source)?;
            run_batch(&sources, &cli.output, &site_config, &generate)?;
        }
        Command::Validate { layout } => {
            let gallery = read_layout(&layout)?;
            gallery.validate()?;
            output::print_layout_report(&gallery);
            println!("Layout OK");
        }
        Command::Layout { mode } => {
            let site_config = config::load_config(&cli.source)?;
            let images = probe_layout_images(&cli.source)?;
            let items = match mode {
                LayoutMode::Justified => layout::justified(
                    &images,
                    &layout::JustifiedOptions {
                        container_width: site_config.layout.container_width,
                        row_height: site_config.layout.row_height,
                        gap: site_config.layout.gap,
                    },
                ),
                LayoutMode::Grid => layout::grid(
                    &images,
                    &layout::GridOptions {
                        container_width: site_config.layout.container_width,
                        columns: site_config.layout.columns,
                        gap: site_config.layout.gap,
                    },
                )?,
            };
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Command::Check { layout } => {
            let site_config = config::load_config(&cli.source)?;
            site_config.validate()?;
            if let Some(path) = layout {
                let gallery = read_layout(&path)?;
                gallery.validate()?;
                output::print_layout_report(&gallery);
            }
            println!("OK");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Process a batch, print the report, and fail if any image failed.
fn run_batch(
    sources: &[photogrid::io::FileSource],
    output_dir: &Path,
    site_config: &config::GalleryConfig,
    generate: &GenerateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut process_config = processor::ProcessConfig::from_gallery_config(site_config);
    process_config.force = generate.force;
    let proc = processor::Processor::new(process_config);

    let destination = photogrid::io::FileDestination::new(output_dir);
    let options = processor::BatchOptions {
        fail_fast: generate.fail_fast,
    };
    let entries = proc.process_batch(sources, &destination, &options);

    output::print_batch_report(&entries);
    let stats = processor::ProcessStats::from_entries(&entries);
    println!("{stats}");

    if stats.failed > 0 {
        return Err(format!("{} images failed", stats.failed).into());
    }
    Ok(())
}

/// Parse a grid layout file in the JSON wire shape.
fn read_layout(path: &Path) -> Result<grid::GalleryLayout, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Map every photo reference in the layout to a source file.
///
/// References are matched by hash ID first, then by filename for layouts
/// authored before content addressing. A reference that matches nothing is
/// a hard error — a placed photo that cannot be generated must fail the
/// build, not degrade into a placeholder.
fn resolve_referenced_photos(
    gallery: &grid::GalleryLayout,
    source_dir: &Path,
) -> Result<Vec<photogrid::io::FileSource>, Box<dyn std::error::Error>> {
    use photogrid::io::ImageSource;

    let sources = processor::collect_sources(source_dir)?;
    let mut by_hash: HashMap<String, &photogrid::io::FileSource> = HashMap::new();
    for source in &sources {
        let mut reader = source.open()?;
        by_hash.insert(naming::hash_id(&mut reader)?, source);
    }

    let mut selected = Vec::new();
    for photo_ref in gallery.photo_refs() {
        let matched = by_hash
            .get(photo_ref)
            .copied()
            .or_else(|| sources.iter().find(|s| s.name() == photo_ref));
        match matched {
            Some(source) => selected.push(source.clone()),
            None => return Err(format!("referenced photo not found: {photo_ref}").into()),
        }
    }
    Ok(selected)
}

/// Read dimensions for every source photo without decoding pixel data.
fn probe_layout_images(
    source_dir: &Path,
) -> Result<Vec<layout::LayoutImage>, Box<dyn std::error::Error>> {
    use photogrid::io::ImageSource;

    let mut images = Vec::new();
    for source in processor::collect_sources(source_dir)? {
        let (width, height) = image::image_dimensions(source.path())?;
        images.push(layout::LayoutImage::new(source.name(), width, height));
    }
    Ok(images)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
