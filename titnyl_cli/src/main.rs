use clap::{Parser, Subcommand};
use log::LevelFilter;
use titnyl::{
    convert::{convert_batch, convert_with},
    crs::{Crs, ProjProvider},
    detect::{detect_crs, DEFAULT_CANDIDATES},
    io::{geojson::to_string_pretty, read_text, write_string},
    ConvertOptions, InputFile,
};

/// Convert TIT/NYL road alignment files to GeoJSON.
#[derive(Parser)]
#[command(name = "titnyl_cli", version)]
struct Cli {
    /// Log debug output (RUST_LOG is honoured otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConvertFlags {
    /// Source CRS: EPSG code, proj definition or "auto"
    #[arg(long)]
    epsg: Option<String>,
    /// Emit segment endpoints instead of a dense polyline.
    #[arg(long)]
    endpoints_only: bool,
    /// Smooth the vertical profile.
    #[arg(long)]
    smooth_z: bool,
    /// Low-pass filter the generated heights.
    #[arg(long)]
    low_pass: bool,
    /// Integration step along the alignment.
    #[arg(long)]
    step: Option<f64>,
    /// JSON file with conversion options.
    #[arg(long)]
    config: Option<String>,
    /// Output file; GeoJSON goes to stdout when omitted.
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one TIT/NYL pair to a GeoJSON LineString.
    Convert {
        #[arg(long)]
        tit: String,
        #[arg(long)]
        nyl: String,
        #[command(flatten)]
        flags: ConvertFlags,
    },
    /// Convert many files, pairing TIT and NYL files by name.
    Batch {
        #[arg(long, num_args = 1.., required = true)]
        tit: Vec<String>,
        #[arg(long, num_args = 1.., required = true)]
        nyl: Vec<String>,
        #[command(flatten)]
        flags: ConvertFlags,
    },
    /// Detect the CRS of a northing/easting pair.
    DetectCrs { val1: f64, val2: f64 },
}

impl ConvertFlags {
    fn options(&self) -> titnyl::Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::load(path)?,
            None => ConvertOptions::default(),
        };
        if let Some(epsg) = &self.epsg {
            options.crs = epsg.clone();
        }
        if self.endpoints_only {
            options.smooth = false;
        }
        if self.smooth_z {
            options.smooth_vertical = true;
        }
        if self.low_pass {
            options.profile.low_pass = true;
        }
        if let Some(step) = self.step {
            options.step = step;
        }
        Ok(options)
    }

    fn emit(&self, collection: &geojson::FeatureCollection) -> titnyl::Result<()> {
        let json = to_string_pretty(collection)?;
        match &self.output {
            Some(path) => {
                write_string(path, &json)?;
                println!("Wrote {}", path);
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

fn file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn run(command: Commands) -> titnyl::Result<()> {
    match command {
        Commands::Convert { tit, nyl, flags } => {
            let options = flags.options()?;
            let horizontal = read_text(&tit)?;
            let vertical = read_text(&nyl)?;
            let name = file_name(&tit);
            let fc = convert_with(&ProjProvider, &horizontal, &vertical, &options, Some(&name))?;
            flags.emit(&fc)
        }
        Commands::Batch { tit, nyl, flags } => {
            let options = flags.options()?;
            let horizontal = tit.iter().map(InputFile::read).collect::<titnyl::Result<Vec<_>>>()?;
            let vertical = nyl.iter().map(InputFile::read).collect::<titnyl::Result<Vec<_>>>()?;
            let fc = convert_batch(&ProjProvider, &horizontal, &vertical, &options)?;
            flags.emit(&fc)
        }
        Commands::DetectCrs { val1, val2 } => {
            match detect_crs(&ProjProvider, &DEFAULT_CANDIDATES, val1, val2) {
                Some(found) => println!("EPSG: {} (swapped: {})", found.crs.code(), found.swapped),
                None => println!("No candidate matched, fallback EPSG: {}", Crs::fallback().code()),
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
