use std::path::PathBuf;

/// Favorability surface CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "favormap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Rasterize a weighted kernel density surface
    Density(DensityArgs),

    /// Rasterize an inverse-distance-weighted score surface
    Idw(IdwArgs),

    /// Evaluate the IDW score at a single location
    Sample(SampleArgs),
}

/// Arguments shared by the raster-producing commands.
#[derive(clap::Args, Debug)]
pub struct GridArgs {
    /// JSON array of {lat, lng, weight} records
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// GeoJSON Polygon, MultiPolygon, Feature or FeatureCollection bounding the study area
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub boundary: Option<PathBuf>,

    /// Cell edge length in meters
    #[arg(short, long, default_value_t = 100.0)]
    pub cell_size: f64,

    /// Maximum number of cells; the cell size is coarsened above this
    #[arg(long, default_value_t = favormap::DEFAULT_MAX_CELLS)]
    pub max_cells: usize,

    /// Treat nested boundary rings as holes
    #[arg(long)]
    pub even_odd: bool,

    /// Compute rows on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Rescale values onto [0, 1] before writing
    #[arg(long)]
    pub normalize: bool,

    /// Output grid file, defaults to "./grid.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct DensityArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Kernel bandwidth in meters
    #[arg(long, default_value_t = 1000.0)]
    pub bandwidth: f64,

    /// Only sum points within this many bandwidths of each cell (approximate, faster)
    #[arg(long)]
    pub truncate: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct IdwArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Distance exponent
    #[arg(long, default_value_t = favormap::DEFAULT_POWER)]
    pub power: f64,
}

#[derive(clap::Args, Debug)]
pub struct SampleArgs {
    /// JSON array of {lat, lng, weight} records
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Distance exponent
    #[arg(long, default_value_t = favormap::DEFAULT_POWER)]
    pub power: f64,
}
