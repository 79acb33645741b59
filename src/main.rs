use brickify::{load_image, Mosaic, Palette, SixelEncoder, WorkingSize};
use clap::{ArgGroup, Parser};
use log::info;
use std::error::Error;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Rebuild an image out of building-block tile colors
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("dimension").args(["size", "scale"])))]
struct Args {
    /// Input image path
    img: PathBuf,

    /// Palette file, one `label r g b` entry per line [default: built-in tile colors]
    #[arg(short, long, value_name = "FILE")]
    palette: Option<PathBuf>,

    /// Working resolution the palette mapping runs at [default: 800,1000]
    #[arg(long, value_name = "W,H", value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Downscale factor used instead of a fixed working resolution
    #[arg(short, long, value_name = "UINT", value_parser = clap::value_parser!(u32).range(1..))]
    scale: Option<u32>,

    /// Save the final image, format is taken from the extension
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Do not print the image to the terminal as sixel graphics
    #[arg(long)]
    no_display: bool,

    /// Map pixels on all cores
    #[arg(short = 'j', long)]
    parallel: bool,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(',')
        .ok_or_else(|| "provide size in the format W,H".to_string())?;
    let w: u32 = w.trim().parse().map_err(|_| format!("invalid width `{w}`"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("invalid height `{h}`"))?;
    if w == 0 || h == 0 {
        return Err("width and height must be non-zero".into());
    }
    Ok((w, h))
}

/// Prefixes an error with the file it came from.
fn in_file<E: Error>(path: &Path) -> impl FnOnce(E) -> String + '_ {
    move |e| format!("{}: {e}", path.display())
}

fn load_palette(path: Option<&Path>) -> Result<Palette, String> {
    match path {
        Some(path) => Palette::from_file(path).map_err(in_file(path)),
        None => Ok(Palette::lego()),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let palette = load_palette(args.palette.as_deref())?;
    let working_size = match (args.size, args.scale) {
        (_, Some(factor)) => WorkingSize::Scale(factor),
        (Some((width, height)), None) => WorkingSize::Exact { width, height },
        (None, None) => WorkingSize::default(),
    };

    let img = load_image(&args.img).map_err(in_file(&args.img))?;
    info!("Loaded {}: {}x{}", args.img.display(), img.width(), img.height());

    let mosaic = Mosaic::new(palette)
        .working_size(working_size)
        .parallel(args.parallel);
    let tiles = mosaic.render(&img)?;

    if let Some(output) = &args.output {
        info!("Saving to {}", output.display());
        tiles.save(output).map_err(in_file(output))?;
    }
    if !args.no_display {
        let mut stdout = stdout().lock();
        SixelEncoder::new(mosaic.palette())?.encode(&tiles, &mut stdout)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
