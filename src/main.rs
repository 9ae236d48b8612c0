//! advent-box CLI - Slice photos into advent calendar box textures

use advent_box::{
    square_crop, AdventError, BoxSlicer, CropRect, DoorCell, DoorPlacement, Face, RegionLayout,
    SceneConfig,
};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "advent-box", about = "Slice photos into advent calendar box textures")]
struct Args {
    /// Input image files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory (one subdirectory per input when several are given)
    #[arg(short, long, default_value = "out")]
    out: PathBuf,
    /// Scene config JSON (box dimensions, timings)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Also write one PNG per door cut from the front region
    #[arg(short, long)]
    doors: bool,
}

#[derive(Serialize)]
struct RegionEntry {
    face: Face,
    file: String,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct DoorEntry {
    #[serde(flatten)]
    cell: DoorCell,
    placement: DoorPlacement,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

#[derive(Serialize)]
struct Manifest {
    source: String,
    crop: CropRect,
    unit: u32,
    regions: Vec<RegionEntry>,
    doors: Vec<DoorEntry>,
}

fn slice_one(
    slicer: &BoxSlicer,
    input: &Path,
    out_dir: &Path,
    doors: bool,
) -> Result<(), AdventError> {
    let image = image::open(input)?;
    let crop = square_crop(&image);
    let unit = RegionLayout::for_crop(&crop)?.unit();
    let regions = slicer.slice(&image)?;
    std::fs::create_dir_all(out_dir)?;

    let mut region_entries = Vec::with_capacity(Face::ALL.len());
    for face in Face::ALL {
        let file = format!("{face}.png");
        let img = regions.get(face);
        img.save(out_dir.join(&file))?;
        region_entries.push(RegionEntry { face, file, width: img.width(), height: img.height() });
    }

    let dims = slicer.config().box_dimensions;
    let mut door_entries = Vec::new();
    for cell in DoorCell::all() {
        let file = if doors {
            let name = format!("door-{:02}.png", cell.day);
            cell.sample(&regions.front).save(out_dir.join(&name))?;
            Some(name)
        } else {
            None
        };
        let placement = DoorPlacement::for_cell(&cell, &dims);
        door_entries.push(DoorEntry { cell, placement, file });
    }

    let manifest = Manifest {
        source: input.display().to_string(),
        crop,
        unit,
        regions: region_entries,
        doors: door_entries,
    };
    let writer = BufWriter::new(File::create(out_dir.join("manifest.json"))?);
    serde_json::to_writer_pretty(writer, &manifest)
        .map_err(|e| AdventError::Config(e.to_string()))?;

    tracing::info!(input = %input.display(), out = %out_dir.display(), "sliced");
    Ok(())
}

/// One output directory per input. A single input writes straight into
/// `base`; several get a subdirectory each, named by file stem, with `-2`,
/// `-3`, ... appended when stems repeat.
fn output_dirs(base: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    if inputs.len() <= 1 {
        return vec![base.to_path_buf(); inputs.len()];
    }
    let mut taken: HashSet<String> = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".into());
            let mut name = stem.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{stem}-{n}");
            }
            base.join(name)
        })
        .collect()
}

fn main() -> Result<(), AdventError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::default(),
    };
    let slicer = BoxSlicer::new(config);
    let dirs = output_dirs(&args.out, &args.inputs);

    let failures: Vec<(PathBuf, AdventError)> = args
        .inputs
        .par_iter()
        .zip(dirs.par_iter())
        .filter_map(|(input, dir)| {
            slice_one(&slicer, input, dir, args.doors).err().map(|e| (input.clone(), e))
        })
        .collect();

    for (input, err) in &failures {
        tracing::error!(input = %input.display(), "{err}");
    }
    match failures.into_iter().next() {
        Some((_, err)) => Err(err),
        None => Ok(()),
    }
}
