//! Scene writers
//!
//! - `obj` - Wavefront OBJ mesh with its MTL material library
//! - `map` - level editor `.map` with one `misc_model` per placement
//! - `dump` - JSON and plain-text side files
//!
//! Every number is formatted with an explicit precision; nothing depends on
//! process locale.

pub mod dump;
pub mod map;
pub mod obj;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scene::Scene;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where each output file of one map lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub obj: PathBuf,
    pub mtl: PathBuf,
    pub map: PathBuf,
    pub models_json: PathBuf,
    pub world_json: PathBuf,
    pub model_list: PathBuf,
    pub search_string: PathBuf,
    pub map_ents: PathBuf,
}

impl OutputPaths {
    /// `<root>/<family>/<mode>/<map>/<map>...`
    pub fn new(root: &Path, scene: &Scene) -> Self {
        let map = scene.info.map_name.as_str();
        let dir = root
            .join(scene.info.family.dir_name())
            .join(scene.info.mode)
            .join(map);
        let file = |suffix: &str| dir.join(format!("{}{}", map, suffix));

        Self {
            obj: file(".obj"),
            mtl: file(".mtl"),
            map: file(".map"),
            models_json: file("_xmodels.json"),
            world_json: file("_worldsettings.json"),
            model_list: file("_xmodelList.txt"),
            search_string: file("_search_string.txt"),
            map_ents: file("_mapEnts.txt"),
            dir,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write every output file for `scene` under `root`
///
/// The `.map` file holds the same models as the JSON dump: statics that
/// survived placement filtering, then script-model entities with a transform.
/// Dropped statics (effects, view models, degenerate scales) are not written.
pub fn write_scene(scene: &Scene, root: &Path, precision: usize) -> Result<OutputPaths, ExportError> {
    let paths = OutputPaths::new(root, scene);
    fs::create_dir_all(&paths.dir)?;

    let mtl_name = paths
        .mtl
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = create(&paths.obj)?;
    obj::write_obj(&mut out, scene, &mtl_name, precision)?;
    out.flush()?;

    let mut out = create(&paths.mtl)?;
    obj::write_mtl(&mut out, &scene.materials)?;
    out.flush()?;

    let mut out = create(&paths.map)?;
    map::write_map(&mut out, &scene.all_placements(), precision)?;
    out.flush()?;

    dump::write_json(&paths.models_json, &scene.placement_records(precision))?;
    dump::write_json(&paths.world_json, &scene.world)?;
    dump::write_text(&paths.model_list, &scene.model_list())?;
    dump::write_text(&paths.search_string, &scene.texture_search_string())?;
    dump::write_text(&paths.map_ents, &scene.raw_entities)?;

    tracing::debug!(dir = %paths.dir.display(), "wrote scene files");
    Ok(paths)
}
