//! # levelrip
//!
//! Level geometry extraction from running games - asset pools, world
//! surfaces, materials and model placements.
//!
//! This library provides functionality to:
//! - Match a running process against a known game profile
//! - Read the resident world asset through per-game record layouts
//! - Rebuild the level mesh grouped by material, with resolved textures
//! - Collect static model placements and script-model entities
//! - Write OBJ/MTL, `.map`, JSON and text side files
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn run(source: &dyn levelrip::MemorySource) -> Result<(), Box<dyn std::error::Error>> {
//! let profile = levelrip::lookup("iw4mp.exe").ok_or("unsupported game")?;
//!
//! match levelrip::extract(source, profile, &mut |line: &str| eprintln!("{}", line))? {
//!     levelrip::Outcome::Extracted(scene) => {
//!         let paths = levelrip::write_scene(&scene, Path::new("exported_maps"), 4)?;
//!         println!("Wrote {}", paths.obj.display());
//!     }
//!     levelrip::Outcome::Unsupported(reason) => eprintln!("{}", reason),
//!     levelrip::Outcome::NoLevelLoaded => {}
//! }
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod export;
pub mod geometry;
pub mod material;
pub mod memory;
pub mod normal;
pub mod profile;
pub mod scene;
pub mod schema;
pub mod transform;

// Re-export commonly used items
#[doc(inline)]
pub use entity::EntityRecord;
#[doc(inline)]
pub use export::{write_scene, ExportError, OutputPaths};
#[doc(inline)]
pub use geometry::{GeometryError, TriangleGroup, Vertex};
#[doc(inline)]
pub use material::{Material, TextureRole};
#[doc(inline)]
pub use memory::{MemoryError, MemorySource};
#[doc(inline)]
pub use profile::{lookup, GameProfile, PROFILES};
#[doc(inline)]
pub use scene::{extract, ExtractError, MapInfo, Outcome, Scene};
#[doc(inline)]
pub use schema::Family;
#[doc(inline)]
pub use transform::Placement;
