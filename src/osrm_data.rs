//! Prepares OSRM road data for the routing provider.
//!
//! Collection trucks and cargo bikes need differently processed extracts, so
//! each dataset is built for one OSRM Lua profile and lives in its own
//! directory: `<data_root>/<region>/<profile>/`. Preparation is idempotent;
//! steps whose outputs already exist are skipped.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error as ThisError;
use tracing::{debug, info};

use crate::model::VehicleType;

const OSRM_IMAGE: &str = "osrm/osrm-backend";
const CONTAINER_DATA_DIR: &str = "/data";

#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    /// Geofabrik region path, e.g. "north-america/us/nevada".
    pub path: String,
}

impl GeofabrikRegion {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

/// OSRM Lua profile baked into a prepared dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsrmProfile {
    Car,
    Bicycle,
}

impl OsrmProfile {
    pub fn for_vehicle(vehicle: VehicleType) -> Self {
        match vehicle {
            VehicleType::Truck | VehicleType::Van => OsrmProfile::Car,
            VehicleType::Bike => OsrmProfile::Bicycle,
        }
    }

    fn lua_path(&self) -> &'static str {
        match self {
            OsrmProfile::Car => "/opt/car.lua",
            OsrmProfile::Bicycle => "/opt/bicycle.lua",
        }
    }

    fn dir_name(&self) -> &'static str {
        match self {
            OsrmProfile::Car => "car",
            OsrmProfile::Bicycle => "bicycle",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmDatasetConfig {
    pub region: GeofabrikRegion,
    pub data_root: PathBuf,
    pub profile: OsrmProfile,
}

impl OsrmDatasetConfig {
    pub fn new(region: GeofabrikRegion, data_root: impl Into<PathBuf>) -> Self {
        Self {
            region,
            data_root: data_root.into(),
            profile: OsrmProfile::Car,
        }
    }

    pub fn with_profile(mut self, profile: OsrmProfile) -> Self {
        self.profile = profile;
        self
    }
}

#[derive(Debug, ThisError)]
pub enum OsrmDataError {
    #[error("dataset io: {0}")]
    Io(#[from] io::Error),
    #[error("extract download: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{step} exited with status {status}")]
    ProcessFailure { step: &'static str, status: String },
}

/// One `docker run` invocation of the MLD pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrepStep {
    Extract,
    Partition,
    Customize,
}

impl PrepStep {
    const ALL: [PrepStep; 3] = [PrepStep::Extract, PrepStep::Partition, PrepStep::Customize];

    fn tool(&self) -> &'static str {
        match self {
            PrepStep::Extract => "osrm-extract",
            PrepStep::Partition => "osrm-partition",
            PrepStep::Customize => "osrm-customize",
        }
    }

    /// Files this step leaves next to the `.osrm` base.
    fn outputs(&self) -> &'static [&'static str] {
        match self {
            PrepStep::Extract => &["osrm"],
            PrepStep::Partition => &["osrm.partition", "osrm.cells"],
            PrepStep::Customize => &["osrm.mldgr"],
        }
    }

    fn args(&self, dataset: &OsrmDataset, profile: OsrmProfile) -> Vec<String> {
        match self {
            PrepStep::Extract => vec![
                "-p".to_string(),
                profile.lua_path().to_string(),
                in_container(&dataset.pbf_path),
            ],
            PrepStep::Partition | PrepStep::Customize => vec![dataset.container_base()],
        }
    }

    fn is_done(&self, osrm_base: &Path) -> bool {
        self.outputs()
            .iter()
            .all(|ext| osrm_base.with_extension(ext).exists())
    }
}

/// Prepared MLD dataset on disk, ready for `osrm-routed`.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    /// Directory mounted as `/data` in the OSRM container.
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
    pub pbf_path: PathBuf,
}

impl OsrmDataset {
    /// Downloads and preprocesses the extract, skipping finished steps.
    pub fn ensure(config: &OsrmDatasetConfig) -> Result<Self, OsrmDataError> {
        let dataset = Self::locate(config)?;
        fs::create_dir_all(&dataset.data_dir)?;

        if !dataset.pbf_path.exists() {
            info!(url = %config.region.url(), "downloading OSM extract");
            download(&config.region.url(), &dataset.pbf_path)?;
        }

        // a rerun extract invalidates the later steps
        let mut rerun = false;
        for step in PrepStep::ALL {
            if !rerun && step.is_done(&dataset.osrm_base) {
                debug!(step = step.tool(), "already prepared");
                continue;
            }
            dataset.run(step, config.profile)?;
            rerun = true;
        }

        Ok(dataset)
    }

    fn locate(config: &OsrmDatasetConfig) -> Result<Self, OsrmDataError> {
        let root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let region = config.region.name();
        let data_dir = root.join(region).join(config.profile.dir_name());
        Ok(Self {
            osrm_base: data_dir.join(format!("{region}-latest.osrm")),
            pbf_path: data_dir.join(format!("{region}-latest.osm.pbf")),
            data_dir,
        })
    }

    /// Path of the `.osrm` base as seen inside the container.
    pub fn container_base(&self) -> String {
        in_container(&self.osrm_base)
    }

    fn run(&self, step: PrepStep, profile: OsrmProfile) -> Result<(), OsrmDataError> {
        info!(step = step.tool(), profile = ?profile, "running OSRM preprocessing");
        let status = Command::new("docker")
            .args(["run", "--rm", "-t", "-v"])
            .arg(format!("{}:{CONTAINER_DATA_DIR}", self.data_dir.display()))
            .arg(OSRM_IMAGE)
            .arg(step.tool())
            .args(step.args(self, profile))
            .status()?;

        if !status.success() {
            return Err(OsrmDataError::ProcessFailure {
                step: step.tool(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Streams `url` into `dest` through a temporary file.
fn download(url: &str, dest: &Path) -> Result<(), OsrmDataError> {
    let mut response = reqwest::blocking::get(url)?.error_for_status()?;
    let partial = dest.with_extension("part");
    let mut writer = BufWriter::new(File::create(&partial)?);
    response.copy_to(&mut writer)?;
    writer.flush()?;
    fs::rename(partial, dest)?;
    Ok(())
}

fn in_container(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    format!("{CONTAINER_DATA_DIR}/{name}")
}
