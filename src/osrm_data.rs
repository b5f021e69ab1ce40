//! OSRM dataset preparation helpers (download + preprocess per profile).
//!
//! Walking and driving need separate extracts because the profile is baked
//! in at `osrm-extract` time. Each profile gets its own directory under the
//! region so both can be served side by side.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::traits::TravelMode;

#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    /// Geofabrik region path, e.g. "asia/south-korea".
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

/// Lua profile shipped in the `osrm/osrm-backend` image for a mode.
pub fn profile_script(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walking => "/opt/foot.lua",
        TravelMode::Driving => "/opt/car.lua",
    }
}

#[derive(Debug, Clone)]
pub struct OsrmDatasetConfig {
    pub region: GeofabrikRegion,
    pub data_root: PathBuf,
    pub mode: TravelMode,
}

impl OsrmDatasetConfig {
    pub fn new(region: GeofabrikRegion, data_root: impl Into<PathBuf>, mode: TravelMode) -> Self {
        Self {
            region,
            data_root: data_root.into(),
            mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmDataset {
    /// Directory to mount as `/data` in the routing container.
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
    pub pbf_path: PathBuf,
}

impl OsrmDataset {
    /// Container path of the `.osrm` base file, for `osrm-routed`.
    pub fn container_osrm_path(&self) -> String {
        format!("/data/{}", file_name(&self.osrm_base))
    }
}

#[derive(Debug)]
pub enum OsrmDataError {
    Io(io::Error),
    Http(reqwest::Error),
    ProcessFailure(String),
}

impl std::fmt::Display for OsrmDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsrmDataError::Io(err) => write!(f, "dataset io error: {}", err),
            OsrmDataError::Http(err) => write!(f, "dataset download failed: {}", err),
            OsrmDataError::ProcessFailure(detail) => {
                write!(f, "osrm preprocessing failed: {}", detail)
            }
        }
    }
}

impl std::error::Error for OsrmDataError {}

impl From<io::Error> for OsrmDataError {
    fn from(err: io::Error) -> Self {
        OsrmDataError::Io(err)
    }
}

impl From<reqwest::Error> for OsrmDataError {
    fn from(err: reqwest::Error) -> Self {
        OsrmDataError::Http(err)
    }
}

impl OsrmDataset {
    /// Downloads the region extract once and runs the MLD pipeline for the
    /// configured mode, skipping steps whose outputs already exist.
    pub fn ensure(config: &OsrmDatasetConfig) -> Result<Self, OsrmDataError> {
        let region_name = config.region.name();
        let data_root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let region_dir = data_root.join(region_name);
        let data_dir = region_dir.join(config.mode.as_str());
        fs::create_dir_all(&data_dir)?;

        let pbf_name = format!("{}-latest.osm.pbf", region_name);
        let shared_pbf = region_dir.join(&pbf_name);
        if !shared_pbf.exists() {
            info!(url = %config.region.url(), "downloading region extract");
            download_pbf(&config.region.url(), &shared_pbf)?;
        }

        // The container only sees `data_dir`, so each profile gets a copy.
        let pbf_path = data_dir.join(&pbf_name);
        if !pbf_path.exists() {
            fs::copy(&shared_pbf, &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", region_name));
        if !osrm_base.exists() {
            info!(mode = %config.mode, "extracting road network");
            run_docker(
                &[
                    "osrm-extract",
                    "-p",
                    profile_script(config.mode),
                    &format!("/data/{}", file_name(&pbf_path)),
                ],
                &data_dir,
            )?;
        }

        if !mld_ready(&osrm_base) {
            let base = format!("/data/{}", file_name(&osrm_base));
            run_docker(&["osrm-partition", &base], &data_dir)?;
            run_docker(&["osrm-customize", &base], &data_dir)?;
        }

        Ok(Self {
            data_dir,
            osrm_base,
            pbf_path,
        })
    }
}

fn download_pbf(url: &str, dest: &Path) -> Result<(), OsrmDataError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    let bytes = response.bytes()?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
        && osrm_base.exists()
}

fn run_docker(args: &[&str], data_dir: &Path) -> Result<(), OsrmDataError> {
    let status = Command::new("docker")
        .arg("run")
        .arg("--rm")
        .arg("-t")
        .arg("-v")
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(OsrmDataError::ProcessFailure(format!(
            "{} exited with status {}",
            args.first().unwrap_or(&"docker"),
            status
        )))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_name_and_url() {
        let region = GeofabrikRegion::new("asia/south-korea");
        assert_eq!(region.name(), "south-korea");
        assert_eq!(
            region.url(),
            "https://download.geofabrik.de/asia/south-korea-latest.osm.pbf"
        );
    }

    #[test]
    fn test_profile_script_per_mode() {
        assert_eq!(profile_script(TravelMode::Walking), "/opt/foot.lua");
        assert_eq!(profile_script(TravelMode::Driving), "/opt/car.lua");
    }

    #[test]
    fn test_mld_not_ready_for_missing_files() {
        assert!(!mld_ready(Path::new("/nonexistent/south-korea-latest.osrm")));
    }
}
