//! A minimal concrete [`InputBackend`]: one CSV file per scan, `coord0,coord1,...,intensity` per
//! row. Real detector formats (HDF5 frames, specfiles) are out of scope for this driver; CSV gives
//! the CLI something a user can actually point at without pulling in a beamline-specific reader.

use anyhow::{Context, Result as AnyResult};
use qspace::dispatcher::{ImageJob, InputBackend};
use qspace::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvBackend {
    scans: Vec<(String, PathBuf)>,
}

impl CsvBackend {
    pub fn discover(dir: &Path) -> AnyResult<Self> {
        let mut scans = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                let scan_id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                scans.push((scan_id, path));
            }
        }
        scans.sort();
        Ok(Self { scans })
    }
}

impl InputBackend for CsvBackend {
    fn scan_ids(&self) -> Vec<String> {
        self.scans.iter().map(|(id, _)| id.clone()).collect()
    }

    fn load(&self, scan_id: &str) -> Result<ImageJob> {
        let path = self
            .scans
            .iter()
            .find(|(id, _)| id == scan_id)
            .map(|(_, path)| path.clone())
            .ok_or_else(|| qspace::Error::FormatError(format!("no such scan {scan_id:?}")))?;

        let text = fs::read_to_string(&path).map_err(qspace::Error::IOError)?;
        let mut coordinates: Vec<Vec<f64>> = Vec::new();
        let mut intensity = Vec::new();

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let fields: Vec<f64> = line
                .split(',')
                .map(str::trim)
                .map(|f| {
                    f.parse()
                        .map_err(|_| qspace::Error::FormatError(format!("bad value {f:?}")))
                })
                .collect::<Result<_>>()?;
            let Some((&last, coords)) = fields.split_last() else {
                continue;
            };
            if coordinates.is_empty() {
                coordinates = vec![Vec::new(); coords.len()];
            }
            for (slot, &c) in coordinates.iter_mut().zip(coords) {
                slot.push(c);
            }
            intensity.push(last);
        }

        Ok(ImageJob {
            scan_id: scan_id.to_owned(),
            coordinates,
            intensity,
        })
    }
}
