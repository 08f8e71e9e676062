//! JSON formats for segmented maps, tracking configs and tracking reports.
//!
//! Paths listed in a [`TrackConfig`] are resolved relative to a base
//! directory, normally the directory holding the config file.

use grain_track_core::{
    Grain, GrainId, MapError, Orientation, SegmentedMap, SymmetryError, SymmetryTable,
};
use grain_track_matcher::{MatchError, MatcherParams, SequentialMatcher, TrackingResult};
use log::{debug, info};
use nalgebra::Matrix3;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Report file name used when neither the CLI nor the config names one.
pub const DEFAULT_REPORT_NAME: &str = "grain_track_report.json";

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("frame {index} ({}): {source}", path.display())]
    FrameIo {
        index: usize,
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("frame {index} ({}): {source}", path.display())]
    FrameMap {
        index: usize,
        path: PathBuf,
        #[source]
        source: MapError,
    },
    #[error(transparent)]
    Symmetry(#[from] SymmetryError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json_pretty<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// One entry of a map's grain registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrainRecord {
    pub label: GrainId,
    /// Euler-Bunge angles `[phi1, Phi, phi2]` in radians.
    pub euler: [f64; 3],
    /// Pixel count.
    pub size: u64,
}

/// Serialized segmented map: row-major label grid plus grain registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub width: usize,
    pub height: usize,
    pub step_size: f64,
    pub labels: Vec<GrainId>,
    pub grains: Vec<GrainRecord>,
}

impl MapFile {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json_pretty(self, path)
    }

    /// Validate and build the in-memory map.
    pub fn into_map(self) -> Result<SegmentedMap, MapError> {
        let grains = self.grains.into_iter().map(|g| {
            let [phi1, phi, phi2] = g.euler;
            (
                g.label,
                Grain {
                    orientation: Orientation::new(phi1, phi, phi2),
                    size: g.size,
                },
            )
        });
        SegmentedMap::new(self.width, self.height, self.labels, grains, self.step_size)
    }

    pub fn from_map(map: &SegmentedMap) -> Self {
        Self {
            width: map.width(),
            height: map.height(),
            step_size: map.step_size(),
            labels: map.labels().to_vec(),
            grains: map
                .grains()
                .iter()
                .map(|(&label, grain)| GrainRecord {
                    label,
                    euler: grain.orientation.to_array(),
                    size: grain.size,
                })
                .collect(),
        }
    }
}

/// Configuration of one tracking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Map files in frame order.
    pub frames: Vec<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Row-major rotations replacing the built-in table of `crystal_class`.
    #[serde(default)]
    pub symmetry_operators: Option<Vec<[[f64; 3]; 3]>>,
    #[serde(flatten)]
    pub params: MatcherParams,
}

impl TrackConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        read_json(path)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json_pretty(self, path)
    }

    pub fn frame_paths(&self, base_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let base = base_dir.as_ref();
        self.frames.iter().map(|f| base.join(f)).collect()
    }

    /// Resolve the output report path.
    pub fn output_path(&self, base_dir: impl AsRef<Path>) -> PathBuf {
        base_dir
            .as_ref()
            .join(self.output_path.as_deref().unwrap_or(DEFAULT_REPORT_NAME))
    }

    /// Read and validate every frame.
    pub fn load_frames(
        &self,
        base_dir: impl AsRef<Path>,
    ) -> Result<Vec<SegmentedMap>, ConfigError> {
        self.frame_paths(base_dir)
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                let file = match MapFile::load_json(&path) {
                    Ok(file) => file,
                    Err(source) => return Err(ConfigError::FrameIo { index, path, source }),
                };
                match file.into_map() {
                    Ok(map) => {
                        debug!(
                            "frame {index}: {}x{} grid, {} grains",
                            map.width(),
                            map.height(),
                            map.grain_ids(None).len()
                        );
                        Ok(map)
                    }
                    Err(source) => Err(ConfigError::FrameMap { index, path, source }),
                }
            })
            .collect()
    }

    /// Symmetry table for the run: custom operators if given, otherwise the
    /// built-in table of `crystal_class`.
    pub fn build_symmetry(&self) -> Result<SymmetryTable, ConfigError> {
        match &self.symmetry_operators {
            Some(rows) => {
                let operators = rows
                    .iter()
                    .map(|m| Matrix3::from_fn(|r, c| m[r][c]))
                    .collect();
                Ok(SymmetryTable::from_matrices(operators)?)
            }
            None => Ok(SymmetryTable::for_class(self.params.crystal_class)),
        }
    }

    /// Load the frames, link them and build the report.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip_all, fields(frames = self.frames.len()))
    )]
    pub fn run(&self, base_dir: impl AsRef<Path>) -> Result<TrackReport, ConfigError> {
        let maps = self.load_frames(base_dir)?;
        let symmetry = self.build_symmetry()?;
        info!(
            "tracking {} frames, {} symmetry operators",
            maps.len(),
            symmetry.len()
        );
        let matcher = SequentialMatcher::with_symmetry(&maps, self.params.clone(), symmetry)?;
        let result = matcher.link_all_frames()?;
        Ok(TrackReport::from_result(
            self.frames.clone(),
            self.params.clone(),
            &result,
        ))
    }
}

/// Per-chain history in plotting-friendly form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub origin_label: GrainId,
    /// Label per frame, `NO_MAPPING` where the chain was unmatched.
    pub labels: Vec<i64>,
    /// Normalized centroid per frame; frozen frames repeat the anchor.
    pub centroids: Vec<[f64; 2]>,
    pub euler: Vec<[f64; 3]>,
}

/// Output of a tracking run as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub frames: Vec<String>,
    pub params: MatcherParams,
    /// `ebsd_i` -> label of every chain at frame `i`.
    pub labels: BTreeMap<String, Vec<i64>>,
    /// `ebsd_i_to_(i+1)` -> edge weight of every chain for that transition.
    pub errors: BTreeMap<String, Vec<f64>>,
    pub matches_per_transition: Vec<usize>,
    pub trajectories: Vec<Trajectory>,
}

impl TrackReport {
    pub fn from_result(
        frames: Vec<String>,
        params: MatcherParams,
        result: &TrackingResult,
    ) -> Self {
        let trajectories = result
            .chains()
            .iter()
            .map(|chain| Trajectory {
                origin_label: chain.origin_label(),
                labels: (0..chain.len()).map(|f| chain.label_or_sentinel(f)).collect(),
                centroids: chain
                    .entries()
                    .iter()
                    .map(|e| [e.centroid.x, e.centroid.y])
                    .collect(),
                euler: chain
                    .entries()
                    .iter()
                    .map(|e| e.orientation.to_array())
                    .collect(),
            })
            .collect();

        Self {
            frames,
            params,
            labels: result.label_table(),
            errors: result.error_table(),
            matches_per_transition: result.matches_per_transition(),
            trajectories,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json_pretty(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_track_core::CrystalClass;
    use grain_track_matcher::{WeightRule, NO_MAPPING};

    fn map_file(labels: Vec<GrainId>, grains: &[(GrainId, [f64; 3])]) -> MapFile {
        MapFile {
            width: 3,
            height: 2,
            step_size: 0.25,
            labels,
            grains: grains
                .iter()
                .map(|&(label, euler)| GrainRecord {
                    label,
                    euler,
                    size: 2,
                })
                .collect(),
        }
    }

    #[test]
    fn map_file_converts_both_ways() {
        let file = map_file(
            vec![1, 1, 2, 0, 3, 3],
            &[(1, [0.1, 0.2, 0.3]), (2, [0.0; 3]), (3, [1.0, 0.5, 0.0])],
        );
        let map = file.clone().into_map().expect("valid map");
        assert_eq!(map.grain_ids(None), vec![1, 2, 3]);
        assert_eq!(map.label_at(1, 1), Some(3));
        assert_eq!(MapFile::from_map(&map), file);
    }

    #[test]
    fn map_file_reports_missing_grain() {
        let file = map_file(vec![1, 1, 2, 0, 0, 0], &[(1, [0.0; 3])]);
        assert_eq!(file.into_map().unwrap_err(), MapError::MissingGrain(2));
    }

    #[test]
    fn negative_frame_label_stops_the_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        map_file(vec![1, 0, 0, 0, 0, 0], &[(1, [0.0; 3])])
            .write_json(dir.path().join("f0.json"))
            .expect("write");
        map_file(vec![-1, 0, 0, 0, 0, 0], &[(-1, [0.0; 3])])
            .write_json(dir.path().join("f1.json"))
            .expect("write");

        let config = TrackConfig {
            frames: vec!["f0.json".into(), "f1.json".into()],
            output_path: None,
            symmetry_operators: None,
            params: MatcherParams::default(),
        };
        let err = config.run(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::FrameMap {
                index: 1,
                source: MapError::InvalidLabel(-1),
                ..
            }
        ));
    }

    #[test]
    fn config_flattens_matcher_params() {
        let config: TrackConfig = serde_json::from_str(
            r#"{
                "frames": ["a.json", "b.json"],
                "radius": 0.1,
                "crystal_class": "hexagonal",
                "weighting": { "rule": "max" }
            }"#,
        )
        .expect("parse");
        assert_eq!(config.frames.len(), 2);
        assert_eq!(config.output_path, None);
        assert_eq!(config.params.radius, 0.1);
        assert_eq!(config.params.tolerance, 1.0);
        assert_eq!(config.params.crystal_class, CrystalClass::Hexagonal);
        assert_eq!(config.params.weighting, WeightRule::Max);
        assert_eq!(config.build_symmetry().expect("table").len(), 12);
    }

    #[test]
    fn config_paths_resolve_against_base_dir() {
        let config = TrackConfig {
            frames: vec!["f0.json".into(), "/abs/f1.json".into()],
            output_path: Some("out/report.json".into()),
            symmetry_operators: None,
            params: MatcherParams::default(),
        };
        let paths = config.frame_paths("/data/run");
        assert_eq!(paths[0], PathBuf::from("/data/run/f0.json"));
        assert_eq!(paths[1], PathBuf::from("/abs/f1.json"));
        assert_eq!(
            config.output_path("/data/run"),
            PathBuf::from("/data/run/out/report.json")
        );
    }

    #[test]
    fn invalid_custom_symmetry_is_rejected() {
        let config = TrackConfig {
            frames: Vec::new(),
            output_path: None,
            symmetry_operators: Some(vec![[[2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]]),
            params: MatcherParams::default(),
        };
        assert!(matches!(
            config.build_symmetry(),
            Err(ConfigError::Symmetry(SymmetryError::InvalidOperator { index: 0 }))
        ));
    }

    #[test]
    fn run_tracks_frames_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        map_file(vec![1, 1, 0, 0, 2, 2], &[(1, [0.0; 3]), (2, [0.4, 0.3, 0.2])])
            .write_json(dir.path().join("f0.json"))
            .expect("write");
        map_file(vec![8, 8, 0, 0, 0, 0], &[(8, [0.01, 0.0, 0.0])])
            .write_json(dir.path().join("f1.json"))
            .expect("write");

        let config = TrackConfig {
            frames: vec!["f0.json".into(), "f1.json".into()],
            output_path: None,
            symmetry_operators: None,
            params: MatcherParams::default(),
        };
        let report = config.run(dir.path()).expect("run");
        assert_eq!(report.labels["ebsd_0"], vec![1, 2]);
        assert_eq!(report.labels["ebsd_1"], vec![8, NO_MAPPING]);
        assert_eq!(report.errors["ebsd_0_to_1"][1], -1.0);
        assert_eq!(report.matches_per_transition, vec![1]);
        let lost = &report.trajectories[1];
        assert_eq!(lost.origin_label, 2);
        assert_eq!(lost.centroids[1], lost.centroids[0]);

        let out = config.output_path(dir.path());
        report.write_json(&out).expect("write report");
        let back = TrackReport::load_json(&out).expect("read report");
        assert_eq!(back.labels, report.labels);
        assert_eq!(back.params, report.params);
    }

    #[test]
    fn missing_frame_names_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = TrackConfig {
            frames: vec!["nope.json".into()],
            output_path: None,
            symmetry_operators: None,
            params: MatcherParams::default(),
        };
        let err = config.load_frames(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FrameIo { index: 0, .. }));
        assert!(err.to_string().contains("nope.json"));
    }
}
