//! Configuration: a small `[section] key = value` model, matching the original pipeline's three
//! sections (`dispatcher`, `input`, `projection`), each keyed by a `type` string that selects a
//! backend/strategy by name.

use crate::axis::Axis;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// One configuration section: an unordered string-to-string mapping, as produced by the loader in
/// [`crate::dispatcher::config::Configuration::from_ini`].
pub type Section = HashMap<String, String>;

/// A capability trait for reading typed values out of a [`Section`], so backends and projections
/// can share one parsing convention instead of each hand-rolling `str::parse`.
pub trait ConfigurableKeys {
    /// Looks up `key`, returning [`Error::FormatError`] if absent.
    fn require(&self, key: &str) -> Result<&str>;
    /// Looks up `key` and parses it as `T`, returning [`Error::FormatError`] on a missing key or a
    /// parse failure.
    fn require_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<T>;
    /// Looks up `key`, returning `default` if it is absent.
    fn get_or(&self, key: &str, default: &str) -> String;
}

impl ConfigurableKeys for Section {
    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::FormatError(format!("missing configuration key {key:?}")))
    }

    fn require_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<T> {
        self.require(key)?
            .parse()
            .map_err(|_| Error::FormatError(format!("could not parse configuration key {key:?}")))
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).cloned().unwrap_or_else(|| default.to_owned())
    }
}

/// The three sections the core reads from: which backend produces image jobs, how each raw frame
/// is projected into the target axes, and how the run is dispatched (local vs. cluster, worker
/// count, chunk size, output path).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configuration {
    /// Dispatcher section: worker/cluster settings.
    #[serde(default)]
    pub dispatcher: Section,
    /// Input section: backend selection and source location.
    #[serde(default)]
    pub input: Section,
    /// Projection section: coordinate-transform selection.
    #[serde(default)]
    pub projection: Section,
}

impl Configuration {
    /// Parses an INI-like configuration: `[section]` headers followed by `key = value` lines.
    /// Blank lines and lines starting with `#` or `;` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] for a `key = value` line appearing before any `[section]`
    /// header, or a line that is neither a header, a comment, blank, nor a `key = value` pair.
    pub fn from_ini(text: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current: Option<&mut Section> = None;

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                current = Some(match name.trim() {
                    "dispatcher" => &mut config.dispatcher,
                    "input" => &mut config.input,
                    "projection" => &mut config.projection,
                    other => {
                        return Err(Error::FormatError(format!(
                            "unknown configuration section {other:?} at line {}",
                            lineno + 1
                        )))
                    }
                });
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::FormatError(format!(
                    "malformed configuration line {}: {raw_line:?}",
                    lineno + 1
                )));
            };
            let Some(section) = current.as_mut() else {
                return Err(Error::FormatError(format!(
                    "key = value pair at line {} before any [section] header",
                    lineno + 1
                )));
            };
            section.insert(key.trim().to_owned(), value.trim().to_owned());
        }

        Ok(config)
    }

    /// Parses the same three sections from a YAML document, as an alternative to the native
    /// `.txt` encoding (each section a top-level mapping of string to string).
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if the document does not match the expected shape.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| Error::FormatError(format!("invalid YAML configuration: {e}")))
    }

    /// Reads the target axes out of the `projection` section: `axis.<label>.min/max/res` triples.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigurableKeys::require_parsed`] errors, and [`Error::FormatError`] if no
    /// axes are declared.
    pub fn target_axes(&self) -> Result<Vec<Axis>> {
        let mut labels: Vec<String> = self
            .projection
            .keys()
            .filter_map(|k| k.strip_prefix("axis.")?.strip_suffix(".min"))
            .map(str::to_owned)
            .collect();
        labels.sort();
        labels.dedup();
        if labels.is_empty() {
            return Err(Error::FormatError(
                "projection section declares no target axes".to_owned(),
            ));
        }
        labels
            .into_iter()
            .map(|label| {
                let min = self.projection.require_parsed(&format!("axis.{label}.min"))?;
                let max = self.projection.require_parsed(&format!("axis.{label}.max"))?;
                let res = self.projection.require_parsed(&format!("axis.{label}.res"))?;
                Axis::new(label, min, max, res)
            })
            .collect()
    }

    /// Local-mode worker count; defaults to `1` (single-threaded) if unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if the key is present but not a valid integer.
    pub fn worker_count(&self) -> Result<usize> {
        Ok(if self.dispatcher.contains_key("workers") {
            self.dispatcher.require_parsed("workers")?
        } else {
            1
        })
    }

    /// Cluster-mode merge chunk size; defaults to `10`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if the key is present but not a valid integer.
    pub fn chunk_size(&self) -> Result<usize> {
        Ok(if self.dispatcher.contains_key("chunksize") {
            self.dispatcher.require_parsed("chunksize")?
        } else {
            10
        })
    }

    /// Output path for the final merged space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if unset.
    pub fn output_path(&self) -> Result<String> {
        self.dispatcher.require("destination").map(str::to_owned)
    }

    /// Whether a merge job should delete its inputs after a successful write. Defaults to `false`.
    #[must_use]
    pub fn delete_inputs(&self) -> bool {
        self.dispatcher.get_or("delete", "false") == "true"
    }

    /// How long the cluster poll loop tolerates a job stuck reporting `Unknown` status before
    /// giving up on it, or `None` to wait forever (the default — transient scheduler opacity must
    /// never be treated as failure, see the open question this resolves in the design notes).
    #[must_use]
    pub fn max_unknown_duration(&self) -> Option<Duration> {
        self.dispatcher
            .get("max_unknown_seconds")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_keys() {
        let text = "\
[dispatcher]
workers = 4
destination = out.hdf5

[projection]
axis.q.min = 0.0
axis.q.max = 1.0
axis.q.res = 0.5
";
        let config = Configuration::from_ini(text).unwrap();
        assert_eq!(config.worker_count().unwrap(), 4);
        assert_eq!(config.output_path().unwrap(), "out.hdf5");
        let axes = config.target_axes().unwrap();
        assert_eq!(axes.len(), 1);
        assert_eq!(axes[0].label(), "q");
    }

    #[test]
    fn defaults_apply_when_keys_are_absent() {
        let config = Configuration::default();
        assert_eq!(config.worker_count().unwrap(), 1);
        assert_eq!(config.chunk_size().unwrap(), 10);
        assert!(!config.delete_inputs());
        assert!(config.max_unknown_duration().is_none());
    }

    #[test]
    fn rejects_key_before_any_section() {
        assert!(matches!(
            Configuration::from_ini("workers = 4"),
            Err(Error::FormatError(_))
        ));
    }

    #[test]
    fn rejects_unknown_section_name() {
        assert!(matches!(
            Configuration::from_ini("[bogus]\nfoo = 1"),
            Err(Error::FormatError(_))
        ));
    }

    #[test]
    fn parses_the_same_sections_from_yaml() {
        let text = "\
dispatcher:
  workers: \"4\"
  destination: out.hdf5
projection:
  axis.q.min: \"0.0\"
  axis.q.max: \"1.0\"
  axis.q.res: \"0.5\"
";
        let config = Configuration::from_yaml(text).unwrap();
        assert_eq!(config.worker_count().unwrap(), 4);
        let axes = config.target_axes().unwrap();
        assert_eq!(axes[0].label(), "q");
        assert!(config.input.is_empty());
    }

    #[test]
    fn yaml_with_only_one_section_still_parses() {
        let config = Configuration::from_yaml("dispatcher:\n  workers: \"2\"\n").unwrap();
        assert_eq!(config.worker_count().unwrap(), 2);
        assert!(config.input.is_empty());
        assert!(config.projection.is_empty());
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            Configuration::from_yaml("not: [valid, , yaml"),
            Err(Error::FormatError(_))
        ));
    }
}
