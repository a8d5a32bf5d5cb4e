//! Model file format: a versioned bincode envelope around the forest.

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Header fields are duplicated outside the forest and checked against it on
/// load.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope<F> {
    format_version: u32,
    n_trees: usize,
    n_features: usize,
    n_classes: usize,
    feature_names: Vec<String>,
    forest: F,
}

impl ModelEnvelope<RandomForest> {
    fn mismatched_field(&self) -> Option<&'static str> {
        let forest = &self.forest;
        if self.n_trees != forest.trees.len() {
            Some("n_trees")
        } else if self.n_features != forest.n_features {
            Some("n_features")
        } else if self.n_classes != forest.n_classes {
            Some("n_classes")
        } else if self.feature_names != forest.feature_names {
            Some("feature_names")
        } else {
            None
        }
    }
}

impl RandomForest {
    /// Encode the model into its on-disk byte representation.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::SerializeModel`] if bincode encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RfError> {
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_trees: self.trees.len(),
            n_features: self.n_features,
            n_classes: self.n_classes,
            feature_names: self.feature_names.clone(),
            forest: self,
        };
        bincode::serialize(&envelope).map_err(|source| RfError::SerializeModel { source })
    }

    /// Save the model to a binary file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    /// | [`RfError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|source| RfError::WriteModel {
            path: path.to_path_buf(),
            source,
        })?;
        info!(size_bytes = bytes.len(), n_trees = self.trees.len(), "model saved");
        Ok(())
    }

    /// Load a model from a binary file written by [`RandomForest::save`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ReadModel`] | file read failed |
    /// | [`RfError::DeserializeModel`] | bincode decoding failed |
    /// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
    /// | [`RfError::ModelHeaderMismatch`] | header disagrees with the decoded forest |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| RfError::ReadModel {
            path: path.to_path_buf(),
            source,
        })?;

        // Check the version before decoding the payload, so files from other
        // format revisions report a version error rather than a decode error.
        let version: u32 = bincode::deserialize(&bytes).map_err(|source| {
            RfError::DeserializeModel {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if version != FORMAT_VERSION {
            return Err(RfError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: version,
                path: path.to_path_buf(),
            });
        }

        let envelope: ModelEnvelope<RandomForest> =
            bincode::deserialize(&bytes).map_err(|source| RfError::DeserializeModel {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(field) = envelope.mismatched_field() {
            return Err(RfError::ModelHeaderMismatch {
                path: path.to_path_buf(),
                field,
            });
        }

        debug!(
            n_trees = envelope.n_trees,
            n_features = envelope.n_features,
            n_classes = envelope.n_classes,
            "model loaded"
        );
        Ok(envelope.forest)
    }
}
