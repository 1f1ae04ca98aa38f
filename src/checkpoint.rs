//! Actor snapshots for the latent search.
//!
//! Snapshots are keyed by (model name, target label, step size α) and stored at
//! `<root>/models/<model_name>/actor_<label>_<alpha>.bin`. They hold the actor only:
//! that is all that is needed to replay the learned search policy.

use std::fs;
use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{BinFileRecorder, FullPrecisionSettings},
    tensor::backend::Backend,
};

use crate::{nn::GaussianActor, Error, Result};

/// File extension used for [`BinFileRecorder`] snapshots
const SNAPSHOT_EXTENSION: &str = "bin";

/// Identifies one search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotKey {
    /// Name of the attacked classifier, e.g. `"VGG16"`
    pub model_name: String,
    /// Target class index
    pub label: usize,
    /// Latent step size used by the search
    pub alpha: f32,
}

impl SnapshotKey {
    pub fn new(model_name: impl Into<String>, label: usize, alpha: f32) -> Self {
        Self {
            model_name: model_name.into(),
            label,
            alpha,
        }
    }

    /// α may contain a dot, so the extension is spelled out rather than set.
    fn file_name(&self) -> String {
        format!("actor_{}_{}.{}", self.label, self.alpha, SNAPSHOT_EXTENSION)
    }
}

/// Saves and restores actor parameters under a root directory.
#[derive(Debug, Clone)]
pub struct ActorSnapshots {
    root: PathBuf,
}

impl ActorSnapshots {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path (with extension) of the snapshot for `key`
    pub fn path(&self, key: &SnapshotKey) -> PathBuf {
        self.root
            .join("models")
            .join(&key.model_name)
            .join(key.file_name())
    }

    pub fn exists(&self, key: &SnapshotKey) -> bool {
        self.path(key).is_file()
    }

    /// Write `actor` for `key`, replacing any earlier snapshot.
    ///
    /// Returns the path written.
    pub fn save<B: Backend>(&self, actor: &GaussianActor<B>, key: &SnapshotKey) -> Result<PathBuf> {
        let path = self.path(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        actor
            .clone()
            .save_file(path.clone(), &recorder)
            .map_err(|e| Error::Recorder {
                path: path.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), "saved actor snapshot");
        Ok(path)
    }

    /// Load the snapshot for `key` into `template`.
    ///
    /// The template fixes the architecture; build it with the same `ActorConfig`
    /// the snapshot was trained with.
    pub fn load<B: Backend>(
        &self,
        template: GaussianActor<B>,
        key: &SnapshotKey,
        device: &B::Device,
    ) -> Result<GaussianActor<B>> {
        let path = self.path(key);
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();

        template
            .load_file(path.clone(), &recorder, device)
            .map_err(|e| Error::Recorder {
                path,
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::ActorConfig;
    use burn::{
        backend::ndarray::{NdArray, NdArrayDevice},
        prelude::*,
    };
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    fn actor(seed: u64) -> GaussianActor<TestBackend> {
        ActorConfig::new(4, 3)
            .with_hidden_size(8)
            .init(&NdArrayDevice::default(), &mut StdRng::seed_from_u64(seed))
    }

    fn outputs(actor: &GaussianActor<TestBackend>) -> (Vec<f32>, Vec<f32>) {
        let device = NdArrayDevice::default();
        let state = Tensor::<TestBackend, 2>::from_floats([[0.1, -0.4, 0.9, 0.3]], &device);
        let (mean, std) = actor.forward(state);
        (
            mean.into_data().iter::<f32>().collect(),
            std.into_data().iter::<f32>().collect(),
        )
    }

    #[test]
    fn test_snapshot_path_layout() {
        let snapshots = ActorSnapshots::new("/tmp/result");
        let key = SnapshotKey::new("VGG16", 7, 0.5);

        assert_eq!(
            snapshots.path(&key),
            PathBuf::from("/tmp/result/models/VGG16/actor_7_0.5.bin")
        );
    }

    #[test]
    fn test_save_then_load_reproduces_inference() {
        let dir = tempdir().unwrap();
        let snapshots = ActorSnapshots::new(dir.path());
        let key = SnapshotKey::new("toy", 3, 0.25);

        let trained = actor(1);
        let written = snapshots.save(&trained, &key).unwrap();
        assert!(written.is_file());
        assert!(snapshots.exists(&key));

        // A differently seeded template must be fully overwritten by the load.
        let restored = snapshots
            .load(actor(2), &key, &NdArrayDevice::default())
            .unwrap();

        assert_eq!(outputs(&restored), outputs(&trained));
    }

    #[test]
    fn test_load_missing_snapshot_is_error() {
        let dir = tempdir().unwrap();
        let snapshots = ActorSnapshots::new(dir.path());
        let key = SnapshotKey::new("toy", 0, 0.1);

        assert!(!snapshots.exists(&key));
        let err = snapshots
            .load(actor(0), &key, &NdArrayDevice::default())
            .unwrap_err();
        assert!(matches!(err, Error::Recorder { .. }));
    }
}
