//! Fixed pose catalog for the control channel

use rand::seq::SliceRandom;
use rand::Rng;

/// Poses the server can ask clients to strike
pub const POSES: [&str; 4] = ["Arms Down", "Y-Pose", "T-Pose", "OMG"];

/// Server-owned list of named poses
///
/// Selection is uniform with replacement: the same pose may come up twice in a
/// row.
#[derive(Debug, Clone, Copy)]
pub struct PoseCatalog {
    poses: &'static [&'static str],
}

impl PoseCatalog {
    /// The built-in catalog
    pub fn fixed() -> Self {
        Self { poses: &POSES }
    }

    pub fn contains(&self, pose: &str) -> bool {
        self.poses.iter().any(|p| *p == pose)
    }

    /// Pick one pose using `rng`
    pub fn choose_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        // The catalog is a non-empty constant.
        self.poses.choose(rng).copied().unwrap_or(POSES[0])
    }

    /// Pick one pose using the thread-local RNG
    pub fn choose(&self) -> &'static str {
        self.choose_with(&mut rand::thread_rng())
    }
}

impl Default for PoseCatalog {
    fn default() -> Self {
        Self::fixed()
    }
}
