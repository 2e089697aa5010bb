//! Process spawning.

mod tokio_spawner;

pub use tokio_spawner::TokioProcessSpawner;
