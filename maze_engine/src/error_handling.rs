// error_handling.rs - Error taxonomy for maze synthesis and its configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("random source unavailable: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("range [{min}, {max}] is invalid")]
    InvalidRange { min: i64, max: i64 },

    #[error("{name} = {value} should be in range {range}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        range: String,
    },

    #[error("invalid endpoint: {reason}")]
    InvalidEndpoint { reason: String },

    #[error("{stage}: {source}")]
    Stage {
        stage: &'static str,
        source: Box<MazeError>,
    },

    #[error("task failed: {0}")]
    TaskJoin(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl MazeError {
    /// Wrap the error with the pipeline stage that produced it.
    pub fn in_stage(self, stage: &'static str) -> Self {
        MazeError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping stage wrappers.
    pub fn root(&self) -> &MazeError {
        match self {
            MazeError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;

/// Attach a stage label to a fallible pipeline step.
pub trait StageContext<T> {
    fn stage(self, stage: &'static str) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    fn stage(self, stage: &'static str) -> Result<T> {
        self.map_err(|err| err.in_stage(stage))
    }
}
