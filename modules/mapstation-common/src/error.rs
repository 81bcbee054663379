use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapStationError {
    #[error("Atlas load error: {0}")]
    AtlasLoad(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
