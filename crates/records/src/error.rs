use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("duplicate {collection} id: {id}")]
    DuplicateId { collection: &'static str, id: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
