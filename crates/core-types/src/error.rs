use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid {0}: '{1}' is not a recognized value")]
    UnknownVariant(&'static str, String),
}
