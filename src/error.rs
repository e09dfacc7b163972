use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContractError>;

/// Every failure aborts the current composition or amendment call; nothing
/// is retried or downgraded into a partial document.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{text:?} measures {width:.1}pt but the {region} region is {max:.1}pt wide")]
    LayoutOverflow {
        region: &'static str,
        text: String,
        width: f32,
        max: f32,
    },
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse font {0}")]
    Font(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("config error: {0}")]
    Config(String),
    #[error("document has no pages")]
    MissingPage,
}
