pub mod shade_effect;
pub mod shade_file;

use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::PathBuf;

pub use shade_effect::{ShadeConfig, is_shadow};
pub use shade_file::{count_shadows, shade_image, shade_image_file, write_png};

/// 16-bit per channel RGBA buffer, the working format of every effect.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

pub type ImageShadeResult<T> = Result<T, ImageShadeError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageShadeError {
    #[error("cannot open input file {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot open output file {}: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write output file {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: EncodeFailure,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Cause of a failed write: the encoder itself or the final flush.
#[derive(thiserror::Error, Debug)]
pub enum EncodeFailure {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait Effect {
    fn apply(&self, image: &Rgba16Image) -> ImageShadeResult<RgbaImage>;
}
