use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Capture has no area ({width}x{height})")]
    EmptyCapture { width: u32, height: u32 },

    #[error("Invalid capture scale: {0}")]
    InvalidScale(f32),

    #[error("Capture of {width}x{height} pixels exceeds the export limit")]
    CaptureTooLarge { width: u64, height: u64 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
