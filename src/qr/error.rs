use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("Failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("Failed to write QR image: {0}")]
    Image(#[from] image::ImageError),
}
