//! QR code rendering for tickets, with a local expiry countdown.

mod error;
mod payload;
mod render;
mod session;

pub use error::QrError;
pub use payload::QrPayload;
pub use render::{ImageFormat, QrImage, QrRenderer, RenderOptions, RenderedQr};
pub use session::{QrSession, QrState, format_remaining};
