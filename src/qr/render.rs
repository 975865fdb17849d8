use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, Luma};
use qrcode::QrCode;
use qrcode::render::{svg, unicode};

use super::{QrError, QrPayload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: ImageFormat,
    /// Encode the JSON envelope (data, timestamps, tag) instead of the raw
    /// data.
    pub envelope: bool,
    /// Minimum width and height of the image in pixels.
    pub min_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            envelope: true,
            min_size: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl QrImage {
    /// `data:` URL suitable for an `<img src>` attribute.
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.mime)
    }
}

#[derive(Debug, Clone)]
pub struct RenderedQr {
    pub payload: QrPayload,
    pub image: QrImage,
}

#[derive(Debug, Clone, Default)]
pub struct QrRenderer {
    options: RenderOptions,
}

impl QrRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The text that ends up inside the code.
    pub fn encoded_text(&self, payload: &QrPayload) -> String {
        if self.options.envelope {
            payload.envelope()
        } else {
            payload.data.clone()
        }
    }

    pub fn render(&self, payload: QrPayload) -> Result<RenderedQr, QrError> {
        let code = QrCode::new(self.encoded_text(&payload).as_bytes())?;
        let size = self.options.min_size;

        let bytes = match self.options.format {
            ImageFormat::Png => {
                let buffer = code
                    .render::<Luma<u8>>()
                    .min_dimensions(size, size)
                    .build();
                let mut bytes = Vec::new();
                DynamicImage::ImageLuma8(buffer)
                    .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
                bytes
            }
            ImageFormat::Svg => code
                .render()
                .min_dimensions(size, size)
                .dark_color(svg::Color("#000000"))
                .light_color(svg::Color("#ffffff"))
                .build()
                .into_bytes(),
        };

        Ok(RenderedQr {
            payload,
            image: QrImage {
                mime: self.options.format.mime(),
                bytes,
            },
        })
    }

    /// Block-character rendering for terminals.
    pub fn render_terminal(&self, payload: &QrPayload) -> Result<String, QrError> {
        let code = QrCode::new(self.encoded_text(payload).as_bytes())?;
        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build())
    }
}
