//! Page-level transforms: rotate, copy into another document, extract images

use crate::error::{Error, Result};
use crate::pdf::document::{Page, ResourceEntry};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use qpdf::{QPdf, QPdfDictionary, QPdfObject};
use std::io::Cursor;

/// Parse a rotation angle from a form value.
///
/// Accepts any integer divisible by 90, negative values included.
pub fn parse_angle(value: &str) -> Result<i64> {
    let angle: i64 = value.trim().parse().map_err(|_| Error::InvalidParameter {
        reason: format!("Invalid angle: {:?}", value),
    })?;
    validate_angle(angle)?;
    Ok(angle)
}

/// Reject angles that are not a multiple of 90
pub fn validate_angle(angle: i64) -> Result<()> {
    if angle % 90 != 0 {
        return Err(Error::InvalidParameter {
            reason: format!("Angle must be a multiple of 90, got {}", angle),
        });
    }
    Ok(())
}

/// Rotate a page by `angle` degrees relative to its current rotation.
///
/// Only the `/Rotate` attribute changes; content geometry is untouched.
/// Returns the new rotation, normalized to `0..360`.
pub fn rotate(page: &Page, angle: i64) -> Result<i64> {
    validate_angle(angle)?;

    let rotation = add_rotation(page.rotation(), angle);
    page.dictionary()
        .set("/Rotate", page.owner().new_integer(rotation));
    Ok(rotation)
}

/// Sum of two rotations in `0..360`; both terms are reduced first so that
/// arbitrary `/Rotate` values cannot overflow.
fn add_rotation(current: i64, angle: i64) -> i64 {
    (current.rem_euclid(360) + angle.rem_euclid(360)).rem_euclid(360)
}

/// Page attributes a page may inherit from its `/Pages` ancestors
const INHERITABLE_KEYS: [&str; 4] = ["/Resources", "/MediaBox", "/CropBox", "/Rotate"];

/// Copy a page into `target` so it can be inserted into a new document.
///
/// Resources reachable from the page are copied along with it. Copying does
/// not follow `/Parent`, so inherited attributes are set on the source page
/// first; its effective attributes are unchanged. The source document must
/// stay alive until `target` is written.
pub fn copy_unmodified(page: &Page, target: &QPdf) -> Page {
    for key in INHERITABLE_KEYS {
        if page.dictionary().get(key).is_some() {
            continue;
        }
        if let Some(value) = page.inherited(key) {
            page.dictionary().set(key, value);
        }
    }

    let copied: QPdfObject = target.copy_from_foreign(page.dictionary()).into();
    Page::from_parts(target.clone(), QPdfDictionary::from(copied))
}

/// Encoding inferred from an image stream's declared filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// `/DCTDecode`: the stream is a JPEG file
    Jpeg,
    /// Anything else, assumed to be raster data
    Raster,
}

impl ImageEncoding {
    fn from_filter(filter: Option<&str>) -> Self {
        match filter {
            Some("/DCTDecode") => ImageEncoding::Jpeg,
            _ => ImageEncoding::Raster,
        }
    }

    /// File extension used for extracted images
    pub fn extension(&self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "jpg",
            ImageEncoding::Raster => "png",
        }
    }
}

/// An image XObject pulled out of a page's resources
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Resource name, e.g. `/Im1`
    pub name: String,
    pub encoding: ImageEncoding,
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    /// Colour components per pixel when the colour space is a device space
    pub components: Option<u32>,
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    fn from_entry(entry: &ResourceEntry) -> Result<Self> {
        let dimension = |key: &str| {
            entry
                .integer(key)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0)
        };
        let components = match entry.color_space().as_deref() {
            Some("/DeviceGray") => Some(1),
            Some("/DeviceRGB") => Some(3),
            Some("/DeviceCMYK") => Some(4),
            _ => None,
        };

        Ok(Self {
            name: entry.name().to_string(),
            encoding: ImageEncoding::from_filter(entry.filter().as_deref()),
            width: dimension("/Width"),
            height: dimension("/Height"),
            bits_per_component: dimension("/BitsPerComponent"),
            components,
            data: entry.raw_data()?,
        })
    }

    /// Bytes to store in the output archive.
    ///
    /// JPEG streams are written unchanged. 8-bit gray or RGB raster data is
    /// encoded as PNG; other raster layouts are written as decoded stream
    /// bytes and are not guaranteed to open as PNG.
    pub fn into_file_bytes(self) -> Result<Vec<u8>> {
        if self.encoding == ImageEncoding::Jpeg || self.bits_per_component != 8 {
            return Ok(self.data);
        }

        let expected = self.width as usize * self.height as usize;
        let image = match self.components {
            Some(1) if self.data.len() == expected => {
                GrayImage::from_raw(self.width, self.height, self.data)
                    .map(DynamicImage::ImageLuma8)
            }
            Some(3) if self.data.len() == expected * 3 => {
                RgbImage::from_raw(self.width, self.height, self.data)
                    .map(DynamicImage::ImageRgb8)
            }
            _ => return Ok(self.data),
        };

        let image = image.ok_or_else(|| Error::Parse {
            reason: "Image dimensions do not match stream length".to_string(),
        })?;
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

/// Images referenced from a page's XObject resources.
///
/// Each call starts a fresh pass over the resource dictionary; stream data
/// is read as items are pulled.
pub fn extract_images(page: &Page) -> impl Iterator<Item = Result<EmbeddedImage>> {
    page.resource_entries()
        .into_iter()
        .filter(|entry| entry.is_image())
        .map(|entry| EmbeddedImage::from_entry(&entry))
}
