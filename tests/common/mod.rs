//! Generates small PDFs for tests and benchmarks

#![allow(dead_code)]

use std::io::Write;

/// Bytes of a tiny JFIF file; only the markers matter since nothing decodes it
pub const SAMPLE_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

#[derive(Debug, Clone)]
enum SampleXObject {
    Jpeg,
    RawRgb { width: u32, height: u32 },
    Form,
}

/// Builder for a PDF with text pages and optional XObjects on page 1
#[derive(Debug, Clone)]
pub struct SamplePdf {
    pages: usize,
    rotations: Vec<i64>,
    tree_rotation: Option<i64>,
    xobjects: Vec<SampleXObject>,
}

impl SamplePdf {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            rotations: Vec::new(),
            tree_rotation: None,
            xobjects: Vec::new(),
        }
    }

    /// Per-page `/Rotate` values, applied in page order
    pub fn with_rotations(mut self, rotations: &[i64]) -> Self {
        self.rotations = rotations.to_vec();
        self
    }

    /// `/Rotate` on the `/Pages` node, inherited by every page
    pub fn with_tree_rotation(mut self, rotation: i64) -> Self {
        self.tree_rotation = Some(rotation);
        self
    }

    /// DCTDecode image XObject on page 1
    pub fn with_jpeg(mut self) -> Self {
        self.xobjects.push(SampleXObject::Jpeg);
        self
    }

    /// Unfiltered 8-bit DeviceRGB image XObject on page 1
    pub fn with_raw_rgb(mut self, width: u32, height: u32) -> Self {
        self.xobjects.push(SampleXObject::RawRgb { width, height });
        self
    }

    /// Form XObject on page 1, which is not an image
    pub fn with_form(mut self) -> Self {
        self.xobjects.push(SampleXObject::Form);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let first_page = 4;
        let first_xobject = first_page + 2 * self.pages;
        let mut objects: Vec<Vec<u8>> = Vec::new();

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = (0..self.pages)
            .map(|i| format!("{} 0 R", first_page + 2 * i))
            .collect();
        let tree_rotation = self
            .tree_rotation
            .map(|r| format!(" /Rotate {}", r))
            .unwrap_or_default();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {}{} >>",
                kids.join(" "),
                self.pages,
                tree_rotation
            )
            .into_bytes(),
        );

        objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());

        for i in 0..self.pages {
            let xobjects = if i == 0 && !self.xobjects.is_empty() {
                let entries: Vec<String> = (0..self.xobjects.len())
                    .map(|n| format!("/X{} {} 0 R", n + 1, first_xobject + n))
                    .collect();
                format!(" /XObject << {} >>", entries.join(" "))
            } else {
                String::new()
            };
            let rotation = self
                .rotations
                .get(i)
                .map(|r| format!(" /Rotate {}", r))
                .unwrap_or_default();

            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                     /Resources << /Font << /F1 3 0 R >>{} >> /Contents {} 0 R{} >>",
                    xobjects,
                    first_page + 2 * i + 1,
                    rotation
                )
                .into_bytes(),
            );

            let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", i + 1);
            objects.push(stream("<<", content.as_bytes()));
        }

        for xobject in &self.xobjects {
            let object = match xobject {
                SampleXObject::Jpeg => stream(
                    "<< /Type /XObject /Subtype /Image /Width 1 /Height 1 \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                    SAMPLE_JPEG,
                ),
                SampleXObject::RawRgb { width, height } => {
                    let pixels = vec![0x7F; (*width * *height * 3) as usize];
                    stream(
                        &format!(
                            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceRGB /BitsPerComponent 8",
                            width, height
                        ),
                        &pixels,
                    )
                }
                SampleXObject::Form => stream(
                    "<< /Type /XObject /Subtype /Form /BBox [0 0 10 10]",
                    b"0 0 10 10 re f",
                ),
            };
            objects.push(object);
        }

        serialize(&objects)
    }
}

fn stream(dict_prefix: &str, data: &[u8]) -> Vec<u8> {
    let mut out = format!("{} /Length {} >>\nstream\n", dict_prefix, data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

fn serialize(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        write!(out, "{} 0 obj\n", i + 1).unwrap();
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref = out.len();
    write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).unwrap();
    for offset in offsets {
        write!(out, "{:010} 00000 n \n", offset).unwrap();
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    )
    .unwrap();
    out
}
