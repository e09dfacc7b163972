//! Thin helpers over lopdf content-stream operations: text lines and
//! blocks, rules, image placement, image XObject embedding and the
//! non-destructive append of a new content stream to an existing page.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::io::Write;

use crate::error::Result;
use crate::fonts::{FontSpec, encode_win_ansi};
use crate::layout::{PageGeometry, Region};

#[derive(Debug, Clone, Copy)]
pub enum Align {
    Left,
    Center,
}

/// One line of text with its baseline at `(x, baseline_y)` in PDF
/// coordinates.
pub fn text_line(
    ops: &mut Vec<Operation>,
    font_res: &str,
    size: f32,
    x: f32,
    baseline_y: f32,
    text: &str,
) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font_res.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), baseline_y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Lay the given lines into `region` top to bottom at the font's line
/// height. Empty lines advance the cursor without emitting operations.
pub fn text_block(
    ops: &mut Vec<Operation>,
    font_res: &str,
    font: &FontSpec,
    region: Region,
    lines: &[&str],
    align: Align,
    geometry: PageGeometry,
) {
    let line_height = font.line_height();
    let ascent = font.ascent();
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let x = match align {
            Align::Left => region.x,
            Align::Center => region.x + (region.width - font.text_width(line)) / 2.0,
        };
        let baseline = geometry.pdf_y(region.y + ascent + line_height * i as f32);
        text_line(ops, font_res, font.size, x, baseline, line);
    }
}

/// Horizontal rule between two points, one point wide.
pub fn rule(ops: &mut Vec<Operation>, x1: f32, x2: f32, y: f32) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("w", vec![1.into()]));
    ops.push(Operation::new("m", vec![x1.into(), y.into()]));
    ops.push(Operation::new("l", vec![x2.into(), y.into()]));
    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

/// Place a previously embedded image XObject with its bottom-left corner at
/// `(x, y)` in PDF coordinates.
pub fn image_ops(ops: &mut Vec<Operation>, name: &str, width: f32, height: f32, x: f32, y: f32) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![
            width.into(),
            0.0_f32.into(),
            0.0_f32.into(),
            height.into(),
            x.into(),
            y.into(),
        ],
    ));
    ops.push(Operation::new("Do", vec![name.into()]));
    ops.push(Operation::new("Q", vec![]));
}

/// Embed an RGBA image as a DeviceRGB XObject with its alpha channel as a
/// separate SMask, both zlib-compressed. The image is flipped vertically to
/// match the PDF coordinate system.
pub fn embed_rgba_image(doc: &mut Document, image: &RgbaImage) -> Result<ObjectId> {
    let mut flipped = image.clone();
    image::imageops::flip_vertical_in_place(&mut flipped);
    let (width, height) = flipped.dimensions();

    let mut rgb_buf = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha_buf = Vec::with_capacity((width * height) as usize);
    for pixel in flipped.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb_buf.extend_from_slice(&[r, g, b]);
        alpha_buf.push(a);
    }

    let mut rgb_encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    rgb_encoder.write_all(&rgb_buf)?;
    let compressed_rgb = rgb_encoder.finish()?;

    let mut alpha_encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    alpha_encoder.write_all(&alpha_buf)?;
    let compressed_alpha = alpha_encoder.finish()?;

    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        compressed_alpha,
    ));
    let xobject_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
            "SMask" => Object::Reference(smask_id),
        },
        compressed_rgb,
    ));
    Ok(xobject_id)
}

/// Register `xobject_id` under `name` in the page's XObject resources,
/// creating the dictionaries if the page has none yet.
pub fn add_xobject_resource(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    xobject_id: ObjectId,
) -> Result<()> {
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    if !page.has(b"Resources") {
        page.set("Resources", Object::Dictionary(Dictionary::new()));
    }
    let resources = page.get_mut(b"Resources")?.as_dict_mut()?;
    if !resources.has(b"XObject") {
        resources.set("XObject", Object::Dictionary(Dictionary::new()));
    }
    let xobjects = resources.get_mut(b"XObject")?.as_dict_mut()?;
    xobjects.set(name.as_bytes().to_vec(), Object::Reference(xobject_id));
    Ok(())
}

/// Append `ops` to the page as an additional content stream, keeping every
/// existing stream in place.
pub fn append_content_stream(
    doc: &mut Document,
    page_id: ObjectId,
    ops: Vec<Operation>,
) -> Result<()> {
    let encoded = Content { operations: ops }.encode()?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    let new_contents = match page.remove(b"Contents") {
        Some(Object::Reference(existing)) => Object::Array(vec![
            Object::Reference(existing),
            Object::Reference(stream_id),
        ]),
        Some(Object::Array(mut array)) => {
            array.push(Object::Reference(stream_id));
            Object::Array(array)
        }
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", new_contents);
    Ok(())
}
