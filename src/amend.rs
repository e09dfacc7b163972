//! Amendment passes against a composed contract: reopen the saved document,
//! rasterize the signer's handwritten-style text, embed it over the reserved
//! region and save in place. Each call is a full load-draw-save; a failure
//! before the save leaves the artifact exactly as it was.

use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use log::info;
use lopdf::Document;
use lopdf::content::Operation;
use rusttype::point;

use crate::artifact::ArtifactHandle;
use crate::draw;
use crate::error::{ContractError, Result};
use crate::fonts::{FontCatalog, FontSpec};
use crate::layout::LayoutPlan;
use crate::trade::Signee;

// Pixels per point when rasterizing signature text.
const RASTER_SCALE: f32 = 2.0;
const RASTER_PADDING: i32 = 4;

pub struct SignatureAmender<'a> {
    fonts: &'a FontCatalog,
    plan: &'a LayoutPlan,
}

impl<'a> SignatureAmender<'a> {
    pub fn new(fonts: &'a FontCatalog, plan: &'a LayoutPlan) -> SignatureAmender<'a> {
        SignatureAmender { fonts, plan }
    }

    /// Draw `signature` into the region reserved for `signee` and re-save
    /// the artifact under the same path. Calling this twice for one role
    /// stacks the drawings; the storage-level result is last-write-wins.
    pub fn add_signature(
        &self,
        handle: &mut ArtifactHandle,
        signature: &str,
        signee: Signee,
    ) -> Result<()> {
        let region = self.plan.signature_region(signee);
        let script = &self.fonts.script;
        let width = script.text_width(signature);
        if width > region.width {
            return Err(ContractError::LayoutOverflow {
                region: "signature-line",
                text: signature.to_string(),
                width,
                max: region.width,
            });
        }

        let mut doc = Document::load(handle.path())?;
        let pages = doc.get_pages();
        let &page_id = pages.get(&1).ok_or(ContractError::MissingPage)?;

        let raster = render_signature_image(script, signature);
        let (w_px, h_px) = raster.dimensions();
        let xobject_id = draw::embed_rgba_image(&mut doc, &raster)?;
        let name = format!("Sig{signee}");
        draw::add_xobject_resource(&mut doc, page_id, &name, xobject_id)?;

        let geometry = self.plan.geometry;
        let mut ops: Vec<Operation> = Vec::new();
        draw::image_ops(
            &mut ops,
            &name,
            w_px as f32 / RASTER_SCALE,
            h_px as f32 / RASTER_SCALE,
            region.x,
            geometry.pdf_y(region.bottom()),
        );
        draw::append_content_stream(&mut doc, page_id, ops)?;
        doc.save(handle.path())?;
        handle.mark_signed(signee);
        info!(
            "{} signature added to {}",
            signee,
            handle.path().display()
        );
        Ok(())
    }
}

/// Rasterize `text` in the script font onto a transparent canvas sized to
/// the glyph bounding box. Drawn at double resolution and placed at half
/// scale so the strokes stay crisp.
fn render_signature_image(script: &FontSpec, text: &str) -> RgbaImage {
    let scale = script.scale_at(script.size * RASTER_SCALE);
    let glyphs: Vec<_> = script
        .rt_font()
        .layout(text, scale, point(0.0, 0.0))
        .collect();
    let boxes: Vec<_> = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).collect();
    let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
        boxes.iter().map(|bb| bb.min.x).min(),
        boxes.iter().map(|bb| bb.max.x).max(),
        boxes.iter().map(|bb| bb.min.y).min(),
        boxes.iter().map(|bb| bb.max.y).max(),
    ) else {
        // Nothing visible to draw; keep the pass harmless.
        return ImageBuffer::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
    };

    let width = (max_x - min_x + 2 * RASTER_PADDING).max(1) as u32;
    let height = (max_y - min_y + 2 * RASTER_PADDING).max(1) as u32;
    let mut image: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    draw_text_mut(
        &mut image,
        Rgba([0, 0, 0, 255]),
        RASTER_PADDING - min_x,
        RASTER_PADDING - min_y,
        scale,
        script.rt_font(),
        text,
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractConfig;
    use crate::layout::PageGeometry;
    use std::path::PathBuf;

    fn catalog() -> FontCatalog {
        let config = ContractConfig {
            fonts_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fonts"),
            ..ContractConfig::default()
        };
        FontCatalog::load(&config).unwrap()
    }

    #[test]
    fn rasterized_signature_has_glyph_sized_canvas() {
        let fonts = catalog();
        let image = render_signature_image(&fonts.script, "John Doe");
        let (w, h) = image.dimensions();
        assert!(w > 10 && h > 10);
        assert!(image.pixels().any(|p| p.0[3] > 0), "no ink on the canvas");

        let longer = render_signature_image(&fonts.script, "John Doe Senior");
        assert!(longer.dimensions().0 > w);
    }

    #[test]
    fn whitespace_signature_renders_an_empty_canvas() {
        let fonts = catalog();
        let image = render_signature_image(&fonts.script, "   ");
        assert_eq!(image.dimensions(), (1, 1));
    }

    #[test]
    fn overflow_is_rejected_before_the_file_is_touched() {
        let fonts = catalog();
        let plan = LayoutPlan::new(PageGeometry::letter(), &fonts, 48.0);
        let amender = SignatureAmender::new(&fonts, &plan);
        let mut handle = ArtifactHandle::new(PathBuf::from("does-not-exist.pdf"));
        let err = amender
            .add_signature(&mut handle, &"M".repeat(400), Signee::Buyer)
            .unwrap_err();
        assert!(matches!(err, ContractError::LayoutOverflow { .. }));
        assert!(!handle.is_signed_by(Signee::Buyer));
    }
}
