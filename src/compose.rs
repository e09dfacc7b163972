//! One-pass composition of the contract document: header, two-column body,
//! boilerplate conditions, signature scaffolding and the reference stamp,
//! then a single save under the date-derived filename.

use chrono::{DateTime, Utc};
use log::info;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::artifact::ArtifactHandle;
use crate::config::ContractConfig;
use crate::draw::{self, Align};
use crate::error::{ContractError, Result};
use crate::fonts::{FontCatalog, FontSpec, TITLE_SIZE};
use crate::layout::LayoutPlan;
use crate::trade::{Signee, Trade};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const BODY_LABELS: [&str; 8] = [
    "Contract ID:",
    "Date:",
    "",
    "Buyer:",
    "Seller:",
    "",
    "Price:",
    "Notes:",
];
const PRICE_TEXT: &str = "$150";
const NOTES_TEXT: &str = "Candy tastes good.";
const CONDITIONS_TEXT: &str = "All conditions apply.";
const MORE_CONDITIONS_TEXT: &str = "So do these.";

const BODY_FONT_RES: &str = "F1";
const LABEL_FONT_RES: &str = "F2";
const LOGO_RES: &str = "Logo";

/// Filename the artifact is saved under. Keyed by creation date, not trade
/// id: two trades composed on the same day write the same file and the
/// later one wins.
pub fn artifact_filename(prefix: &str, created_at: &DateTime<Utc>) -> String {
    format!("{}_{}.pdf", prefix, created_at.format(DATE_FORMAT))
}

/// Height of the header band: the logo's natural size when one is
/// configured, otherwise one title line for the brand name.
pub fn header_height(config: &ContractConfig, fonts: &FontCatalog) -> Result<f32> {
    match &config.logo {
        Some(path) => {
            let (_, h) = image::image_dimensions(path)?;
            Ok(h as f32)
        }
        None => Ok(fonts.label.line_height_at(TITLE_SIZE)),
    }
}

pub struct ContractComposer<'a> {
    config: &'a ContractConfig,
    fonts: &'a FontCatalog,
    plan: &'a LayoutPlan,
}

impl<'a> ContractComposer<'a> {
    pub fn new(
        config: &'a ContractConfig,
        fonts: &'a FontCatalog,
        plan: &'a LayoutPlan,
    ) -> ContractComposer<'a> {
        ContractComposer {
            config,
            fonts,
            plan,
        }
    }

    /// Compose the full document for `trade` and persist it. Saving is the
    /// last step, so a failed pass leaves no file behind.
    pub fn generate(&self, trade: &Trade) -> Result<ArtifactHandle> {
        let geometry = self.plan.geometry;
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let body_font_id = self.fonts.body.embed(&mut doc, "DejaVuSans")?;
        let label_font_id = self.fonts.label.embed(&mut doc, "DejaVuSans-Bold")?;

        let mut ops: Vec<Operation> = Vec::new();
        let logo_id = self.draw_header(&mut doc, &mut ops)?;
        self.draw_body(&mut ops, trade)?;
        self.draw_conditions(&mut ops);
        self.draw_signature_fields(&mut ops, trade);
        self.draw_reference_id(&mut ops, trade);

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            Content { operations: ops }.encode()?,
        ));

        let mut font_res = Dictionary::new();
        font_res.set(BODY_FONT_RES, Object::Reference(body_font_id));
        font_res.set(LABEL_FONT_RES, Object::Reference(label_font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_res));
        if let Some(id) = logo_id {
            resources.set(
                "XObject",
                Object::Dictionary(dictionary! { LOGO_RES => Object::Reference(id) }),
            );
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                geometry.width.into(),
                geometry.height.into(),
            ],
            "Resources" => resources,
            "Contents" => content_id,
        });
        let pages = doc.get_object_mut(pages_id)?.as_dict_mut()?;
        pages.set("Kids", vec![Object::Reference(page_id)]);
        pages.set("Count", 1_i64);

        doc.compress();
        let path = self
            .config
            .output_dir
            .join(artifact_filename(&self.config.filename_prefix, &trade.created_at));
        doc.save(&path)?;
        info!("contract {} written to {}", trade.display_id, path.display());
        Ok(ArtifactHandle::new(path))
    }

    fn check_width(&self, region: &'static str, font: &FontSpec, max: f32, text: &str) -> Result<()> {
        let width = font.text_width(text);
        if width > max {
            return Err(ContractError::LayoutOverflow {
                region,
                text: text.to_string(),
                width,
                max,
            });
        }
        Ok(())
    }

    fn draw_header(&self, doc: &mut Document, ops: &mut Vec<Operation>) -> Result<Option<ObjectId>> {
        let geometry = self.plan.geometry;
        let header = self.plan.header;
        let logo_id = match &self.config.logo {
            Some(path) => {
                let logo = image::open(path)?.to_rgba8();
                let (w, h) = logo.dimensions();
                let id = draw::embed_rgba_image(doc, &logo)?;
                let x = header.x + (header.width - w as f32) / 2.0;
                draw::image_ops(ops, LOGO_RES, w as f32, h as f32, x, geometry.pdf_y(header.bottom()));
                Some(id)
            }
            None => {
                let title = self.config.company_name.as_str();
                let x = header.x
                    + (header.width - self.fonts.label.text_width_at(title, TITLE_SIZE)) / 2.0;
                let baseline =
                    geometry.pdf_y(header.y + self.fonts.label.ascent_at(TITLE_SIZE));
                draw::text_line(ops, LABEL_FONT_RES, TITLE_SIZE, x, baseline, title);
                None
            }
        };

        let lines: Vec<&str> = self.config.address_lines.iter().map(String::as_str).collect();
        draw::text_block(
            ops,
            BODY_FONT_RES,
            &self.fonts.body,
            self.plan.address,
            &lines,
            Align::Center,
            geometry,
        );
        Ok(logo_id)
    }

    fn draw_body(&self, ops: &mut Vec<Operation>, trade: &Trade) -> Result<()> {
        let geometry = self.plan.geometry;
        draw::text_block(
            ops,
            BODY_FONT_RES,
            &self.fonts.body,
            self.plan.body_left,
            &BODY_LABELS,
            Align::Left,
            geometry,
        );

        let buyer_field = format!("{}/{}", trade.buyer.company_name, trade.buyer.full_name);
        let seller_field = format!("{}/{}", trade.seller.company_name, trade.seller.full_name);
        let value_width = self.plan.body_right.width;
        self.check_width("body-right", &self.fonts.body, value_width, &buyer_field)?;
        self.check_width("body-right", &self.fonts.body, value_width, &seller_field)?;

        let date = trade.created_at.format(DATE_FORMAT).to_string();
        let values = [
            trade.display_id.as_str(),
            date.as_str(),
            "",
            buyer_field.as_str(),
            seller_field.as_str(),
            "",
            PRICE_TEXT,
            NOTES_TEXT,
        ];
        draw::text_block(
            ops,
            BODY_FONT_RES,
            &self.fonts.body,
            self.plan.body_right,
            &values,
            Align::Left,
            geometry,
        );
        Ok(())
    }

    fn draw_conditions(&self, ops: &mut Vec<Operation>) {
        let geometry = self.plan.geometry;
        draw::text_block(
            ops,
            BODY_FONT_RES,
            &self.fonts.conditions,
            self.plan.conditions,
            &[CONDITIONS_TEXT],
            Align::Left,
            geometry,
        );
        draw::text_block(
            ops,
            BODY_FONT_RES,
            &self.fonts.conditions,
            self.plan.more_conditions,
            &[MORE_CONDITIONS_TEXT],
            Align::Left,
            geometry,
        );
    }

    /// Rule and printed company label per signer slot; the handwritten text
    /// itself arrives later through the amender.
    fn draw_signature_fields(&self, ops: &mut Vec<Operation>, trade: &Trade) {
        let geometry = self.plan.geometry;
        let x1 = geometry.margin;
        let x2 = geometry.width - geometry.margin;
        for signee in Signee::ALL {
            let label = match signee {
                Signee::Buyer => trade.buyer.company_name.as_str(),
                Signee::Seller => trade.seller.company_name.as_str(),
                Signee::Admin => self.config.company_name.as_str(),
            };
            let y = geometry.pdf_y(self.plan.signature_baseline(signee));
            draw::rule(ops, x1, x2, y);
            let baseline = y - self.fonts.label.ascent();
            draw::text_line(
                ops,
                LABEL_FONT_RES,
                self.fonts.label.size,
                x1,
                baseline,
                label,
            );
        }
    }

    fn draw_reference_id(&self, ops: &mut Vec<Operation>, trade: &Trade) {
        let geometry = self.plan.geometry;
        let font = &self.fonts.conditions;
        let text = format!("Reference ID: {}", trade.id.to_string().to_uppercase());
        let x = geometry.width - geometry.margin - font.text_width(&text);
        let baseline = geometry.margin + font.line_height() - font.ascent();
        draw::text_line(ops, BODY_FONT_RES, font.size, x, baseline, &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_is_prefix_plus_creation_date() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap();
        assert_eq!(artifact_filename("test", &created), "test_2024-03-01.pdf");
        assert_eq!(
            artifact_filename("contract", &created),
            "contract_2024-03-01.pdf"
        );
    }
}
