//! Region table for the contract page. Everything here is arithmetic over
//! page geometry and font line heights; the plan is computed once and shared
//! by the composer and the amender so both agree on where every block goes.

use crate::fonts::FontCatalog;
use crate::trade::Signee;

pub const MARGIN: f32 = 50.0;
pub const SECTION_PADDING: f32 = 30.0;

// US Letter, in points.
const LETTER_WIDTH: f32 = 612.0;
const LETTER_HEIGHT: f32 = 792.0;

// Line counts the bands are sized for.
const BODY_LINES: f32 = 7.0;
const CONDITION_LINES: f32 = 2.0;

// The label column is this much wider than the left margin.
const LABEL_COLUMN_EXTRA: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub padding: f32,
}

impl PageGeometry {
    pub fn letter() -> PageGeometry {
        PageGeometry {
            width: LETTER_WIDTH,
            height: LETTER_HEIGHT,
            margin: MARGIN,
            padding: SECTION_PADDING,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Convert a top-down y coordinate into the bottom-up coordinate PDF
    /// content streams use.
    pub fn pdf_y(&self, top_down_y: f32) -> f32 {
        self.height - top_down_y
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::letter()
    }
}

/// Axis-aligned rectangle in top-down page coordinates; `y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// The full region table. Bands stack strictly top to bottom: each band's
/// top edge is the previous band's bottom edge plus the section padding, so
/// regions cannot overlap by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub geometry: PageGeometry,
    pub header: Region,
    pub address: Region,
    pub body_left: Region,
    pub body_right: Region,
    pub conditions: Region,
    pub more_conditions: Region,
    signature_y: [f32; 3],
    script_line_height: f32,
}

impl LayoutPlan {
    pub fn new(geometry: PageGeometry, fonts: &FontCatalog, header_height: f32) -> LayoutPlan {
        let margin = geometry.margin;
        let pad = geometry.padding;
        let width = geometry.content_width();
        let body_lh = fonts.body.line_height();
        let cond_lh = fonts.conditions.line_height();
        let label_lh = fonts.label.line_height();
        let script_lh = fonts.script.line_height();

        let header = Region {
            x: margin,
            y: margin,
            width,
            height: header_height,
        };
        let address = Region {
            x: margin,
            y: header.bottom() + pad,
            width,
            height: body_lh + pad,
        };
        let body_left = Region {
            x: margin,
            y: address.bottom() + pad,
            width: margin + LABEL_COLUMN_EXTRA,
            height: body_lh * BODY_LINES + pad,
        };
        // The value column runs to the page edge so long fields are measured
        // against all the space that is actually there.
        let body_right = Region {
            x: body_left.right(),
            y: body_left.y,
            width: geometry.width - body_left.right(),
            height: body_left.height,
        };
        let conditions = Region {
            x: margin,
            y: body_left.bottom() + pad,
            width,
            height: cond_lh * CONDITION_LINES + pad,
        };
        let more_conditions = Region {
            x: margin,
            y: conditions.bottom() + pad,
            width,
            height: cond_lh * CONDITION_LINES + pad,
        };

        // One slot per signer: room for the rule and printed label, then the
        // handwritten line above the next rule.
        let slot = label_lh * 2.0 + script_lh;
        let first = more_conditions.bottom() + pad;
        let signature_y = [first, first + slot, first + 2.0 * slot];

        LayoutPlan {
            geometry,
            header,
            address,
            body_left,
            body_right,
            conditions,
            more_conditions,
            signature_y,
            script_line_height: script_lh,
        }
    }

    /// Top-down y of the signature rule for `signee`.
    pub fn signature_baseline(&self, signee: Signee) -> f32 {
        self.signature_y[signee.index()]
    }

    /// Region reserved for the handwritten signature text, sitting one
    /// section padding above the rule.
    pub fn signature_region(&self, signee: Signee) -> Region {
        Region {
            x: self.geometry.margin,
            y: self.signature_baseline(signee) - self.geometry.padding,
            width: self.geometry.width - self.geometry.margin,
            height: self.script_line_height,
        }
    }

    /// The vertically stacked bands, top to bottom. The two body columns
    /// share one band; `body_left` stands in for it here.
    pub fn bands(&self) -> [(&'static str, Region); 5] {
        [
            ("header", self.header),
            ("address", self.address),
            ("body", self.body_left),
            ("conditions", self.conditions),
            ("more-conditions", self.more_conditions),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractConfig;
    use std::path::PathBuf;

    fn catalog() -> FontCatalog {
        let config = ContractConfig {
            fonts_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fonts"),
            ..ContractConfig::default()
        };
        FontCatalog::load(&config).unwrap()
    }

    fn plan() -> LayoutPlan {
        LayoutPlan::new(PageGeometry::letter(), &catalog(), 48.0)
    }

    // Positions are sums of a handful of f32 terms; compare within a
    // hundredth of a point.
    const TOL: f32 = 0.01;

    #[test]
    fn bands_stack_with_exactly_one_padding_between() {
        let plan = plan();
        let bands = plan.bands();
        for pair in bands.windows(2) {
            let (_, above) = pair[0];
            let (name, below) = pair[1];
            assert!(below.y >= above.bottom(), "{name} overlaps the band above");
            assert!(
                (below.y - above.bottom() - SECTION_PADDING).abs() < TOL,
                "{name} is not one padding below its predecessor"
            );
        }
    }

    #[test]
    fn body_columns_split_one_band() {
        let plan = plan();
        assert_eq!(plan.body_left.y, plan.body_right.y);
        assert_eq!(plan.body_left.height, plan.body_right.height);
        assert_eq!(plan.body_left.right(), plan.body_right.x);
        assert_eq!(plan.body_right.right(), plan.geometry.width);
        assert_eq!(plan.body_left.width, MARGIN + 45.0);
    }

    #[test]
    fn recomputing_the_plan_is_bit_identical() {
        let fonts = catalog();
        let a = LayoutPlan::new(PageGeometry::letter(), &fonts, 48.0);
        let b = LayoutPlan::new(PageGeometry::letter(), &fonts, 48.0);
        assert_eq!(a, b);

        let reloaded = catalog();
        let c = LayoutPlan::new(PageGeometry::letter(), &reloaded, 48.0);
        assert_eq!(a, c);
    }

    #[test]
    fn signature_baselines_descend_in_role_order_with_fixed_spacing() {
        let plan = plan();
        let fonts = catalog();
        let buyer = plan.signature_baseline(Signee::Buyer);
        let seller = plan.signature_baseline(Signee::Seller);
        let admin = plan.signature_baseline(Signee::Admin);
        assert!(buyer < seller && seller < admin);

        let slot = fonts.label.line_height() * 2.0 + fonts.script.line_height();
        assert!((seller - buyer - slot).abs() < TOL);
        assert!((admin - seller - slot).abs() < TOL);

        let first = plan.more_conditions.bottom() + SECTION_PADDING;
        assert!((buyer - first).abs() < TOL);
    }

    #[test]
    fn signature_regions_sit_above_their_rules() {
        let plan = plan();
        for signee in Signee::ALL {
            let region = plan.signature_region(signee);
            let baseline = plan.signature_baseline(signee);
            assert!((baseline - region.y - SECTION_PADDING).abs() < TOL);
            assert!(region.bottom() <= baseline);
            assert_eq!(region.right(), plan.geometry.width);
        }
    }

    #[test]
    fn everything_fits_on_the_page() {
        let plan = plan();
        let lowest = plan.signature_baseline(Signee::Admin);
        assert!(lowest < plan.geometry.height - plan.geometry.margin);
    }
}
