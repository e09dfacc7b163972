use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use rusttype::{Font, Scale, point};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::ContractConfig;
use crate::error::{ContractError, Result};

pub const BODY_SIZE: f32 = 11.0;
pub const CONDITIONS_SIZE: f32 = 8.0;
pub const LABEL_SIZE: f32 = 11.0;
pub const SCRIPT_SIZE: f32 = 16.0;
pub const TITLE_SIZE: f32 = 18.0;

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

/// A loaded TrueType font at a fixed point size. The same glyph metrics
/// back both `text_width` measurement and the `Widths` array embedded into
/// the document, so measured text and drawn text cannot disagree.
pub struct FontSpec {
    data: Vec<u8>,
    font: Font<'static>,
    pub size: f32,
    units_per_em: f32,
    // ascent - descent in unscaled font units; rusttype scales relative to
    // this rather than to the em square
    pixel_height_units: f32,
}

impl FontSpec {
    pub fn load(path: &Path, size: f32) -> Result<FontSpec> {
        let data = fs::read(path)?;
        let font = Font::try_from_vec(data.clone())
            .ok_or_else(|| ContractError::Font(path.display().to_string()))?;
        let units_per_em = font.units_per_em() as f32;
        let vm = font.v_metrics_unscaled();
        Ok(FontSpec {
            data,
            font,
            size,
            units_per_em,
            pixel_height_units: vm.ascent - vm.descent,
        })
    }

    pub(crate) fn rt_font(&self) -> &Font<'static> {
        &self.font
    }

    /// rusttype `Scale` equivalent to drawing this font at `size` points in
    /// a PDF, where sizes are per em square.
    pub(crate) fn scale_at(&self, size: f32) -> Scale {
        Scale::uniform(size * self.pixel_height_units / self.units_per_em)
    }

    pub(crate) fn scale(&self) -> Scale {
        self.scale_at(self.size)
    }

    pub fn line_height(&self) -> f32 {
        self.line_height_at(self.size)
    }

    pub fn line_height_at(&self, size: f32) -> f32 {
        let vm = self.font.v_metrics(self.scale_at(size));
        vm.ascent - vm.descent + vm.line_gap
    }

    pub fn ascent(&self) -> f32 {
        self.ascent_at(self.size)
    }

    pub fn ascent_at(&self, size: f32) -> f32 {
        self.font.v_metrics(self.scale_at(size)).ascent
    }

    /// Width of `text` in points when drawn at this spec's size.
    pub fn text_width(&self, text: &str) -> f32 {
        self.text_width_at(text, self.size)
    }

    pub fn text_width_at(&self, text: &str, size: f32) -> f32 {
        self.font
            .layout(text, self.scale_at(size), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Embed this font into `doc` as a simple TrueType font with a
    /// WinAnsi-compatible `Widths` array and the raw font program attached.
    pub fn embed(&self, doc: &mut Document, base_name: &str) -> Result<ObjectId> {
        let scale_1000 = self.scale_at(1000.0);
        let widths: Vec<Object> = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                let advance = self
                    .font
                    .glyph(win_ansi_char(code))
                    .scaled(scale_1000)
                    .h_metrics()
                    .advance_width;
                Object::Integer(advance.round() as i64)
            })
            .collect();
        let vm_1000 = self.font.v_metrics(scale_1000);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.data)?;
        let compressed = encoder.finish()?;

        let font_file_id = doc.add_object(Stream::new(
            dictionary! {
                "Length1" => self.data.len() as i64,
                "Filter" => "FlateDecode",
            },
            compressed,
        ));
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_name,
            "Flags" => 32,
            "FontBBox" => vec![(-1000_i64).into(), (-400_i64).into(), 2000_i64.into(), 1200_i64.into()],
            "ItalicAngle" => 0,
            "Ascent" => vm_1000.ascent.round() as i64,
            "Descent" => vm_1000.descent.round() as i64,
            "CapHeight" => vm_1000.ascent.round() as i64,
            "StemV" => 80,
            "FontFile2" => Object::Reference(font_file_id),
        });
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => base_name,
            "FirstChar" => FIRST_CHAR as i64,
            "LastChar" => LAST_CHAR as i64,
            "Widths" => widths,
            "FontDescriptor" => Object::Reference(descriptor_id),
            "Encoding" => "WinAnsiEncoding",
        });
        Ok(font_id)
    }
}

/// Unicode character a WinAnsi byte renders as. Codes 0xA0..=0xFF follow
/// Latin-1; the 0x80..=0x9F block is left as spaces since nothing drawn by
/// this crate uses it.
fn win_ansi_char(code: u8) -> char {
    match code {
        32..=126 => code as char,
        0xA0..=0xFF => char::from_u32(code as u32).unwrap_or(' '),
        _ => ' ',
    }
}

/// Byte encoding used for every text string drawn into the document; the
/// inverse of [`win_ansi_char`] with `?` for anything unrepresentable.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            32..=126 => c as u8,
            0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

/// The four font roles the contract draws with, loaded from the configured
/// fonts directory. Body and conditions share one face at different sizes.
pub struct FontCatalog {
    pub body: FontSpec,
    pub conditions: FontSpec,
    pub label: FontSpec,
    pub script: FontSpec,
}

impl FontCatalog {
    pub fn load(config: &ContractConfig) -> Result<FontCatalog> {
        let dir = &config.fonts_dir;
        Ok(FontCatalog {
            body: FontSpec::load(&dir.join(&config.body_font), BODY_SIZE)?,
            conditions: FontSpec::load(&dir.join(&config.body_font), CONDITIONS_SIZE)?,
            label: FontSpec::load(&dir.join(&config.bold_font), LABEL_SIZE)?,
            script: FontSpec::load(&dir.join(&config.script_font), SCRIPT_SIZE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn body_font() -> FontSpec {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fonts")
            .join("DejaVuSans.ttf");
        FontSpec::load(&path, BODY_SIZE).unwrap()
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(body_font().text_width(""), 0.0);
    }

    #[test]
    fn wide_glyphs_measure_wider_than_narrow_ones() {
        let font = body_font();
        assert!(font.text_width("WWWW") > font.text_width("iiii"));
        assert!(font.text_width("Walmart/John Doe") > font.text_width("Walmart"));
    }

    #[test]
    fn width_scales_with_point_size() {
        let font = body_font();
        let at_11 = font.text_width_at("Best Buy/Richard Roe", 11.0);
        let at_22 = font.text_width_at("Best Buy/Richard Roe", 22.0);
        assert!((at_22 - 2.0 * at_11).abs() < 0.01);
    }

    #[test]
    fn line_height_is_at_least_the_point_size() {
        let font = body_font();
        assert!(font.line_height() >= font.size);
        assert!(font.ascent() > 0.0);
    }

    #[test]
    fn win_ansi_round_trips_latin_text() {
        let bytes = encode_win_ansi("Price: $150 · naïve");
        let back: String = bytes.iter().map(|&b| win_ansi_char(b)).collect();
        assert_eq!(back, "Price: $150 · naïve");
        assert_eq!(encode_win_ansi("✓"), b"?");
    }
}
