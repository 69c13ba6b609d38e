//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::HashMap;

use printpdf::*;

use crate::assets::DocumentAssets;
use crate::error::Result;
use crate::fonts::{winansi_byte, FontManager};
use crate::icons::{draw_icon, path_to_line, rounded_rect};
use crate::layout_config::{
    Element, FrameElement, ImageElement, LayoutConfig, PageLayout, RuleElement, TextElement,
};
use crate::plan::ImageSlot;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Faces text is written with: the base-14 Helvetica pair or embedded TTFs.
enum TextFaces {
    Builtin,
    Embedded { regular: FontId, bold: FontId },
}

fn rgb(c: [f32; 3]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

/// Render a LayoutConfig into PDF bytes.
///
/// Image elements whose slot has no prepared asset, or whose bytes printpdf
/// cannot encode, are skipped with a `log::warn`.
pub fn render_pdf(
    config: &LayoutConfig,
    assets: &DocumentAssets,
    fonts: &FontManager,
) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&config.title);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    // ── Register fonts ────────────────────────────────────────────────────
    let faces = match (fonts.parsed_face(false), fonts.parsed_face(true)) {
        (Some(regular), Some(bold)) => TextFaces::Embedded {
            regular: doc.add_font(regular),
            bold: doc.add_font(bold),
        },
        _ => TextFaces::Builtin,
    };

    // ── Pre-register images ───────────────────────────────────────────────
    let mut image_resources: HashMap<ImageSlot, ImageResource> = HashMap::new();
    for slot in [ImageSlot::IdentityDocument, ImageSlot::SecondaryDocument] {
        let Some(asset) = assets.get(slot) else {
            continue;
        };
        let raw = match RawImage::decode_from_bytes(&asset.bytes, &mut warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping {slot:?} image: PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);
        image_resources.insert(
            slot,
            ImageResource {
                xobj_id,
                px_width: asset.px_width,
                px_height: asset.px_height,
            },
        );
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::new();
    for page_layout in &config.pages {
        let ops = render_page_ops(
            page_layout,
            config.page_height_pt,
            &image_resources,
            &faces,
            fonts,
        );
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    for w in &warnings {
        log::debug!("printpdf: {w:?}");
    }
    Ok(bytes)
}

fn render_page_ops(
    page: &PageLayout,
    page_height: f32,
    images: &HashMap<ImageSlot, ImageResource>,
    faces: &TextFaces,
    fonts: &FontManager,
) -> Vec<Op> {
    let mut ops = Vec::new();
    for element in &page.elements {
        match element {
            Element::Text(text) => render_text(&mut ops, text, page_height, faces, fonts),
            Element::Image(img) => {
                if let Some(res) = images.get(&img.slot) {
                    render_image(&mut ops, img, res, page_height);
                }
            }
            Element::Frame(frame) => render_frame(&mut ops, frame, page_height),
            Element::Rule(rule) => render_rule(&mut ops, rule, page_height),
            Element::Icon(icon) => {
                draw_icon(&mut ops, page_height, icon);
            }
        }
    }
    ops
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF). Measurement maps
/// characters through the same [`winansi_byte`].
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().map(winansi_byte).collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn render_text(
    ops: &mut Vec<Op>,
    text: &TextElement,
    page_height: f32,
    faces: &TextFaces,
    fonts: &FontManager,
) {
    // Baseline = top of line + half leading + ascender.
    let half_leading = (text.line_height - text.font_size) / 2.0;
    let ascender = fonts.ascender_px(text.font_size, text.bold);

    for (i, line) in text.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let baseline = text.y + i as f32 * text.line_height + half_leading + ascender;

        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(text.x),
                y: Pt(page_height - baseline),
            },
        });
        ops.push(Op::SetFillColor {
            col: rgb(text.color),
        });
        match faces {
            TextFaces::Builtin => {
                let font = if text.bold {
                    BuiltinFont::HelveticaBold
                } else {
                    BuiltinFont::Helvetica
                };
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(text.font_size),
                    font,
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_winlatin(line))],
                    font,
                });
            }
            TextFaces::Embedded { regular, bold } => {
                let font = if text.bold { bold } else { regular };
                ops.push(Op::SetFontSize {
                    size: Pt(text.font_size),
                    font: font.clone(),
                });
                ops.push(Op::WriteText {
                    items: vec![TextItem::Text(line.clone())],
                    font: font.clone(),
                });
            }
        }
        ops.push(Op::EndTextSection);
    }
}

/// Largest `(width, height)` with the image's pixel aspect that fits the
/// frame, and its offset from the frame's top-left corner.
fn fit_image(frame_w: f32, frame_h: f32, px_width: u32, px_height: u32) -> (f32, f32, f32, f32) {
    let (px_w, px_h) = (px_width.max(1) as f32, px_height.max(1) as f32);
    let scale = (frame_w / px_w).min(frame_h / px_h);
    let (w, h) = (px_w * scale, px_h * scale);
    (w, h, (frame_w - w) / 2.0, (frame_h - h) / 2.0)
}

fn render_image(ops: &mut Vec<Op>, img: &ImageElement, res: &ImageResource, page_height: f32) {
    let (w, h, dx, dy) = fit_image(img.width, img.height, res.px_width, res.px_height);

    // PDF origin is bottom-left; translate_y = bottom edge of the image.
    let img_bottom_y = page_height - (img.y + dy) - h;

    // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px_dim.
    let scale = w / res.px_width.max(1) as f32;

    ops.push(Op::UseXobject {
        id: res.xobj_id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(img.x + dx)),
            translate_y: Some(Pt(img_bottom_y)),
            dpi: Some(72.0),
            scale_x: Some(scale),
            scale_y: Some(scale),
            rotate: None,
        },
    });
}

fn render_frame(ops: &mut Vec<Op>, frame: &FrameElement, page_height: f32) {
    let path = rounded_rect(frame.x, frame.y, frame.width, frame.height, frame.radius);
    let flip = |x: f32, y: f32| (x, page_height - y);

    if let Some(fill) = frame.fill_color {
        ops.push(Op::SetFillColor { col: rgb(fill) });
        let outline = path_to_line(&path, flip);
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: outline.points,
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    ops.push(Op::SetOutlineColor {
        col: rgb(frame.stroke_color),
    });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(frame.stroke_width),
    });
    ops.push(Op::DrawLine {
        line: path_to_line(&path, flip),
    });
}

fn render_rule(ops: &mut Vec<Op>, rule: &RuleElement, page_height: f32) {
    let y = page_height - rule.y;
    ops.push(Op::SetOutlineColor {
        col: rgb(rule.color),
    });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(rule.thickness),
    });
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![
                LinePoint {
                    p: Point {
                        x: Pt(rule.x1),
                        y: Pt(y),
                    },
                    bezier: false,
                },
                LinePoint {
                    p: Point {
                        x: Pt(rule.x2),
                        y: Pt(y),
                    },
                    bezier: false,
                },
            ],
            is_closed: false,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::IconKind;
    use crate::layout_config::{IconElement, RuleRole};

    #[test]
    fn render_empty_page() {
        let config = LayoutConfig::a4();
        let bytes =
            render_pdf(&config, &DocumentAssets::default(), &FontManager::default()).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        // PDF magic number
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn page_ops_keep_graphics_state_balanced() {
        let mut page = PageLayout::new(0);
        for (i, kind) in [IconKind::IdCard, IconKind::Map, IconKind::Pin, IconKind::Chevron]
            .into_iter()
            .enumerate()
        {
            page.elements.push(Element::Icon(IconElement {
                kind,
                x: 40.0 + i as f32 * 20.0,
                y: 40.0,
                size: 14.0,
                color: [0.0, 0.0, 0.0],
                stroke_width: 2.0,
            }));
            page.elements.push(Element::Rule(RuleElement {
                x1: 40.0,
                x2: 200.0,
                y: 60.0,
                thickness: 0.5,
                color: [0.5, 0.5, 0.5],
                role: RuleRole::ItemSeparator,
            }));
        }
        let fonts = FontManager::default();
        let ops = render_page_ops(&page, 841.89, &HashMap::new(), &TextFaces::Builtin, &fonts);
        let saves = ops.iter().filter(|o| matches!(o, Op::SaveGraphicsState)).count();
        let restores = ops
            .iter()
            .filter(|o| matches!(o, Op::RestoreGraphicsState))
            .count();
        assert_eq!(saves, 4);
        assert_eq!(saves, restores);
        // Rules are drawn outside any icon transform.
        let mut depth = 0;
        for op in &ops {
            match op {
                Op::SaveGraphicsState => depth += 1,
                Op::RestoreGraphicsState => depth -= 1,
                Op::DrawLine { line } if line.points.len() == 2 && !line.is_closed => {
                    if line.points[0].p.x.0 == 40.0 && line.points[1].p.x.0 == 200.0 {
                        assert_eq!(depth, 0);
                    }
                }
                _ => {}
            }
        }
    }

    #[test]
    fn missing_image_resource_is_skipped() {
        let mut page = PageLayout::new(0);
        page.elements.push(Element::Image(ImageElement {
            x: 40.0,
            y: 40.0,
            width: 160.0,
            height: 100.0,
            slot: ImageSlot::IdentityDocument,
        }));
        let fonts = FontManager::default();
        let ops = render_page_ops(&page, 841.89, &HashMap::new(), &TextFaces::Builtin, &fonts);
        assert!(ops.is_empty());
    }

    #[test]
    fn portrait_image_keeps_its_aspect() {
        // 67x107 portrait photo inside a 160x100 card frame.
        let (w, h, dx, dy) = fit_image(160.0, 100.0, 67, 107);
        assert!((h - 100.0).abs() < 1e-3);
        assert!((w / h - 67.0 / 107.0).abs() < 1e-4);
        assert!((dx - (160.0 - w) / 2.0).abs() < 1e-3);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn wide_image_is_centred_vertically() {
        let (w, h, dx, dy) = fit_image(160.0, 100.0, 400, 100);
        assert!((w - 160.0).abs() < 1e-3);
        assert!((h - 40.0).abs() < 1e-3);
        assert_eq!(dx, 0.0);
        assert!((dy - 30.0).abs() < 1e-3);
    }

    #[test]
    fn image_transform_uses_one_scale() {
        let img = ImageElement {
            x: 52.0,
            y: 300.0,
            width: 160.0,
            height: 100.0,
            slot: ImageSlot::SecondaryDocument,
        };
        let mut images = HashMap::new();
        let mut doc = PdfDocument::new("t");
        let portrait = ::image::RgbImage::from_pixel(67, 107, ::image::Rgb([90, 90, 90]));
        let mut png = Vec::new();
        ::image::DynamicImage::ImageRgb8(portrait)
            .write_to(&mut std::io::Cursor::new(&mut png), ::image::ImageFormat::Png)
            .unwrap();
        let raw = RawImage::decode_from_bytes(&png, &mut Vec::new()).unwrap();
        images.insert(
            ImageSlot::SecondaryDocument,
            ImageResource {
                xobj_id: doc.add_image(&raw),
                px_width: 67,
                px_height: 107,
            },
        );
        let mut page = PageLayout::new(0);
        page.elements.push(Element::Image(img));
        let fonts = FontManager::default();
        let ops = render_page_ops(&page, 841.89, &images, &TextFaces::Builtin, &fonts);
        match &ops[..] {
            [Op::UseXobject { transform, .. }] => {
                assert_eq!(transform.scale_x, transform.scale_y);
                let x = transform.translate_x.map(|p| p.0).unwrap_or_default();
                assert!(x > 52.0 && x < 52.0 + 160.0);
            }
            other => panic!("expected one image op, got {} ops", other.len()),
        }
    }

    #[test]
    fn winlatin_maps_latin1_and_unmappable() {
        assert_eq!(to_winlatin("\u{00FC}\u{4E16}").as_bytes(), &[0xFC, b'?']);
    }

    #[test]
    fn winlatin_maps_punctuation() {
        let s = to_winlatin("a\u{2013}b");
        assert_eq!(s.as_bytes(), &[b'a', 0x96, b'b']);
    }
}
