//! Coordinate transforms between a rendered page viewport and PDF user space
//!
//! Viewport coordinates have a top-left origin and are measured in pixels at
//! a render scale. PDF user space has a bottom-left origin, is measured in
//! points and ignores the page's `/Rotate` entry. Redaction boxes drawn on a
//! rendered page must be mapped back into user space before they are
//! painted into the document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Gap kept between a top/bottom watermark and the page edge, in points
pub const WATERMARK_MARGIN: f64 = 36.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Page rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),
    #[error("Render scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("Invalid page range: {0:?}")]
    InvalidPageRange(String),
    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
}

/// Page media box in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// A box anchored at the origin, e.g. `PageBox::sized(612.0, 792.0)` for US Letter
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Clockwise display rotation of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Normalise any multiple of 90 degrees (including negatives)
    pub fn from_degrees(degrees: i32) -> Result<Self, GeometryError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarter),
            _ => Err(GeometryError::InvalidRotation(degrees)),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }
}

/// Rectangle in viewport pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rectangle in PDF user space, normalised so `x0 <= x1` and `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PdfRect {
    fn from_corners((ax, ay): (f64, f64), (bx, by): (f64, f64)) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

fn check_scale(scale: f64) -> Result<(), GeometryError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidScale(scale))
    }
}

/// Size in pixels of the page rendered at `scale`
pub fn viewport_size(
    page: &PageBox,
    rotation: Rotation,
    scale: f64,
) -> Result<(f64, f64), GeometryError> {
    check_scale(scale)?;
    let (w, h) = (page.width() * scale, page.height() * scale);
    Ok(if rotation.swaps_axes() { (h, w) } else { (w, h) })
}

fn view_point_to_pdf(
    page: &PageBox,
    rotation: Rotation,
    scale: f64,
    vx: f64,
    vy: f64,
) -> (f64, f64) {
    let (dx, dy) = (vx / scale, vy / scale);
    match rotation {
        Rotation::None => (page.x0 + dx, page.y1 - dy),
        Rotation::Quarter => (page.x0 + dy, page.y0 + dx),
        Rotation::Half => (page.x1 - dx, page.y0 + dy),
        Rotation::ThreeQuarter => (page.x1 - dy, page.y1 - dx),
    }
}

fn pdf_point_to_view(
    page: &PageBox,
    rotation: Rotation,
    scale: f64,
    px: f64,
    py: f64,
) -> (f64, f64) {
    let (vx, vy) = match rotation {
        Rotation::None => (px - page.x0, page.y1 - py),
        Rotation::Quarter => (py - page.y0, px - page.x0),
        Rotation::Half => (page.x1 - px, py - page.y0),
        Rotation::ThreeQuarter => (page.y1 - py, page.x1 - px),
    };
    (vx * scale, vy * scale)
}

/// Map a rectangle drawn on the rendered page into PDF user space
pub fn viewport_to_pdf(
    rect: &ViewRect,
    page: &PageBox,
    rotation: Rotation,
    scale: f64,
) -> Result<PdfRect, GeometryError> {
    check_scale(scale)?;
    let a = view_point_to_pdf(page, rotation, scale, rect.x, rect.y);
    let b = view_point_to_pdf(page, rotation, scale, rect.x + rect.width, rect.y + rect.height);
    Ok(PdfRect::from_corners(a, b))
}

/// Map a user-space rectangle onto the rendered page
pub fn pdf_to_viewport(
    rect: &PdfRect,
    page: &PageBox,
    rotation: Rotation,
    scale: f64,
) -> Result<ViewRect, GeometryError> {
    check_scale(scale)?;
    let (ax, ay) = pdf_point_to_view(page, rotation, scale, rect.x0, rect.y0);
    let (bx, by) = pdf_point_to_view(page, rotation, scale, rect.x1, rect.y1);
    Ok(ViewRect {
        x: ax.min(bx),
        y: ay.min(by),
        width: (ax - bx).abs(),
        height: (ay - by).abs(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkPosition {
    /// Centered and running corner to corner
    #[default]
    Center,
    Top,
    Bottom,
}

/// Where to start drawing watermark text and at what angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Baseline origin in user space
    pub x: f64,
    pub y: f64,
    /// Counter-clockwise text rotation
    pub angle_degrees: f64,
}

/// Place a `text_width` × `text_height` watermark on an unrotated page
pub fn watermark_placement(
    page: &PageBox,
    text_width: f64,
    text_height: f64,
    position: WatermarkPosition,
) -> Placement {
    let centered_x = page.x0 + (page.width() - text_width) / 2.0;
    match position {
        WatermarkPosition::Center => {
            let angle = page.height().atan2(page.width());
            let (sin, cos) = angle.sin_cos();
            let cx = page.x0 + page.width() / 2.0;
            let cy = page.y0 + page.height() / 2.0;
            // Shift so the rotated text box is centered on the page
            Placement {
                x: cx - (text_width / 2.0 * cos - text_height / 2.0 * sin),
                y: cy - (text_width / 2.0 * sin + text_height / 2.0 * cos),
                angle_degrees: angle.to_degrees(),
            }
        }
        WatermarkPosition::Top => Placement {
            x: centered_x,
            y: page.y1 - WATERMARK_MARGIN - text_height,
            angle_degrees: 0.0,
        },
        WatermarkPosition::Bottom => Placement {
            x: centered_x,
            y: page.y0 + WATERMARK_MARGIN,
            angle_degrees: 0.0,
        },
    }
}

/// Parse a 1-based page selection like `"1-3,5,8-"` into sorted unique pages.
/// `"all"`, `"*"` and an empty string select every page.
pub fn parse_page_ranges(selection: &str, page_count: usize) -> Result<Vec<usize>, GeometryError> {
    let selection = selection.trim();
    if selection.is_empty() || selection == "*" || selection.eq_ignore_ascii_case("all") {
        return Ok((1..=page_count).collect());
    }

    let invalid = || GeometryError::InvalidPageRange(selection.to_string());
    let parse = |s: &str| s.trim().parse::<usize>().map_err(|_| invalid());
    let check = |page: usize| {
        if page == 0 || page > page_count {
            Err(GeometryError::PageOutOfRange {
                page,
                count: page_count,
            })
        } else {
            Ok(page)
        }
    };

    let mut pages = BTreeSet::new();
    for part in selection.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid());
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start = check(parse(start)?)?;
                let end = if end.trim().is_empty() {
                    page_count
                } else {
                    check(parse(end)?)?
                };
                if start > end {
                    return Err(invalid());
                }
                pages.extend(start..=end);
            }
            None => {
                pages.insert(check(parse(part)?)?);
            }
        }
    }
    Ok(pages.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn letter() -> PageBox {
        PageBox::sized(612.0, 792.0)
    }

    fn assert_rect(actual: PdfRect, expected: (f64, f64, f64, f64)) {
        let (x0, y0, x1, y1) = expected;
        assert!(
            (actual.x0 - x0).abs() < EPS
                && (actual.y0 - y0).abs() < EPS
                && (actual.x1 - x1).abs() < EPS
                && (actual.y1 - y1).abs() < EPS,
            "got {actual:?}, expected {expected:?}"
        );
    }

    #[test]
    fn test_rotation_normalisation() {
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::ThreeQuarter);
        assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Quarter);
        assert!(Rotation::from_degrees(45).is_err());
    }

    #[test]
    fn test_viewport_size_swaps_for_quarter_turns() {
        assert_eq!(viewport_size(&letter(), Rotation::None, 2.0).unwrap(), (1224.0, 1584.0));
        assert_eq!(viewport_size(&letter(), Rotation::Quarter, 1.0).unwrap(), (792.0, 612.0));
        assert!(viewport_size(&letter(), Rotation::None, 0.0).is_err());
    }

    #[test]
    fn test_unrotated_flips_y() {
        let rect = ViewRect { x: 100.0, y: 50.0, width: 200.0, height: 100.0 };
        let pdf = viewport_to_pdf(&rect, &letter(), Rotation::None, 2.0).unwrap();
        assert_rect(pdf, (50.0, 717.0, 150.0, 767.0));
    }

    #[test]
    fn test_quarter_turn_corner() {
        // Top-left of the rotated view is the bottom-left corner of the page
        let rect = ViewRect { x: 0.0, y: 0.0, width: 10.0, height: 20.0 };
        let pdf = viewport_to_pdf(&rect, &letter(), Rotation::Quarter, 1.0).unwrap();
        assert_rect(pdf, (0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn test_half_and_three_quarter_turns() {
        let rect = ViewRect { x: 0.0, y: 0.0, width: 10.0, height: 20.0 };
        let half = viewport_to_pdf(&rect, &letter(), Rotation::Half, 1.0).unwrap();
        assert_rect(half, (602.0, 0.0, 612.0, 20.0));

        let three = viewport_to_pdf(&rect, &letter(), Rotation::ThreeQuarter, 1.0).unwrap();
        assert_rect(three, (592.0, 782.0, 612.0, 792.0));
    }

    #[test]
    fn test_round_trip_with_offset_media_box() {
        let page = PageBox::new(10.0, 20.0, 310.0, 420.0);
        let rect = ViewRect { x: 30.0, y: 45.0, width: 60.0, height: 15.0 };
        for degrees in [0, 90, 180, 270] {
            let rotation = Rotation::from_degrees(degrees).unwrap();
            let pdf = viewport_to_pdf(&rect, &page, rotation, 1.5).unwrap();
            let back = pdf_to_viewport(&pdf, &page, rotation, 1.5).unwrap();
            assert!((back.x - rect.x).abs() < EPS, "rotation {degrees}");
            assert!((back.y - rect.y).abs() < EPS, "rotation {degrees}");
            assert!((back.width - rect.width).abs() < EPS, "rotation {degrees}");
            assert!((back.height - rect.height).abs() < EPS, "rotation {degrees}");
        }
    }

    #[test]
    fn test_watermark_center_is_centered() {
        let page = letter();
        let (tw, th) = (300.0, 40.0);
        let p = watermark_placement(&page, tw, th, WatermarkPosition::Center);
        let angle = p.angle_degrees.to_radians();
        let cx = p.x + tw / 2.0 * angle.cos() - th / 2.0 * angle.sin();
        let cy = p.y + tw / 2.0 * angle.sin() + th / 2.0 * angle.cos();
        assert!((cx - 306.0).abs() < EPS);
        assert!((cy - 396.0).abs() < EPS);
        assert!(p.angle_degrees > 45.0 && p.angle_degrees < 60.0);
    }

    #[test]
    fn test_watermark_top_and_bottom() {
        let top = watermark_placement(&letter(), 100.0, 20.0, WatermarkPosition::Top);
        assert_eq!((top.x, top.y), (256.0, 792.0 - WATERMARK_MARGIN - 20.0));
        let bottom = watermark_placement(&letter(), 100.0, 20.0, WatermarkPosition::Bottom);
        assert_eq!(bottom.y, WATERMARK_MARGIN);
    }

    #[test]
    fn test_parse_page_ranges() {
        assert_eq!(parse_page_ranges("1-3, 5,2", 10).unwrap(), vec![1, 2, 3, 5]);
        assert_eq!(parse_page_ranges("8-", 10).unwrap(), vec![8, 9, 10]);
        assert_eq!(parse_page_ranges("all", 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_page_range_errors() {
        assert_eq!(
            parse_page_ranges("0", 5),
            Err(GeometryError::PageOutOfRange { page: 0, count: 5 })
        );
        assert_eq!(
            parse_page_ranges("2-9", 5),
            Err(GeometryError::PageOutOfRange { page: 9, count: 5 })
        );
        assert!(matches!(parse_page_ranges("4-2", 5), Err(GeometryError::InvalidPageRange(_))));
        assert!(matches!(parse_page_ranges("1,,2", 5), Err(GeometryError::InvalidPageRange(_))));
        assert!(matches!(parse_page_ranges("x", 5), Err(GeometryError::InvalidPageRange(_))));
    }
}
