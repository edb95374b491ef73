//! PDF page math: `pdf-rect`, `watermark`, `pages`

use anyhow::{anyhow, Result};
use clap::Args;
use quill_core::page_geometry::{
    self, PageBox, PdfRect, Rotation, ViewRect, WatermarkPosition,
};
use std::process::ExitCode;

/// Parse `WIDTHxHEIGHT` in points or a named paper size
pub fn parse_page_size(s: &str) -> Result<PageBox, String> {
    match s.to_ascii_lowercase().as_str() {
        "letter" => return Ok(PageBox::sized(612.0, 792.0)),
        "legal" => return Ok(PageBox::sized(612.0, 1008.0)),
        "a4" => return Ok(PageBox::sized(595.0, 842.0)),
        "a3" => return Ok(PageBox::sized(842.0, 1191.0)),
        _ => {}
    }
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT or a paper name, got {s:?}"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width {w:?}"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height {h:?}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err(format!("page size must be positive, got {s:?}"));
    }
    Ok(PageBox::sized(w, h))
}

/// Parse four comma-separated numbers
fn parse_quad(s: &str) -> Result<[f64; 4], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad number in {s:?}: {e}"))?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected 4 values, got {}", v.len()))
}

#[derive(Debug, Args)]
pub struct PdfRectArgs {
    /// Page size: WIDTHxHEIGHT in points, or letter/legal/a4/a3
    #[arg(long, value_parser = parse_page_size, default_value = "letter")]
    pub page: PageBox,
    /// Page /Rotate value in degrees
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rotate: i32,
    /// Render scale of the viewport
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
    /// Viewport rectangle `x,y,width,height`, or a PDF rectangle `x0,y0,x1,y1`
    /// with --to-view
    #[arg(long, value_parser = parse_quad)]
    pub rect: [f64; 4],
    /// Convert from PDF user space to the viewport instead
    #[arg(long)]
    pub to_view: bool,
}

pub fn run_pdf_rect(args: &PdfRectArgs) -> Result<ExitCode> {
    let rotation = Rotation::from_degrees(args.rotate)?;
    let [a, b, c, d] = args.rect;
    if args.to_view {
        let rect = PdfRect { x0: a, y0: b, x1: c, y1: d };
        let view = page_geometry::pdf_to_viewport(&rect, &args.page, rotation, args.scale)?;
        println!("{}", serde_json::to_string(&view)?);
    } else {
        let rect = ViewRect { x: a, y: b, width: c, height: d };
        let pdf = page_geometry::viewport_to_pdf(&rect, &args.page, rotation, args.scale)?;
        println!("{}", serde_json::to_string(&pdf)?);
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct WatermarkArgs {
    #[arg(long, value_parser = parse_page_size, default_value = "letter")]
    pub page: PageBox,
    /// Width of the rendered watermark text in points
    #[arg(long)]
    pub text_width: f64,
    /// Height of the rendered watermark text in points
    #[arg(long)]
    pub text_height: f64,
    #[arg(long, value_enum, default_value_t = Position::Center)]
    pub position: Position,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Position {
    Center,
    Top,
    Bottom,
}

impl From<Position> for WatermarkPosition {
    fn from(position: Position) -> Self {
        match position {
            Position::Center => WatermarkPosition::Center,
            Position::Top => WatermarkPosition::Top,
            Position::Bottom => WatermarkPosition::Bottom,
        }
    }
}

pub fn run_watermark(args: &WatermarkArgs) -> Result<ExitCode> {
    if args.text_width <= 0.0 || args.text_height <= 0.0 {
        return Err(anyhow!("Watermark text size must be positive"));
    }
    let placement = page_geometry::watermark_placement(
        &args.page,
        args.text_width,
        args.text_height,
        args.position.into(),
    );
    println!("{}", serde_json::to_string(&placement)?);
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct PagesArgs {
    /// Selection such as `1-3,5,8-` or `all`
    pub selection: String,
    /// Number of pages in the document
    #[arg(long)]
    pub count: usize,
}

pub fn run_pages(args: &PagesArgs) -> Result<ExitCode> {
    let pages = page_geometry::parse_page_ranges(&args.selection, args.count)?;
    let list: Vec<String> = pages.iter().map(usize::to_string).collect();
    println!("{}", list.join(" "));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size("A4").unwrap(), PageBox::sized(595.0, 842.0));
        assert_eq!(parse_page_size("300x400").unwrap(), PageBox::sized(300.0, 400.0));
        assert!(parse_page_size("300").is_err());
        assert!(parse_page_size("0x10").is_err());
    }

    #[test]
    fn test_parse_quad() {
        assert_eq!(parse_quad("1, 2.5,3,4").unwrap(), [1.0, 2.5, 3.0, 4.0]);
        assert!(parse_quad("1,2,3").unwrap_err().contains("expected 4 values"));
        assert!(parse_quad("1,2,x,4").is_err());
    }
}
