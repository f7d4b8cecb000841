use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::HierarchyLayout;
use crate::model::{Node, index_nodes};
use crate::theme::Theme;
use crate::zoom::Zoom;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(
    layout: &HierarchyLayout,
    roots: &[Node],
    theme: &Theme,
    config: &LayoutConfig,
    render_cfg: &RenderConfig,
    zoom: Zoom,
) -> String {
    let mut svg = String::new();
    let (width, height) = zoom.viewport(layout);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render_cfg.background
    ));
    svg.push_str(&format!("<g transform=\"scale({})\">", zoom.scale()));

    if layout.is_empty() {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            layout.width / 2.0,
            layout.height / 2.0,
            theme.font_family,
            theme.font_size * 1.2,
            theme.role_text_color,
            escape_xml(&render_cfg.empty_message)
        ));
        svg.push_str("</g></svg>");
        return svg;
    }

    for connector in &layout.connectors {
        let (stroke, dash) = if connector.is_bonus {
            (theme.bonus_line_color.as_str(), " stroke-dasharray=\"6 4\"")
        } else {
            (theme.line_color.as_str(), "")
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.6\"{} />",
            connector.path.to_svg_path(),
            stroke,
            dash
        ));
    }

    let nodes = index_nodes(roots);

    for pos in &layout.positions {
        let Some(node) = nodes.get(pos.node_id.as_str()) else {
            continue;
        };
        let (fill, border) = if node.is_bonus {
            (theme.bonus_fill.as_str(), theme.bonus_border.as_str())
        } else {
            (theme.card_fill.as_str(), theme.card_border.as_str())
        };
        let left = pos.x - config.card_width / 2.0;
        svg.push_str(&format!(
            "<rect x=\"{left:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{fill}\" stroke=\"{border}\" stroke-width=\"1.4\"/>",
            pos.y, config.card_width, config.card_height,
        ));
        let name_y = pos.y + config.card_height * 0.4;
        let role_y = name_y + theme.font_size * 1.4;
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
            pos.x,
            theme.font_family,
            theme.font_size,
            theme.name_text_color,
            escape_xml(&node.name)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{role_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            pos.x,
            theme.font_family,
            theme.font_size * 0.85,
            theme.role_text_color,
            escape_xml(&node.role)
        ));
        if node.descendant_count > 0 {
            let badge_y = pos.y + config.card_height;
            svg.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{badge_y:.2}\" r=\"11\" fill=\"{}\"/>",
                pos.x, theme.badge_fill
            ));
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"#FFFFFF\">{}</text>",
                pos.x,
                badge_y + theme.font_size * 0.35,
                theme.font_family,
                theme.font_size * 0.8,
                node.descendant_count
            ));
        }
    }

    svg.push_str("</g></svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

/// Pixel size of a PNG for an SVG of `svg_size`, and the scale applied to get
/// there. Charts larger than `render_cfg.width` x `render_cfg.height` shrink to
/// fit with their aspect ratio kept; smaller ones are never enlarged.
pub fn png_canvas_size(svg_size: (f32, f32), render_cfg: &RenderConfig) -> (u32, u32, f32) {
    let (width, height) = svg_size;
    let fit = (render_cfg.width / width)
        .min(render_cfg.height / height)
        .min(1.0);
    let scale = if fit.is_finite() && fit > 0.0 { fit } else { 1.0 };
    (
        (width * scale).round().max(1.0) as u32,
        (height * scale).round().max(1.0) as u32,
        scale,
    )
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size();
    let (width, height, scale) = png_canvas_size((size.width(), size.height()), render_cfg);
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
