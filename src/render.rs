use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{DiagramModel, RenderEntity};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Distance of the axis labels from the viewport edge, as a share of the margin.
const LABEL_INSET: f32 = 0.25;

pub fn render_svg(model: &DiagramModel, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let viewport = &model.viewport;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" id=\"tubesheet_svg\" width=\"100%\" height=\"100%\" viewBox=\"{} {} {} {}\">",
        viewport.min_x, viewport.min_y, viewport.width, viewport.height
    ));

    svg.push_str("<style type=\"text/css\">");
    svg.push_str(&format!(
        ".tube {{stroke: {}; stroke-width: {};}} ",
        theme.tube_stroke, theme.tube_stroke_width
    ));
    svg.push_str(&format!(
        ".tube_num {{text-anchor: middle; dominant-baseline: middle; font-family: {}; font-size: {}px; fill: {};}} ",
        theme.font_family, theme.font_size, theme.number_color
    ));
    svg.push_str(&format!(
        ".label {{text-anchor: middle; dominant-baseline: middle; font-family: {}; font-size: {}px; fill: {};}} ",
        theme.font_family, theme.font_size, theme.label_color
    ));
    svg.push_str(&format!(
        ".guide {{stroke: {}; stroke-width: {}; stroke-dasharray: 0.1 0.1; fill: none;}}",
        theme.guide_color, theme.guide_stroke_width
    ));
    svg.push_str("</style>");

    if let Some(background) = &theme.background {
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            viewport.min_x,
            viewport.min_y,
            viewport.width,
            viewport.height,
            escape_xml(background)
        ));
    }

    for guide in &model.guides {
        svg.push_str(&format!(
            "<line class=\"guide\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"/>",
            guide.x1, guide.y1, guide.x2, guide.y2
        ));
    }

    // Column labels run along the top edge, rotated to read upwards.
    let label_y = viewport.min_y + config.margin_y * LABEL_INSET;
    for label in &model.x_labels {
        svg.push_str(&format!(
            "<text class=\"label\" x=\"{x}\" y=\"{label_y}\" transform=\"rotate(270,{x},{label_y})\">{}</text>",
            escape_xml(&label.text),
            x = label.coordinate,
        ));
    }

    let label_x = viewport.min_x + config.margin_x * LABEL_INSET;
    for label in &model.y_labels {
        svg.push_str(&format!(
            "<text class=\"label\" x=\"{label_x}\" y=\"{}\">{}</text>",
            label.coordinate,
            escape_xml(&label.text)
        ));
    }

    for entity in &model.entities {
        svg.push_str(&tube_svg(entity));
    }

    svg.push_str("</svg>");
    svg
}

fn tube_svg(entity: &RenderEntity) -> String {
    let mut group = format!(
        "<g id=\"{}\" data-col=\"{}\" data-row=\"{}\"",
        escape_xml(&entity.id),
        escape_xml(&entity.x_label),
        escape_xml(&entity.y_label)
    );
    if !entity.plan.is_empty() {
        group.push_str(&format!(" data-plan=\"{}\"", escape_xml(&entity.plan)));
    }
    group.push('>');
    group.push_str(&format!("<title>{}</title>", escape_xml(&entity.tooltip)));
    group.push_str(&format!(
        "<circle class=\"tube\" cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
        entity.x,
        entity.y,
        entity.radius,
        escape_xml(&entity.fill_color)
    ));
    group.push_str(&format!(
        "<text class=\"tube_num\" x=\"{}\" y=\"{}\">{}</text>",
        entity.x,
        entity.y,
        escape_xml(&entity.number_text)
    ));
    group.push_str("</g>");
    group
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

/// Rasterizes the SVG so that the viewport spans `render_cfg.width` pixels.
#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size();
    let scale = if size.width() > 0.0 {
        render_cfg.width / size.width()
    } else {
        1.0
    };
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate {width}x{height} pixmap"))?;

    let transform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
