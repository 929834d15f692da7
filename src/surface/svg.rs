use std::fmt::Write as _;

use super::{AttrValue, ElementId, PathCommand, PathData, Surface, TransformOp};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Compact decimal rendering: integers without a fraction, otherwise at most
/// three decimals with trailing zeros trimmed.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let mut out = format!("{value:.3}");
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if out == "-0" { "0".to_string() } else { out }
}

/// Serializes the live tree rooted at the surface root as SVG markup.
#[must_use]
pub fn to_svg(surface: &Surface) -> String {
    let mut out = String::new();
    write_element(surface, surface.root(), 0, &mut out);
    out
}

fn write_element(surface: &Surface, id: ElementId, depth: usize, out: &mut String) {
    let Some(element) = surface.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let tag = element.kind.tag();
    let _ = write!(out, "{indent}<{tag}");
    if depth == 0 {
        let _ = write!(out, " xmlns=\"{SVG_NS}\"");
    }
    for (name, value) in &element.attrs {
        let rendered = render_value(value);
        let _ = write!(
            out,
            " {name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(&rendered)
        );
    }

    let live_children: Vec<ElementId> = element
        .children()
        .iter()
        .copied()
        .filter(|child| surface.contains(*child))
        .collect();
    if live_children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in live_children {
        write_element(surface, child, depth + 1, out);
    }
    let _ = writeln!(out, "{indent}</{tag}>");
}

fn render_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Number(n) => format_number(*n),
        AttrValue::Text(s) => s.clone(),
        AttrValue::Path(path) => render_path(path),
        AttrValue::Transform(ops) => render_transform(ops),
    }
}

fn render_path(path: &PathData) -> String {
    let n = |v: f64| format_number(v);
    path.commands
        .iter()
        .map(|command| match *command {
            PathCommand::MoveTo(p) => format!("M {} {}", n(p.x), n(p.y)),
            PathCommand::LineTo(p) => format!("L {} {}", n(p.x), n(p.y)),
            PathCommand::CubicTo { c1, c2, to } => format!(
                "C {} {} {} {} {} {}",
                n(c1.x),
                n(c1.y),
                n(c2.x),
                n(c2.y),
                n(to.x),
                n(to.y)
            ),
            PathCommand::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_transform(ops: &[TransformOp]) -> String {
    ops.iter()
        .map(|op| match *op {
            TransformOp::Translate { x, y } => {
                format!("translate({} {})", format_number(x), format_number(y))
            }
            TransformOp::Rotate { degrees, cx, cy } => format!(
                "rotate({} {} {})",
                format_number(degrees),
                format_number(cx),
                format_number(cy)
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
