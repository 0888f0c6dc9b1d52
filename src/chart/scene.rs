//! Rendered frame: shapes with resolved attributes, serialised as SVG
//!
//! Controllers build a `Scene` on every animation frame from their element
//! state; the scene is then handed to a `Surface`.

use super::colors::to_hex;
use super::error::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Stroke colour and width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: [u8; 3],
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub class: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Corner radius (rx = ry)
    pub radius: f64,
    pub fill: [u8; 3],
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub class: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub anchor: Anchor,
    pub font_size: Option<f64>,
    /// White outline drawn behind the text
    pub halo: Option<f64>,
    pub opacity: f64,
}

impl Text {
    pub fn new(class: &str, x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            class: class.to_string(),
            x,
            y,
            text: text.into(),
            anchor: Anchor::Start,
            font_size: None,
            halo: None,
            opacity: 1.0,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn halo(mut self, stroke_width: f64) -> Self {
        self.halo = Some(stroke_width);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub class: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Stroke,
    pub opacity: f64,
}

/// Anything that can be drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Text(Text),
    Line(Line),
    /// Shapes translated by `(dx, dy)`
    Group {
        class: String,
        translate: (f64, f64),
        children: Vec<Shape>,
    },
}

/// Floating label positioned in scene coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipBox {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub border: [u8; 3],
}

/// One frame
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<Shape>,
    pub tooltip: Option<TooltipBox>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
            tooltip: None,
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Every shape with the given class, searching inside groups
    pub fn find_class(&self, class: &str) -> Vec<&Shape> {
        fn walk<'a>(shapes: &'a [Shape], class: &str, out: &mut Vec<&'a Shape>) {
            for shape in shapes {
                let own = match shape {
                    Shape::Rect(r) => r.class.as_str(),
                    Shape::Text(t) => t.class.as_str(),
                    Shape::Line(l) => l.class.as_str(),
                    Shape::Group {
                        class: group_class,
                        children,
                        ..
                    } => {
                        walk(children, class, out);
                        group_class.as_str()
                    }
                };
                if own.split_whitespace().any(|c| c == class) {
                    out.push(shape);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.shapes, class, &mut out);
        out
    }

    /// Serialise as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(4096 + self.shapes.len() * 128);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height)
        );
        for shape in &self.shapes {
            write_shape(&mut svg, shape, 1);
        }
        if let Some(tip) = &self.tooltip {
            write_tooltip(&mut svg, tip);
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn write_shape(svg: &mut String, shape: &Shape, depth: usize) {
    let indent = "  ".repeat(depth);
    match shape {
        Shape::Rect(r) => {
            let _ = write!(
                svg,
                r#"{indent}<rect class="{}" x="{}" y="{}" width="{}" height="{}""#,
                escape(&r.class),
                fmt_num(r.x),
                fmt_num(r.y),
                fmt_num(r.width.max(0.0)),
                fmt_num(r.height.max(0.0)),
            );
            if r.radius > 0.0 {
                let _ = write!(svg, r#" rx="{0}" ry="{0}""#, fmt_num(r.radius));
            }
            if let Some(stroke) = r.stroke {
                let _ = write!(
                    svg,
                    r#" stroke="{}" stroke-width="{}""#,
                    to_hex(stroke.color),
                    fmt_num(stroke.width)
                );
            }
            let _ = writeln!(svg, r#" fill="{}"/>"#, to_hex(r.fill));
        }
        Shape::Text(t) => {
            if let Some(width) = t.halo {
                write_text(svg, &indent, t, Some(width));
            }
            write_text(svg, &indent, t, None);
        }
        Shape::Line(l) => {
            let _ = write!(
                svg,
                r#"{indent}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}""#,
                escape(&l.class),
                fmt_num(l.x1),
                fmt_num(l.y1),
                fmt_num(l.x2),
                fmt_num(l.y2),
                to_hex(l.stroke.color),
                fmt_num(l.stroke.width)
            );
            write_opacity(svg, l.opacity);
            svg.push_str("/>\n");
        }
        Shape::Group {
            class,
            translate,
            children,
        } => {
            let _ = writeln!(
                svg,
                r#"{indent}<g class="{}" transform="translate({},{})">"#,
                escape(class),
                fmt_num(translate.0),
                fmt_num(translate.1)
            );
            for child in children {
                write_shape(svg, child, depth + 1);
            }
            let _ = writeln!(svg, "{indent}</g>");
        }
    }
}

fn write_text(svg: &mut String, indent: &str, t: &Text, halo: Option<f64>) {
    let _ = write!(
        svg,
        r#"{indent}<text class="{}" x="{}" y="{}" text-anchor="{}""#,
        escape(&t.class),
        fmt_num(t.x),
        fmt_num(t.y),
        t.anchor.as_str()
    );
    if let Some(size) = t.font_size {
        let _ = write!(svg, r#" font-size="{}px""#, fmt_num(size));
    }
    write_opacity(svg, t.opacity);
    if let Some(width) = halo {
        let _ = write!(
            svg,
            r##" fill="#ffffff" stroke="#ffffff" stroke-width="{}" stroke-linejoin="round""##,
            fmt_num(width)
        );
    }
    let _ = writeln!(svg, ">{}</text>", escape(&t.text));
}

fn write_opacity(svg: &mut String, opacity: f64) {
    if opacity < 1.0 {
        let _ = write!(svg, r#" opacity="{}""#, fmt_num(opacity.max(0.0)));
    }
}

fn write_tooltip(svg: &mut String, tip: &TooltipBox) {
    let border = to_hex(tip.border);
    let width = 20.0 + tip.text.chars().count() as f64 * 7.0;
    let _ = writeln!(
        svg,
        r#"  <g class="tooltip" transform="translate({},{})">"#,
        fmt_num(tip.x),
        fmt_num(tip.y)
    );
    let _ = writeln!(
        svg,
        r##"    <rect width="{}" height="34" fill="#ffffff" stroke="{}" stroke-width="1"/>"##,
        fmt_num(width),
        border
    );
    let _ = writeln!(
        svg,
        r##"    <text x="10" y="22" fill="#000000">{}</text>"##,
        escape(&tip.text)
    );
    svg.push_str("  </g>\n");
}

/// Numbers with at most two decimals, no trailing zeros
fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Destination for rendered frames
pub trait Surface {
    fn present(&mut self, frame: u64, scene: &Scene) -> Result<()>;
}

/// Render `scene` into `surface`; a missing surface makes this a no-op
pub fn render<S>(surface: Option<&mut S>, frame: u64, scene: &Scene) -> Result<()>
where
    S: Surface + ?Sized,
{
    match surface {
        Some(surface) => surface.present(frame, scene),
        None => Ok(()),
    }
}

/// Writes each frame to `<dir>/frame_NNNNN.svg`
#[derive(Debug, Clone)]
pub struct FrameDirectory {
    dir: PathBuf,
    written: u64,
}

impl FrameDirectory {
    /// Create the directory if needed
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, frame: u64) -> PathBuf {
        self.dir.join(format!("frame_{:05}.svg", frame))
    }
}

impl Surface for FrameDirectory {
    fn present(&mut self, frame: u64, scene: &Scene) -> Result<()> {
        std::fs::write(self.frame_path(frame), scene.to_svg())?;
        self.written += 1;
        Ok(())
    }
}

/// Keeps the latest frame in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    pub frames: u64,
    pub last_frame: Option<u64>,
    pub last_svg: String,
    pub last_scene: Option<Scene>,
}

impl Surface for MemorySurface {
    fn present(&mut self, frame: u64, scene: &Scene) -> Result<()> {
        self.frames += 1;
        self.last_frame = Some(frame);
        self.last_svg = scene.to_svg();
        self.last_scene = Some(scene.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Scene {
        let mut scene = Scene::new(200.0, 100.0);
        scene.push(Shape::Group {
            class: "heatmap".to_string(),
            translate: (50.0, 0.0),
            children: vec![
                Shape::Rect(Rect {
                    class: "cell".to_string(),
                    x: 0.0,
                    y: 10.5,
                    width: 20.0,
                    height: 20.0,
                    radius: 4.0,
                    fill: [0, 255, 0],
                    stroke: Some(Stroke {
                        color: [0, 0, 0],
                        width: 1.0,
                    }),
                }),
                Shape::Text(Text::new("label", 10.0, 20.0, "A & B").anchor(Anchor::Middle)),
            ],
        });
        scene
    }

    #[test]
    fn test_svg_output() {
        let svg = sample().to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"transform="translate(50,0)""#));
        assert!(svg.contains(r#"y="10.5""#));
        assert!(svg.contains(r#"rx="4" ry="4""#));
        assert!(svg.contains(r##"fill="#00ff00""##));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_halo_renders_twice() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.push(Shape::Text(Text::new("yearText", 5.0, 5.0, "2000").halo(10.0)));
        let svg = scene.to_svg();
        assert_eq!(svg.matches(">2000</text>").count(), 2);
        assert!(svg.contains(r#"stroke-width="10""#));
    }

    #[test]
    fn test_find_class_searches_groups() {
        let scene = sample();
        assert_eq!(scene.find_class("cell").len(), 1);
        assert_eq!(scene.find_class("heatmap").len(), 1);
        assert!(scene.find_class("bar").is_empty());
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(3.456), "3.46");
        assert_eq!(fmt_num(-0.5), "-0.5");
        assert_eq!(fmt_num(f64::NAN), "0");
    }

    #[test]
    fn test_missing_surface_is_noop() {
        assert!(render(None::<&mut MemorySurface>, 0, &sample()).is_ok());

        let mut memory = MemorySurface::default();
        render(Some(&mut memory), 7, &sample()).unwrap();
        assert_eq!(memory.frames, 1);
        assert_eq!(memory.last_frame, Some(7));
    }

    #[test]
    fn test_frame_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut frames = FrameDirectory::create(dir.path().join("out")).unwrap();
        frames.present(3, &sample()).unwrap();
        let written = std::fs::read_to_string(frames.frame_path(3)).unwrap();
        assert!(written.contains("<rect"));
        assert_eq!(frames.written(), 1);
    }
}
