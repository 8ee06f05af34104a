//! Print surface abstraction — the layout engine draws through this
//! trait so page output is not tied to one backend.  The bundled
//! implementation accumulates SVG elements and produces the final string.

// ═══════════════════════════════════════════════════════════════════════
// PrintSurface
// ═══════════════════════════════════════════════════════════════════════

/// Horizontal anchoring of drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Drawing primitives one printed page needs.
///
/// Coordinates are absolute page coordinates in print user units; `y` for
/// text is the baseline.
pub trait PrintSurface {
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64);
    fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str);
    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        size: f64,
        bold: bool,
        color: &str,
        anchor: TextAnchor,
    );
    /// Approximate (width, height) of `content` at `size`.
    fn text_extent(&self, content: &str, size: f64) -> (f64, f64);
}

// ═══════════════════════════════════════════════════════════════════════
// SvgSurface
// ═══════════════════════════════════════════════════════════════════════

/// A [`PrintSurface`] that accumulates SVG elements for one page.
pub struct SvgSurface {
    elements: Vec<String>,
    width: f64,
    height: f64,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    pub fn build(self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}" style="font-family: 'Georgia', 'Times New Roman', serif;">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl PrintSurface for SvgSurface {
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}" stroke-linecap="round"/>"#,
            x1, y1, x2, y2, color, width
        ));
    }

    fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        self.elements.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, w, h, fill
        ));
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        size: f64,
        bold: bool,
        color: &str,
        anchor: TextAnchor,
    ) {
        let escaped = content
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let weight = if bold { "bold" } else { "normal" };
        self.elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="{:.0}" font-weight="{}" fill="{}" text-anchor="{}">{}</text>"#,
            x,
            y,
            size,
            weight,
            color,
            anchor.as_svg(),
            escaped
        ));
    }

    fn text_extent(&self, content: &str, size: f64) -> (f64, f64) {
        // Serif average advance, good enough for header and marker labels.
        (content.chars().count() as f64 * size * 0.6, size * 1.2)
    }
}
