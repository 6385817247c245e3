//! Content-stream interpretation and fragment assembly.
//!
//! Text-showing operators are turned into positioned [`RawSpan`]s, and spans
//! that share a baseline and a font are then merged into [`TextFragment`]s.

use std::collections::HashMap;

use crate::model::{is_malformed_text, TextFragment};

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};

/// Average glyph advance as a fraction of the font size.
///
/// Glyph widths are not read from the font program, so advances and gaps
/// are estimated from this ratio.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments beyond this many thousandths of an em read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A decoded text-showing operation with its position.
#[derive(Debug, Clone)]
pub struct RawSpan {
    /// Decoded text
    pub text: String,
    /// X position (left edge), in user space
    pub x: f32,
    /// Baseline Y position, in user space (bottom-up)
    pub baseline: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Base font name
    pub font_name: String,
}

impl RawSpan {
    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    // Start of the current line, which Td/T* move relative to
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate_line(0.0, -leading);
    }

    /// Advance along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt().max(f32::EPSILON)
    }
}

/// Walks the operations of one page and collects text spans.
pub struct ContentInterpreter<'a, B: PdfBackend> {
    backend: &'a B,
    page: PageId,
    fonts: HashMap<Vec<u8>, String>,
}

impl<'a, B: PdfBackend> ContentInterpreter<'a, B> {
    /// Create an interpreter for a page, given its font resources.
    pub fn new(backend: &'a B, page: PageId, fonts: HashMap<Vec<u8>, String>) -> Self {
        Self {
            backend,
            page,
            fonts,
        }
    }

    /// Interpret the operations and return spans in stream order.
    pub fn spans(&self, ops: &[ContentOp]) -> Vec<RawSpan> {
        let mut spans = Vec::new();
        let mut matrix = TextMatrix::default();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;
        let mut leading: f32 = 0.0;
        let mut in_text = false;

        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(key)) = op.operands.first() {
                        font_name = self
                            .fonts
                            .get(key)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                        font_key = key.clone();
                    }
                    font_size = op.number(1, font_size);
                }
                "TL" => leading = op.number(0, leading),
                "Td" => matrix.translate_line(op.number(0, 0.0), op.number(1, 0.0)),
                "TD" => {
                    let ty = op.number(1, 0.0);
                    leading = -ty;
                    matrix.translate_line(op.number(0, 0.0), ty);
                }
                "Tm" => matrix.set(
                    op.number(0, 1.0),
                    op.number(1, 0.0),
                    op.number(2, 0.0),
                    op.number(3, 1.0),
                    op.number(4, 0.0),
                    op.number(5, 0.0),
                ),
                "T*" => matrix.next_line(leading_or_default(leading, font_size)),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.next_line(leading_or_default(leading, font_size));
                    }
                    if !in_text {
                        continue;
                    }
                    let text = match op.operator.as_str() {
                        "TJ" => self.decode_array(op.operands.first(), &font_key),
                        "\"" => self.decode_string(op.operands.get(2), &font_key),
                        _ => self.decode_string(op.operands.first(), &font_key),
                    };
                    let advance = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        let scale = matrix.scale();
                        spans.push(RawSpan {
                            text,
                            x,
                            baseline: y,
                            width: advance * scale,
                            font_size: font_size * scale,
                            font_name: font_name.clone(),
                        });
                    }
                    matrix.advance(advance);
                }
                _ => {}
            }
        }

        spans
    }

    fn decode_string(&self, operand: Option<&PdfValue>, font_key: &[u8]) -> String {
        match operand {
            Some(PdfValue::Str(bytes)) => self.backend.decode_text(self.page, font_key, bytes),
            _ => String::new(),
        }
    }

    /// Decode a TJ array, turning large negative adjustments into spaces.
    fn decode_array(&self, operand: Option<&PdfValue>, font_key: &[u8]) -> String {
        let Some(PdfValue::Array(items)) = operand else {
            return String::new();
        };

        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    combined.push_str(&self.backend.decode_text(self.page, font_key, bytes));
                }
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let adjustment = -item.as_number().unwrap_or(0.0);
                    let needs_space = adjustment > TJ_SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .map(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                            .unwrap_or(false);
                    if needs_space {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        combined
    }
}

fn leading_or_default(leading: f32, font_size: f32) -> f32 {
    if leading > 0.0 {
        leading
    } else {
        font_size * 1.2
    }
}

/// Result of assembling a page's spans.
#[derive(Debug, Default)]
pub struct PageFragments {
    /// Fragments ordered top to bottom, then left to right
    pub fragments: Vec<TextFragment>,
    /// Spans dropped because their text was not decodable
    pub skipped: usize,
}

/// Merge spans on the same baseline with the same font into fragments.
///
/// `page_height` converts PDF's bottom-up coordinates into the top-down `y`
/// stored on [`TextFragment`].
pub fn assemble_fragments(spans: Vec<RawSpan>, page: u32, page_height: f32) -> PageFragments {
    let mut result = PageFragments::default();

    let mut spans: Vec<RawSpan> = spans
        .into_iter()
        .filter(|span| {
            if is_malformed_text(&span.text) {
                log::debug!("Page {}: skipping undecodable span {:?}", page, span.text);
                result.skipped += 1;
                false
            } else {
                true
            }
        })
        .collect();

    // Top to bottom (baseline descending), then left to right
    spans.sort_by(|a, b| {
        b.baseline
            .total_cmp(&a.baseline)
            .then_with(|| a.x.total_cmp(&b.x))
    });

    let mut run: Vec<RawSpan> = Vec::new();
    for span in spans {
        let joins = run
            .last()
            .map(|prev| same_run(prev, &span))
            .unwrap_or(false);
        if !joins && !run.is_empty() {
            result
                .fragments
                .push(merge_run(std::mem::take(&mut run), page, page_height));
        }
        run.push(span);
    }
    if !run.is_empty() {
        result.fragments.push(merge_run(run, page, page_height));
    }

    result
}

/// Whether `next` continues the styled run that ends with `prev`.
fn same_run(prev: &RawSpan, next: &RawSpan) -> bool {
    let same_baseline = (prev.baseline - next.baseline).abs() <= prev.font_size * 0.3;
    let same_font = prev.font_name == next.font_name;
    let same_size = (prev.font_size - next.font_size).abs() < 0.1;
    // Large horizontal gaps separate columns or table cells
    let near = next.x - prev.right() < prev.font_size * 3.0;
    same_baseline && same_font && same_size && near
}

fn merge_run(run: Vec<RawSpan>, page: u32, page_height: f32) -> TextFragment {
    let mut text = String::new();
    for (i, span) in run.iter().enumerate() {
        if i > 0 {
            let prev = &run[i - 1];
            let gap = span.x - prev.right();
            let prev_last = prev.text.chars().last();
            let next_first = span.text.chars().next();
            let spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
                && next_first.map(is_spaceless_script_char).unwrap_or(false);
            let has_space = prev.text.ends_with(char::is_whitespace)
                || span.text.starts_with(char::is_whitespace);
            if gap > span.font_size * AVG_GLYPH_WIDTH * 0.2 && !spaceless && !has_space {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
    }

    let first = &run[0];
    let x = run.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
    TextFragment::new(
        text,
        first.font_name.clone(),
        first.font_size,
        x,
        (page_height - first.baseline).max(0.0),
        page,
    )
}

/// Check if a character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::parser::backend::{decode_text_simple, BackendFontInfo};
    use std::collections::BTreeMap;

    /// Backend that serves pre-decoded operations.
    struct MockBackend;

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::new()
        }
        fn page_size(&self, _page: PageId) -> Option<(f32, f32)> {
            None
        }
        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![])
        }
        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(vec![])
        }
        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(vec![])
        }
        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }
        fn info_string(&self, _key: &[u8]) -> Option<String> {
            None
        }
        fn version(&self) -> String {
            "1.7".to_string()
        }
        fn is_encrypted(&self) -> bool {
            false
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn interpreter(backend: &MockBackend) -> ContentInterpreter<'_, MockBackend> {
        let mut fonts = HashMap::new();
        fonts.insert(b"F1".to_vec(), "Helvetica-Bold".to_string());
        fonts.insert(b"F2".to_vec(), "Helvetica".to_string());
        ContentInterpreter::new(backend, (1, 0), fonts)
    }

    fn span(text: &str, x: f32, baseline: f32, size: f32, font: &str) -> RawSpan {
        RawSpan {
            text: text.to_string(),
            x,
            baseline,
            width: text.chars().count() as f32 * size * AVG_GLYPH_WIDTH,
            font_size: size,
            font_name: font.to_string(),
        }
    }

    #[test]
    fn test_spans_follow_text_positioning() {
        let backend = MockBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(24.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("Executive Summary")]),
            op("Tf", vec![PdfValue::Name(b"F2".to_vec()), num(10.0)]),
            op("Td", vec![num(0.0), num(-40.0)]),
            op("Tj", vec![s("Body text")]),
            op("ET", vec![]),
        ];

        let spans = interpreter(&backend).spans(&ops);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].font_name, "Helvetica-Bold");
        assert_eq!(spans[0].font_size, 24.0);
        assert_eq!((spans[0].x, spans[0].baseline), (72.0, 700.0));
        assert_eq!((spans[1].x, spans[1].baseline), (72.0, 660.0));
    }

    #[test]
    fn test_text_matrix_scales_font_size() {
        let backend = MockBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F2".to_vec()), num(1.0)]),
            op(
                "Tm",
                vec![num(18.0), num(0.0), num(0.0), num(18.0), num(50.0), num(500.0)],
            ),
            op("Tj", vec![s("Scaled")]),
            op("ET", vec![]),
        ];

        let spans = interpreter(&backend).spans(&ops);
        assert_eq!(spans.len(), 1);
        assert!((spans[0].font_size - 18.0).abs() < 1e-4);
        assert_eq!(spans[0].x, 50.0);
    }

    #[test]
    fn test_tj_array_inserts_word_spaces() {
        let backend = MockBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F2".to_vec()), num(12.0)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    s("Hello"),
                    PdfValue::Integer(-250),
                    s("World"),
                    PdfValue::Integer(-20),
                    s("!"),
                ])],
            ),
            op("ET", vec![]),
        ];

        let spans = interpreter(&backend).spans(&ops);
        assert_eq!(spans[0].text, "Hello World!");
    }

    #[test]
    fn test_text_outside_bt_is_ignored() {
        let backend = MockBackend;
        let ops = vec![op("Tj", vec![s("stray")])];
        assert!(interpreter(&backend).spans(&ops).is_empty());
    }

    #[test]
    fn test_t_star_uses_leading() {
        let backend = MockBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F2".to_vec()), num(10.0)]),
            op("TL", vec![num(14.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("one")]),
            op("T*", vec![]),
            op("Tj", vec![s("two")]),
            op("ET", vec![]),
        ];
        let spans = interpreter(&backend).spans(&ops);
        assert_eq!(spans[1].baseline, 686.0);
        assert_eq!(spans[1].x, 72.0);
    }

    #[test]
    fn test_assemble_merges_same_line_runs() {
        let spans = vec![
            span("Body", 72.0, 600.0, 10.0, "Helvetica"),
            span("Exec", 72.0, 700.0, 24.0, "Helvetica-Bold"),
            span("Summary", 72.0 + 4.0 * 12.0 + 6.0, 700.0, 24.0, "Helvetica-Bold"),
        ];
        let page = assemble_fragments(spans, 1, 792.0);

        assert_eq!(page.fragments.len(), 2);
        assert_eq!(page.fragments[0].text, "Exec Summary");
        assert!(page.fragments[0].is_bold);
        assert_eq!(page.fragments[0].y, 92.0);
        assert_eq!(page.fragments[1].text, "Body");
        assert_eq!(page.skipped, 0);
    }

    #[test]
    fn test_assemble_splits_on_font_change() {
        let spans = vec![
            span("1.", 72.0, 700.0, 12.0, "Helvetica-Bold"),
            span("Scope", 90.0, 700.0, 12.0, "Helvetica"),
        ];
        let page = assemble_fragments(spans, 1, 792.0);
        assert_eq!(page.fragments.len(), 2);
    }

    #[test]
    fn test_assemble_skips_malformed_spans() {
        let spans = vec![
            span("ok", 72.0, 700.0, 12.0, "Helvetica"),
            span("\u{FFFD}\u{FFFD}", 72.0, 680.0, 12.0, "Helvetica"),
            span("bad\u{0001}", 72.0, 660.0, 12.0, "Helvetica"),
        ];
        let page = assemble_fragments(spans, 3, 792.0);
        assert_eq!(page.fragments.len(), 1);
        assert_eq!(page.skipped, 2);
        assert_eq!(page.fragments[0].page, 3);
    }

    #[test]
    fn test_cjk_runs_join_without_space() {
        let spans = vec![
            span("日本", 72.0, 700.0, 12.0, "MS-Mincho"),
            span("語", 72.0 + 2.0 * 6.0 + 5.0, 700.0, 12.0, "MS-Mincho"),
        ];
        let page = assemble_fragments(spans, 1, 792.0);
        assert_eq!(page.fragments[0].text, "日本語");
    }
}
