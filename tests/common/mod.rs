//! Builds small PDFs with lopdf for end-to-end tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

/// One line of text placed at an absolute baseline.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    pub x: f32,
    /// Baseline, measured from the bottom of the page
    pub baseline: f32,
}

pub fn text(text: &str, size: f32, baseline: f32) -> Line {
    Line {
        text: text.to_string(),
        size,
        bold: false,
        x: 72.0,
        baseline,
    }
}

pub fn bold(text: &str, size: f32, baseline: f32) -> Line {
    Line {
        bold: true,
        ..self::text(text, size, baseline)
    }
}

/// `count` body lines at 10pt, 14pt apart, starting at `baseline`.
pub fn body(count: usize, baseline: f32) -> Vec<Line> {
    (0..count)
        .map(|i| {
            text(
                "Body text that explains the section in ordinary sentences",
                10.0,
                baseline - i as f32 * 14.0,
            )
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct PdfBuilder {
    pages: Vec<Vec<Line>>,
    title: Option<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, lines: Vec<Line>) -> Self {
        self.pages.push(lines);
        self
    }

    pub fn metadata_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let heavy = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => heavy,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in &self.pages {
            let mut operations = Vec::new();
            for line in lines {
                let font = if line.bold { "F2" } else { "F1" };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        1.into(),
                        line.x.into(),
                        line.baseline.into(),
                    ],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(line.text.as_str())],
                ));
                operations.push(Operation::new("ET", vec![]));
            }

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Producer" => Object::string_literal("pdf-outline tests"),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).expect("save pdf");
        buffer
    }
}

/// Two-page report with a two-line title and numbered sections.
pub fn report() -> PdfBuilder {
    let mut first = vec![
        bold("Understanding Artificial", 24.0, 720.0),
        bold("Intelligence", 24.0, 692.0),
        bold("1. Introduction", 16.0, 640.0),
    ];
    first.extend(body(8, 616.0));

    let mut second = vec![bold("1.1 Background", 13.0, 740.0)];
    second.extend(body(5, 716.0));
    second.push(bold("2. Methods", 16.0, 620.0));
    second.extend(body(5, 596.0));
    second.push(bold("Conclusion", 16.0, 500.0));
    second.extend(body(3, 476.0));

    PdfBuilder::new().page(first).page(second)
}
