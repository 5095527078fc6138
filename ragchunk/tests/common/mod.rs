#![allow(dead_code)]

use std::{io::Cursor, sync::Arc};

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream,
    content::{Content, Operation},
    dictionary,
};
use ragchunk::{
    ChunkConfig, Pipeline,
    pipeline::{DocumentManager, WhitespaceTokenizer},
};

pub struct LinkFixture {
    pub uri: String,
    /// `[x0, y0, x1, y1]` in PDF user space.
    pub rect: [i64; 4],
}

#[derive(Default)]
pub struct PageFixture {
    pub operations: Vec<Operation>,
    pub links: Vec<LinkFixture>,
}

impl PageFixture {
    pub fn text(mut self, font: &str, size: i64, x: i64, y: i64, body: &str) -> Self {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(body)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Appends raw content-stream operations.
    pub fn ops(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn link(mut self, uri: &str, rect: [i64; 4]) -> Self {
        self.links.push(LinkFixture {
            uri: uri.to_string(),
            rect,
        });
        self
    }
}

/// Builds an A4 PDF with `F1` = Helvetica and `F2` = Courier.
pub fn build_pdf(pages: Vec<PageFixture>) -> Vec<u8> {
    PdfBuilder::new().build(pages)
}

/// Shorthand for `Operation::new`.
pub fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

pub fn encode_ops(operations: Vec<Operation>) -> Vec<u8> {
    Content { operations }.encode().expect("encode content")
}

/// A PDF under construction whose pages share one resource dictionary.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    xobjects: Dictionary,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let helvetica = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let courier = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        Self {
            doc,
            pages_id,
            fonts: dictionary! {
                "F1" => helvetica,
                "F2" => courier,
            },
            xobjects: Dictionary::new(),
        }
    }

    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Reserves an id so an object can refer to itself.
    pub fn reserve(&mut self) -> ObjectId {
        self.doc.new_object_id()
    }

    pub fn insert(&mut self, id: ObjectId, object: impl Into<Object>) {
        self.doc.objects.insert(id, object.into());
    }

    pub fn font(mut self, name: &str, font: Dictionary) -> Self {
        let id = self.doc.add_object(font);
        self.fonts.set(name, id);
        self
    }

    pub fn xobject(mut self, name: &str, id: ObjectId) -> Self {
        self.xobjects.set(name, id);
        self
    }

    /// The resource dictionary the pages use, for forms that inherit it.
    pub fn resources(&self) -> Dictionary {
        dictionary! {
            "Font" => self.fonts.clone(),
            "XObject" => self.xobjects.clone(),
        }
    }

    pub fn build(mut self, pages: Vec<PageFixture>) -> Vec<u8> {
        let resources_id = self.doc.add_object(self.resources());
        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let mut operations = vec![op("BT", vec![]), op("ET", vec![])];
            operations.extend(page.operations);
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, encode_ops(operations)));
            let annots: Vec<Object> = page
                .links
                .into_iter()
                .map(|link| {
                    Object::Dictionary(dictionary! {
                        "Type" => "Annot",
                        "Subtype" => "Link",
                        "Rect" => link.rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
                        "A" => dictionary! {
                            "S" => "URI",
                            "URI" => Object::string_literal(link.uri),
                        },
                    })
                })
                .collect();
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => content_id,
                "Annots" => annots,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).expect("save pdf");
        bytes
    }
}

pub fn paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

pub fn table(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|row| {
                TableRow::new(
                    row.iter()
                        .map(|cell| TableCell::new().add_paragraph(paragraph(cell)))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn pack_docx(docx: Docx) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).expect("pack docx");
    cursor.into_inner()
}

/// `n` space-separated words, i.e. `n` whitespace tokens.
pub fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

/// A pipeline counting whitespace tokens, with default intake limits.
pub fn whitespace_pipeline(config: ChunkConfig) -> Pipeline {
    Pipeline::with_dependencies(
        config,
        Arc::new(WhitespaceTokenizer),
        DocumentManager::new(&["pdf", "docx"], 1024 * 1024),
        None,
    )
}
