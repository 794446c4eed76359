//! DOCX loading and extraction.
//!
//! The document body (paragraphs and tables) is read with docx-rs. Images
//! and hyperlinks are resolved through the package relationships, which
//! docx-rs does not expose in document order.

use std::path::Path;

use docsift_core::{
    ArtifactKind, DocumentFormat, DocumentLoader, DocumentSource, ExtractedImage,
    InvalidReason, SiftError, SiftResult, Table,
};
use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, StructuredDataTag, StructuredDataTagChild,
    TableCellContent, TableChild, TableRowChild,
};

use crate::base::Extractor;
use crate::error::PackageError;
use crate::ooxml::{open_package, parse_xml, OoxmlPackage};
use crate::source::{read_source, reject};

/// Extractor for DOCX documents.
pub type DocxExtractor = Extractor<DocxLoader>;

const CONTENT_MARKERS: &[&str] = &["wordprocessingml", "ms-word"];

/// Loads and validates DOCX files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl DocxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for DocxLoader {
    type Document = DocxDocument;

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn load_file(&self, path: &Path) -> SiftResult<DocxDocument> {
        let format = DocumentFormat::Docx;
        let source = read_source(path, format)?;
        let (package, main_part) = open_package(path, format, &source, CONTENT_MARKERS)?;

        let docx = docx_rs::read_docx(&source.bytes)
            .map_err(|e| reject(format, InvalidReason::Malformed, path, e))?;

        tracing::debug!(
            "Accepted DOCX {} with {} body elements",
            path.display(),
            docx.document.children.len()
        );

        Ok(DocxDocument {
            docx,
            package,
            main_part,
        })
    }
}

/// Loaded DOCX document handle.
pub struct DocxDocument {
    docx: docx_rs::Docx,
    package: OoxmlPackage,
    main_part: String,
}

impl DocxDocument {
    /// Name of the main document part inside the package.
    pub fn main_part(&self) -> &str {
        &self.main_part
    }
}

impl DocumentSource for DocxDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn text_units(&self) -> SiftResult<Vec<String>> {
        Ok(body_blocks(&self.docx.document.children)
            .into_iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(paragraph_text(p)),
                Block::Table(_) => None,
            })
            .filter(|text| !text.trim().is_empty())
            .collect())
    }

    fn images(&self) -> SiftResult<Vec<ExtractedImage>> {
        let collect = || -> Result<Vec<ExtractedImage>, PackageError> {
            let text = self.package.xml_text(&self.main_part)?;
            let doc = parse_xml(&self.main_part, text)?;
            self.package.embedded_images(&self.main_part, &doc)
        };
        collect().map_err(|e| failure(ArtifactKind::Image, e))
    }

    fn link_targets(&self) -> SiftResult<Vec<String>> {
        self.package
            .hyperlink_targets(&self.main_part)
            .map_err(|e| failure(ArtifactKind::Url, e))
    }

    fn tables(&self) -> SiftResult<Vec<Table>> {
        Ok(body_blocks(&self.docx.document.children)
            .into_iter()
            .filter_map(|block| match block {
                Block::Table(t) => Some(table_rows(t)),
                Block::Paragraph(_) => None,
            })
            .filter(|table| !table.is_empty())
            .collect())
    }
}

/// A top-level body element.
enum Block<'a> {
    Paragraph(&'a docx_rs::Paragraph),
    Table(&'a docx_rs::Table),
}

/// Body paragraphs and tables in document order, with the content of
/// content controls (`w:sdt`) inlined where the control sits.
fn body_blocks(children: &[DocumentChild]) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    for child in children {
        match child {
            DocumentChild::Paragraph(p) => blocks.push(Block::Paragraph(p)),
            DocumentChild::Table(t) => blocks.push(Block::Table(t)),
            DocumentChild::StructuredDataTag(sdt) => push_tag_blocks(&mut blocks, sdt),
            _ => {}
        }
    }
    blocks
}

fn push_tag_blocks<'a>(blocks: &mut Vec<Block<'a>>, sdt: &'a StructuredDataTag) {
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Paragraph(p) => blocks.push(Block::Paragraph(p)),
            StructuredDataTagChild::Table(t) => blocks.push(Block::Table(t)),
            StructuredDataTagChild::StructuredDataTag(inner) => push_tag_blocks(blocks, inner),
            _ => {}
        }
    }
}

fn failure(kind: ArtifactKind, err: PackageError) -> SiftError {
    SiftError::extraction(DocumentFormat::Docx, kind, err.to_string())
}

/// Concatenated text of a paragraph's runs, including hyperlink runs.
fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run_text(&mut text, r),
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        push_run_text(&mut text, r);
                    }
                }
            }
            _ => {}
        }
    }

    text
}

fn push_run_text(text: &mut String, run: &docx_rs::Run) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

/// Rows of cell text; a cell's paragraphs are joined with a space.
fn table_rows(t: &docx_rs::Table) -> Table {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for row in &t.rows {
        let TableChild::TableRow(r) = row;
        let mut cells: Vec<String> = Vec::new();
        for cell in &r.cells {
            let TableRowChild::TableCell(c) = cell;
            let mut cell_text = String::new();
            for child in &c.children {
                if let TableCellContent::Paragraph(p) = child {
                    let para = paragraph_text(p);
                    if !cell_text.is_empty() && !para.is_empty() {
                        cell_text.push(' ');
                    }
                    cell_text.push_str(&para);
                }
            }
            cells.push(cell_text.trim().to_string());
        }
        rows.push(cells);
    }

    Table::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run, TableCell, TableRow};

    fn build(docx: Docx) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_paragraph_text_joins_runs() {
        let p = Paragraph::new()
            .add_run(Run::new().add_text("Hello, "))
            .add_run(Run::new().add_text("world"));
        assert_eq!(paragraph_text(&p), "Hello, world");
    }

    #[test]
    fn test_table_rows() {
        let table = docx_rs::Table::new(vec![
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("a"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("b"))),
            ]),
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("1"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("2"))),
            ]),
        ]);
        assert_eq!(
            table_rows(&table).rows,
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
    }

    #[test]
    fn test_body_blocks_unwrap_content_controls() {
        let text = |t: &str| Paragraph::new().add_run(Run::new().add_text(t));
        let inner = StructuredDataTag::new().add_paragraph(text("nested"));
        let mut outer = StructuredDataTag::new()
            .add_paragraph(text("in control"))
            .add_table(docx_rs::Table::new(vec![TableRow::new(vec![
                TableCell::new().add_paragraph(text("cell")),
            ])]));
        outer
            .children
            .push(StructuredDataTagChild::StructuredDataTag(Box::new(inner)));

        let docx = Docx::new()
            .add_paragraph(text("before"))
            .add_structured_data_tag(outer)
            .add_paragraph(text("after"));

        let blocks = body_blocks(&docx.document.children);
        let paragraphs: Vec<String> = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(paragraph_text(p)),
                Block::Table(_) => None,
            })
            .collect();
        assert_eq!(paragraphs, vec!["before", "in control", "nested", "after"]);
        assert_eq!(
            blocks.iter().filter(|b| matches!(b, Block::Table(_))).count(),
            1
        );
    }

    #[test]
    fn test_load_and_extract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.docx");
        let bytes = build(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("First")))
                .add_paragraph(Paragraph::new())
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Second"))),
        );
        std::fs::write(&path, bytes).unwrap();

        let document = DocxLoader::new().load_file(&path).ok().unwrap();
        assert_eq!(document.main_part(), "word/document.xml");
        assert_eq!(document.text_units().unwrap(), vec!["First", "Second"]);
        assert!(document.tables().unwrap().is_empty());
        assert!(document.images().unwrap().is_empty());
    }

    #[test]
    fn test_pdf_bytes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually.docx");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();

        let err = DocxLoader::new().load_file(&path).err().unwrap();
        assert_eq!(err.to_string(), "Invalid DOCX file.");
        assert_eq!(err.invalid_reason(), Some(InvalidReason::WrongFormat));
    }
}
