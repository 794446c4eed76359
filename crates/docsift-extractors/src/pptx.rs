//! PPTX loading and extraction.
//!
//! Slides are taken in presentation order (`p:sldIdLst`), not archive order.
//! Each extraction operation parses the slide XML again; a malformed slide
//! fails that operation only.

use std::path::Path;

use docsift_core::{
    ArtifactKind, DocumentFormat, DocumentLoader, DocumentSource, ExtractedImage,
    InvalidReason, SiftError, SiftResult, Table,
};
use roxmltree::Node;

use crate::base::Extractor;
use crate::error::PackageError;
use crate::ooxml::{open_package, parse_xml, rel_attribute, OoxmlPackage};
use crate::source::{read_source, reject};

/// Extractor for PPTX presentations.
pub type PptxExtractor = Extractor<PptxLoader>;

const CONTENT_MARKERS: &[&str] = &["presentationml", "ms-powerpoint"];

const DRAWINGML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Loads and validates PPTX files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxLoader;

impl PptxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for PptxLoader {
    type Document = PptxDocument;

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn load_file(&self, path: &Path) -> SiftResult<PptxDocument> {
        let format = DocumentFormat::Pptx;
        let source = read_source(path, format)?;
        let (package, main_part) = open_package(path, format, &source, CONTENT_MARKERS)?;

        let slides = slide_parts(&package, &main_part)
            .map_err(|e| reject(format, InvalidReason::Malformed, path, e))?;

        tracing::debug!("Accepted PPTX {} with {} slides", path.display(), slides.len());

        Ok(PptxDocument { package, slides })
    }
}

/// Loaded PPTX document handle.
#[derive(Debug)]
pub struct PptxDocument {
    package: OoxmlPackage,
    slides: Vec<String>,
}

impl PptxDocument {
    /// Number of slides in the presentation.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Parse each slide in order and apply `f` to it.
    fn map_slides<T>(
        &self,
        kind: ArtifactKind,
        f: impl Fn(&str, &roxmltree::Document<'_>) -> Result<T, PackageError>,
    ) -> SiftResult<Vec<T>> {
        self.slides
            .iter()
            .map(|slide| {
                let text = self.package.xml_text(slide)?;
                let doc = parse_xml(slide, text)?;
                f(slide, &doc)
            })
            .collect::<Result<Vec<T>, PackageError>>()
            .map_err(|e| SiftError::extraction(DocumentFormat::Pptx, kind, e.to_string()))
    }
}

impl DocumentSource for PptxDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn text_units(&self) -> SiftResult<Vec<String>> {
        let texts = self.map_slides(ArtifactKind::Text, |_, doc| Ok(slide_text(doc)))?;
        Ok(texts.into_iter().filter(|t| !t.trim().is_empty()).collect())
    }

    fn images(&self) -> SiftResult<Vec<ExtractedImage>> {
        let per_slide = self.map_slides(ArtifactKind::Image, |slide, doc| {
            self.package.embedded_images(slide, doc)
        })?;
        Ok(per_slide.into_iter().flatten().collect())
    }

    fn link_targets(&self) -> SiftResult<Vec<String>> {
        let mut links = Vec::new();
        for slide in &self.slides {
            let targets = self.package.hyperlink_targets(slide).map_err(|e| {
                SiftError::extraction(DocumentFormat::Pptx, ArtifactKind::Url, e.to_string())
            })?;
            links.extend(targets);
        }
        Ok(links)
    }

    fn tables(&self) -> SiftResult<Vec<Table>> {
        let per_slide = self.map_slides(ArtifactKind::Table, |_, doc| Ok(slide_tables(doc)))?;
        Ok(per_slide.into_iter().flatten().collect())
    }
}

/// Slide part names in presentation order.
fn slide_parts(package: &OoxmlPackage, main_part: &str) -> Result<Vec<String>, PackageError> {
    let text = package.xml_text(main_part)?;
    let doc = parse_xml(main_part, text)?;
    let relationships = package.relationships(main_part)?;

    let mut slides = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "sldId")
    {
        let id = rel_attribute(&node, "id").ok_or_else(|| PackageError::Structure {
            part: main_part.to_string(),
            message: "slide entry without relationship id".to_string(),
        })?;
        let rel = relationships
            .iter()
            .find(|rel| rel.id == id)
            .ok_or_else(|| PackageError::Structure {
                part: main_part.to_string(),
                message: format!("slide relationship {} not found", id),
            })?;
        if !package.has_part(&rel.target) {
            return Err(PackageError::MissingPart(rel.target.clone()));
        }
        slides.push(rel.target.clone());
    }

    Ok(slides)
}

fn is_drawing(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(DRAWINGML_NS)
}

/// Concatenated `a:t` runs of a DrawingML paragraph or cell.
fn runs_text(node: &Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| is_drawing(n, "t"))
        .filter_map(|n| n.text())
        .collect()
}

/// Text of a slide outside tables: non-empty paragraphs joined by newlines.
fn slide_text(doc: &roxmltree::Document<'_>) -> String {
    doc.descendants()
        .filter(|n| is_drawing(n, "p") && !n.ancestors().any(|a| is_drawing(&a, "tbl")))
        .map(|p| runs_text(&p))
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `a:tbl` tables of a slide; a cell's paragraphs are joined with a space.
fn slide_tables(doc: &roxmltree::Document<'_>) -> Vec<Table> {
    doc.descendants()
        .filter(|n| is_drawing(n, "tbl"))
        .map(|tbl| {
            let rows = tbl
                .children()
                .filter(|n| is_drawing(n, "tr"))
                .map(|tr| {
                    tr.children()
                        .filter(|n| is_drawing(n, "tc"))
                        .map(|tc| {
                            tc.descendants()
                                .filter(|n| is_drawing(n, "p"))
                                .map(|p| runs_text(&p))
                                .filter(|t| !t.is_empty())
                                .collect::<Vec<_>>()
                                .join(" ")
                                .trim()
                                .to_string()
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();
            Table::new(rows)
        })
        .filter(|table| !table.is_empty())
        .collect()
}
