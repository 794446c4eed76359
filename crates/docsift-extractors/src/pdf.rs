//! PDF loading and extraction using lopdf.
//!
//! Text is taken page by page; images are the image XObjects each page's
//! content stream draws with `Do`, including those nested in form XObjects;
//! URLs come from `/Link` annotations with a `/URI` action; tables are
//! detected heuristically from aligned text.

use std::path::Path;

use docsift_core::{
    ArtifactKind, DocumentFormat, DocumentLoader, DocumentSource, ExtractedImage,
    ExtractionConfig, InvalidReason, SiftError, SiftResult, Table,
};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::base::Extractor;
use crate::images::{encode_png, format_hint, PixelLayout};
use crate::signature::FileSignature;
use crate::source::{read_source, reject};

/// Extractor for PDF documents.
pub type PdfExtractor = Extractor<PdfLoader>;

/// Guard against cyclic `/Parent` chains in the page tree.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Guard against form XObjects that draw themselves.
const MAX_FORM_DEPTH: usize = 16;

/// Cells in a text line are separated by tabs or runs of three or more spaces.
static CELL_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+| {3,}").unwrap());

/// Loads and validates PDF files.
#[derive(Debug, Clone, Default)]
pub struct PdfLoader {
    config: ExtractionConfig,
}

impl PdfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader whose documents use custom table detection thresholds.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl DocumentLoader for PdfLoader {
    type Document = PdfDocument;

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn load_file(&self, path: &Path) -> SiftResult<PdfDocument> {
        let format = DocumentFormat::Pdf;
        let source = read_source(path, format)?;

        if let Some(reason) = source.signature.pdf_rejection() {
            return Err(reject(format, reason, path, "not a PDF container"));
        }
        if has_encrypt_entry(&source.bytes) {
            return Err(reject(
                format,
                InvalidReason::PasswordProtected,
                path,
                "trailer declares /Encrypt",
            ));
        }

        let doc = Document::load_mem(&source.bytes).map_err(|e| {
            let reason = match source.signature {
                FileSignature::Pdf => InvalidReason::Malformed,
                _ => InvalidReason::WrongFormat,
            };
            reject(format, reason, path, e)
        })?;

        if is_password_protected(&doc) {
            return Err(reject(
                format,
                InvalidReason::PasswordProtected,
                path,
                "document is encrypted",
            ));
        }

        tracing::debug!(
            "Accepted PDF {} with {} pages",
            path.display(),
            doc.get_pages().len()
        );

        Ok(PdfDocument {
            doc,
            min_table_rows: self.config.min_table_rows.max(1),
            min_table_columns: self.config.min_table_columns.max(2),
        })
    }
}

/// Loaded PDF document handle.
#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    min_table_rows: usize,
    min_table_columns: usize,
}

impl PdfDocument {
    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Raw text of every page, in page order, including empty pages.
    ///
    /// Failures are reported against `kind`, the artifact being extracted.
    fn page_texts(&self, kind: ArtifactKind) -> SiftResult<Vec<String>> {
        self.doc
            .get_pages()
            .into_keys()
            .map(|page_num| {
                self.doc
                    .extract_text(&[page_num])
                    .map(|text| text.trim_end_matches(['\n', '\r']).to_string())
                    .map_err(|e| failure(kind, format!("page {}: {}", page_num, e)))
            })
            .collect()
    }

    /// Resources of a page, inherited from the page tree when absent.
    fn page_resources(&self, page_id: ObjectId) -> Result<Option<&Dictionary>, lopdf::Error> {
        let mut node = self.doc.get_dictionary(page_id)?;
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return self.resolve(resources)?.as_dict().map(Some);
            }
            match node.get(b"Parent") {
                Ok(Object::Reference(parent)) => node = self.doc.get_dictionary(*parent)?,
                _ => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Images drawn by a page, in the order its content stream draws them.
    fn page_images(&self, page_id: ObjectId) -> Result<Vec<ExtractedImage>, lopdf::Error> {
        let mut images = Vec::new();
        let Some(resources) = self.page_resources(page_id)? else {
            return Ok(images);
        };
        let content = self.doc.get_page_content(page_id)?;
        self.collect_drawn_images(&content, resources, 0, &mut images)?;
        Ok(images)
    }

    /// Walk the `Do` operators of `content`, resolving names against the
    /// `/XObject` entry of `resources`. Form XObjects are entered with their
    /// own resources, or the enclosing ones when they declare none.
    fn collect_drawn_images<'a>(
        &'a self,
        content: &[u8],
        resources: &'a Dictionary,
        depth: usize,
        images: &mut Vec<ExtractedImage>,
    ) -> Result<(), lopdf::Error> {
        if depth > MAX_FORM_DEPTH {
            tracing::debug!("Form XObjects nested deeper than {}, skipping", MAX_FORM_DEPTH);
            return Ok(());
        }
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(());
        };
        let xobjects = self.resolve(xobjects)?.as_dict()?;

        for operation in Content::decode(content)?.operations {
            if operation.operator != "Do" {
                continue;
            }
            let Some(Object::Name(name)) = operation.operands.first() else {
                continue;
            };
            let Ok(object) = xobjects.get(name) else {
                tracing::debug!("Do names unknown XObject /{}", String::from_utf8_lossy(name));
                continue;
            };

            let stream = self.resolve(object)?.as_stream()?;
            let subtype = stream.dict.get(b"Subtype").ok();
            if is_name(subtype, b"Image") {
                images.push(image_from_stream(stream));
            } else if is_name(subtype, b"Form") {
                let form_resources = match stream.dict.get(b"Resources") {
                    Ok(own) => self.resolve(own)?.as_dict()?,
                    Err(_) => resources,
                };
                let form_content = stream_content(stream)?;
                self.collect_drawn_images(&form_content, form_resources, depth + 1, images)?;
            }
        }
        Ok(())
    }

    fn page_links(&self, page_id: ObjectId) -> Result<Vec<String>, lopdf::Error> {
        let page = self.doc.get_dictionary(page_id)?;
        let Ok(annots) = page.get(b"Annots") else {
            return Ok(Vec::new());
        };

        let mut links = Vec::new();
        for annot in self.resolve(annots)?.as_array()? {
            let annot = self.resolve(annot)?.as_dict()?;
            if !is_name(annot.get(b"Subtype").ok(), b"Link") {
                continue;
            }
            let Ok(action) = annot.get(b"A") else {
                // Internal destination.
                continue;
            };
            let action = self.resolve(action)?.as_dict()?;
            if let Ok(uri) = action.get(b"URI") {
                if let Object::String(bytes, _) = self.resolve(uri)? {
                    links.push(String::from_utf8_lossy(bytes).trim().to_string());
                }
            }
        }
        Ok(links)
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, lopdf::Error> {
        match object {
            Object::Reference(id) => self.doc.get_object(*id),
            other => Ok(other),
        }
    }
}

impl DocumentSource for PdfDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn text_units(&self) -> SiftResult<Vec<String>> {
        Ok(self
            .page_texts(ArtifactKind::Text)?
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .collect())
    }

    fn images(&self) -> SiftResult<Vec<ExtractedImage>> {
        let mut images = Vec::new();
        for (page_num, page_id) in self.doc.get_pages() {
            let page_images = self
                .page_images(page_id)
                .map_err(|e| failure(ArtifactKind::Image, format!("page {}: {}", page_num, e)))?;
            images.extend(page_images);
        }
        Ok(images)
    }

    fn link_targets(&self) -> SiftResult<Vec<String>> {
        let mut links = Vec::new();
        for (page_num, page_id) in self.doc.get_pages() {
            let page_links = self
                .page_links(page_id)
                .map_err(|e| failure(ArtifactKind::Url, format!("page {}: {}", page_num, e)))?;
            links.extend(page_links);
        }
        Ok(links)
    }

    fn tables(&self) -> SiftResult<Vec<Table>> {
        Ok(self
            .page_texts(ArtifactKind::Table)?
            .iter()
            .flat_map(|text| detect_tables(text, self.min_table_rows, self.min_table_columns))
            .collect())
    }
}

fn failure(kind: ArtifactKind, message: String) -> SiftError {
    SiftError::extraction(DocumentFormat::Pdf, kind, message)
}

fn is_name(object: Option<&Object>, name: &[u8]) -> bool {
    matches!(object, Some(Object::Name(n)) if n == name)
}

/// Whether a parsed document carries an `/Encrypt` trailer entry.
fn is_password_protected(doc: &Document) -> bool {
    doc.is_encrypted() || doc.trailer.get(b"Encrypt").is_ok()
}

/// Whether the raw file declares an `/Encrypt` dictionary or reference.
fn has_encrypt_entry(bytes: &[u8]) -> bool {
    const KEY: &[u8] = b"/Encrypt";
    bytes.windows(KEY.len()).enumerate().any(|(start, window)| {
        window == KEY
            && bytes[start + KEY.len()..]
                .iter()
                .find(|b| !b.is_ascii_whitespace())
                .is_some_and(|b| b.is_ascii_digit() || *b == b'<')
    })
}

/// Filter names of a stream, outermost first.
fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(names)) => names
            .iter()
            .filter_map(|n| match n {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Decoded bytes of a content-bearing stream such as a form XObject.
fn stream_content(stream: &Stream) -> Result<Vec<u8>, lopdf::Error> {
    if stream_filters(&stream.dict).is_empty() {
        Ok(stream.content.clone())
    } else {
        stream.decompressed_content()
    }
}

/// Bytes and format hint for an image XObject.
///
/// JPEG and JPEG 2000 streams are already standalone files. Unfiltered or
/// Flate-compressed 8-bit RGB and grayscale samples are re-encoded as PNG.
/// Anything else keeps its stored bytes with a `raw` hint.
fn image_from_stream(stream: &Stream) -> ExtractedImage {
    let filters = stream_filters(&stream.dict);
    match filters.as_slice() {
        [filter] if filter.as_slice() == b"DCTDecode" => {
            ExtractedImage::new(stream.content.clone(), format_hint(&stream.content, "jpg"))
        }
        [filter] if filter.as_slice() == b"JPXDecode" => {
            ExtractedImage::new(stream.content.clone(), "jp2")
        }
        [] => reencode_samples(stream, stream.content.clone()),
        [filter] if filter.as_slice() == b"FlateDecode" => match stream.decompressed_content() {
            Ok(samples) => reencode_samples(stream, samples),
            Err(e) => {
                tracing::debug!("Keeping undecodable image stream as raw bytes: {}", e);
                ExtractedImage::new(stream.content.clone(), "raw")
            }
        },
        _ => ExtractedImage::new(stream.content.clone(), "raw"),
    }
}

fn reencode_samples(stream: &Stream, samples: Vec<u8>) -> ExtractedImage {
    let dict = &stream.dict;
    let dimension = |key: &[u8]| {
        dict.get(key)
            .ok()
            .and_then(|o| o.as_i64().ok())
            .and_then(|v| u32::try_from(v).ok())
    };
    let layout = match dict.get(b"ColorSpace") {
        Ok(Object::Name(name)) if name.as_slice() == b"DeviceRGB" => Some(PixelLayout::Rgb),
        Ok(Object::Name(name)) if name.as_slice() == b"DeviceGray" => Some(PixelLayout::Gray),
        _ => None,
    };

    if let (Some(width), Some(height), Some(8), Some(layout)) = (
        dimension(b"Width"),
        dimension(b"Height"),
        dimension(b"BitsPerComponent"),
        layout,
    ) {
        if let Some(png) = encode_png(samples.clone(), width, height, layout) {
            return ExtractedImage::new(png, "png");
        }
    }

    ExtractedImage::new(samples, "raw")
}

/// Find tables in page text: runs of at least `min_rows` consecutive lines
/// that split into the same number of cells, at least `min_columns` of them.
/// Lines holding a full sentence are treated as prose and end a run.
pub(crate) fn detect_tables(text: &str, min_rows: usize, min_columns: usize) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    let mut flush = |run: &mut Vec<Vec<String>>| {
        if run.len() >= min_rows {
            tables.push(Table::new(std::mem::take(run)));
        } else {
            run.clear();
        }
    };

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() < min_columns || cells.iter().any(|cell| is_sentence(cell)) {
            flush(&mut run);
            continue;
        }
        if run.first().is_some_and(|first| first.len() != cells.len()) {
            flush(&mut run);
        }
        run.push(cells);
    }
    flush(&mut run);

    tables
}

fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect()
}

/// Several words closed by sentence punctuation.
fn is_sentence(cell: &str) -> bool {
    cell.ends_with(['.', '!', '?']) && cell.split_whitespace().count() >= 3
}
