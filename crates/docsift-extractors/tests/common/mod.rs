//! Fixture documents generated at test time.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use docx_rs::{Docx, Paragraph, Pic, Run, Table, TableCell, TableRow};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Real PNG bytes for embedding.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// An OLE compound file shaped like a password-protected Office package.
pub fn encrypted_office_bytes() -> Vec<u8> {
    let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    bytes.extend_from_slice(&[0u8; 504]);
    for name in ["EncryptionInfo", "EncryptedPackage"] {
        for unit in name.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0u8; 32]);
    }
    bytes
}

/// First half of a valid file.
pub fn truncated(bytes: &[u8]) -> Vec<u8> {
    bytes[..bytes.len() / 2].to_vec()
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// One PDF page.
#[derive(Default, Clone)]
pub struct PdfPage {
    /// Each line becomes its own text object.
    pub lines: Vec<String>,
    /// RGB samples (width, height, bytes) for one image XObject.
    pub image: Option<(i64, i64, Vec<u8>)>,
    /// URI link annotations.
    pub links: Vec<String>,
}

impl PdfPage {
    pub fn text(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }
}

fn build_pdf_document(pages: &[PdfPage]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        let mut y: i64 = 750;
        for line in &page.lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![50.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("ET", vec![]));
            y -= 20;
        }

        let mut xobjects = lopdf::Dictionary::new();
        if let Some((width, height, samples)) = &page.image {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => *width,
                    "Height" => *height,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                samples.clone(),
            ));
            xobjects.set("Im1", image_id);
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![100.into(), 0.into(), 0.into(), 100.into(), 50.into(), 400.into()],
            ));
            operations.push(Operation::new("Do", vec!["Im1".into()]));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let annots: Vec<Object> = page
            .links
            .iter()
            .map(|uri| {
                let id: ObjectId = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
                    "A" => dictionary! {
                        "S" => "URI",
                        "URI" => Object::string_literal(uri.as_str()),
                    },
                });
                id.into()
            })
            .collect();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save_pdf(mut doc: Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn pdf_bytes(pages: &[PdfPage]) -> Vec<u8> {
    save_pdf(build_pdf_document(pages))
}

/// A PDF whose trailer declares standard security handler encryption.
pub fn encrypted_pdf_bytes() -> Vec<u8> {
    let mut doc = build_pdf_document(&[PdfPage::text(&["secret"])]);
    doc.trailer.set(
        "Encrypt",
        dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "O" => Object::string_literal(vec![0u8; 32]),
            "U" => Object::string_literal(vec![0u8; 32]),
            "P" => -4,
        },
    );
    save_pdf(doc)
}

/// A one-page PDF with hand-written content operations. `xobjects` builds
/// the page's `/XObject` resource dictionary.
pub fn custom_page_pdf_bytes(
    operations: Vec<Operation>,
    xobjects: impl FnOnce(&mut Document) -> lopdf::Dictionary,
) -> Vec<u8> {
    let mut doc = build_pdf_document(&[PdfPage::default()]);
    let xobjects = xobjects(&mut doc);
    let content = Content { operations }.encode().unwrap();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut).unwrap();
    page.set("Contents", content_id);
    page.set("Resources", dictionary! { "XObject" => xobjects });
    save_pdf(doc)
}

/// Uncompressed RGB image XObject.
pub fn rgb_image_stream((width, height, samples): (i64, i64, Vec<u8>)) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        samples,
    )
}

/// Form XObject drawing the XObjects in `resources` named by `draws`.
pub fn form_stream(resources: lopdf::Dictionary, draws: &[&str]) -> Stream {
    let operations: Vec<Operation> = draws
        .iter()
        .map(|name| Operation::new("Do", vec![(*name).into()]))
        .collect();
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Resources" => dictionary! { "XObject" => resources },
        },
        Content { operations }.encode().unwrap(),
    )
}

/// 2x2 RGB pixels.
pub fn rgb_samples() -> (i64, i64, Vec<u8>) {
    (2, 2, vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255])
}

// ---------------------------------------------------------------------------
// DOCX
// ---------------------------------------------------------------------------

pub fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

pub fn docx_table(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|row| {
                TableRow::new(
                    row.iter()
                        .map(|cell| TableCell::new().add_paragraph(text_paragraph(cell)))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn image_paragraph() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_image(Pic::new(&png_bytes())))
}

pub fn docx_bytes(docx: Docx) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    docx.build().pack(&mut out).unwrap();
    out.into_inner()
}

// ---------------------------------------------------------------------------
// PPTX
// ---------------------------------------------------------------------------

/// One PPTX slide.
#[derive(Default, Clone)]
pub struct PptxSlide {
    pub paragraphs: Vec<String>,
    pub table: Option<Vec<Vec<String>>>,
    pub image: Option<Vec<u8>>,
    pub links: Vec<String>,
}

impl PptxSlide {
    pub fn text(paragraphs: &[&str]) -> Self {
        Self {
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }
}

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn a_paragraph(text: &str) -> String {
    format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(text))
}

fn slide_xml(slide: &PptxSlide) -> String {
    let mut tree = String::new();

    if !slide.paragraphs.is_empty() {
        tree.push_str("<p:sp><p:txBody><a:bodyPr/>");
        for p in &slide.paragraphs {
            tree.push_str(&a_paragraph(p));
        }
        tree.push_str("</p:txBody></p:sp>");
    }

    if let Some(rows) = &slide.table {
        tree.push_str("<p:graphicFrame><a:graphic><a:graphicData><a:tbl>");
        for row in rows {
            tree.push_str("<a:tr>");
            for cell in row {
                tree.push_str("<a:tc><a:txBody>");
                tree.push_str(&a_paragraph(cell));
                tree.push_str("</a:txBody></a:tc>");
            }
            tree.push_str("</a:tr>");
        }
        tree.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    }

    if slide.image.is_some() {
        tree.push_str(
            "<p:pic><p:blipFill><a:blip r:embed=\"rIdImg\"/></p:blipFill></p:pic>",
        );
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"{NS_A}\" xmlns:p=\"{NS_P}\" xmlns:r=\"{NS_R}\">\
         <p:cSld><p:spTree>{tree}</p:spTree></p:cSld></p:sld>"
    )
}

fn slide_rels(slide: &PptxSlide, index: usize) -> String {
    let mut rels = String::new();
    if slide.image.is_some() {
        rels.push_str(&format!(
            "<Relationship Id=\"rIdImg\" Type=\"{REL_BASE}/image\" Target=\"../media/image{index}.png\"/>"
        ));
    }
    for (n, link) in slide.links.iter().enumerate() {
        rels.push_str(&format!(
            "<Relationship Id=\"rIdLink{n}\" Type=\"{REL_BASE}/hyperlink\" Target=\"{}\" TargetMode=\"External\"/>",
            escape(link)
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"{NS_PKG_RELS}\">{rels}</Relationships>"
    )
}

/// Build a PPTX package. Slides are listed in `sldIdLst` in the given
/// order but written to the archive in reverse, so tests catch archive-order
/// traversal.
pub fn pptx_bytes(slides: &[PptxSlide]) -> Vec<u8> {
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();

    let mut overrides = String::from(
        "<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>",
    );
    let mut sld_ids = String::new();
    let mut pres_rels = String::new();

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        ));
        sld_ids.push_str(&format!("<p:sldId id=\"{}\" r:id=\"rId{n}\"/>", 255 + n));
        pres_rels.push_str(&format!(
            "<Relationship Id=\"rId{n}\" Type=\"{REL_BASE}/slide\" Target=\"slides/slide{n}.xml\"/>"
        ));
        if let Some(image) = &slide.image {
            parts.push((format!("ppt/media/image{n}.png"), image.clone()));
        }
        parts.push((
            format!("ppt/slides/_rels/slide{n}.xml.rels"),
            slide_rels(slide, n).into_bytes(),
        ));
        parts.push((format!("ppt/slides/slide{n}.xml"), slide_xml(slide).into_bytes()));
    }
    parts.reverse();

    let content_types = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"png\" ContentType=\"image/png\"/>\
         {overrides}</Types>"
    );
    let root_rels = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"{NS_PKG_RELS}\">\
         <Relationship Id=\"rId1\" Type=\"{REL_BASE}/officeDocument\" Target=\"ppt/presentation.xml\"/>\
         </Relationships>"
    );
    let presentation = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:presentation xmlns:a=\"{NS_A}\" xmlns:p=\"{NS_P}\" xmlns:r=\"{NS_R}\">\
         <p:sldIdLst>{sld_ids}</p:sldIdLst></p:presentation>"
    );
    let presentation_rels = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"{NS_PKG_RELS}\">{pres_rels}</Relationships>"
    );

    let mut all_parts = vec![
        ("[Content_Types].xml".to_string(), content_types.into_bytes()),
        ("_rels/.rels".to_string(), root_rels.into_bytes()),
        ("ppt/presentation.xml".to_string(), presentation.into_bytes()),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels.into_bytes(),
        ),
    ];
    all_parts.extend(parts);
    zip_bytes(&all_parts)
}

pub fn zip_bytes(parts: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (name, data) in parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}
