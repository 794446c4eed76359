//! Office Open XML package access shared by the DOCX and PPTX formats.
//!
//! A package is a ZIP archive of parts linked by relationship files
//! (`_rels/*.rels`). The whole archive is inflated at load time, so a bad
//! CRC or truncated entry fails the loader rather than a later extraction.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

use docsift_core::{DocumentFormat, ExtractedImage, InvalidReason, SiftResult};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::PackageError;
use crate::images::format_hint;
use crate::signature::FileSignature;
use crate::source::{reject, SourceFile};
use crate::urls::is_absolute_url;

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const HYPERLINK_REL: &str = "/hyperlink";
const RELATIONSHIPS_NS_SUFFIX: &str = "/relationships";

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Resolved part name for internal targets, raw target for external ones.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn is_hyperlink(&self) -> bool {
        self.rel_type.ends_with(HYPERLINK_REL)
    }
}

/// An inflated OOXML package.
#[derive(Debug)]
pub(crate) struct OoxmlPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlPackage {
    /// Inflate every part of a ZIP archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PackageError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = BTreeMap::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().trim_start_matches('/').to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            parts.insert(name, data);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(PackageError::MissingPart(CONTENT_TYPES_PART.to_string()));
        }

        Ok(Self { parts })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// A part as UTF-8 text with any byte-order mark removed.
    pub fn xml_text(&self, name: &str) -> Result<&str, PackageError> {
        let data = self
            .part(name)
            .ok_or_else(|| PackageError::MissingPart(name.to_string()))?;
        let text =
            std::str::from_utf8(data).map_err(|_| PackageError::Encoding(name.to_string()))?;
        Ok(text.trim_start_matches('\u{feff}'))
    }

    /// Relationships declared by `part_name` (empty string for the package
    /// root). A part without a `.rels` file has no relationships.
    pub fn relationships(&self, part_name: &str) -> Result<Vec<Relationship>, PackageError> {
        let rels_name = rels_path(part_name);
        if !self.has_part(&rels_name) {
            return Ok(Vec::new());
        }

        let text = self.xml_text(&rels_name)?;
        let doc = parse_xml(&rels_name, text)?;

        let mut relationships = Vec::new();
        for node in doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        {
            let (Some(id), Some(rel_type), Some(target)) = (
                node.attribute("Id"),
                node.attribute("Type"),
                node.attribute("Target"),
            ) else {
                return Err(PackageError::Structure {
                    part: rels_name,
                    message: "relationship without Id, Type or Target".to_string(),
                });
            };
            let external = node
                .attribute("TargetMode")
                .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
            let target = if external {
                target.to_string()
            } else {
                resolve_target(part_name, target)
            };
            relationships.push(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target,
                external,
            });
        }

        Ok(relationships)
    }

    /// Name of the main document part, from the package root relationships.
    pub fn main_part(&self) -> Result<String, PackageError> {
        self.relationships("")?
            .into_iter()
            .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL) && !rel.external)
            .map(|rel| rel.target)
            .ok_or_else(|| PackageError::MissingPart("officeDocument relationship".to_string()))
    }

    /// Declared content type of a part (override first, then the default
    /// for its extension).
    pub fn content_type(&self, part_name: &str) -> Result<Option<String>, PackageError> {
        let text = self.xml_text(CONTENT_TYPES_PART)?;
        let doc = parse_xml(CONTENT_TYPES_PART, text)?;
        let wanted = format!("/{}", part_name);
        let extension = part_name.rsplit_once('.').map(|(_, ext)| ext);

        let mut default = None;
        for node in doc.descendants().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "Override" if node.attribute("PartName") == Some(wanted.as_str()) => {
                    return Ok(node.attribute("ContentType").map(str::to_string));
                }
                "Default" => {
                    let matches = match (node.attribute("Extension"), extension) {
                        (Some(declared), Some(ext)) => declared.eq_ignore_ascii_case(ext),
                        _ => false,
                    };
                    if matches {
                        default = node.attribute("ContentType").map(str::to_string);
                    }
                }
                _ => {}
            }
        }

        Ok(default)
    }

    /// External hyperlink targets declared by a part.
    pub fn hyperlink_targets(&self, part_name: &str) -> Result<Vec<String>, PackageError> {
        Ok(self
            .relationships(part_name)?
            .into_iter()
            .filter(|rel| rel.is_hyperlink() && rel.external && is_absolute_url(&rel.target))
            .map(|rel| rel.target)
            .collect())
    }

    /// Images embedded by a part, in the order their `blip` references
    /// appear in its XML. Repeated references yield repeated images.
    pub fn embedded_images(
        &self,
        part_name: &str,
        doc: &roxmltree::Document<'_>,
    ) -> Result<Vec<ExtractedImage>, PackageError> {
        let embed_ids: Vec<String> = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "blip")
            .filter_map(|n| rel_attribute(&n, "embed"))
            .collect();
        if embed_ids.is_empty() {
            return Ok(Vec::new());
        }

        let relationships = self.relationships(part_name)?;
        let mut images = Vec::with_capacity(embed_ids.len());
        for id in embed_ids {
            let rel = relationships
                .iter()
                .find(|rel| rel.id == id)
                .ok_or_else(|| PackageError::Structure {
                    part: part_name.to_string(),
                    message: format!("image reference {} has no relationship", id),
                })?;
            if rel.external {
                // Linked, not embedded.
                continue;
            }
            let data = self
                .part(&rel.target)
                .ok_or_else(|| PackageError::MissingPart(rel.target.clone()))?;
            let fallback = rel.target.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("raw");
            images.push(ExtractedImage::new(
                data.to_vec(),
                format_hint(data, &fallback.to_ascii_lowercase()),
            ));
        }

        Ok(images)
    }
}

/// Validate a source file as an OOXML package of `format`.
///
/// The main document part's declared content type must contain one of
/// `content_markers`; a package of another Office format is rejected as the
/// wrong format. Returns the package and its main part name.
pub(crate) fn open_package(
    path: &Path,
    format: DocumentFormat,
    source: &SourceFile,
    content_markers: &[&str],
) -> SiftResult<(OoxmlPackage, String)> {
    if let Some(reason) = source.signature.ooxml_rejection(&source.bytes) {
        return Err(reject(format, reason, path, "not an OOXML container"));
    }

    let package = OoxmlPackage::from_bytes(&source.bytes)
        .map_err(|e| reject(format, rejection_reason(&e, source.signature), path, e))?;

    let main_part = package
        .main_part()
        .map_err(|e| reject(format, InvalidReason::Malformed, path, e))?;
    if !package.has_part(&main_part) {
        return Err(reject(
            format,
            InvalidReason::Malformed,
            path,
            format!("main part {} is missing", main_part),
        ));
    }

    let content_type = package
        .content_type(&main_part)
        .map_err(|e| reject(format, InvalidReason::Malformed, path, e))?;
    if let Some(content_type) = content_type {
        if !content_markers.iter().any(|m| content_type.contains(m)) {
            return Err(reject(
                format,
                InvalidReason::WrongFormat,
                path,
                format!("main part content type is {}", content_type),
            ));
        }
    }

    Ok((package, main_part))
}

fn rejection_reason(err: &PackageError, signature: FileSignature) -> InvalidReason {
    match err {
        PackageError::Zip(ZipError::UnsupportedArchive(message))
            if message.contains("assword") =>
        {
            InvalidReason::PasswordProtected
        }
        PackageError::Zip(_) if signature != FileSignature::Zip => InvalidReason::WrongFormat,
        _ => InvalidReason::Malformed,
    }
}

/// Parse XML text, tagging errors with the part name.
pub(crate) fn parse_xml<'a>(
    part_name: &str,
    text: &'a str,
) -> Result<roxmltree::Document<'a>, PackageError> {
    roxmltree::Document::parse(text).map_err(|e| PackageError::Xml {
        part: part_name.to_string(),
        message: e.to_string(),
    })
}

/// Value of a relationship-namespace attribute (`r:embed`, `r:id`). Both
/// the transitional and strict namespace URIs end in `/relationships`.
pub(crate) fn rel_attribute(node: &roxmltree::Node<'_, '_>, local_name: &str) -> Option<String> {
    node.attributes()
        .find(|attr| {
            attr.name() == local_name
                && attr
                    .namespace()
                    .is_some_and(|ns| ns.ends_with(RELATIONSHIPS_NS_SUFFIX))
        })
        .map(|attr| attr.value().to_string())
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`; the package root
/// (empty name) -> `_rels/.rels`.
fn rels_path(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target relative to the directory of its source
/// part. Absolute targets start at the package root.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = source_part
        .rsplit_once('/')
        .map(|(dir, _)| dir.split('/').collect())
        .unwrap_or_default();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
