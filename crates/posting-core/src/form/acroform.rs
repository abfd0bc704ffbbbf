//! AcroForm templates backed by lopdf.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId, StringFormat};
use tracing::{debug, trace};

use super::{FormTemplate, Result, TemplateSource};
use crate::error::TemplateError;

/// Guard against malformed field trees that reference themselves.
const MAX_FIELD_DEPTH: usize = 32;

/// A loaded form document with its fields indexed by fully qualified name.
pub struct AcroFormTemplate {
    document: Document,
    fields: HashMap<String, ObjectId>,
}

impl AcroFormTemplate {
    /// Load a template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let document = Document::load(path).map_err(|e| TemplateError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_document(document)
    }

    /// Index the form fields of an already parsed document.
    pub fn from_document(mut document: Document) -> Result<Self> {
        let catalog_id = match document.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => *id,
            _ => return Err(TemplateError::NoForm),
        };

        let (acroform_id, field_refs) = {
            let catalog = match document.get_object(catalog_id) {
                Ok(Object::Dictionary(dict)) => dict,
                _ => return Err(TemplateError::NoForm),
            };
            let acroform_obj = catalog.get(b"AcroForm").map_err(|_| TemplateError::NoForm)?;
            let (acroform_id, acroform) = match document.dereference(acroform_obj) {
                Ok((id, Object::Dictionary(dict))) => (id, dict),
                _ => return Err(TemplateError::NoForm),
            };
            let field_refs = match acroform.get(b"Fields").map(|f| document.dereference(f)) {
                Ok(Ok((_, Object::Array(refs)))) => refs.clone(),
                _ => Vec::new(),
            };
            (acroform_id, field_refs)
        };

        let mut fields = HashMap::new();
        for field in &field_refs {
            if let Object::Reference(id) = field {
                collect_fields(&document, *id, None, &mut fields, 0);
            }
        }
        debug!("Template has {} form fields", fields.len());

        // Filled values carry no appearance stream; ask viewers to build one.
        let acroform = match acroform_id {
            Some(id) => document.get_object_mut(id),
            None => document
                .get_object_mut(catalog_id)
                .and_then(|catalog| catalog.as_dict_mut())
                .and_then(|catalog| catalog.get_mut(b"AcroForm")),
        };
        if let Ok(Object::Dictionary(dict)) = acroform {
            dict.set("NeedAppearances", Object::Boolean(true));
        }

        Ok(Self { document, fields })
    }

    /// Fully qualified names of all fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Current value of a field, if it has one.
    pub fn field_value(&self, name: &str) -> Option<String> {
        let id = self.fields.get(name)?;
        match self.document.get_object(*id) {
            Ok(Object::Dictionary(dict)) => match dict.get(b"V") {
                Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FormTemplate for AcroFormTemplate {
    fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let id = *self
            .fields
            .get(name)
            .ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;

        match self.document.get_object_mut(id) {
            Ok(Object::Dictionary(dict)) => {
                dict.set("V", encode_text_string(value));
                trace!("Set field {:?} = {:?}", name, value);
                Ok(())
            }
            Ok(_) => Err(TemplateError::Write {
                field: name.to_string(),
                reason: "field is not a dictionary".to_string(),
            }),
            Err(e) => Err(TemplateError::Write {
                field: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn save(mut self, path: &Path) -> Result<()> {
        self.document.save(path).map_err(|e| TemplateError::Save {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Saved form to {}", path.display());
        Ok(())
    }
}

/// Loads the template file from disk for every batch.
#[derive(Debug, Clone)]
pub struct AcroFormSource {
    path: PathBuf,
}

impl AcroFormSource {
    /// Create a source for the template at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the template file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for AcroFormSource {
    type Template = AcroFormTemplate;

    fn load(&self) -> Result<AcroFormTemplate> {
        AcroFormTemplate::load(&self.path)
    }
}

fn collect_fields(
    document: &Document,
    id: ObjectId,
    parent: Option<&str>,
    out: &mut HashMap<String, ObjectId>,
    depth: usize,
) {
    if depth > MAX_FIELD_DEPTH {
        return;
    }
    let dict = match document.get_object(id) {
        Ok(Object::Dictionary(dict)) => dict,
        _ => return,
    };

    let partial = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
        _ => None,
    };
    // Widgets without a partial name belong to their parent field.
    let name = match (parent, partial) {
        (Some(parent), Some(partial)) => Some(format!("{}.{}", parent, partial)),
        (None, Some(partial)) => Some(partial),
        (parent, None) => parent.map(str::to_string),
    };

    if let Some(name) = &name {
        out.entry(name.clone()).or_insert(id);
    }

    if let Ok(Object::Array(kids)) = dict.get(b"Kids") {
        for kid in kids {
            if let Object::Reference(kid_id) = kid {
                collect_fields(document, *kid_id, name.as_deref(), out, depth + 1);
            }
        }
    }
}

/// PDFDocEncoding characters for bytes 0x80..=0xA0, where it departs from Latin-1.
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}',
    char::REPLACEMENT_CHARACTER, '\u{20AC}',
];

/// Decode a PDF text string (UTF-16BE with BOM, otherwise PDFDocEncoding).
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE_u8, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0xA0 => PDF_DOC_HIGH[usize::from(b - 0x80)],
            _ => char::from(b),
        })
        .collect()
}

/// Encode a value as a PDF text string.
fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_round_trip() {
        let encoded = encode_text_string("12 High St, Springfield");
        match encoded {
            Object::String(bytes, StringFormat::Literal) => {
                assert_eq!(decode_text_string(&bytes), "12 High St, Springfield");
            }
            other => panic!("unexpected object {:?}", other),
        }
    }

    #[test]
    fn test_non_ascii_uses_utf16() {
        match encode_text_string("Zoë Brontë") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(decode_text_string(&bytes), "Zoë Brontë");
            }
            other => panic!("unexpected object {:?}", other),
        }
    }

    #[test]
    fn test_pdf_doc_encoding_high_range() {
        // en dash, curly quotes, euro
        assert_eq!(decode_text_string(&[0x41, 0x85, 0x42]), "A\u{2013}B");
        assert_eq!(decode_text_string(&[0x8D, 0x48, 0x69, 0x8E]), "\u{201C}Hi\u{201D}");
        assert_eq!(decode_text_string(&[0x80, 0xA0]), "\u{2022}\u{20AC}");
        assert_eq!(decode_text_string(&[0x9F]), "\u{FFFD}");
    }

    #[test]
    fn test_latin1_decode() {
        assert_eq!(decode_text_string(&[0x4A, 0x6F, 0xEB]), "Joë");
    }

    #[test]
    fn test_missing_template() {
        let err = AcroFormSource::new("does/not/exist.pdf").load().err().unwrap();
        assert!(matches!(err, TemplateError::Load { .. }));
    }
}
