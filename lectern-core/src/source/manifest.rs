//! OPF manifest scanning
//!
//! The `epub` crate keeps manifest items in a hash map, which loses the
//! declared order. The order matters for the navigation fallback, so the
//! package document is scanned once more for its `<item>` elements.

use crate::error::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<item>` of the OPF manifest, in declared order
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

/// Scan the manifest of an OPF package document
pub fn scan_manifest(opf: &str) -> Result<Vec<ManifestEntry>, ParseError> {
    let mut reader = Reader::from_str(opf.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_manifest = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"manifest" => in_manifest = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"manifest" => in_manifest = false,
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if in_manifest && e.local_name().as_ref() == b"item" =>
            {
                let mut entry = ManifestEntry {
                    id: String::new(),
                    href: String::new(),
                    media_type: String::new(),
                    properties: None,
                };

                for attr in e.attributes().flatten() {
                    let value = match attr.unescape_value() {
                        Ok(value) => value.into_owned(),
                        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                    };
                    match attr.key.local_name().as_ref() {
                        b"id" => entry.id = value,
                        b"href" => entry.href = value,
                        b"media-type" => entry.media_type = value,
                        b"properties" => entry.properties = Some(value),
                        _ => {}
                    }
                }

                if !entry.id.is_empty() && !entry.href.is_empty() {
                    entries.push(entry);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::MalformedPackage(e.to_string())),
            _ => {}
        }
    }

    Ok(entries)
}
