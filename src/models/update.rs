use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

/// Errors that can occur while checking for updates
#[derive(Error, Debug)]
pub enum UpdateCheckError {
    #[error("Failed to fetch update descriptor: {0}")]
    Fetch(String),

    #[error("Malformed update descriptor: {0}")]
    Malformed(String),

    #[error("Update descriptor has no {0} field")]
    MissingField(&'static str),

    #[error("Update descriptor has invalid revision {0:?}")]
    InvalidRevision(String),
}

/// Revision of the running build.
///
/// Development builds carry a sentinel revision and never trigger an update prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildRevision {
    pub current: u32,
    pub dev_sentinel: u32,
}

impl BuildRevision {
    pub fn new(current: u32, dev_sentinel: u32) -> Self {
        Self {
            current,
            dev_sentinel,
        }
    }

    /// Whether the running build is a genuine release build
    pub fn is_release(&self) -> bool {
        self.current != self.dev_sentinel
    }

    /// Whether a remote revision should be offered to the user
    pub fn is_outdated_by(&self, latest: u32) -> bool {
        self.is_release() && latest > self.current
    }
}

/// Update record parsed from the remote descriptor.
///
/// The descriptor is a flat document whose root element has one child
/// element per field:
///
/// ```xml
/// <update>
///   <revision>42</revision>
///   <title>reelname 4.9</title>
///   <message>A new version is available.</message>
///   <download>https://...</download>
///   <discussion>https://...</discussion>
/// </update>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub revision: u32,
    pub title: String,
    pub message: String,
    pub download: String,
    pub discussion: String,
}

impl UpdateInfo {
    /// Parse a descriptor document into an update record
    pub fn parse(xml: &str) -> Result<Self, UpdateCheckError> {
        Self::from_record(&parse_descriptor(xml)?)
    }

    /// Build an update record from the flat key/value form of the descriptor
    pub fn from_record(record: &IndexMap<String, String>) -> Result<Self, UpdateCheckError> {
        let revision = record
            .get("revision")
            .ok_or(UpdateCheckError::MissingField("revision"))?;
        let revision = revision
            .parse()
            .map_err(|_| UpdateCheckError::InvalidRevision(revision.clone()))?;

        let field = |name: &str| record.get(name).cloned().unwrap_or_default();

        Ok(Self {
            revision,
            title: field("title"),
            message: field("message"),
            download: field("download"),
            discussion: field("discussion"),
        })
    }
}

/// Flatten the children of the root element into name/text pairs.
///
/// Text of nested elements is concatenated into their top-level child and
/// trimmed; later duplicates replace earlier ones.
pub fn parse_descriptor(xml: &str) -> Result<IndexMap<String, String>, UpdateCheckError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut record = IndexMap::new();
    let mut depth = 0usize;
    let mut current: Option<(String, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| UpdateCheckError::Malformed(e.to_string()))?;

        match event {
            Event::Start(element) => {
                depth += 1;
                if depth == 2 {
                    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                    current = Some((name, String::new()));
                }
            }
            Event::Empty(element) => {
                if depth == 1 {
                    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                    record.insert(name, String::new());
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, text)) = current.take() {
                        record.insert(name, text.trim().to_string());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some((_, value)) = current.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| UpdateCheckError::Malformed(e.to_string()))?;
                    value.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(UpdateCheckError::Malformed(
            "unexpected end of document".to_string(),
        ));
    }

    Ok(record)
}
