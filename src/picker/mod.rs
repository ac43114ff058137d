use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("picker payload does not contain a usable image file")]
    InvalidFilePayload,
}

/// Raw file data as handed over by a picker capability, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilePayload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// What a picker hands over. Some picker components wrap the real file inside
/// a container object under an `origin_file` field instead of yielding the
/// file itself; both shapes must normalize to the same canonical handle.
#[derive(Debug, Clone)]
pub enum PickedPayload {
    File(RawFilePayload),
    Container { origin_file: Option<RawFilePayload> },
}

/// Canonical binary image handle. Constructed only through
/// [`normalize_picked_payload`], so holding one implies the payload carried a
/// name, a MIME-ish type, and retrievable bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Resolve a picker payload to the canonical file handle.
///
/// Resolution order: a container exposing `origin_file` yields the wrapped
/// file; a direct file payload is used as-is. The resolved value must look
/// like a real binary file (non-empty bytes, a name, a MIME-ish type) or the
/// whole payload is rejected.
pub fn normalize_picked_payload(payload: PickedPayload) -> Result<ImageFile, PickerError> {
    let raw = match payload {
        PickedPayload::Container {
            origin_file: Some(raw),
        } => raw,
        PickedPayload::Container { origin_file: None } => {
            return Err(PickerError::InvalidFilePayload)
        }
        PickedPayload::File(raw) => raw,
    };

    if raw.bytes.is_empty() || raw.name.is_empty() || !raw.mime_type.contains('/') {
        return Err(PickerError::InvalidFilePayload);
    }

    Ok(ImageFile {
        name: raw.name,
        mime_type: raw.mime_type,
        bytes: raw.bytes,
    })
}
