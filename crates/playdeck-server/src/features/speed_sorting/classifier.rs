//! Item classifier
//!
//! Decides whether a submitted item value is literal text or an inline
//! binary payload. An explicit `type` tag wins; shape sniffing only applies
//! when the tag is absent.
//!
//! | declared | value                        | result                |
//! |----------|------------------------------|-----------------------|
//! | `file`   | data-URL or bare base64      | file                  |
//! | `file`   | empty or not base64          | error                 |
//! | `text`   | data-URL with base64 payload | error (tags disagree) |
//! | `text`   | anything else                | text                  |
//! | none     | data-URL or bare base64      | file                  |
//! | none     | anything else                | text                  |

use playdeck_common::media::{EncodedPayload, PayloadShape};
use thiserror::Error;

use super::types::ItemType;
use crate::storage::UploadFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedItem {
    Text(String),
    File(UploadFile),
}

/// Positions are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("item {position} has no decodable base64 payload")]
    MissingPayload { position: usize },

    #[error("item {position} is declared as text but carries a base64 data URL")]
    ConflictingType { position: usize },
}

/// Classify the item at zero-based `index`.
pub fn classify(
    index: usize,
    value: &str,
    declared: Option<ItemType>,
) -> Result<ClassifiedItem, ClassificationError> {
    let position = index + 1;

    match declared {
        Some(ItemType::File) => {
            let payload = EncodedPayload::sniff(value)
                .ok_or(ClassificationError::MissingPayload { position })?;
            to_file(index, &payload)
        },
        Some(ItemType::Text) => match EncodedPayload::sniff(value) {
            Some(payload) if payload.shape == PayloadShape::DataUrl => {
                Err(ClassificationError::ConflictingType { position })
            },
            _ => Ok(ClassifiedItem::Text(value.to_string())),
        },
        None => match EncodedPayload::sniff(value) {
            Some(payload) => to_file(index, &payload),
            None => Ok(ClassifiedItem::Text(value.to_string())),
        },
    }
}

fn to_file(
    index: usize,
    payload: &EncodedPayload<'_>,
) -> Result<ClassifiedItem, ClassificationError> {
    let bytes = payload
        .decode()
        .map_err(|_| ClassificationError::MissingPayload { position: index + 1 })?;
    Ok(ClassifiedItem::File(UploadFile {
        bytes,
        filename: format!("item-{}.{}", index, payload.extension()),
        media_type: payload.media_type_or_default().to_string(),
    }))
}
