use serde::{Deserialize, Deserializer, Serialize};

/// A hadith book as listed by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Stable slug (e.g. `bukhari`)
    pub id: String,
    /// Display label
    pub name: String,
    /// Total records the remote store claims to hold
    #[serde(rename = "available", default)]
    pub available_count: u32,
}

impl Collection {
    pub fn new(id: impl Into<String>, name: impl Into<String>, available_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available_count,
        }
    }
}

/// Text of one record. Either script may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContent {
    /// 1-based position within the book
    pub number: u32,
    /// Arabic source text
    #[serde(rename = "arab", default, deserialize_with = "empty_if_null")]
    pub primary_text: String,
    /// Translated text
    #[serde(rename = "id", default, deserialize_with = "empty_if_null")]
    pub translated_text: String,
}

/// Book metadata joined with one record's content.
///
/// Identity is `(collection.id, contents.number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub collection: Collection,
    pub contents: RecordContent,
}

impl Record {
    pub fn new(collection: Collection, contents: RecordContent) -> Self {
        Self {
            collection,
            contents,
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection.id
    }

    pub fn collection_name(&self) -> &str {
        &self.collection.name
    }

    pub fn number(&self) -> u32 {
        self.contents.number
    }

    /// Both scripts carry text
    pub fn is_complete(&self) -> bool {
        !self.contents.primary_text.trim().is_empty()
            && !self.contents.translated_text.trim().is_empty()
    }
}

fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_wire_shape() {
        let value = json!({
            "name": "HR. Bukhari",
            "id": "bukhari",
            "available": 7008,
            "contents": {
                "number": 1,
                "arab": "إِنَّمَا الْأَعْمَالُ بِالنِّيَّاتِ",
                "id": "Semua perbuatan tergantung niatnya"
            }
        });

        let record: Record = serde_json::from_value(value).unwrap();
        assert_eq!(record.collection_id(), "bukhari");
        assert_eq!(record.collection_name(), "HR. Bukhari");
        assert_eq!(record.collection.available_count, 7008);
        assert_eq!(record.number(), 1);
        assert!(record.is_complete());
    }

    #[test]
    fn test_null_text_is_incomplete() {
        let value = json!({
            "name": "HR. Malik",
            "id": "malik",
            "available": 1594,
            "contents": { "number": 9, "arab": "نص", "id": null }
        });

        let record: Record = serde_json::from_value(value).unwrap();
        assert_eq!(record.contents.translated_text, "");
        assert!(!record.is_complete());
    }
}
