use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Plant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: Option<String>,
    pub variety: Option<String>,
    pub photo_url: Option<String>,
    pub date_planted: Option<String>,
}

impl Plant {
    /// Hex form of the id, as used in URLs. Empty for a plant not yet stored.
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Editable plant fields. Absent values are written as null, on create and
/// on update alike.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantFields {
    pub name: Option<String>,
    pub variety: Option<String>,
    pub photo_url: Option<String>,
    pub date_planted: Option<String>,
}

/// Weak reference from a harvest to its plant: the plant id as hex text.
/// Nothing guarantees the plant still exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PlantRef(String);

impl PlantRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ObjectId> for PlantRef {
    fn from(id: ObjectId) -> Self {
        Self(id.to_hex())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub plant_id: PlantRef,
    /// Free text, e.g. "3 tomatoes".
    pub quantity: Option<String>,
    pub date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestFields {
    pub quantity: Option<String>,
    pub date: Option<String>,
}

/// Parses a path segment into a store id. Anything that is not a 24 char hex
/// ObjectId is reported as `MalformedId`.
pub fn parse_record_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::MalformedId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    #[test]
    fn plant_fields_keep_absent_values_as_null() {
        let fields = PlantFields {
            name: Some("Tomato".to_string()),
            ..Default::default()
        };
        let doc = bson::to_document(&fields).unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "Tomato");
        assert_eq!(doc.get("variety"), Some(&Bson::Null));
        assert_eq!(doc.get("photo_url"), Some(&Bson::Null));
        assert_eq!(doc.get("date_planted"), Some(&Bson::Null));
    }

    #[test]
    fn plant_reads_documents_with_missing_fields() {
        let id = ObjectId::new();
        let doc = bson::doc! { "_id": id, "name": "Basil" };
        let plant: Plant = bson::from_document(doc).unwrap();
        assert_eq!(plant.id, Some(id));
        assert_eq!(plant.name.as_deref(), Some("Basil"));
        assert!(plant.variety.is_none());
        assert_eq!(plant.id_hex(), id.to_hex());
    }

    #[test]
    fn harvest_stores_plant_ref_as_plain_text() {
        let plant_id = ObjectId::new();
        let harvest = Harvest {
            id: None,
            plant_id: PlantRef::from(plant_id),
            quantity: Some("3 tomatoes".to_string()),
            date: None,
        };
        let doc = bson::to_document(&harvest).unwrap();
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("plant_id").unwrap(), plant_id.to_hex());
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(matches!(
            parse_record_id("not-an-id"),
            Err(AppError::MalformedId(raw)) if raw == "not-an-id"
        ));
        let id = ObjectId::new();
        assert_eq!(parse_record_id(&id.to_hex()).unwrap(), id);
    }
}
