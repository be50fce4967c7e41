//! Loose field access on schemaless documents.

use mongodb::bson::{oid::ObjectId, Bson, Document};

pub fn get_string(doc: &Document, key: &str) -> Option<String> {
    doc.get(key).and_then(Bson::as_str).map(|s| s.to_string())
}

pub fn get_f64(doc: &Document, key: &str) -> Option<f64> {
    match doc.get(key) {
        Some(Bson::Double(v)) => Some(*v),
        Some(Bson::Int32(v)) => Some(*v as f64),
        Some(Bson::Int64(v)) => Some(*v as f64),
        Some(Bson::String(s)) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// A reference to another document, stored either as an ObjectId or as its hex string.
pub fn object_id_ref(value: &Bson) -> Option<ObjectId> {
    match value {
        Bson::ObjectId(oid) => Some(*oid),
        Bson::String(hex) => ObjectId::parse_str(hex).ok(),
        _ => None,
    }
}

/// Grouping label for a category value. Strings pass through, scalars are
/// printed, anything else groups under the empty label.
pub fn category_label(value: Option<&Bson>) -> String {
    match value {
        Some(Bson::String(s)) => s.clone(),
        Some(Bson::Int32(v)) => v.to_string(),
        Some(Bson::Int64(v)) => v.to_string(),
        Some(Bson::Double(v)) => v.to_string(),
        Some(Bson::Boolean(v)) => v.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn numeric_fields_read_from_any_number_type() {
        let doc = doc! { "a": 1_i32, "b": 2_i64, "c": 2.5, "d": "4.25", "e": true };
        assert_eq!(get_f64(&doc, "a"), Some(1.0));
        assert_eq!(get_f64(&doc, "b"), Some(2.0));
        assert_eq!(get_f64(&doc, "c"), Some(2.5));
        assert_eq!(get_f64(&doc, "d"), Some(4.25));
        assert_eq!(get_f64(&doc, "e"), None);
        assert_eq!(get_string(&doc, "d").as_deref(), Some("4.25"));
        assert_eq!(get_string(&doc, "a"), None);
    }

    #[test]
    fn references_accept_ids_and_hex_strings() {
        let id = ObjectId::new();
        assert_eq!(object_id_ref(&Bson::ObjectId(id)), Some(id));
        assert_eq!(object_id_ref(&Bson::String(id.to_hex())), Some(id));
        assert_eq!(object_id_ref(&Bson::String("nope".into())), None);
        assert_eq!(object_id_ref(&Bson::Int32(7)), None);
    }

    #[test]
    fn categories_group_by_printed_value() {
        assert_eq!(category_label(Some(&Bson::String("pizza".into()))), "pizza");
        assert_eq!(category_label(Some(&Bson::Int32(3))), "3");
        assert_eq!(category_label(Some(&Bson::Boolean(true))), "true");
        assert_eq!(category_label(Some(&Bson::Null)), "");
        assert_eq!(category_label(None), "");
    }
}
