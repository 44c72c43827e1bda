//! Property Extractor
//!
//! Resolves logical properties (name, type, layer, ...) off drawing objects
//! whose layout differs by object kind and API surface. Each property is
//! looked up through ordered candidate attribute paths; absence is a normal
//! outcome and never an error.

use cadbom_models::{Access, AttrValue, ExtractedProperties, LAYER_FIELD, NAME_FIELD, TYPE_FIELD};
use tracing::trace;

/// Built-in candidate table: logical field -> tiers of candidate paths.
/// A later tier is consulted only when every path of the earlier tiers is absent.
pub const BUILTIN_CANDIDATES: &[(&str, &[&[&str]])] = &[
    (
        NAME_FIELD,
        &[
            &["Name", "name", "Attributes.Name"],
            &["ObjectName", "Attributes.ObjectName"],
        ],
    ),
    (
        TYPE_FIELD,
        &[
            &["ObjectType", "type"],
            &["Geometry.ObjectType", "Geometry.Type"],
        ],
    ),
    (
        LAYER_FIELD,
        &[
            &["Layer", "layer", "Attributes.Layer"],
            &["Attributes.LayerIndex", "LayerIndex"],
        ],
    ),
];

/// Walk a dot-separated attribute path into a record.
///
/// Mappings are consulted by key, structured objects by field name; any
/// other value, a missing segment or a null stops the walk with `None`.
pub fn resolve<'a>(record: &'a AttrValue, path: &str) -> Option<&'a AttrValue> {
    let mut current = Some(record);

    for segment in path.split('.') {
        let value = current?;
        current = match value.access() {
            Access::Keyed(map) => map.get(segment),
            Access::Fields(object) => object.field(segment),
            Access::Opaque => None,
        }
        .filter(|v| !v.is_null());
    }

    current
}

/// First candidate path that resolves to a value
pub fn first_of<'a, S: AsRef<str>>(record: &'a AttrValue, candidates: &[S]) -> Option<&'a AttrValue> {
    candidates
        .iter()
        .find_map(|candidate| resolve(record, candidate.as_ref()))
}

/// Extract the built-in properties plus `extra_fields` using the default table
pub fn extract_properties<S: AsRef<str>>(record: &AttrValue, extra_fields: &[S]) -> ExtractedProperties {
    PropertyExtractor::default().extract(record, extra_fields)
}

/// Title-case a field name: each run of letters gets an upper-case first
/// letter and lower-case remainder. Digits, underscores and other
/// non-letters start a new run, so `unit_price` becomes `Unit_Price`.
pub fn title_case(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut in_word = false;

    for c in field.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

/// Candidate paths for a requested extra field
pub fn extra_field_candidates(field: &str) -> [String; 3] {
    [
        field.to_string(),
        title_case(field),
        format!("Attributes.{}", field),
    ]
}

/// Candidate tiers for one logical field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidates {
    pub field: String,
    pub tiers: Vec<Vec<String>>,
}

impl FieldCandidates {
    pub fn new<I, T, S>(field: impl Into<String>, tiers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            tiers: tiers
                .into_iter()
                .map(|tier| tier.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Resolve through the tiers in order
    pub fn resolve<'a>(&self, record: &'a AttrValue) -> Option<&'a AttrValue> {
        self.tiers
            .iter()
            .find_map(|tier| first_of(record, tier.as_slice()))
    }
}

/// Property extractor driven by a candidate table
#[derive(Debug, Clone)]
pub struct PropertyExtractor {
    builtins: Vec<FieldCandidates>,
}

impl Default for PropertyExtractor {
    fn default() -> Self {
        Self {
            builtins: BUILTIN_CANDIDATES
                .iter()
                .map(|(field, tiers)| {
                    FieldCandidates::new(*field, tiers.iter().map(|tier| tier.iter().copied()))
                })
                .collect(),
        }
    }
}

impl PropertyExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tiers of a built-in field, or add a new always-extracted field
    pub fn with_candidates(mut self, candidates: FieldCandidates) -> Self {
        match self.builtins.iter_mut().find(|c| c.field == candidates.field) {
            Some(existing) => *existing = candidates,
            None => self.builtins.push(candidates),
        }
        self
    }

    /// Fields computed for every record, in output order
    pub fn builtin_fields(&self) -> impl Iterator<Item = &str> {
        self.builtins.iter().map(|c| c.field.as_str())
    }

    /// Extract the built-in fields, then each extra field not already present
    pub fn extract<S: AsRef<str>>(&self, record: &AttrValue, extra_fields: &[S]) -> ExtractedProperties {
        let mut properties = ExtractedProperties::new();

        for candidates in &self.builtins {
            properties.insert(candidates.field.clone(), candidates.resolve(record).cloned());
        }

        for field in extra_fields {
            let field = field.as_ref();
            if properties.contains(field) {
                continue;
            }
            let value = first_of(record, &extra_field_candidates(field));
            properties.insert(field, value.cloned());
        }

        trace!(fields = properties.len(), "extracted object properties");
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadbom_models::CadObject;

    fn rhino_object() -> AttrValue {
        CadObject::new("RhinoObject")
            .with_field(
                "Attributes",
                CadObject::new("ObjectAttributes")
                    .with_field("Name", "Bracket")
                    .with_field("LayerIndex", 3),
            )
            .with_field("ObjectType", "Brep")
            .into()
    }

    #[test]
    fn test_resolve_top_level() {
        let record = AttrValue::map([("Name", "Widget")]);
        assert_eq!(resolve(&record, "Name"), Some(&AttrValue::from("Widget")));
        assert_eq!(resolve(&record, "name"), None);
    }

    #[test]
    fn test_resolve_dotted_paths() {
        let record = rhino_object();
        assert_eq!(
            resolve(&record, "Attributes.Name"),
            Some(&AttrValue::from("Bracket"))
        );
        assert_eq!(resolve(&record, "Attributes.Missing"), None);
        assert_eq!(resolve(&record, "Geometry.Type"), None);
        // scalars support neither lookup
        assert_eq!(resolve(&record, "ObjectType.Name"), None);
    }

    #[test]
    fn test_resolve_prefers_key_lookup_on_maps() {
        let record = AttrValue::map([(
            "Attributes",
            AttrValue::map([("Layer", "Walls")]),
        )]);
        assert_eq!(
            resolve(&record, "Attributes.Layer"),
            Some(&AttrValue::from("Walls"))
        );
    }

    #[test]
    fn test_null_is_absent() {
        let record = AttrValue::map([("Name", AttrValue::Null), ("name", "widget".into())]);
        assert_eq!(resolve(&record, "Name"), None);
        assert_eq!(
            first_of(&record, &["Name", "name"]),
            Some(&AttrValue::from("widget"))
        );
    }

    #[test]
    fn test_first_of_all_absent() {
        let record = AttrValue::map([("other", 1)]);
        assert_eq!(first_of(&record, &["Name", "name", "Attributes.Name"]), None);
        let empty: [&str; 0] = [];
        assert_eq!(first_of(&record, &empty), None);
    }

    #[test]
    fn test_extract_builtins_with_fallbacks() {
        let props = extract_properties::<&str>(&rhino_object(), &[]);
        assert_eq!(props.name(), Some(&AttrValue::from("Bracket")));
        assert_eq!(props.object_type(), Some(&AttrValue::from("Brep")));
        assert_eq!(props.layer(), Some(&AttrValue::Integer(3)));
    }

    #[test]
    fn test_extract_nested_layer() {
        let record = AttrValue::map([(
            "Attributes",
            AttrValue::map([("Layer", "L1")]),
        )]);
        let props = extract_properties::<&str>(&record, &[]);
        assert_eq!(props.layer(), Some(&AttrValue::from("L1")));
    }

    #[test]
    fn test_extract_type_from_geometry() {
        let record: AttrValue = CadObject::new("RhinoObject")
            .with_field("Geometry", CadObject::new("Curve").with_field("ObjectType", "Curve"))
            .into();
        let props = extract_properties::<&str>(&record, &[]);
        assert_eq!(props.object_type(), Some(&AttrValue::from("Curve")));
    }

    #[test]
    fn test_fallback_tier_only_when_absent() {
        let record = AttrValue::map([("Name", ""), ("ObjectName", "Fallback")]);
        let props = extract_properties::<&str>(&record, &[]);
        assert_eq!(props.name(), Some(&AttrValue::from("")));
    }

    #[test]
    fn test_extract_missing_everything() {
        let props = extract_properties::<&str>(&AttrValue::Map(Default::default()), &[]);
        assert_eq!(props.len(), 3);
        assert_eq!(props.name(), None);
        assert_eq!(props.object_type(), None);
        assert_eq!(props.layer(), None);
    }

    #[test]
    fn test_extract_extra_fields() {
        let record = AttrValue::map([
            ("Unit_Price", AttrValue::from("12")),
            ("Attributes", AttrValue::map([("finish", "Zinc")])),
            ("layer", AttrValue::from("Top")),
        ]);
        let props = extract_properties(&record, &["unit_price", "finish", "layer", "material"]);

        assert_eq!(props.get("unit_price"), Some(&AttrValue::from("12")));
        assert_eq!(props.get("finish"), Some(&AttrValue::from("Zinc")));
        assert_eq!(props.layer(), Some(&AttrValue::from("Top")));
        assert!(props.contains("material"));
        assert_eq!(props.get("material"), None);
        assert_eq!(props.len(), 6);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("price"), "Price");
        assert_eq!(title_case("unit_price"), "Unit_Price");
        assert_eq!(title_case("UNIT PRICE"), "Unit Price");
        assert_eq!(title_case("part2number"), "Part2Number");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_custom_candidates() {
        let extractor = PropertyExtractor::new()
            .with_candidates(FieldCandidates::new("layer", [["Level"]]))
            .with_candidates(FieldCandidates::new("material", [["Mat"], ["Attributes.Mat"]]));

        let record = AttrValue::map([
            ("Layer", AttrValue::from("ignored")),
            ("Level", AttrValue::from("L2")),
            ("Attributes", AttrValue::map([("Mat", "Steel")])),
        ]);
        let props = extractor.extract::<&str>(&record, &[]);

        assert_eq!(props.layer(), Some(&AttrValue::from("L2")));
        assert_eq!(props.get("material"), Some(&AttrValue::from("Steel")));
        assert_eq!(
            extractor.builtin_fields().collect::<Vec<_>>(),
            vec!["name", "type", "layer", "material"]
        );
    }
}
