//! Material library and per-run material resolution.
//!
//! The library is the JSON document shipped with the material database:
//! one entry per lowercase material name, each property a value/unit pair.
//! Resolution converts the elastic modulus to MPa and memoizes the resulting
//! [`Material`] record by name for the rest of the run.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::error::Error;
use crate::model::entity::{Material, MaterialProperties, PropertyValue};
use crate::model::table::{Id, Table};

/// Name resolved for components that carry no material assignment.
pub const UNASSIGNED_MATERIAL: &str = "UNASSIGNED";

#[derive(Debug, Deserialize)]
struct LibraryFile {
    #[serde(rename = "Material library")]
    materials: BTreeMap<String, MaterialEntry>,
}

/// A value/unit pair from the library.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quantity {
    pub value: Value,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Quantity {
    fn raw(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Mechanical and thermal properties of one library material.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MaterialEntry {
    #[serde(rename = "mechanical__modulus_elastic")]
    pub elastic_modulus: Option<Quantity>,
    #[serde(rename = "mechanical__ratio_poissons")]
    pub poissons_ratio: Option<Quantity>,
    pub density: Option<Quantity>,
    #[serde(rename = "thermal__coefficient_expansion_linear")]
    pub thermal_expansion: Option<Quantity>,
}

/// Material property library, keyed by lowercase material name.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    entries: HashMap<String, MaterialEntry>,
}

impl MaterialLibrary {
    /// Parses the library document.
    ///
    /// Names that differ only by case collapse to one entry. Source names are
    /// visited in byte order and the first one wins, so `"Steel"` shadows
    /// `"steel"` on every run.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: LibraryFile = serde_json::from_str(text)?;
        let mut entries = HashMap::with_capacity(file.materials.len());
        let mut kept: HashMap<String, String> = HashMap::new();
        for (name, entry) in file.materials {
            let key = name.to_lowercase();
            if let Some(first) = kept.get(&key) {
                warn!(kept = %first, ignored = %name, "material names differ only by case");
                continue;
            }
            kept.insert(key.clone(), name);
            entries.insert(key, entry);
        }
        Ok(Self { entries })
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&MaterialEntry> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves material names against the library, once per distinct name.
#[derive(Debug)]
pub struct MaterialResolver<'a> {
    library: &'a MaterialLibrary,
}

impl<'a> MaterialResolver<'a> {
    pub fn new(library: &'a MaterialLibrary) -> Self {
        Self { library }
    }

    /// Returns the ID of the material named `name`, resolving it into
    /// `materials` on first use.
    ///
    /// Data-quality problems do not fail resolution; they are returned as
    /// warning-severity errors alongside the ID.
    pub fn resolve(&self, materials: &mut Table<Material>, name: &str) -> (Id, Vec<Error>) {
        let key = name.to_lowercase();
        let mut warnings = Vec::new();

        let (id, created) = materials.insert_keyed(&key, |id| {
            let (resolved, properties) = match self.library.get(name) {
                Some(entry) => (true, convert_entry(name, entry, &mut warnings)),
                None => {
                    error!(material = name, "Material lookup needs attention");
                    warnings.push(Error::material_lookup(name));
                    (false, MaterialProperties::missing())
                }
            };
            Material {
                id,
                name: name.to_string(),
                resolved,
                properties,
            }
        });

        if created {
            debug!(material = name, %id, "resolved material");
        }
        (id, warnings)
    }
}

fn convert_entry(name: &str, entry: &MaterialEntry, warnings: &mut Vec<Error>) -> MaterialProperties {
    let mut passthrough = |property: &'static str, quantity: &Option<Quantity>| match quantity {
        Some(q) => PropertyValue::Known(q.raw()),
        None => {
            warnings.push(Error::missing_property(name, property));
            PropertyValue::Missing
        }
    };

    let poissons_ratio = passthrough("Poisson's ratio", &entry.poissons_ratio);
    let density = passthrough("density", &entry.density);
    let thermal_expansion = passthrough("thermal expansion coefficient", &entry.thermal_expansion);

    let elastic_modulus = match &entry.elastic_modulus {
        Some(q) => match modulus_in_mpa(q) {
            Ok(mpa) => PropertyValue::Known(format_number(mpa)),
            Err(detail) => {
                warnings.push(Error::unit_conversion(name, "elastic modulus", q.raw(), detail));
                PropertyValue::Flagged(q.raw())
            }
        },
        None => {
            warnings.push(Error::missing_property(name, "elastic modulus"));
            PropertyValue::Missing
        }
    };

    MaterialProperties {
        elastic_modulus,
        poissons_ratio,
        density,
        thermal_expansion,
    }
}

/// Converts a pressure quantity to MPa. A missing unit is taken as Pa.
fn modulus_in_mpa(quantity: &Quantity) -> Result<f64, String> {
    let value = quantity
        .as_f64()
        .ok_or_else(|| "value is not numeric".to_string())?;
    let unit = quantity.unit.as_deref().map(str::trim).unwrap_or("Pa");
    match unit {
        "Pa" => Ok(value / 1e6),
        "kPa" => Ok(value / 1e3),
        "MPa" => Ok(value),
        "GPa" => Ok(value * 1e3),
        other => Err(format!("unknown pressure unit '{other}'")),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"{
        "Material library": {
            "Aluminum 6061": {
                "mechanical__modulus_elastic": {"value": 68900000000.0, "unit": "Pa"},
                "mechanical__ratio_poissons": {"value": 0.33, "unit": ""},
                "density": {"value": 2700.0, "unit": "kg/m^3"},
                "thermal__coefficient_expansion_linear": {"value": 2.36e-05, "unit": "1/K"}
            },
            "steel": {
                "mechanical__modulus_elastic": {"value": "200", "unit": "GPa"},
                "mechanical__ratio_poissons": {"value": 0.29},
                "density": {"value": 7850},
                "thermal__coefficient_expansion_linear": {"value": 1.2e-05}
            },
            "mystery": {
                "mechanical__modulus_elastic": {"value": "stiff"},
                "mechanical__ratio_poissons": {"value": 0.3},
                "density": {"value": 1000},
                "thermal__coefficient_expansion_linear": {"value": 1e-05}
            },
            "odd units": {
                "mechanical__modulus_elastic": {"value": 10, "unit": "psi"},
                "mechanical__ratio_poissons": {"value": 0.3},
                "density": {"value": 1000},
                "thermal__coefficient_expansion_linear": {"value": 1e-05}
            }
        }
    }"#;

    fn library() -> MaterialLibrary {
        MaterialLibrary::from_json(LIBRARY).unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let lib = library();
        assert_eq!(lib.len(), 4);
        assert!(lib.get("aluminum 6061").is_some());
        assert!(lib.get("ALUMINUM 6061").is_some());
        assert!(lib.get("Steel").is_some());
        assert!(lib.get("titanium").is_none());
    }

    #[test]
    fn pascal_modulus_is_converted_to_mpa() {
        let lib = library();
        let mut table = Table::new();
        let (id, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "Aluminum 6061");

        assert_eq!(id, Id::FIRST);
        assert!(warnings.is_empty());
        let material = table.get(id).unwrap();
        assert!(material.resolved);
        assert_eq!(
            material.properties.elastic_modulus,
            PropertyValue::Known("68900.0".into())
        );
        assert_eq!(
            material.properties.poissons_ratio,
            PropertyValue::Known("0.33".into())
        );
        assert_eq!(material.properties.density, PropertyValue::Known("2700.0".into()));
    }

    #[test]
    fn string_values_and_other_units_convert() {
        let lib = library();
        let mut table = Table::new();
        let (id, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "steel");
        assert!(warnings.is_empty());
        assert_eq!(
            table.get(id).unwrap().properties.elastic_modulus,
            PropertyValue::Known("200000.0".into())
        );
    }

    #[test]
    fn repeated_lookups_reuse_the_record() {
        let lib = library();
        let resolver = MaterialResolver::new(&lib);
        let mut table = Table::new();

        let (first, _) = resolver.resolve(&mut table, "Aluminum 6061");
        let (second, _) = resolver.resolve(&mut table, "steel");
        let (again, warnings) = resolver.resolve(&mut table, "aluminum 6061");

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        assert_eq!(again, first);
        assert!(warnings.is_empty());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unknown_material_is_a_soft_failure() {
        let lib = library();
        let mut table = Table::new();
        let (id, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "Unobtainium");

        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Error::MaterialLookupFailure { .. }));
        let material = table.get(id).unwrap();
        assert!(!material.resolved);
        assert_eq!(material.properties, MaterialProperties::missing());

        // The warning is only raised when the record is first created.
        let (_, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "unobtainium");
        assert!(warnings.is_empty());
    }

    #[test]
    fn non_numeric_modulus_is_flagged() {
        let lib = library();
        let mut table = Table::new();
        let (id, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "mystery");

        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Error::UnitConversion { .. }));
        assert_eq!(
            table.get(id).unwrap().properties.elastic_modulus,
            PropertyValue::Flagged("stiff".into())
        );
    }

    #[test]
    fn unknown_unit_is_flagged() {
        let lib = library();
        let mut table = Table::new();
        let (id, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "odd units");

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("psi"));
        assert_eq!(
            table.get(id).unwrap().properties.elastic_modulus,
            PropertyValue::Flagged("10".into())
        );
    }

    #[test]
    fn absent_property_is_reported_as_missing() {
        let lib = MaterialLibrary::from_json(
            r#"{"Material library": {"bare": {
                "mechanical__modulus_elastic": {"value": 1, "unit": "GPa"},
                "mechanical__ratio_poissons": {"value": 0.3}
            }}}"#,
        )
        .unwrap();
        let mut table = Table::new();
        let (id, warnings) = MaterialResolver::new(&lib).resolve(&mut table, "bare");

        assert_eq!(warnings.len(), 2);
        assert!(
            warnings
                .iter()
                .all(|w| matches!(w, Error::MissingMaterialProperty { .. }))
        );
        assert!(warnings[0].to_string().contains("no value for density"));
        let properties = &table.get(id).unwrap().properties;
        assert_eq!(properties.density, PropertyValue::Missing);
        assert_eq!(properties.elastic_modulus, PropertyValue::Known("1000.0".into()));
    }

    #[test]
    fn case_colliding_names_keep_the_first_in_byte_order() {
        let text = r#"{"Material library": {
            "steel 4130": {"mechanical__modulus_elastic": {"value": 1, "unit": "GPa"}},
            "Steel 4130": {"mechanical__modulus_elastic": {"value": 2, "unit": "GPa"}}
        }}"#;
        for _ in 0..8 {
            let lib = MaterialLibrary::from_json(text).unwrap();
            assert_eq!(lib.len(), 1);
            let entry = lib.get("STEEL 4130").unwrap();
            assert_eq!(entry.elastic_modulus.as_ref().unwrap().value, serde_json::json!(2));
        }
    }

    #[test]
    fn library_without_root_key_is_rejected() {
        assert!(MaterialLibrary::from_json(r#"{"materials": {}}"#).is_err());
    }
}
