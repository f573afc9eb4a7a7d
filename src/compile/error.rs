//! Error types for assembly compilation.
//!
//! Every failure carries the diagnostic tag of the element it was raised for
//! (`Element[_id=..]`), so a broken model can be traced back to its source
//! document. Errors are split by [`Severity`]: warnings describe data-quality
//! problems the run can carry through to the output, fatal errors abort it.

use std::fmt;

use thiserror::Error;

use crate::io;

/// How a compilation problem affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Recorded as a [`Diagnostic`]; the script is still produced.
    Warning,
    /// Aborts the run before any output is written.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Fatal => f.write_str("fatal"),
        }
    }
}

/// Errors that can occur while compiling an assembly into a script.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading or writing a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A required attribute or child element is absent.
    #[error("{origin}: missing required {what}")]
    MissingRequiredAttribute {
        /// Diagnostic tag of the element that was inspected.
        origin: String,
        /// The attribute or child that was expected.
        what: String,
    },

    /// An attribute is present but its value has the wrong shape.
    #[error("{origin}: invalid {attribute} '{value}': {detail}")]
    InvalidAttribute {
        origin: String,
        attribute: String,
        value: String,
        detail: String,
    },

    /// A cross-reference points at an entity that was never extracted.
    #[error("{origin}: {entity} with metric ID '{key}' does not exist")]
    UnresolvedReference {
        origin: String,
        /// Kind of entity that was looked up.
        entity: &'static str,
        key: String,
    },

    /// A displacement axis is neither numeric nor a recognized state token.
    #[error("{origin}: {motion} axis '{axis}' has unsupported value '{value}'")]
    UnsupportedConstraintValue {
        origin: String,
        motion: String,
        axis: String,
        value: String,
    },

    /// A load kind that is recognized but not implemented.
    #[error("{origin}: load type '{kind}' is not supported")]
    UnsupportedLoadType { origin: String, kind: String },

    /// A material name has no entry in the material library.
    #[error("material '{name}' not found in the material library")]
    MaterialLookupFailure { name: String },

    /// A library value could not be converted to the output unit system.
    #[error("material '{material}': cannot convert {property} '{value}': {detail}")]
    UnitConversion {
        material: String,
        property: &'static str,
        value: String,
        detail: String,
    },

    /// A library entry has no value for a property the script needs.
    #[error("material '{material}': no value for {property} in the material library")]
    MissingMaterialProperty {
        material: String,
        property: &'static str,
    },

    /// The solver declares a shell element type with no known mapping.
    #[error("{origin}: shell element type '{value}' has no known mapping")]
    UnsupportedElementType { origin: String, value: String },

    /// The template registry has no section with the requested name.
    #[error("template section '{0}' not found")]
    TemplateNotFound(String),

    /// Failed to parse a template registry.
    #[error("failed to parse template registry: {0}")]
    TemplateParse(#[from] toml::de::Error),

    /// Placeholders survived the global pass while strict mode is enabled.
    #[error("unresolved placeholders in output: {}", names.join(", "))]
    UnresolvedPlaceholder { names: Vec<String> },
}

impl Error {
    /// Classifies the error for the extraction driver.
    pub fn severity(&self) -> Severity {
        match self {
            Error::MaterialLookupFailure { .. }
            | Error::UnitConversion { .. }
            | Error::MissingMaterialProperty { .. }
            | Error::UnsupportedElementType { .. } => Severity::Warning,
            _ => Severity::Fatal,
        }
    }

    /// Creates a [`MissingRequiredAttribute`](Error::MissingRequiredAttribute) error.
    ///
    /// # Arguments
    ///
    /// * `origin` - Diagnostic tag of the inspected element
    /// * `what` - Name of the missing attribute or child path
    pub fn missing_attribute(origin: impl Into<String>, what: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            origin: origin.into(),
            what: what.into(),
        }
    }

    /// Creates an [`InvalidAttribute`](Error::InvalidAttribute) error.
    pub fn invalid_attribute(
        origin: impl Into<String>,
        attribute: &str,
        value: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            origin: origin.into(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            detail: detail.into(),
        }
    }

    /// Creates an [`UnresolvedReference`](Error::UnresolvedReference) error.
    ///
    /// # Arguments
    ///
    /// * `origin` - Diagnostic tag of the referencing element
    /// * `entity` - Kind of entity that was looked up (`"point"`, `"geometry"` …)
    /// * `key` - The metric or component ID that did not resolve
    pub fn unresolved(origin: impl Into<String>, entity: &'static str, key: &str) -> Self {
        Self::UnresolvedReference {
            origin: origin.into(),
            entity,
            key: key.to_string(),
        }
    }

    pub fn unsupported_constraint_value(
        origin: impl Into<String>,
        motion: impl fmt::Display,
        axis: impl fmt::Display,
        value: &str,
    ) -> Self {
        Self::UnsupportedConstraintValue {
            origin: origin.into(),
            motion: motion.to_string(),
            axis: axis.to_string(),
            value: value.to_string(),
        }
    }

    pub fn unsupported_load(origin: impl Into<String>, kind: impl fmt::Display) -> Self {
        Self::UnsupportedLoadType {
            origin: origin.into(),
            kind: kind.to_string(),
        }
    }

    pub fn material_lookup(name: &str) -> Self {
        Self::MaterialLookupFailure {
            name: name.to_string(),
        }
    }

    pub fn unit_conversion(
        material: &str,
        property: &'static str,
        value: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnitConversion {
            material: material.to_string(),
            property,
            value: value.into(),
            detail: detail.into(),
        }
    }

    pub fn missing_property(material: &str, property: &'static str) -> Self {
        Self::MissingMaterialProperty {
            material: material.to_string(),
            property,
        }
    }

    pub fn unsupported_element_type(origin: impl Into<String>, value: &str) -> Self {
        Self::UnsupportedElementType {
            origin: origin.into(),
            value: value.to_string(),
        }
    }
}

/// A non-fatal problem recorded during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl From<&Error> for Diagnostic {
    fn from(error: &Error) -> Self {
        Self {
            severity: error.severity(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}
