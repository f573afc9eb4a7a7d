use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a number, FIXED or FREE, found '{0}'")]
pub struct ParseAxisSettingError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown load kind: '{0}'")]
pub struct ParseLoadKindError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Attribute name used for this axis in the assembly document.
    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two groups of degrees of freedom a displacement constraint restrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Translation,
    Rotation,
}

impl Motion {
    /// Element name of the group inside a `Displacement` node.
    pub fn element(&self) -> &'static str {
        match self {
            Motion::Translation => "Translation",
            Motion::Rotation => "Rotation",
        }
    }

    /// Infix used in the rendered field names (`x_Disp_Val`, `x_Rot_State`).
    pub fn field_infix(&self) -> &'static str {
        match self {
            Motion::Translation => "Disp",
            Motion::Rotation => "Rot",
        }
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

/// Per-axis setting of a displacement constraint: exactly one of a prescribed
/// numeric value, a fixed axis, or a free axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisSetting {
    /// Prescribed value, kept as written in the source document.
    Value(String),
    Fixed,
    Free,
}

impl AxisSetting {
    /// The prescribed value, if this axis carries one.
    pub fn value(&self) -> Option<&str> {
        match self {
            AxisSetting::Value(v) => Some(v),
            AxisSetting::Fixed | AxisSetting::Free => None,
        }
    }

    /// The state token, if this axis is fixed or free.
    pub fn state(&self) -> Option<&'static str> {
        match self {
            AxisSetting::Value(_) => None,
            AxisSetting::Fixed => Some("FIXED"),
            AxisSetting::Free => Some("FREE"),
        }
    }
}

impl FromStr for AxisSetting {
    type Err = ParseAxisSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "FIXED" => Ok(AxisSetting::Fixed),
            "FREE" => Ok(AxisSetting::Free),
            _ if trimmed.parse::<f64>().is_ok() => Ok(AxisSetting::Value(trimmed.to_string())),
            _ => Err(ParseAxisSettingError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Pressure,
    Force,
    ForceMoment,
}

impl LoadKind {
    /// Element name of the load payload inside a `Load` node.
    pub fn element(&self) -> &'static str {
        match self {
            LoadKind::Pressure => "Pressure",
            LoadKind::Force => "Force",
            LoadKind::ForceMoment => "ForceMoment",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, LoadKind::Pressure)
    }
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadKind::Pressure => write!(f, "PRESSURE"),
            LoadKind::Force => write!(f, "FORCE"),
            LoadKind::ForceMoment => write!(f, "FORCEMOMENT"),
        }
    }
}

impl FromStr for LoadKind {
    type Err = ParseLoadKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pressure" => Ok(LoadKind::Pressure),
            "Force" => Ok(LoadKind::Force),
            "ForceMoment" => Ok(LoadKind::ForceMoment),
            _ => Err(ParseLoadKindError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instructions {
    MeshOnly,
    #[default]
    MeshAndSolve,
}

impl Instructions {
    pub fn from_mesh_only_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("true") {
            Instructions::MeshOnly
        } else {
            Instructions::MeshAndSolve
        }
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instructions::MeshOnly => write!(f, "MESH_ONLY"),
            Instructions::MeshAndSolve => write!(f, "MESH_AND_SOLVE"),
        }
    }
}
