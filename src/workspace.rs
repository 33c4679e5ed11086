//! Hardware travel envelope and the registry of named presets
use crate::{AbsolutePos, Axis, Bound, Error, HardwareAbsolutePos, Result, Scalar};

/// Name of the preset used when nothing else is configured
pub const DEFAULT_WORKSPACE: &str = "default";

#[cfg(feature = "serde")]
const WORKSPACES: &str = include_str!("workspaces.json");

/// Rectangular area the head is allowed to travel in
///
/// `min` is also the base point the head is parked at by the preamble, all
/// drawing coordinates are offset by it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "PascalCase")
)]
pub struct Workspace {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            min_x: 80,
            min_y: 80,
            max_x: 160,
            max_y: 160,
            name: DEFAULT_WORKSPACE.to_owned(),
            description: "Printer bed reduced to the area reachable by the engraving head"
                .to_owned(),
        }
    }
}

impl Workspace {
    /// Custom workspace with the provided bounds
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            name: "custom".to_owned(),
            description: String::new(),
        }
    }

    /// Base point of the workspace in hardware space
    pub fn base(&self) -> HardwareAbsolutePos {
        HardwareAbsolutePos::new(self.min_x as Scalar, self.min_y as Scalar)
    }

    /// Upper corner of the workspace in hardware space
    pub fn max(&self) -> HardwareAbsolutePos {
        HardwareAbsolutePos::new(self.max_x as Scalar, self.max_y as Scalar)
    }

    /// Convert drawing position to hardware position
    ///
    /// Fails if the position is negative or ends up outside of the envelope.
    pub fn to_hardware(&self, pos: AbsolutePos) -> Result<HardwareAbsolutePos> {
        let pos = pos.validate()?;
        let hw = pos.retag() + self.base();
        self.contains(hw)?;
        Ok(hw)
    }

    /// Convert hardware position back to the drawing space
    pub fn to_absolute(&self, pos: HardwareAbsolutePos) -> AbsolutePos {
        (pos - self.base()).retag()
    }

    /// Check that hardware position lies within `[min, max]` on both axes
    pub fn contains(&self, pos: HardwareAbsolutePos) -> Result<()> {
        let min = self.base();
        let max = self.max();
        let axes = [
            (Axis::X, pos.x(), min.x(), max.x()),
            (Axis::Y, pos.y(), min.y(), max.y()),
        ];
        for (axis, value, lo, hi) in axes {
            if !(value >= lo) {
                return Err(Error::OutOfBounds {
                    axis,
                    bound: Bound::Min,
                    value,
                    limit: lo,
                });
            }
            if value > hi {
                return Err(Error::OutOfBounds {
                    axis,
                    bound: Bound::Max,
                    value,
                    limit: hi,
                });
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl Workspace {
    /// Parse registry of workspaces from JSON array
    pub fn from_json(text: &str) -> Result<Vec<Workspace>> {
        Ok(serde_json::from_str(text)?)
    }

    /// All workspaces shipped with the crate
    pub fn registry() -> Result<Vec<Workspace>> {
        Self::from_json(WORKSPACES)
    }

    /// Find workspace by its name in the built-in registry
    pub fn find(name: &str) -> Result<Option<Workspace>> {
        Ok(Self::registry()?.into_iter().find(|ws| ws.name == name))
    }

    /// Same as [`Workspace::find`] but a missing preset is an error
    pub fn get(name: &str) -> Result<Workspace> {
        Self::find(name)?.ok_or_else(|| Error::UnknownWorkspace(name.to_owned()))
    }
}
