//! Tool definitions for free-path scans.

use serde::{Deserialize, Serialize};

use crate::error::{FreePathError, Result};

/// A cutting tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Tool {
    /// Flat end mill.
    FlatEndMill {
        /// Tool diameter in mm.
        diameter: f64,
        /// Flute length (cutting depth) in mm.
        flute_length: f64,
    },
    /// Ball end mill for 3D contouring.
    BallEndMill {
        /// Tool diameter in mm.
        diameter: f64,
        /// Flute length in mm.
        flute_length: f64,
    },
}

impl Tool {
    /// Get the cutting diameter of the tool.
    pub fn diameter(&self) -> f64 {
        match self {
            Tool::FlatEndMill { diameter, .. } | Tool::BallEndMill { diameter, .. } => *diameter,
        }
    }

    /// Get the tool radius.
    pub fn radius(&self) -> f64 {
        self.diameter() / 2.0
    }

    /// Length of the cutting part above the tip.
    pub fn flute_length(&self) -> f64 {
        match self {
            Tool::FlatEndMill { flute_length, .. } | Tool::BallEndMill { flute_length, .. } => {
                *flute_length
            }
        }
    }

    /// Short name of the tool type.
    pub fn kind(&self) -> &'static str {
        match self {
            Tool::FlatEndMill { .. } => "flat end mill",
            Tool::BallEndMill { .. } => "ball end mill",
        }
    }

    /// Check that the dimensions describe a real tool.
    pub fn validate(&self) -> Result<()> {
        let diameter = self.diameter();
        if !diameter.is_finite() || diameter <= 0.0 {
            return Err(FreePathError::InvalidTool(format!(
                "{} diameter must be positive, got {diameter}",
                self.kind()
            )));
        }
        let flute_length = self.flute_length();
        if !flute_length.is_finite() || flute_length < 0.0 {
            return Err(FreePathError::InvalidTool(format!(
                "{} flute length must not be negative, got {flute_length}",
                self.kind()
            )));
        }
        Ok(())
    }

    /// Create a default flat end mill (6mm).
    pub fn default_endmill() -> Self {
        Tool::FlatEndMill {
            diameter: 6.0,
            flute_length: 20.0,
        }
    }

    /// Create a default ball end mill (6mm).
    pub fn default_ball() -> Self {
        Tool::BallEndMill {
            diameter: 6.0,
            flute_length: 20.0,
        }
    }
}
