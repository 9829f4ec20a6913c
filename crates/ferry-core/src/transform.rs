//! Resize parameters carried on a download URL
//!
//! Two query syntaxes are accepted:
//!
//! - legacy: `imageProcess=resize&imageResizeM=fill&imageResizeW=200&imageResizeH=100`
//! - compact: `ir=fill_200_100`, where `0` leaves a side unset (`ir=fit_200_0`)
//!
//! A URL with neither form asks for the original bytes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::MAX_RESIZE_DIMENSION;
use crate::error::AppError;

/// How the source image is mapped onto the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "resize_mode", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale to fit inside the box, keeping the aspect ratio
    #[default]
    Fit,
    /// Scale to cover the box, then crop the overflow around the centre
    Fill,
    /// Stretch to exactly the box
    Fixed,
}

impl ResizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::Fit => "fit",
            ResizeMode::Fill => "fill",
            ResizeMode::Fixed => "fixed",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "fit" => Ok(ResizeMode::Fit),
            "fill" => Ok(ResizeMode::Fill),
            "fixed" => Ok(ResizeMode::Fixed),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported resize mode '{}', expected fit, fill or fixed",
                other
            ))),
        }
    }
}

/// A validated resize request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub mode: ResizeMode,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeParams {
    pub fn new(
        mode: ResizeMode,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self, AppError> {
        for side in [width, height].into_iter().flatten() {
            if side == 0 || side > MAX_RESIZE_DIMENSION {
                return Err(AppError::InvalidInput(format!(
                    "Resize dimensions must be between 1 and {}",
                    MAX_RESIZE_DIMENSION
                )));
            }
        }

        match mode {
            ResizeMode::Fit if width.is_none() && height.is_none() => Err(AppError::InvalidInput(
                "Resize mode fit needs a width or a height".to_string(),
            )),
            ResizeMode::Fill | ResizeMode::Fixed if width.is_none() || height.is_none() => {
                Err(AppError::InvalidInput(format!(
                    "Resize mode {} needs both width and height",
                    mode
                )))
            }
            _ => Ok(Self {
                mode,
                width,
                height,
            }),
        }
    }

    /// Extract resize parameters from a decoded query string.
    ///
    /// Returns `Ok(None)` when the request does not ask for a resize.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Option<Self>, AppError> {
        if let Some(compact) = query.get("ir").filter(|v| !v.is_empty()) {
            return Self::parse_compact(compact).map(Some);
        }

        match query.get("imageProcess").map(String::as_str) {
            None | Some("") => Ok(None),
            Some("resize") => {
                let mode = query
                    .get("imageResizeM")
                    .map(|m| m.parse::<ResizeMode>())
                    .transpose()?
                    .unwrap_or_default();
                let width = parse_side(query.get("imageResizeW"), "imageResizeW")?;
                let height = parse_side(query.get("imageResizeH"), "imageResizeH")?;
                Self::new(mode, width, height).map(Some)
            }
            Some(other) => Err(AppError::InvalidInput(format!(
                "Unsupported imageProcess '{}'",
                other
            ))),
        }
    }

    fn parse_compact(value: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = value.split('_').collect();
        if parts.len() != 3 {
            return Err(AppError::InvalidInput(format!(
                "Invalid ir value '{}', expected <mode>_<width>_<height>",
                value
            )));
        }

        let mode = parts[0].parse::<ResizeMode>()?;
        let width = parse_compact_side(parts[1], "width")?;
        let height = parse_compact_side(parts[2], "height")?;
        Self::new(mode, width, height)
    }
}

fn parse_side(raw: Option<&String>, name: &str) -> Result<Option<u32>, AppError> {
    match raw.map(|s| s.trim()) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("{} must be a positive integer", name))),
    }
}

fn parse_compact_side(raw: &str, name: &str) -> Result<Option<u32>, AppError> {
    let value = raw
        .parse::<u32>()
        .map_err(|_| AppError::InvalidInput(format!("ir {} must be an integer", name)))?;
    Ok(if value == 0 { None } else { Some(value) })
}
