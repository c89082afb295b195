//! Survey registry.
//!
//! Short survey identifiers used throughout the crate, the names the image
//! archive knows them by, and the channel assignments of each composite.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RgbError;

/// A single-band sky survey available from the image archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Survey {
    Tgss,
    Nvss,
    First,
    Dss2r,
    Dss2ir,
    Dss2b,
    W22,
    Gnuv,
}

impl Survey {
    pub const ALL: [Survey; 8] = [
        Survey::Tgss,
        Survey::Nvss,
        Survey::First,
        Survey::Dss2r,
        Survey::Dss2ir,
        Survey::Dss2b,
        Survey::W22,
        Survey::Gnuv,
    ];

    /// Short identifier, e.g. `dss2r`
    pub fn short_name(&self) -> &'static str {
        match self {
            Survey::Tgss => "tgss",
            Survey::Nvss => "nvss",
            Survey::First => "first",
            Survey::Dss2r => "dss2r",
            Survey::Dss2ir => "dss2ir",
            Survey::Dss2b => "dss2b",
            Survey::W22 => "w22",
            Survey::Gnuv => "gnuv",
        }
    }

    /// Name of the survey in the image archive
    pub fn archive_name(&self) -> &'static str {
        match self {
            Survey::Tgss => "TGSS ADR1",
            Survey::Nvss => "NVSS",
            Survey::First => "VLA FIRST (1.4 GHz)",
            Survey::Dss2r => "DSS2 Red",
            Survey::Dss2ir => "DSS2 IR",
            Survey::Dss2b => "DSS2 Blue",
            Survey::W22 => "WISE 22",
            Survey::Gnuv => "GALEX Near UV",
        }
    }

    /// Resampling kernel to request from the archive, if not its default
    pub fn sampler(&self) -> Option<&'static str> {
        match self {
            Survey::Nvss => Some("Lanczos3"),
            _ => None,
        }
    }

    /// Radio surveys have their value range reported back to the user
    pub fn is_radio(&self) -> bool {
        matches!(self, Survey::Tgss | Survey::Nvss | Survey::First)
    }
}

impl fmt::Display for Survey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Survey {
    type Err = RgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Survey::ALL
            .iter()
            .copied()
            .find(|svy| svy.short_name() == key.to_lowercase() || svy.archive_name() == key)
            .ok_or_else(|| RgbError::InvalidParameter {
                param: "survey".to_string(),
                message: format!(
                    "'{}' is not a valid survey. please choose one from {}",
                    s,
                    Survey::ALL
                        .iter()
                        .map(|svy| svy.short_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

/// Named survey combinations the query planner draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combination {
    /// Radio - Optical - Radio
    Ror,
    /// Infrared - Optical - Ultraviolet
    Iou,
    Optical,
    /// FIRST over DSS2 Red
    Single,
}

impl Combination {
    pub fn surveys(&self) -> &'static [Survey] {
        match self {
            Combination::Ror => &[Survey::Tgss, Survey::Dss2r, Survey::Nvss],
            Combination::Iou => &[Survey::W22, Survey::Dss2r, Survey::Gnuv],
            Combination::Optical => &[Survey::Dss2ir, Survey::Dss2r, Survey::Dss2b],
            Combination::Single => &[Survey::First, Survey::Dss2r],
        }
    }
}

/// Which set of figures a query produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagesOption {
    /// Two ROR composites, one IOU and one optical composite
    RorIouOptical,
    /// Radio contours and catalog overlays on DSS2 Red
    ContoursOnDss2r,
}

impl ImagesOption {
    pub fn combinations(&self) -> &'static [Combination] {
        match self {
            ImagesOption::RorIouOptical => &[Combination::Ror, Combination::Iou, Combination::Optical],
            ImagesOption::ContoursOnDss2r => &[Combination::Single, Combination::Ror],
        }
    }
}

impl TryFrom<u8> for ImagesOption {
    type Error = RgbError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ImagesOption::RorIouOptical),
            2 => Ok(ImagesOption::ContoursOnDss2r),
            other => Err(RgbError::InvalidParameter {
                param: "images".to_string(),
                message: format!("Unknown images option {}, expected 1 or 2", other),
            }),
        }
    }
}

/// Deduplicated surveys that have to be fetched for `option`
pub fn plan_surveys(option: ImagesOption) -> Vec<Survey> {
    let mut surveys: Vec<Survey> = option
        .combinations()
        .iter()
        .flat_map(|c| c.surveys().iter().copied())
        .collect();
    surveys.sort();
    surveys.dedup();
    surveys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_round_trip_names() {
        for svy in Survey::ALL {
            assert_eq!(svy.short_name().parse::<Survey>().unwrap(), svy);
            assert_eq!(svy.archive_name().parse::<Survey>().unwrap(), svy);
        }
        assert!("dss3".parse::<Survey>().is_err());
    }

    #[test]
    fn test_only_nvss_is_resampled() {
        assert_eq!(Survey::Nvss.sampler(), Some("Lanczos3"));
        assert_eq!(Survey::Tgss.sampler(), None);
    }

    #[test]
    fn test_plan_surveys_option_one() {
        let plan = plan_surveys(ImagesOption::RorIouOptical);
        assert_eq!(plan.len(), 7);
        assert!(plan.contains(&Survey::Gnuv));
        assert!(!plan.contains(&Survey::First));
    }

    #[test]
    fn test_plan_surveys_option_two() {
        let plan = plan_surveys(ImagesOption::ContoursOnDss2r);
        assert_eq!(
            plan,
            vec![Survey::Tgss, Survey::Nvss, Survey::First, Survey::Dss2r]
        );
    }

    #[test]
    fn test_images_option_from_number() {
        assert_eq!(ImagesOption::try_from(1).unwrap(), ImagesOption::RorIouOptical);
        assert!(ImagesOption::try_from(3).is_err());
    }
}
