use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::fmt;
use std::str::FromStr;

/// Filter sent to `GET /products`. Every field is optional and defaults to
/// the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProductQuery {
    pub name: String,
    pub location: String,
    pub location_type: String,
}

/// Which `location_default.*` field a location filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    City,
    District,
    Province,
    Country,
}

impl LocationType {
    pub const ALL: [LocationType; 4] = [
        LocationType::City,
        LocationType::District,
        LocationType::Province,
        LocationType::Country,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::City => "city",
            LocationType::District => "district",
            LocationType::Province => "province",
            LocationType::Country => "country",
        }
    }

    /// Index field holding this kind of location.
    pub fn field(self) -> &'static str {
        match self {
            LocationType::City => "location_default.city",
            LocationType::District => "location_default.district",
            LocationType::Province => "location_default.province",
            LocationType::Country => "location_default.country",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "city" => Ok(LocationType::City),
            "district" => Ok(LocationType::District),
            "province" => Ok(LocationType::Province),
            "country" => Ok(LocationType::Country),
            other => Err(format!(
                "Unknown location_type '{}', expected one of: {}",
                other,
                LocationType::ALL.map(LocationType::as_str).join(", ")
            )),
        }
    }
}

/// What to ask the index for, decided from a [`ProductQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    All,
    Filtered {
        name: String,
        location: String,
        location_type: LocationType,
    },
}

impl ProductQuery {
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.location.is_empty() && !self.location_type.is_empty()
    }

    /// Filters only when all three fields are set; an unknown location type
    /// is rejected rather than turned into a field path.
    pub fn plan(&self) -> Result<SearchPlan, AppError> {
        if !self.is_complete() {
            return Ok(SearchPlan::All);
        }

        let location_type = self
            .location_type
            .parse::<LocationType>()
            .map_err(AppError::bad_request)?;

        Ok(SearchPlan::Filtered {
            name: self.name.clone(),
            location: self.location.clone(),
            location_type,
        })
    }
}
