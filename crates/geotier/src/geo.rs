// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Value types for the place-name dataset.

use serde::{Deserialize, Serialize};

use crate::ResultMap;

/// A resolved place name and its coordinate.
pub type LocationDictionary = ResultMap<String, Coordinate>;

/// A geographic position in decimal degrees.
///
/// The resolver never interprets coordinates; they are stored and returned as
/// the tiers produced them.
///
/// # Examples
///
/// ```
/// use geotier::Coordinate;
///
/// let london = Coordinate::new(51.5, -0.1);
/// assert_eq!(london, Coordinate::from((51.5, -0.1)));
/// assert_eq!(london.to_string(), "(51.5, -0.1)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north of the equator; negative south of it.
    pub latitude: f64,
    /// Degrees east of the prime meridian; negative west of it.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from a latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coordinate: Coordinate) -> Self {
        (coordinate.latitude, coordinate.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
