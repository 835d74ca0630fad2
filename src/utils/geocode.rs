// Lookup-table geocoder

use crate::error::GeocodeError;
use crate::models::Location;
use crate::oracle::Geocoder;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Resolves addresses from a fixed table.
///
/// Matching ignores case and surrounding whitespace, so
/// `" 49 White St "` finds an entry stored as `"49 white st"`.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    locations: HashMap<String, Location>,
}

fn address_key(address: &str) -> String {
    address.trim().to_lowercase()
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: AsRef<str>>(&mut self, address: S, location: Location) {
        self.locations.insert(address_key(address.as_ref()), location);
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Parse a JSON object mapping addresses to `{"lng": .., "lat": ..}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Location> = serde_json::from_str(json)?;
        let mut geocoder = Self::new();
        for (address, location) in raw {
            geocoder.insert(address, location);
        }
        Ok(geocoder)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Geocoder for StaticGeocoder {
    fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        self.locations
            .get(&address_key(address))
            .copied()
            .ok_or_else(|| GeocodeError::NotFound {
                address: address.to_string(),
            })
    }
}

impl FromIterator<(String, Location)> for StaticGeocoder {
    fn from_iter<I: IntoIterator<Item = (String, Location)>>(iter: I) -> Self {
        let mut geocoder = Self::new();
        for (address, location) in iter {
            geocoder.insert(address, location);
        }
        geocoder
    }
}
