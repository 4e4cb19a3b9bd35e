use crate::error::InvalidInputError;

const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Whether parsed coordinates must also fall inside the geographic ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeCheck {
    /// Only require that both values parse as numbers.
    #[default]
    Lenient,
    /// Additionally require latitude in [-90, 90] and longitude in [-180, 180].
    Strict,
}

impl RangeCheck {
    pub fn from_strict(strict: bool) -> Self {
        if strict { RangeCheck::Strict } else { RangeCheck::Lenient }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Parse raw latitude/longitude text, applying `check` afterwards.
    pub fn parse(latitude: &str, longitude: &str, check: RangeCheck) -> Result<Self, InvalidInputError> {
        let coordinate = Self {
            latitude: parse_axis("latitude", latitude)?,
            longitude: parse_axis("longitude", longitude)?,
        };

        if check == RangeCheck::Strict {
            coordinate.check_ranges()?;
        }

        Ok(coordinate)
    }

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Reject values outside the geographic ranges. NaN is always out of range.
    pub fn check_ranges(&self) -> Result<(), InvalidInputError> {
        check_axis("latitude", self.latitude, LATITUDE_RANGE)?;
        check_axis("longitude", self.longitude, LONGITUDE_RANGE)
    }
}

fn parse_axis(axis: &'static str, input: &str) -> Result<f64, InvalidInputError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|source| InvalidInputError::NotANumber {
            axis,
            input: input.to_string(),
            source,
        })
}

fn check_axis(axis: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), InvalidInputError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InvalidInputError::OutOfRange { axis, value, min, max })
    }
}
