//! Shared primitive types used across the lottery core.

/// A 3-letter country identifier as emitted by the upstream source ("USA").
pub type CountryCode = String;

/// A calendar year of an indicator observation.
pub type Year = i32;

/// Upstream indicator identifier ("SP.DYN.CBRT.IN").
pub type IndicatorCode = String;

/// Decimal digits kept on every probability percentage.
pub const PROBABILITY_PRECISION: i32 = 6;

/// Region label the upstream source gives to non-country groupings.
pub const AGGREGATES_REGION: &str = "Aggregates";
