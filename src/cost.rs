//! Fuel cost estimation.

/// Round to 2 decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimated fuel cost of driving `total_distance_miles`:
/// `(miles / mpg) * price`, rounded to cents.
///
/// `vehicle_mpg` must be positive; requests are validated before reaching
/// this point.
pub fn estimate_fuel_cost(total_distance_miles: f64, vehicle_mpg: f64, gas_price: f64) -> f64 {
    debug_assert!(vehicle_mpg > 0.0, "vehicle MPG must be positive");
    round2((total_distance_miles / vehicle_mpg) * gas_price)
}
