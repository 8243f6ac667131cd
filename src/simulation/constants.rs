// Units of the collision runs: AU, Julian year, solar mass
/// Astronomical unit, in meters
pub const AU2M: f64 = 1.495978707e11;
/// Julian year, in seconds
pub const YR2S: f64 = 365.25 * 86400.0;
/// Solar mass, in kilograms
pub const MSUN: f64 = 1.988409870698051e30;
/// Heliocentric gravitational constant, in m^3 s^-2
pub const GMSUN: f64 = 1.32712440041279419e20;
/// Solar radius, in meters
pub const RSUN: f64 = 6.957e8;

// Derived:
/// Gravitational constant in AU^3 Msun^-1 yr^-2
pub const GU: f64 = GMSUN * YR2S * YR2S / (AU2M * AU2M * AU2M);

/// Convert a bulk density from kg/m^3 to Msun/AU^3
pub fn density_to_sim(kg_m3: f64) -> f64 {
    kg_m3 * AU2M * AU2M * AU2M / MSUN
}
