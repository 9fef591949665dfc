//! Scalar pair laws. Forces are signed along the separation vector from the
//! second atom to the first: positive pushes the pair apart.

#[inline]
pub fn harmonic_spring_force(dist: f64, equilibrium_length: f64, spring_constant: f64) -> f64 {
    -spring_constant * (dist - equilibrium_length)
}

#[inline]
pub fn harmonic_spring_energy(dist: f64, equilibrium_length: f64, spring_constant: f64) -> f64 {
    let stretch = dist - equilibrium_length;
    0.5 * spring_constant * stretch * stretch
}

/// Magnitude of the 12-6 Lennard-Jones force, `24ε(2(σ/r)^12 - (σ/r)^6)/r`.
#[inline]
pub fn lennard_jones_force(dist: f64, sigma: f64, epsilon: f64) -> f64 {
    let s6 = (sigma / dist).powi(6);
    let s12 = s6 * s6;
    24.0 * epsilon * (2.0 * s12 - s6) / dist
}

#[inline]
pub fn lennard_jones_energy(dist: f64, sigma: f64, epsilon: f64) -> f64 {
    let s6 = (sigma / dist).powi(6);
    let s12 = s6 * s6;
    4.0 * epsilon * (s12 - s6)
}
