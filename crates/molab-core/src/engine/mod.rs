//! # Engine Module
//!
//! The stateful machinery behind a simulation tick: configuration, the
//! per-atom dynamical state carried from tick to tick, velocity seeding, and
//! the damped integrator.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Force field, thermal and integrator settings with validation
//! - **State Tracking** ([`state`]) - Velocities and forces keyed by atom identity
//! - **Thermal Seeding** ([`thermal`]) - Initial velocities drawn from the temperature
//! - **Integration** ([`integrator`]) - Time-step clamping, damping and bounding-box snapping
//! - **Progress Monitoring** ([`progress`]) - Callback-based tick reporting
//!
//! Nothing here spawns threads or keeps global state; the owner of a
//! [`state::DynamicsState`] decides when and how often a tick runs.

pub mod config;
pub mod integrator;
pub mod progress;
pub mod state;
pub mod thermal;
