//! Chebyshev ephemeris engine.
//!
//! Loads native `EPHKERNL` or NAIF SPK (type 2) kernels and evaluates the
//! position and velocity of a body relative to a center at any covered time.
//! Start from [`Ephemeris`].

pub mod bodies;
pub mod chebyshev;
pub mod composer;
pub mod constants;
pub mod ecliptic;
pub mod ephemeris;
pub mod ephemeris_errors;
pub mod kernel;
pub mod segment;
pub mod segment_index;
pub mod state_vector;
pub mod time;

pub use ecliptic::SphericalCoordinates;
pub use ephemeris::Ephemeris;
pub use ephemeris_errors::{EphemerisError, Result};
pub use kernel::{Kernel, KernelFormat, KernelSource};
pub use segment::Segment;
pub use state_vector::StateVector;
pub use time::{CalendarTime, TimeConvention};
