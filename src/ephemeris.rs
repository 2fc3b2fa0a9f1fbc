//! Public query handle.
//!
//! An [`Ephemeris`] owns one loaded kernel: its segment index, its body relation graph
//! and the time convention used to read calendar times. Everything is
//! immutable after [`Ephemeris::load`] and shared behind an [`Arc`], so a
//! handle is cheap to clone and can be queried from many threads at once.
//!
//! # Example
//! ```rust, no_run
//! use ephemeris::{CalendarTime, Ephemeris};
//!
//! let ephem = Ephemeris::open("de440s.bsp")?;
//! let t = CalendarTime::new(2024, 3, 20, 3, 6, 0.0)?;
//! let earth = ephem.state(399, 10, &t)?;
//! println!("{}", earth.to_au());
//! # Ok::<(), ephemeris::EphemerisError>(())
//! ```

use std::sync::Arc;

use camino::Utf8Path;
use hifitime::Epoch;
use log::debug;

use crate::bodies;
use crate::composer::{self, BodyTree, HopChain};
use crate::constants::{BodyId, EphemerisTime};
use crate::ephemeris_errors::Result;
use crate::kernel::{Kernel, KernelFormat, KernelSource};
use crate::segment_index::SegmentIndex;
use crate::state_vector::StateVector;
use crate::time::{CalendarTime, TimeConvention};

#[derive(Debug)]
struct LoadedKernel {
    format: KernelFormat,
    range: (EphemerisTime, EphemerisTime),
    comment: Option<String>,
    index: SegmentIndex,
    tree: BodyTree,
}

/// Handle on a loaded kernel.
///
/// See also
/// ------------
/// * [`Ephemeris::load`] – Build a handle.
/// * [`Ephemeris::state`] – Main query.
#[derive(Debug, Clone)]
pub struct Ephemeris {
    kernel: Arc<LoadedKernel>,
    convention: TimeConvention,
}

impl Ephemeris {
    /// Load a kernel and prepare it for queries.
    ///
    /// Arguments
    /// -----------------
    /// * `source`: Path or bytes of a native or SPK kernel.
    ///
    /// Return
    /// ----------
    /// * A handle using the default [`TimeConvention::tdb`] convention, or the
    ///   load error. Besides the errors of [`Kernel::load`], overlapping segments
    ///   for one pair and cycles in the body tree fail with
    ///   [`EphemerisError::Corrupt`](crate::EphemerisError::Corrupt).
    pub fn load(source: impl Into<KernelSource>) -> Result<Self> {
        Ephemeris::from_kernel(Kernel::load(source)?)
    }

    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        Ephemeris::from_kernel(Kernel::open(path)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ephemeris::from_kernel(Kernel::from_bytes(bytes)?)
    }

    /// Index an already decoded kernel.
    pub fn from_kernel(kernel: Kernel) -> Result<Self> {
        let format = kernel.format();
        let range = kernel.validity_range();
        let comment = kernel.comment().map(str::to_string);

        let tree = BodyTree::from_segments(kernel.segments())?;
        let index = SegmentIndex::new(kernel.into_segments())?;
        debug!(
            "ephemeris ready: {} pairs over [{}, {}]",
            index.pairs().len(),
            range.0,
            range.1
        );

        Ok(Ephemeris {
            kernel: Arc::new(LoadedKernel {
                format,
                range,
                comment,
                index,
                tree,
            }),
            convention: TimeConvention::default(),
        })
    }

    /// Same kernel, read with another time convention.
    pub fn with_time_convention(mut self, convention: TimeConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn time_convention(&self) -> &TimeConvention {
        &self.convention
    }

    /// State of `body` relative to `center` at a calendar time.
    ///
    /// Arguments
    /// -----------------
    /// * `body`, `center`: Body codes.
    /// * `time`: Calendar time, read with the handle's [`TimeConvention`].
    ///
    /// Return
    /// ----------
    /// * The state vector, or [`EphemerisError::TimeDomain`](crate::EphemerisError::TimeDomain)
    ///   for an unusable calendar time, then any error of [`Self::state_et`].
    pub fn state(&self, body: BodyId, center: BodyId, time: &CalendarTime) -> Result<StateVector> {
        let t = self.convention.to_continuous(time)?;
        self.state_et(body, center, t)
    }

    /// State of `body` relative to `center` at continuous time `t`.
    ///
    /// Return
    /// ----------
    /// * The state vector, or one of
    ///   [`NoPath`](crate::EphemerisError::NoPath),
    ///   [`UnknownPair`](crate::EphemerisError::UnknownPair),
    ///   [`TimeOutOfRange`](crate::EphemerisError::TimeOutOfRange),
    ///   [`DegenerateSegment`](crate::EphemerisError::DegenerateSegment).
    ///
    /// See also
    /// ------------
    /// * [`composer::state`] – Composition rules.
    pub fn state_et(&self, body: BodyId, center: BodyId, t: EphemerisTime) -> Result<StateVector> {
        composer::state(&self.kernel.index, &self.kernel.tree, body, center, t)
    }

    /// State at a `hifitime` epoch, read as TDB seconds past J2000.
    pub fn state_at_epoch(&self, body: BodyId, center: BodyId, epoch: Epoch) -> Result<StateVector> {
        self.state_et(body, center, epoch.to_et_seconds())
    }

    /// Calendar times between which `state(body, center, ·)` can be evaluated.
    ///
    /// The bounds enclose gaps between the segments of a pair: an instant
    /// inside them may still fail with
    /// [`TimeOutOfRange`](crate::EphemerisError::TimeOutOfRange).
    /// [`Self::coverage_intervals_et`] lists the covered pieces.
    pub fn validity_range(
        &self,
        body: BodyId,
        center: BodyId,
    ) -> Result<(CalendarTime, CalendarTime)> {
        let (start, end) = self.validity_range_et(body, center)?;
        Ok((
            self.convention.to_calendar(start)?,
            self.convention.to_calendar(end)?,
        ))
    }

    /// Continuous time bounds of `state(body, center, ·)`, gaps included.
    pub fn validity_range_et(
        &self,
        body: BodyId,
        center: BodyId,
    ) -> Result<(EphemerisTime, EphemerisTime)> {
        composer::validity_range(
            &self.kernel.index,
            &self.kernel.tree,
            body,
            center,
            self.kernel.range,
        )
    }

    /// Covered pieces of `state(body, center, ·)` on the continuous time scale.
    ///
    /// See also
    /// ------------
    /// * [`composer::coverage_intervals`] – Intersection over the hops.
    pub fn coverage_intervals_et(
        &self,
        body: BodyId,
        center: BodyId,
    ) -> Result<Vec<(EphemerisTime, EphemerisTime)>> {
        composer::coverage_intervals(
            &self.kernel.index,
            &self.kernel.tree,
            body,
            center,
            self.kernel.range,
        )
    }

    /// How a query would be answered: the shortest chain of stored pairs.
    pub fn hop_chain(&self, body: BodyId, center: BodyId) -> Result<HopChain> {
        composer::hop_chain(&self.kernel.index, &self.kernel.tree, body, center)
    }

    /// Body code of a NAIF name, alias or numeric string.
    pub fn body_id(name: &str) -> Result<BodyId> {
        bodies::body_id(name)
    }

    pub fn format(&self) -> KernelFormat {
        self.kernel.format
    }

    /// Global validity range of the kernel.
    pub fn kernel_range(&self) -> (EphemerisTime, EphemerisTime) {
        self.kernel.range
    }

    /// SPK comment area, if any.
    pub fn comment(&self) -> Option<&str> {
        self.kernel.comment.as_deref()
    }

    /// Stored `(body, center)` pairs.
    pub fn pairs(&self) -> Vec<(BodyId, BodyId)> {
        self.kernel.index.pairs()
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.kernel.index
    }

    /// Stored relations between bodies.
    pub fn body_tree(&self) -> &BodyTree {
        &self.kernel.tree
    }
}
