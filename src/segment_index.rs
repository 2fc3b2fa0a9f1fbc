//! Segment index: `(body, center)` → segments sorted by start time.
//!
//! Segments of one pair never overlap. Each covers `[start, end)`, except the
//! last one of the pair whose end is served inclusively, so that a query at
//! the very end of the pair's coverage succeeds. Gaps between segments are
//! unsupported times.

use std::collections::HashMap;

use itertools::Itertools;

use crate::constants::{BodyId, EphemerisTime};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::segment::Segment;

#[derive(Debug, Clone)]
pub struct SegmentIndex {
    segments: Vec<Segment>,
    // (body, center) -> indices into `segments`, sorted by start
    by_pair: HashMap<(BodyId, BodyId), Vec<usize>>,
}

impl SegmentIndex {
    /// Build the index.
    ///
    /// Arguments
    /// -----------------
    /// * `segments`: All segments of a kernel, in any order.
    ///
    /// Return
    /// ----------
    /// * The index, or [`EphemerisError::Corrupt`] if two segments of the same pair overlap.
    pub fn new(segments: Vec<Segment>) -> Result<Self> {
        let mut by_pair: HashMap<(BodyId, BodyId), Vec<usize>> = HashMap::new();
        for (i, segment) in segments.iter().enumerate() {
            by_pair
                .entry((segment.body, segment.center))
                .or_default()
                .push(i);
        }

        for ((body, center), indices) in by_pair.iter_mut() {
            indices.sort_by(|&a, &b| segments[a].start.total_cmp(&segments[b].start));
            if let Some((a, b)) = indices
                .iter()
                .map(|&i| &segments[i])
                .tuple_windows()
                .find(|(previous, next)| next.start < previous.end)
            {
                return Err(EphemerisError::Corrupt(format!(
                    "segments of {body}->{center} overlap: [{}, {}] and [{}, {}]",
                    a.start, a.end, b.start, b.end
                )));
            }
        }

        Ok(SegmentIndex { segments, by_pair })
    }

    /// Find the segment covering `t` for `(body, center)`.
    ///
    /// Binary search over the pair's segment starts.
    ///
    /// Arguments
    /// -----------------
    /// * `body`, `center`: The pair, in the order stored in the kernel.
    /// * `t`: Instant on the continuous time scale.
    ///
    /// Return
    /// ----------
    /// * The covering segment.
    /// * [`EphemerisError::UnknownPair`] if no segment exists for the pair.
    /// * [`EphemerisError::TimeOutOfRange`] if `t` falls before, after or
    ///   between the pair's segments.
    pub fn resolve(&self, body: BodyId, center: BodyId, t: EphemerisTime) -> Result<&Segment> {
        let indices = self
            .by_pair
            .get(&(body, center))
            .ok_or(EphemerisError::UnknownPair { body, center })?;

        let following = indices.partition_point(|&i| self.segments[i].start <= t);
        if following > 0 {
            let segment = &self.segments[indices[following - 1]];
            let is_last = following == indices.len();
            if t < segment.end || (is_last && t == segment.end) {
                return Ok(segment);
            }
        }

        let (start, end) = self.pair_coverage(indices);
        Err(EphemerisError::TimeOutOfRange {
            body,
            center,
            t,
            start,
            end,
        })
    }

    fn pair_coverage(&self, indices: &[usize]) -> (EphemerisTime, EphemerisTime) {
        let first = &self.segments[indices[0]];
        let last = &self.segments[indices[indices.len() - 1]];
        (first.start, last.end)
    }

    /// First start and last end of a pair's segments (gaps included).
    ///
    /// See also
    /// ------------
    /// * [`Self::coverage_intervals`] – The same coverage without its gaps.
    pub fn coverage(&self, body: BodyId, center: BodyId) -> Result<(EphemerisTime, EphemerisTime)> {
        self.by_pair
            .get(&(body, center))
            .map(|indices| self.pair_coverage(indices))
            .ok_or(EphemerisError::UnknownPair { body, center })
    }

    /// Covered pieces of a pair: segments meeting end to start are merged,
    /// the gaps between pieces are unsupported times.
    ///
    /// A piece other than the last is served up to, not including, its end.
    pub fn coverage_intervals(
        &self,
        body: BodyId,
        center: BodyId,
    ) -> Result<Vec<(EphemerisTime, EphemerisTime)>> {
        let indices = self
            .by_pair
            .get(&(body, center))
            .ok_or(EphemerisError::UnknownPair { body, center })?;
        Ok(indices
            .iter()
            .map(|&i| (self.segments[i].start, self.segments[i].end))
            .coalesce(|previous, next| {
                if next.0 <= previous.1 {
                    Ok((previous.0, previous.1.max(next.1)))
                } else {
                    Err((previous, next))
                }
            })
            .collect())
    }

    pub fn contains_pair(&self, body: BodyId, center: BodyId) -> bool {
        self.by_pair.contains_key(&(body, center))
    }

    /// All stored `(body, center)` pairs, sorted.
    pub fn pairs(&self) -> Vec<(BodyId, BodyId)> {
        self.by_pair.keys().copied().sorted().collect()
    }

    /// Segments of a pair, by increasing start.
    pub fn segments_for(&self, body: BodyId, center: BodyId) -> impl Iterator<Item = &Segment> {
        self.by_pair
            .get(&(body, center))
            .into_iter()
            .flatten()
            .map(|&i| &self.segments[i])
    }

    /// All segments, in kernel order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}
