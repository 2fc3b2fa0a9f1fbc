//! State composition across the body graph.
//!
//! Every stored `(body, center)` relation links two bodies. A query
//! `(body, center)` is answered by the shortest chain of stored relations
//! joining them, found by a breadth-first search over the undirected
//! relation graph. Each link of the chain is evaluated as stored, or negated
//! when only the opposite orientation exists. A directly stored pair is always
//! a chain of length one, so it is always preferred.
//!
//! Chains are planned from the smaller body code to the larger one. A query
//! with `body > center` evaluates the chain of `(center, body)` and negates it,
//! so `state(a, b) == -state(b, a)` holds bit for bit. When both orientations
//! of a pair are stored, the one whose body has the smaller code is used.
//!
//! The directed relations are checked for cycles once, at load time. A pair
//! stored in both orientations counts as a single relation.

use std::collections::{BTreeSet, HashMap, VecDeque};

use log::debug;

use crate::constants::{BodyId, EphemerisTime};
use crate::ephemeris_errors::{EphemerisError, Result};
use crate::segment::Segment;
use crate::segment_index::SegmentIndex;
use crate::state_vector::StateVector;

/// Stored `body → center` relations of a kernel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyTree {
    /// Centers each body is stored against, sorted.
    centers: HashMap<BodyId, Vec<BodyId>>,
    /// Both orientations of every relation, sorted and deduplicated.
    neighbors: HashMap<BodyId, Vec<BodyId>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visit {
    Open,
    Closed,
}

impl BodyTree {
    /// Collect the relations and reject cycles.
    ///
    /// Arguments
    /// -----------------
    /// * `segments`: Kernel segments, in kernel order.
    ///
    /// Return
    /// ----------
    /// * The relation graph, or [`EphemerisError::Corrupt`] for a segment
    ///   relative to its own body or a cycle in the directed relations.
    pub fn from_segments(segments: &[Segment]) -> Result<Self> {
        let mut relations = BTreeSet::new();
        for segment in segments {
            if segment.body == segment.center {
                return Err(EphemerisError::Corrupt(format!(
                    "segment of body {} is relative to itself",
                    segment.body
                )));
            }
            relations.insert((segment.body, segment.center));
        }

        let mut tree = BodyTree::default();
        for &(body, center) in &relations {
            tree.centers.entry(body).or_default().push(center);
            tree.neighbors.entry(body).or_default().push(center);
            tree.neighbors.entry(center).or_default().push(body);
        }
        for linked in tree.neighbors.values_mut() {
            linked.sort_unstable();
            linked.dedup();
        }
        for (body, centers) in &tree.centers {
            if centers.len() > 1 {
                debug!("body {body} is stored relative to {centers:?}");
            }
        }

        tree.check_acyclic()?;
        debug!(
            "body graph: {} bodies, {} relations",
            tree.neighbors.len(),
            relations.len()
        );
        Ok(tree)
    }

    /// `true` if the body appears in any segment, as target or center.
    pub fn contains(&self, body: BodyId) -> bool {
        self.neighbors.contains_key(&body)
    }

    /// Centers `body` is stored against, sorted; empty for pure centers.
    pub fn centers(&self, body: BodyId) -> &[BodyId] {
        self.centers.get(&body).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bodies sharing a stored relation with `body`, sorted.
    pub fn neighbors(&self, body: BodyId) -> &[BodyId] {
        self.neighbors.get(&body).map(Vec::as_slice).unwrap_or(&[])
    }

    fn stores(&self, body: BodyId, center: BodyId) -> bool {
        self.centers(body).binary_search(&center).is_ok()
    }

    /// Directed edges used by the cycle check; a pair stored both ways keeps
    /// only the orientation starting at the smaller code.
    fn oriented_centers(&self, body: BodyId) -> Vec<BodyId> {
        self.centers(body)
            .iter()
            .copied()
            .filter(|&center| !(body > center && self.stores(center, body)))
            .collect()
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut visits: HashMap<BodyId, Visit> = HashMap::new();
        let mut starts: Vec<BodyId> = self.centers.keys().copied().collect();
        starts.sort_unstable();

        for start in starts {
            if visits.contains_key(&start) {
                continue;
            }
            visits.insert(start, Visit::Open);
            let mut stack = vec![(start, self.oriented_centers(start), 0usize)];

            while let Some(frame) = stack.last_mut() {
                let next = frame.1.get(frame.2).copied();
                frame.2 += 1;
                match next {
                    Some(center) => match visits.get(&center).copied() {
                        Some(Visit::Open) => {
                            return Err(EphemerisError::Corrupt(format!(
                                "body tree has a cycle through body {center}"
                            )))
                        }
                        Some(Visit::Closed) => {}
                        None => {
                            visits.insert(center, Visit::Open);
                            stack.push((center, self.oriented_centers(center), 0));
                        }
                    },
                    None => {
                        let body = frame.0;
                        stack.pop();
                        visits.insert(body, Visit::Closed);
                    }
                }
            }
        }
        Ok(())
    }

    /// Fewest-relations path `[from, …, to]` between two bodies.
    ///
    /// Neighbors are visited in ascending code order, so ties between paths of
    /// equal length always resolve the same way.
    ///
    /// Return
    /// ----------
    /// * The path, or `None` when a body is unknown or the two are not linked.
    pub fn shortest_path(&self, from: BodyId, to: BodyId) -> Option<Vec<BodyId>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let mut previous = HashMap::from([(from, from)]);
        let mut queue = VecDeque::from([from]);
        while let Some(body) = queue.pop_front() {
            for &next in self.neighbors(body) {
                if previous.contains_key(&next) {
                    continue;
                }
                previous.insert(next, body);
                if next == to {
                    let mut path = vec![to];
                    let mut current = to;
                    while current != from {
                        current = *previous.get(&current)?;
                        path.push(current);
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}

/// Sequence of stored pairs combined to answer one query.
#[derive(Debug, Clone, PartialEq)]
pub enum HopChain {
    /// `body == center`: the zero state.
    Identity { body: BodyId },
    /// Stored as `(body, center)`.
    Direct { body: BodyId, center: BodyId },
    /// Stored as `(center, body)`, negated.
    Reversed { body: BodyId, center: BodyId },
    /// Through intermediate bodies; `legs[i]` links `path[i]` to `path[i + 1]`
    /// and is either [`HopChain::Direct`] or [`HopChain::Reversed`].
    Composed {
        body: BodyId,
        center: BodyId,
        path: Vec<BodyId>,
        legs: Vec<HopChain>,
    },
}

impl HopChain {
    /// Stored pairs the chain evaluates, in evaluation order.
    pub fn hops(&self) -> Vec<(BodyId, BodyId)> {
        match self {
            HopChain::Identity { .. } => Vec::new(),
            HopChain::Direct { body, center } => vec![(*body, *center)],
            HopChain::Reversed { body, center } => vec![(*center, *body)],
            HopChain::Composed { legs, .. } => legs.iter().flat_map(HopChain::hops).collect(),
        }
    }

    /// The same chain answering `(center, body)`.
    pub fn reversed(&self) -> HopChain {
        match self {
            HopChain::Identity { body } => HopChain::Identity { body: *body },
            HopChain::Direct { body, center } => HopChain::Reversed {
                body: *center,
                center: *body,
            },
            HopChain::Reversed { body, center } => HopChain::Direct {
                body: *center,
                center: *body,
            },
            HopChain::Composed {
                body,
                center,
                path,
                legs,
            } => HopChain::Composed {
                body: *center,
                center: *body,
                path: path.iter().rev().copied().collect(),
                legs: legs.iter().rev().map(HopChain::reversed).collect(),
            },
        }
    }
}

/// One link between neighbors `a` and `b`.
fn single_hop(index: &SegmentIndex, a: BodyId, b: BodyId) -> HopChain {
    match (index.contains_pair(a, b), index.contains_pair(b, a)) {
        (true, true) if a < b => HopChain::Direct { body: a, center: b },
        (true, true) => HopChain::Reversed { body: a, center: b },
        (true, false) => HopChain::Direct { body: a, center: b },
        (false, _) => HopChain::Reversed { body: a, center: b },
    }
}

/// Plan how a `(body, center)` query is answered.
///
/// Return
/// ----------
/// * The [`HopChain`], or [`EphemerisError::NoPath`] when a body is unknown or
///   no chain of stored relations links the two bodies.
pub fn hop_chain(
    index: &SegmentIndex,
    tree: &BodyTree,
    body: BodyId,
    center: BodyId,
) -> Result<HopChain> {
    if body == center {
        return if tree.contains(body) {
            Ok(HopChain::Identity { body })
        } else {
            Err(EphemerisError::NoPath { body, center })
        };
    }

    let (low, high) = (body.min(center), body.max(center));
    let path = tree
        .shortest_path(low, high)
        .ok_or(EphemerisError::NoPath { body, center })?;
    let chain = if path.len() == 2 {
        single_hop(index, path[0], path[1])
    } else {
        HopChain::Composed {
            body: low,
            center: high,
            legs: path
                .windows(2)
                .map(|pair| single_hop(index, pair[0], pair[1]))
                .collect(),
            path,
        }
    };
    Ok(if body > center { chain.reversed() } else { chain })
}

fn stored_state(
    index: &SegmentIndex,
    body: BodyId,
    center: BodyId,
    t: EphemerisTime,
) -> Result<StateVector> {
    let (position, velocity) = index.resolve(body, center, t)?.evaluate(t)?;
    Ok(StateVector::new(body, center, t, position, velocity))
}

fn evaluate_chain(index: &SegmentIndex, chain: &HopChain, t: EphemerisTime) -> Result<StateVector> {
    match chain {
        HopChain::Identity { body } => Ok(StateVector::zero(*body, t)),
        HopChain::Direct { body, center } => stored_state(index, *body, *center, t),
        HopChain::Reversed { body, center } => Ok(-stored_state(index, *center, *body, t)?),
        HopChain::Composed { body, legs, .. } => legs
            .iter()
            .try_fold(StateVector::zero(*body, t), |state, leg| {
                Ok(state + evaluate_chain(index, leg, t)?)
            }),
    }
}

/// State of `body` relative to `center` at `t`.
///
/// Arguments
/// -----------------
/// * `index`: Segment lookup.
/// * `tree`: Relation graph of the same kernel.
/// * `body`, `center`: The requested pair.
/// * `t`: Instant on the continuous time scale.
///
/// Return
/// ----------
/// * The state, or the first error met: [`EphemerisError::NoPath`] from
///   planning, [`EphemerisError::TimeOutOfRange`] or
///   [`EphemerisError::DegenerateSegment`] from a hop.
///
/// See also
/// ------------
/// * [`hop_chain`] – Query planning.
/// * [`crate::chebyshev::evaluate`] – Evaluation of a single hop.
pub fn state(
    index: &SegmentIndex,
    tree: &BodyTree,
    body: BodyId,
    center: BodyId,
    t: EphemerisTime,
) -> Result<StateVector> {
    let chain = hop_chain(index, tree, body, center)?;
    if body > center {
        Ok(-evaluate_chain(index, &chain.reversed(), t)?)
    } else {
        evaluate_chain(index, &chain, t)
    }
}

/// Bounds of the instants at which `state(body, center, ·)` can be evaluated.
///
/// For a composed chain this is the intersection of the coverages of its hops;
/// the zero state of a body relative to itself is valid over `kernel_range`.
/// A hop whose segments leave gaps contributes the hull of its segments, so
/// an instant inside the returned range may still fail with
/// [`EphemerisError::TimeOutOfRange`]. Use
/// [`SegmentIndex::coverage_intervals`] for the exact pieces of a pair.
///
/// Return
/// ----------
/// * `(start, end)`, or [`EphemerisError::NoPath`] /
///   [`EphemerisError::DisjointCoverage`] when the hop coverages do not intersect.
pub fn validity_range(
    index: &SegmentIndex,
    tree: &BodyTree,
    body: BodyId,
    center: BodyId,
    kernel_range: (EphemerisTime, EphemerisTime),
) -> Result<(EphemerisTime, EphemerisTime)> {
    let chain = hop_chain(index, tree, body, center)?;
    if let HopChain::Identity { .. } = chain {
        return Ok(kernel_range);
    }

    let mut range = (f64::NEG_INFINITY, f64::INFINITY);
    for (child, parent) in chain.hops() {
        let (start, end) = index.coverage(child, parent)?;
        range = (range.0.max(start), range.1.min(end));
    }
    if range.0 > range.1 {
        return Err(EphemerisError::DisjointCoverage { body, center });
    }
    Ok(range)
}

/// Intersection of two sorted lists of disjoint closed intervals.
fn intersect_intervals(
    a: &[(EphemerisTime, EphemerisTime)],
    b: &[(EphemerisTime, EphemerisTime)],
) -> Vec<(EphemerisTime, EphemerisTime)> {
    let (mut i, mut j) = (0, 0);
    let mut common = Vec::new();
    while i < a.len() && j < b.len() {
        let start = a[i].0.max(b[j].0);
        let end = a[i].1.min(b[j].1);
        if start <= end {
            common.push((start, end));
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    common
}

/// Pieces of [`validity_range`] left once the gaps of every hop are removed.
///
/// Return
/// ----------
/// * The sorted pieces, or [`EphemerisError::NoPath`] /
///   [`EphemerisError::DisjointCoverage`] when nothing is left.
pub fn coverage_intervals(
    index: &SegmentIndex,
    tree: &BodyTree,
    body: BodyId,
    center: BodyId,
    kernel_range: (EphemerisTime, EphemerisTime),
) -> Result<Vec<(EphemerisTime, EphemerisTime)>> {
    let chain = hop_chain(index, tree, body, center)?;
    let mut pieces = vec![kernel_range];
    for (child, parent) in chain.hops() {
        pieces = intersect_intervals(&pieces, &index.coverage_intervals(child, parent)?);
    }
    if pieces.is_empty() {
        return Err(EphemerisError::DisjointCoverage { body, center });
    }
    Ok(pieces)
}
