//! NAIF body naming.
//!
//! Kernels identify bodies by integer codes following the NAIF convention
//! (0 = Solar System Barycenter, 1..=9 planetary barycenters, `N99` planet mass
//! centers, `Nxx` natural satellites). This module maps the common codes to
//! names and back; any other code is still a valid identifier, it just has no name.

use crate::constants::BodyId;
use crate::ephemeris_errors::{EphemerisError, Result};

/// Canonical name of each known body, in NAIF code order.
const BODY_NAMES: &[(BodyId, &str)] = &[
    (0, "Solar System Barycenter"),
    (1, "Mercury Barycenter"),
    (2, "Venus Barycenter"),
    (3, "Earth-Moon Barycenter"),
    (4, "Mars Barycenter"),
    (5, "Jupiter Barycenter"),
    (6, "Saturn Barycenter"),
    (7, "Uranus Barycenter"),
    (8, "Neptune Barycenter"),
    (9, "Pluto Barycenter"),
    (10, "Sun"),
    (199, "Mercury"),
    (299, "Venus"),
    (301, "Moon"),
    (399, "Earth"),
    (401, "Phobos"),
    (402, "Deimos"),
    (499, "Mars"),
    (501, "Io"),
    (502, "Europa"),
    (503, "Ganymede"),
    (504, "Callisto"),
    (599, "Jupiter"),
    (601, "Mimas"),
    (602, "Enceladus"),
    (603, "Tethys"),
    (604, "Dione"),
    (605, "Rhea"),
    (606, "Titan"),
    (608, "Iapetus"),
    (699, "Saturn"),
    (701, "Ariel"),
    (702, "Umbriel"),
    (703, "Titania"),
    (704, "Oberon"),
    (705, "Miranda"),
    (799, "Uranus"),
    (801, "Triton"),
    (899, "Neptune"),
    (901, "Charon"),
    (999, "Pluto"),
];

/// Extra spellings accepted by [`body_id`].
const BODY_ALIASES: &[(&str, BodyId)] = &[
    ("SSB", 0),
    ("Solar System Bary", 0),
    ("Mercury Bary", 1),
    ("Venus Bary", 2),
    ("EMB", 3),
    ("Earth Barycenter", 3),
    ("Earth Moon Barycenter", 3),
    ("Earth-Moon Bary", 3),
    ("Mars Bary", 4),
    ("Jupiter Bary", 5),
    ("Saturn Bary", 6),
    ("Uranus Bary", 7),
    ("Neptune Bary", 8),
    ("Pluto Bary", 9),
];

/// Canonical name of a body code, if it has one.
pub fn body_name(id: BodyId) -> Option<&'static str> {
    BODY_NAMES
        .binary_search_by_key(&id, |&(code, _)| code)
        .ok()
        .map(|i| BODY_NAMES[i].1)
}

/// Resolve a body name (case-insensitive) or a numeric string to its code.
///
/// Arguments
/// -----------------
/// * `name`: A canonical name such as `"Earth"`, an alias such as `"EMB"`, or a code such as `"399"`.
///
/// Return
/// ----------
/// * The body code, or [`EphemerisError::UnknownBodyName`].
pub fn body_id(name: &str) -> Result<BodyId> {
    let trimmed = name.trim();
    if let Ok(id) = trimmed.parse::<BodyId>() {
        return Ok(id);
    }

    BODY_NAMES
        .iter()
        .map(|&(id, n)| (n, id))
        .chain(BODY_ALIASES.iter().copied())
        .find(|(n, _)| n.eq_ignore_ascii_case(trimmed))
        .map(|(_, id)| id)
        .ok_or_else(|| EphemerisError::UnknownBodyName(name.to_string()))
}

/// Human readable label `"Name (code)"`, or the bare code for unnamed bodies.
pub fn body_label(id: BodyId) -> String {
    match body_name(id) {
        Some(name) => format!("{name} ({id})"),
        None => id.to_string(),
    }
}
