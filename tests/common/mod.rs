#![allow(dead_code)]

use std::f64::consts::PI;

use ephemeris::constants::{DAF_RECORD_SIZE, SECONDS_PER_DAY};
use ephemeris::kernel::daf_header::DafHeader;
use ephemeris::kernel::directory::Type2Directory;
use ephemeris::kernel::summary_record::{SpkSummary, SummaryControl};
use ephemeris::kernel::writer::{KernelWriter, SegmentData};
use nalgebra::Vector3;

/// Half-width of the synthetic kernels: 64 days around J2000.
pub const HALF_SPAN: f64 = 64.0 * SECONDS_PER_DAY;

/// Circular orbit in the xy plane.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub radius: f64,
    pub period_days: f64,
    pub phase: f64,
}

impl Orbit {
    fn angular_rate(&self) -> f64 {
        2.0 * PI / (self.period_days * SECONDS_PER_DAY)
    }

    pub fn position(&self, t: f64) -> Vector3<f64> {
        let angle = self.angular_rate() * t + self.phase;
        Vector3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin(),
            0.0,
        )
    }

    pub fn velocity(&self, t: f64) -> Vector3<f64> {
        let rate = self.angular_rate();
        let angle = rate * t + self.phase;
        Vector3::new(
            -self.radius * rate * angle.sin(),
            self.radius * rate * angle.cos(),
            0.0,
        )
    }
}

pub const EMB_AROUND_SSB: Orbit = Orbit {
    radius: 1.496e8,
    period_days: 365.25,
    phase: 1.75,
};

pub const EARTH_AROUND_EMB: Orbit = Orbit {
    radius: 4_671.0,
    period_days: 27.321_661,
    phase: PI + 0.3,
};

pub const MOON_AROUND_EMB: Orbit = Orbit {
    radius: 379_700.0,
    period_days: 27.321_661,
    phase: 0.3,
};

pub const SUN_AROUND_SSB: Orbit = Orbit {
    radius: 7.0e5,
    period_days: 4_332.59,
    phase: -0.4,
};

pub const JUPITER_AROUND_SSB: Orbit = Orbit {
    radius: 7.785e8,
    period_days: 4_332.59,
    phase: 2.2,
};

/// Chebyshev interpolation of `f` on `[lo, hi]` at `degree + 1` Chebyshev nodes.
pub fn chebyshev_fit(f: impl Fn(f64) -> f64, lo: f64, hi: f64, degree: usize) -> Vec<f64> {
    let n = degree + 1;
    let mid = 0.5 * (lo + hi);
    let half = 0.5 * (hi - lo);
    let samples: Vec<(f64, f64)> = (0..n)
        .map(|k| {
            let theta = PI * (k as f64 + 0.5) / n as f64;
            (theta, f(mid + half * theta.cos()))
        })
        .collect();

    (0..n)
        .map(|j| {
            let sum: f64 = samples
                .iter()
                .map(|(theta, value)| value * (j as f64 * theta).cos())
                .sum();
            let c = 2.0 * sum / n as f64;
            if j == 0 {
                0.5 * c
            } else {
                c
            }
        })
        .collect()
}

/// Per sub-interval X, Y, Z coefficient blocks fitted to `orbit`.
pub fn orbit_coefficients(
    orbit: Orbit,
    (start, end): (f64, f64),
    sub_intervals: usize,
    degree: usize,
) -> Vec<f64> {
    let step = (end - start) / sub_intervals as f64;
    (0..sub_intervals)
        .flat_map(|k| {
            let lo = start + k as f64 * step;
            let hi = lo + step;
            (0..3).flat_map(move |axis| {
                chebyshev_fit(|t| orbit.position(t)[axis], lo, hi, degree)
            })
        })
        .collect()
}

pub fn orbit_segment(
    body: i32,
    center: i32,
    orbit: Orbit,
    range: (f64, f64),
    sub_intervals: u16,
    degree: u16,
) -> SegmentData {
    SegmentData::new(
        body,
        center,
        range,
        degree,
        sub_intervals,
        orbit_coefficients(orbit, range, sub_intervals as usize, degree as usize),
    )
}

/// Native kernel with the Earth-Moon system, the Sun and Jupiter over `[-HALF_SPAN, HALF_SPAN]`.
///
/// * 3 -> 0, 399 -> 3, 301 -> 3, 10 -> 0 in one segment each,
/// * 5 -> 0 in two consecutive segments meeting at t = 0.
pub fn planetary_writer() -> KernelWriter {
    let full = (-HALF_SPAN, HALF_SPAN);
    KernelWriter::new()
        .with_segment(orbit_segment(3, 0, EMB_AROUND_SSB, full, 8, 12))
        .with_segment(orbit_segment(399, 3, EARTH_AROUND_EMB, full, 32, 12))
        .with_segment(orbit_segment(301, 3, MOON_AROUND_EMB, full, 32, 12))
        .with_segment(orbit_segment(10, 0, SUN_AROUND_SSB, full, 2, 10))
        .with_segment(orbit_segment(5, 0, JUPITER_AROUND_SSB, (-HALF_SPAN, 0.0), 2, 8))
        .with_segment(orbit_segment(5, 0, JUPITER_AROUND_SSB, (0.0, HALF_SPAN), 2, 8))
}

pub fn planetary_kernel() -> Vec<u8> {
    planetary_writer()
        .write_to_vec()
        .expect("the planetary kernel is valid")
}

/// Native kernel from the scenario: body 3 around 0 on [0, 10], degree 2,
/// one sub-interval, x coefficients [0, 1, 0].
pub fn scenario_kernel() -> Vec<u8> {
    KernelWriter::new()
        .with_segment(SegmentData::new(
            3,
            0,
            (0.0, 10.0),
            2,
            1,
            vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        ))
        .write_to_vec()
        .expect("the scenario kernel is valid")
}

/// One SPK type 2 segment to assemble.
pub struct SpkSegment {
    pub body: i32,
    pub center: i32,
    pub orbit: Orbit,
    pub range: (f64, f64),
    pub records: usize,
    pub degree: usize,
    pub data_type: i32,
}

/// Assemble a little-endian DAF/SPK file: file record, optional comment
/// record, one summary record, one name record, then the segment data.
pub fn spk_kernel(segments: &[SpkSegment], comment: Option<&str>) -> Vec<u8> {
    let comment_records = usize::from(comment.is_some());
    let summary_record = 2 + comment_records;
    let data_start_word = (summary_record + 1) * DAF_RECORD_SIZE / 8 + 1;

    let mut data = Vec::new();
    let mut summaries = Vec::new();
    for segment in segments {
        let initial_addr = data_start_word + data.len() / 8;
        let step = (segment.range.1 - segment.range.0) / segment.records as f64;
        for k in 0..segment.records {
            let lo = segment.range.0 + k as f64 * step;
            let hi = lo + step;
            data.extend_from_slice(&(0.5 * (lo + hi)).to_le_bytes());
            data.extend_from_slice(&(0.5 * step).to_le_bytes());
            for axis in 0..3 {
                for c in chebyshev_fit(|t| segment.orbit.position(t)[axis], lo, hi, segment.degree) {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
        }
        Type2Directory {
            init: segment.range.0,
            intlen: step,
            rsize: 2 + 3 * (segment.degree + 1),
            n_records: segment.records,
        }
        .encode(&mut data);
        let final_addr = data_start_word + data.len() / 8 - 1;

        summaries.push(SpkSummary {
            start: segment.range.0,
            end: segment.range.1,
            target: segment.body,
            center: segment.center,
            frame: 1,
            data_type: segment.data_type,
            initial_addr: initial_addr as i32,
            final_addr: final_addr as i32,
        });
    }

    let mut bytes = DafHeader {
        idword: "DAF/SPK".to_string(),
        internal_name: "SYNTHETIC SPK".to_string(),
        nd: 2,
        ni: 6,
        fward: summary_record as i32,
        bward: summary_record as i32,
        free: (data_start_word + data.len() / 8) as i32,
        locfmt: "LTL-IEEE".to_string(),
    }
    .encode();

    if let Some(text) = comment {
        let mut record = text.replace('\n', "\0").into_bytes();
        record.push(0x04);
        record.resize(DAF_RECORD_SIZE, 0);
        bytes.extend(record);
    }

    let mut record = Vec::new();
    SummaryControl {
        next: 0,
        prev: 0,
        nsum: summaries.len(),
    }
    .encode(&mut record);
    for summary in &summaries {
        summary.encode(&mut record);
    }
    record.resize(DAF_RECORD_SIZE, 0);
    bytes.extend(record);

    bytes.extend(vec![b' '; DAF_RECORD_SIZE]);
    bytes.extend(data);
    bytes
}

/// SPK counterpart of the Earth-Moon part of [`planetary_writer`].
pub fn earth_moon_spk() -> Vec<u8> {
    let full = (-HALF_SPAN, HALF_SPAN);
    spk_kernel(
        &[
            SpkSegment {
                body: 3,
                center: 0,
                orbit: EMB_AROUND_SSB,
                range: full,
                records: 8,
                degree: 12,
                data_type: 2,
            },
            SpkSegment {
                body: 399,
                center: 3,
                orbit: EARTH_AROUND_EMB,
                range: full,
                records: 32,
                degree: 12,
                data_type: 2,
            },
            SpkSegment {
                body: 301,
                center: 3,
                orbit: MOON_AROUND_EMB,
                range: full,
                records: 32,
                degree: 12,
                data_type: 2,
            },
        ],
        Some("Synthetic Earth-Moon kernel\nfor integration tests"),
    )
}

/// Relative distance between two vectors, against the norm of `expected`.
pub fn relative_error(actual: &Vector3<f64>, expected: &Vector3<f64>) -> f64 {
    (actual - expected).norm() / expected.norm()
}
