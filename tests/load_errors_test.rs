mod common;

use ephemeris::kernel::writer::{KernelWriter, SegmentData};
use ephemeris::{Ephemeris, EphemerisError, Kernel, KernelSource};

use common::{planetary_kernel, scenario_kernel};

/// Constant position over `range`.
fn fixed(body: i32, center: i32, range: (f64, f64), x: f64) -> SegmentData {
    SegmentData::new(body, center, range, 0, 1, vec![x, 0.0, 0.0])
}

fn put_f64(bytes: &mut [u8], offset: usize, value: f64) {
    bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn test_unknown_format() {
    let inputs: [&[u8]; 4] = [b"", b"NOTAKERNEL", b"EPHKERN", b"DAF/PCK 0000"];
    for bytes in inputs {
        assert!(matches!(
            Ephemeris::from_bytes(bytes),
            Err(EphemerisError::Format(_))
        ));
    }
}

#[test]
fn test_unsupported_version() {
    let mut bytes = scenario_kernel();
    bytes[8..12].copy_from_slice(&2u32.to_le_bytes());
    assert_eq!(
        Kernel::from_bytes(&bytes).unwrap_err(),
        EphemerisError::Format("unsupported EPHKERNL version 2".to_string())
    );
}

#[test]
fn test_truncated_kernels() {
    let bytes = scenario_kernel();
    assert_eq!(bytes.len(), 40 + 48 + 9 * 8);

    // inside the header
    assert!(matches!(
        Kernel::from_bytes(&bytes[..20]),
        Err(EphemerisError::Truncated { .. })
    ));
    // inside the directory
    assert!(matches!(
        Kernel::from_bytes(&bytes[..60]),
        Err(EphemerisError::Truncated { .. })
    ));
    // last coefficient missing
    assert_eq!(
        Kernel::from_bytes(&bytes[..bytes.len() - 8]).unwrap_err(),
        EphemerisError::Truncated {
            what: "segment 0 coefficients".to_string(),
            start: 88,
            end: 160,
            available: 152,
        }
    );

    let planetary = planetary_kernel();
    assert!(matches!(
        Ephemeris::load(KernelSource::Bytes(planetary[..planetary.len() / 2].to_vec())),
        Err(EphemerisError::Truncated { .. })
    ));
}

#[test]
fn test_coefficient_count_mismatch() {
    let mut bytes = scenario_kernel();
    // data_len of the first directory record
    bytes[80..88].copy_from_slice(&8u64.to_le_bytes());
    assert!(matches!(
        Kernel::from_bytes(&bytes),
        Err(EphemerisError::Corrupt(_))
    ));
}

#[test]
fn test_inverted_intervals() {
    let mut segment = scenario_kernel();
    put_f64(&mut segment, 48, 20.0);
    assert!(matches!(
        Kernel::from_bytes(&segment),
        Err(EphemerisError::Corrupt(_))
    ));

    let mut header = scenario_kernel();
    put_f64(&mut header, 24, -5.0);
    assert!(matches!(
        Kernel::from_bytes(&header),
        Err(EphemerisError::Corrupt(_))
    ));
}

#[test]
fn test_segment_outside_kernel_range() {
    let mut bytes = scenario_kernel();
    // header range shrunk to [0, 5] while the segment spans [0, 10]
    put_f64(&mut bytes, 24, 5.0);
    assert!(matches!(
        Kernel::from_bytes(&bytes),
        Err(EphemerisError::Corrupt(_))
    ));
}

#[test]
fn test_overlapping_segments() {
    let bytes = KernelWriter::new()
        .with_segment(fixed(3, 0, (0.0, 10.0), 1.0))
        .with_segment(fixed(3, 0, (5.0, 15.0), 2.0))
        .write_to_vec()
        .unwrap();

    // every segment is well formed on its own
    assert_eq!(Kernel::from_bytes(&bytes).unwrap().segments().len(), 2);
    assert!(matches!(
        Ephemeris::from_bytes(&bytes),
        Err(EphemerisError::Corrupt(_))
    ));

    // touching segments are fine
    let bytes = KernelWriter::new()
        .with_segment(fixed(3, 0, (0.0, 10.0), 1.0))
        .with_segment(fixed(3, 0, (10.0, 15.0), 2.0))
        .write_to_vec()
        .unwrap();
    let ephem = Ephemeris::from_bytes(&bytes).unwrap();
    assert_eq!(ephem.state_et(3, 0, 10.0).unwrap().position.x, 2.0);
    assert_eq!(ephem.state_et(3, 0, 9.5).unwrap().position.x, 1.0);
}

#[test]
fn test_cycle_in_body_tree() {
    let bytes = KernelWriter::new()
        .with_segment(fixed(3, 0, (0.0, 10.0), 1.0))
        .with_segment(fixed(399, 3, (0.0, 10.0), 2.0))
        .with_segment(fixed(0, 399, (0.0, 10.0), 3.0))
        .write_to_vec()
        .unwrap();
    assert!(matches!(
        Ephemeris::from_bytes(&bytes),
        Err(EphemerisError::Corrupt(_))
    ));
}

#[test]
fn test_segment_relative_to_itself() {
    let bytes = KernelWriter::new()
        .with_segment(fixed(3, 3, (0.0, 10.0), 1.0))
        .write_to_vec()
        .unwrap();
    assert_eq!(
        Ephemeris::from_bytes(&bytes).unwrap_err(),
        EphemerisError::Corrupt("segment of body 3 is relative to itself".to_string())
    );
}

#[test]
fn test_missing_file() {
    let result = Ephemeris::open("/nonexistent/ephemeris/kernel.bin");
    assert!(matches!(result, Err(EphemerisError::Io(_))));
}
