mod common;

use approx::assert_relative_eq;
use camino::Utf8PathBuf;
use ephemeris::{
    CalendarTime, Ephemeris, EphemerisError, Kernel, KernelFormat, KernelSource,
};

use common::{
    planetary_kernel, relative_error, scenario_kernel, EARTH_AROUND_EMB, EMB_AROUND_SSB,
    HALF_SPAN, JUPITER_AROUND_SSB, MOON_AROUND_EMB,
};

#[test]
fn test_scenario_segment() {
    let ephem = Ephemeris::from_bytes(&scenario_kernel()).unwrap();
    let state = ephem.state_et(3, 0, 5.0).unwrap();

    assert_eq!(state.position.x, 0.0);
    assert_eq!(state.position.y, 0.0);
    assert_eq!(state.position.z, 0.0);
    assert_relative_eq!(state.velocity.x, 0.2, epsilon = 1e-15);

    let segment = ephem.index().resolve(3, 0, 5.0).unwrap();
    assert_eq!(segment.degree, 2);
    assert_eq!(segment.sub_intervals, 1);
}

#[test]
fn test_load_from_path() {
    let path = Utf8PathBuf::from_path_buf(std::env::temp_dir().join(format!(
        "ephemeris-native-{}.bin",
        std::process::id()
    )))
    .unwrap();
    common::planetary_writer().write_to_path(&path).unwrap();

    let from_path = Ephemeris::load(KernelSource::Path(path.clone())).unwrap();
    let from_bytes = Ephemeris::load(planetary_kernel()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(from_path.format(), KernelFormat::Native { version: 1 });
    assert_eq!(from_path.pairs(), from_bytes.pairs());
    assert_eq!(
        from_path.state_et(301, 0, 1234.5).unwrap(),
        from_bytes.state_et(301, 0, 1234.5).unwrap()
    );
}

#[test]
fn test_matches_fitted_orbits() {
    let ephem = Ephemeris::from_bytes(&planetary_kernel()).unwrap();

    for i in 0..=64 {
        let t = -HALF_SPAN + i as f64 * HALF_SPAN / 32.0;

        let emb = ephem.state_et(3, 0, t).unwrap();
        assert!(relative_error(&emb.position, &EMB_AROUND_SSB.position(t)) < 1e-12);
        assert!(relative_error(&emb.velocity, &EMB_AROUND_SSB.velocity(t)) < 1e-9);

        let moon = ephem.state_et(301, 3, t).unwrap();
        assert!(relative_error(&moon.position, &MOON_AROUND_EMB.position(t)) < 1e-12);
        assert!(relative_error(&moon.velocity, &MOON_AROUND_EMB.velocity(t)) < 1e-9);

        let jupiter = ephem.state_et(5, 0, t).unwrap();
        assert!(relative_error(&jupiter.position, &JUPITER_AROUND_SSB.position(t)) < 1e-12);
    }
}

#[test]
fn test_evaluation_is_bit_identical() {
    let ephem = Ephemeris::from_bytes(&planetary_kernel()).unwrap();
    let other = Ephemeris::from_bytes(&planetary_kernel()).unwrap();

    for t in [-HALF_SPAN, -1.0e6, -0.5, 0.0, 3.3e5, HALF_SPAN] {
        let a = ephem.state_et(399, 0, t).unwrap();
        let b = ephem.state_et(399, 0, t).unwrap();
        let c = other.state_et(399, 0, t).unwrap();
        for axis in 0..3 {
            assert_eq!(a.position[axis].to_bits(), b.position[axis].to_bits());
            assert_eq!(a.velocity[axis].to_bits(), c.velocity[axis].to_bits());
        }
    }
}

#[test]
fn test_continuity_across_sub_intervals() {
    let ephem = Ephemeris::from_bytes(&planetary_kernel()).unwrap();
    let segment = ephem.index().resolve(399, 3, 0.0).unwrap().clone();

    for k in 1..segment.sub_intervals {
        let (boundary, _) = segment.sub_interval_bounds(k);
        let before = boundary - 1.0e-6;
        assert_eq!(segment.sub_interval_index(before).unwrap(), k - 1);
        assert_eq!(segment.sub_interval_index(boundary).unwrap(), k);

        let left = ephem.state_et(399, 3, before).unwrap();
        let right = ephem.state_et(399, 3, boundary).unwrap();
        assert!(relative_error(&left.position, &right.position) < 1e-10);
        assert!(relative_error(&left.velocity, &right.velocity) < 1e-9);
    }
}

#[test]
fn test_consecutive_segments_of_one_pair() {
    let ephem = Ephemeris::from_bytes(&planetary_kernel()).unwrap();

    // t = 0 belongs to the later segment
    let at_boundary = ephem.index().resolve(5, 0, 0.0).unwrap();
    assert_eq!(at_boundary.start, 0.0);

    let left = ephem.state_et(5, 0, -1.0e-6).unwrap();
    let right = ephem.state_et(5, 0, 0.0).unwrap();
    assert!(relative_error(&left.position, &right.position) < 1e-10);
    assert!(relative_error(&left.velocity, &right.velocity) < 1e-9);
    assert_eq!(ephem.validity_range_et(5, 0).unwrap(), (-HALF_SPAN, HALF_SPAN));
}

#[test]
fn test_global_end_is_inclusive() {
    let ephem = Ephemeris::from_bytes(&planetary_kernel()).unwrap();

    let at_end = ephem.state_et(399, 3, HALF_SPAN).unwrap();
    assert!(relative_error(&at_end.position, &EARTH_AROUND_EMB.position(HALF_SPAN)) < 1e-12);
    assert!(ephem.state_et(399, 3, -HALF_SPAN).is_ok());

    assert_eq!(
        ephem.state_et(399, 3, HALF_SPAN + 1.0).unwrap_err(),
        EphemerisError::TimeOutOfRange {
            body: 399,
            center: 3,
            t: HALF_SPAN + 1.0,
            start: -HALF_SPAN,
            end: HALF_SPAN,
        }
    );
    assert!(matches!(
        ephem.state_et(399, 3, -HALF_SPAN - 1.0),
        Err(EphemerisError::TimeOutOfRange { .. })
    ));
}

#[test]
fn test_calendar_queries() {
    let ephem = Ephemeris::from_bytes(&planetary_kernel()).unwrap();

    let noon = CalendarTime::new(2000, 1, 1, 12, 0, 0.0).unwrap();
    assert_eq!(
        ephem.state(3, 0, &noon).unwrap(),
        ephem.state_et(3, 0, 0.0).unwrap()
    );

    let (start, end) = ephem.validity_range(3, 0).unwrap();
    assert_eq!(start.to_string(), "1999-10-29T12:00:00.000");
    assert_eq!(end.to_string(), "2000-03-05T12:00:00.000");
    assert!(ephem.state(3, 0, &end).is_ok());

    let invalid = CalendarTime {
        month: 13,
        ..noon
    };
    assert!(matches!(
        ephem.state(3, 0, &invalid),
        Err(EphemerisError::TimeDomain(_))
    ));
}

#[test]
fn test_kernel_metadata() {
    let kernel = Kernel::from_bytes(&planetary_kernel()).unwrap();
    assert_eq!(kernel.validity_range(), (-HALF_SPAN, HALF_SPAN));
    assert_eq!(kernel.segments().len(), 6);
    assert_eq!(kernel.comment(), None);

    let table = kernel.to_string();
    assert!(table.contains("EPHKERNL v1"));
    assert!(table.contains("| segments | 6"));
}
