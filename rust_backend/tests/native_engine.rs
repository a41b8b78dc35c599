//! Scenarios against the linked Swiss Ephemeris library, through the
//! adapter, the session and the sandbox surface.

#![cfg(feature = "native")]

use approx::assert_abs_diff_eq;
use serde_json::json;
use sweph_bridge::session;
use sweph_bridge::{ClosePolicy, EngineKind, ErrorKind, NativeEngine, SandboxModule, Session};
use sweph_sys::{SEFLG_MOSEPH, SEFLG_SPEED};

const J2000: f64 = 2451545.0;
const SEFLG_MOSEPH_SPEED: i32 = SEFLG_MOSEPH | SEFLG_SPEED;

fn native_session() -> Session {
    Session::new(Box::new(NativeEngine::new()), None, ClosePolicy::Reinitialize)
}

// ==================== Positions ====================

#[test]
fn test_sun_at_j2000() {
    let mut session = native_session();
    let sun = session.calc_ut(J2000, 0, SEFLG_MOSEPH_SPEED).unwrap();
    assert_abs_diff_eq!(sun.position[0], 280.37, epsilon = 0.05);
    assert_abs_diff_eq!(sun.position[2], 0.983, epsilon = 0.001);
    assert_abs_diff_eq!(sun.position[3], 1.02, epsilon = 0.01);
    assert!(sun.flags >= 0);
}

#[test]
fn test_out_of_range_jd_is_an_engine_error() {
    let mut session = native_session();
    let err = session.calc_ut(1e300, 0, SEFLG_MOSEPH_SPEED).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Engine);
    assert!(!err.message().is_empty());
}

#[test]
fn test_names_and_version() {
    let mut session = native_session();
    assert_eq!(session.planet_name(0).unwrap(), "Sun");
    assert!(!session.version().unwrap().is_empty());
}

// ==================== Houses ====================

#[test]
fn test_placidus_houses_in_berlin() {
    let mut session = native_session();
    let result = session.houses(J2000, 52.0, 13.4, b'P').unwrap();
    assert_eq!(result.cusps.len(), 13);
    assert_eq!(result.ascmc.len(), 10);
    assert_abs_diff_eq!(result.cusps[1], result.ascmc[0], epsilon = 1e-9);
}

#[test]
fn test_gauquelin_sectors_keep_twelve_cusps() {
    let mut session = native_session();
    for hsys in [b'G', b'g'] {
        let result = session.houses(J2000, 52.0, 13.4, hsys).unwrap();
        assert_eq!(result.cusps.len(), 13);
        assert_eq!(result.ascmc.len(), 10);
        assert!(result.cusps[1..].iter().all(|c| (0.0..360.0).contains(c)));
    }
}

// ==================== Sandbox ====================

#[test]
fn test_sandbox_over_native_engine() {
    let module = SandboxModule::with_session(session::shared(native_session()));
    let houses = module
        .call("houses", &[json!(J2000), json!(52.0), json!(13.4), json!("G")])
        .unwrap();
    assert_eq!(houses[0].as_array().unwrap().len(), 13);

    let err = module.call("calc_ut", &[json!(1e300), json!(0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Engine);
}

// ==================== Lifecycle ====================

#[test]
fn test_close_is_idempotent() {
    let mut session = native_session();
    session.close();
    session.close();
    assert!(session.is_closed());
    assert!(session.calc_ut(J2000, 0, SEFLG_MOSEPH_SPEED).is_ok());
}

#[test]
fn test_native_is_the_default_engine() {
    assert_eq!(EngineKind::default(), EngineKind::Native);
    assert_eq!(Session::default().engine_name(), "native");
}
