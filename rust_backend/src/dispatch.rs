//! Shared call path for both hosts:
//! resolve → lock session → engine → [`Outcome`].

use crate::error::BridgeResult;
use crate::marshal::Outcome;
use crate::resolver::{resolve, Call, HostValue, Operation};
use crate::session::{Session, SharedSession};
use crate::types::CalendarSystem;

/// Run an already resolved call against `session`.
pub fn execute(session: &mut Session, call: Call) -> BridgeResult<Outcome> {
    Ok(match call {
        Call::SetEphePath { path } => {
            session.set_ephe_path(path.as_deref());
            Outcome::Unit
        }
        Call::Julday {
            year,
            month,
            day,
            hour,
            gregflag,
        } => Outcome::Real(session.julday(
            year,
            month,
            day,
            hour,
            CalendarSystem::from_flag(gregflag),
        )?),
        Call::Revjul { jd, gregflag } => {
            Outcome::Date(session.revjul(jd, CalendarSystem::from_flag(gregflag))?)
        }
        Call::CalcUt { tjd_ut, ipl, iflag } => {
            Outcome::Position(session.calc_ut(tjd_ut, ipl, iflag)?)
        }
        Call::GetPlanetName { ipl } => Outcome::Text(session.planet_name(ipl)?),
        Call::LunEclipseWhen {
            tjd_start,
            ifl,
            ifltype,
            backward,
        } => Outcome::Eclipse(session.lun_eclipse_when(tjd_start, ifl, ifltype, backward != 0)?),
        Call::SolEclipseWhenGlob {
            tjd_start,
            ifl,
            ifltype,
            backward,
        } => Outcome::Eclipse(session.sol_eclipse_when_glob(
            tjd_start,
            ifl,
            ifltype,
            backward != 0,
        )?),
        Call::Houses {
            tjd_ut,
            geolat,
            geolon,
            hsys,
        } => Outcome::Houses(session.houses(tjd_ut, geolat, geolon, hsys)?),
        Call::Close => {
            session.close();
            Outcome::Unit
        }
        Call::Version => Outcome::Text(session.version()?),
    })
}

/// Resolve host arguments and run the operation under the session lock.
///
/// Validation happens before the lock is taken; the engine is never
/// invoked for a call that fails to resolve.
pub fn invoke<V: HostValue>(
    session: &SharedSession,
    op: Operation,
    args: &[V],
) -> BridgeResult<Outcome> {
    let call = resolve(op, args)?;
    run(session, call)
}

/// Take the session lock and execute `call`.
pub fn run(session: &SharedSession, call: Call) -> BridgeResult<Outcome> {
    log::debug!("dispatching {} {:?}", call.operation(), call);
    let mut guard = session.lock();
    execute(&mut guard, call)
}

#[cfg(all(test, feature = "builtin"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resolver::Primitive::{self, Int, Real, Text};
    use crate::session::{shared, ClosePolicy};

    fn fresh() -> SharedSession {
        shared(Session::builtin())
    }

    #[test]
    fn test_julday_revjul_through_dispatch() {
        let session = fresh();
        let jd = invoke(
            &session,
            Operation::Julday,
            &[Int(2000), Int(1), Int(1), Real(12.0)],
        )
        .unwrap();
        assert_eq!(jd, Outcome::Real(2451545.0));

        let date = invoke(&session, Operation::Revjul, &[Real(2451545.0)]).unwrap();
        assert_eq!(
            date,
            Outcome::Date(crate::types::CalendarDate::new(2000, 1, 1, 12.0))
        );
    }

    #[test]
    fn test_validation_precedes_engine() {
        let session = fresh();
        session.lock().set_policy(ClosePolicy::Reject);
        session.lock().close();
        // a closed, rejecting session still reports the argument problem first
        let err = invoke::<Primitive>(&session, Operation::CalcUt, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = invoke(&session, Operation::CalcUt, &[Real(2451545.0), Int(0)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn test_set_path_and_close() {
        let session = fresh();
        let out = invoke(&session, Operation::SetEphePath, &[Text("/data".into())]).unwrap();
        assert_eq!(out, Outcome::Unit);
        assert_eq!(session.lock().ephe_path(), Some("/data"));
        invoke::<Primitive>(&session, Operation::Close, &[]).unwrap();
        invoke::<Primitive>(&session, Operation::Close, &[]).unwrap();
        assert!(session.lock().is_closed());
        assert_eq!(session.lock().ephe_path(), None);
    }

    #[test]
    fn test_engine_errors_surface() {
        let session = fresh();
        let err = invoke(&session, Operation::CalcUt, &[Real(2451545.0), Int(15)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert!(!err.message().is_empty());
    }
}
