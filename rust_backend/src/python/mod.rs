//! Python extension front end.
//!
//! Every operation is exposed as a variadic function so that arity and type
//! checks happen in the shared resolver rather than in PyO3's argument
//! extraction. Both hosts therefore report the same messages:
//!
//! ```python
//! import sweph_bridge as swe
//! xx, retflag = swe.calc_ut(2451545.0, swe.SE_SUN)
//! cusps, ascmc = swe.houses(2451545.0, 52.0, 13.4, "P")
//! ```
//!
//! Failures raise [`ValidationError`] (a `TypeError`) or [`EngineError`]
//! (a `RuntimeError`).

use pyo3::create_exception;
use pyo3::exceptions::{PyRuntimeError, PyTypeError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyInt, PyList, PyString, PyTuple};

use crate::dispatch;
use crate::error::{BridgeError, ErrorKind};
use crate::marshal::HostMarshal;
use crate::resolver::{resolve, HostValue, Operation, Primitive};
use crate::session;

create_exception!(sweph_bridge, ValidationError, PyTypeError);
create_exception!(sweph_bridge, EngineError, PyRuntimeError);

impl From<BridgeError> for PyErr {
    fn from(err: BridgeError) -> PyErr {
        match err.kind() {
            ErrorKind::Validation => ValidationError::new_err(err.message().to_string()),
            ErrorKind::Engine => EngineError::new_err(err.message().to_string()),
        }
    }
}

impl HostValue for Bound<'_, PyAny> {
    fn primitive(&self) -> Primitive {
        // bool is a subclass of int and must be checked first
        if self.is_none() {
            Primitive::Absent
        } else if self.is_instance_of::<PyBool>() {
            self.extract::<bool>()
                .map(Primitive::Bool)
                .unwrap_or(Primitive::Other)
        } else if self.is_instance_of::<PyInt>() {
            // ints beyond i64 degrade to reals, as JSON numbers do
            match self.extract::<i64>() {
                Ok(i) => Primitive::Int(i),
                Err(_) => self
                    .extract::<f64>()
                    .map(Primitive::Real)
                    .unwrap_or(Primitive::Other),
            }
        } else if self.is_instance_of::<PyFloat>() {
            self.extract::<f64>()
                .map(Primitive::Real)
                .unwrap_or(Primitive::Other)
        } else if self.is_instance_of::<PyString>() {
            self.extract::<String>()
                .map(Primitive::Text)
                .unwrap_or(Primitive::Other)
        } else {
            Primitive::Other
        }
    }
}

/// Buffers become `list`, composites become `tuple`.
pub struct PyMarshal<'py> {
    py: Python<'py>,
}

impl<'py> PyMarshal<'py> {
    pub fn new(py: Python<'py>) -> Self {
        Self { py }
    }
}

impl<'py> HostMarshal for PyMarshal<'py> {
    type Value = Bound<'py, PyAny>;
    type Error = PyErr;

    fn unit(&self) -> PyResult<Self::Value> {
        Ok(self.py.None().into_bound(self.py))
    }

    fn int(&self, value: i32) -> PyResult<Self::Value> {
        Ok(value.into_pyobject(self.py)?.into_any())
    }

    fn real(&self, value: f64) -> PyResult<Self::Value> {
        Ok(value.into_pyobject(self.py)?.into_any())
    }

    fn text(&self, value: &str) -> PyResult<Self::Value> {
        Ok(PyString::new(self.py, value).into_any())
    }

    fn buffer(&self, values: &[f64]) -> PyResult<Self::Value> {
        Ok(PyList::new(self.py, values)?.into_any())
    }

    fn composite(&self, items: Vec<Self::Value>) -> PyResult<Self::Value> {
        Ok(PyTuple::new(self.py, items)?.into_any())
    }
}

/// Resolve with the interpreter attached, then run the engine detached so
/// other Python threads keep going while the session lock is held.
fn call_operation(
    py: Python<'_>,
    op: Operation,
    args: &Bound<'_, PyTuple>,
) -> PyResult<Py<PyAny>> {
    let values: Vec<Bound<'_, PyAny>> = args.iter().collect();
    let call = resolve(op, &values)?;
    let outcome = py.detach(move || dispatch::run(&session::global(), call))?;
    Ok(outcome.render(&PyMarshal::new(py))?.unbind())
}

macro_rules! operation_function {
    ($name:ident, $op:expr, $doc:literal) => {
        #[doc = $doc]
        #[pyfunction]
        #[pyo3(signature = (*args))]
        fn $name(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
            call_operation(py, $op, args)
        }
    };
}

operation_function!(
    set_ephe_path,
    Operation::SetEphePath,
    "set_ephe_path(path=None) -> None"
);
operation_function!(
    julday,
    Operation::Julday,
    "julday(year, month, day, hour, gregflag=SE_GREG_CAL) -> float"
);
operation_function!(
    revjul,
    Operation::Revjul,
    "revjul(jd, gregflag=SE_GREG_CAL) -> (year, month, day, hour)"
);
operation_function!(
    calc_ut,
    Operation::CalcUt,
    "calc_ut(tjd_ut, ipl, iflag=SEFLG_SWIEPH|SEFLG_SPEED) -> ([6], retflag)"
);
operation_function!(
    get_planet_name,
    Operation::GetPlanetName,
    "get_planet_name(ipl) -> str"
);
operation_function!(
    lun_eclipse_when,
    Operation::LunEclipseWhen,
    "lun_eclipse_when(tjd_start, ifl=SEFLG_SWIEPH, ifltype=0, backward=0) -> (type, [10])"
);
operation_function!(
    sol_eclipse_when_glob,
    Operation::SolEclipseWhenGlob,
    "sol_eclipse_when_glob(tjd_start, ifl=SEFLG_SWIEPH, ifltype=0, backward=0) -> (type, [10])"
);
operation_function!(
    houses,
    Operation::Houses,
    "houses(tjd_ut, geolat, geolon, hsys='P') -> ([13], [10])"
);
operation_function!(close, Operation::Close, "close() -> None");
operation_function!(version, Operation::Version, "version() -> str");

const INT_CONSTANTS: &[(&str, i32)] = &[
    ("OK", sweph_sys::OK),
    ("ERR", sweph_sys::ERR),
    ("SE_JUL_CAL", sweph_sys::SE_JUL_CAL),
    ("SE_GREG_CAL", sweph_sys::SE_GREG_CAL),
    ("SE_ECL_NUT", sweph_sys::SE_ECL_NUT),
    ("SE_SUN", sweph_sys::SE_SUN),
    ("SE_MOON", sweph_sys::SE_MOON),
    ("SE_MERCURY", sweph_sys::SE_MERCURY),
    ("SE_VENUS", sweph_sys::SE_VENUS),
    ("SE_MARS", sweph_sys::SE_MARS),
    ("SE_JUPITER", sweph_sys::SE_JUPITER),
    ("SE_SATURN", sweph_sys::SE_SATURN),
    ("SE_URANUS", sweph_sys::SE_URANUS),
    ("SE_NEPTUNE", sweph_sys::SE_NEPTUNE),
    ("SE_PLUTO", sweph_sys::SE_PLUTO),
    ("SE_MEAN_NODE", sweph_sys::SE_MEAN_NODE),
    ("SE_TRUE_NODE", sweph_sys::SE_TRUE_NODE),
    ("SE_MEAN_APOG", sweph_sys::SE_MEAN_APOG),
    ("SE_OSCU_APOG", sweph_sys::SE_OSCU_APOG),
    ("SE_EARTH", sweph_sys::SE_EARTH),
    ("SE_CHIRON", sweph_sys::SE_CHIRON),
    ("SE_PHOLUS", sweph_sys::SE_PHOLUS),
    ("SE_CERES", sweph_sys::SE_CERES),
    ("SE_PALLAS", sweph_sys::SE_PALLAS),
    ("SE_JUNO", sweph_sys::SE_JUNO),
    ("SE_VESTA", sweph_sys::SE_VESTA),
    ("SE_NPLANETS", sweph_sys::SE_NPLANETS),
    ("SE_AST_OFFSET", sweph_sys::SE_AST_OFFSET),
    ("SEFLG_JPLEPH", sweph_sys::SEFLG_JPLEPH),
    ("SEFLG_SWIEPH", sweph_sys::SEFLG_SWIEPH),
    ("SEFLG_MOSEPH", sweph_sys::SEFLG_MOSEPH),
    ("SEFLG_HELCTR", sweph_sys::SEFLG_HELCTR),
    ("SEFLG_TRUEPOS", sweph_sys::SEFLG_TRUEPOS),
    ("SEFLG_J2000", sweph_sys::SEFLG_J2000),
    ("SEFLG_NONUT", sweph_sys::SEFLG_NONUT),
    ("SEFLG_SPEED", sweph_sys::SEFLG_SPEED),
    ("SEFLG_NOGDEFL", sweph_sys::SEFLG_NOGDEFL),
    ("SEFLG_NOABERR", sweph_sys::SEFLG_NOABERR),
    ("SEFLG_EQUATORIAL", sweph_sys::SEFLG_EQUATORIAL),
    ("SEFLG_XYZ", sweph_sys::SEFLG_XYZ),
    ("SEFLG_RADIANS", sweph_sys::SEFLG_RADIANS),
    ("SEFLG_BARYCTR", sweph_sys::SEFLG_BARYCTR),
    ("SEFLG_TOPOCTR", sweph_sys::SEFLG_TOPOCTR),
    ("SEFLG_SIDEREAL", sweph_sys::SEFLG_SIDEREAL),
    ("SE_ECL_CENTRAL", sweph_sys::SE_ECL_CENTRAL),
    ("SE_ECL_NONCENTRAL", sweph_sys::SE_ECL_NONCENTRAL),
    ("SE_ECL_TOTAL", sweph_sys::SE_ECL_TOTAL),
    ("SE_ECL_ANNULAR", sweph_sys::SE_ECL_ANNULAR),
    ("SE_ECL_PARTIAL", sweph_sys::SE_ECL_PARTIAL),
    ("SE_ECL_ANNULAR_TOTAL", sweph_sys::SE_ECL_ANNULAR_TOTAL),
    ("SE_ECL_PENUMBRAL", sweph_sys::SE_ECL_PENUMBRAL),
    ("SE_ECL_ALLTYPES_SOLAR", sweph_sys::SE_ECL_ALLTYPES_SOLAR),
    ("SE_ECL_ALLTYPES_LUNAR", sweph_sys::SE_ECL_ALLTYPES_LUNAR),
];

const INDEX_CONSTANTS: &[(&str, usize)] = &[
    ("SE_ASC", sweph_sys::SE_ASC),
    ("SE_MC", sweph_sys::SE_MC),
    ("SE_ARMC", sweph_sys::SE_ARMC),
    ("SE_VERTEX", sweph_sys::SE_VERTEX),
    ("SE_EQUASC", sweph_sys::SE_EQUASC),
    ("SE_COASC1", sweph_sys::SE_COASC1),
    ("SE_COASC2", sweph_sys::SE_COASC2),
    ("SE_POLASC", sweph_sys::SE_POLASC),
];

/// Register the ten operations.
pub fn register_operation_functions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(set_ephe_path, m)?)?;
    m.add_function(wrap_pyfunction!(julday, m)?)?;
    m.add_function(wrap_pyfunction!(revjul, m)?)?;
    m.add_function(wrap_pyfunction!(calc_ut, m)?)?;
    m.add_function(wrap_pyfunction!(get_planet_name, m)?)?;
    m.add_function(wrap_pyfunction!(lun_eclipse_when, m)?)?;
    m.add_function(wrap_pyfunction!(sol_eclipse_when_glob, m)?)?;
    m.add_function(wrap_pyfunction!(houses, m)?)?;
    m.add_function(wrap_pyfunction!(close, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}

/// Register the exception classes and the common constants.
pub fn register_module_items(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add("ValidationError", py.get_type::<ValidationError>())?;
    m.add("EngineError", py.get_type::<EngineError>())?;
    for (name, value) in INT_CONSTANTS {
        m.add(*name, *value)?;
    }
    for (name, value) in INDEX_CONSTANTS {
        m.add(*name, *value)?;
    }
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_module<F>(f: F)
    where
        F: for<'py> FnOnce(Python<'py>, &Bound<'py, PyModule>) -> PyResult<()>,
    {
        Python::initialize();
        Python::attach(|py| {
            let m = PyModule::new(py, "sweph_bridge").unwrap();
            register_operation_functions(&m).unwrap();
            register_module_items(&m).unwrap();
            f(py, &m).unwrap();
        });
    }

    #[test]
    fn test_primitive_conversion() {
        with_module(|py, _| {
            let none = py.None().into_bound(py);
            assert_eq!(none.primitive(), Primitive::Absent);
            let t = true.into_pyobject(py)?.to_owned().into_any();
            assert_eq!(t.primitive(), Primitive::Bool(true));
            let i = 7i64.into_pyobject(py)?.into_any();
            assert_eq!(i.primitive(), Primitive::Int(7));
            let big = u64::MAX.into_pyobject(py)?.into_any();
            assert_eq!(big.primitive(), Primitive::Real(u64::MAX as f64));
            let x = 1.5f64.into_pyobject(py)?.into_any();
            assert_eq!(x.primitive(), Primitive::Real(1.5));
            let s = PyString::new(py, "P").into_any();
            assert_eq!(s.primitive(), Primitive::Text("P".into()));
            let l = PyList::empty(py).into_any();
            assert_eq!(l.primitive(), Primitive::Other);
            Ok(())
        });
    }

    #[test]
    fn test_julday_and_revjul() {
        with_module(|_, m| {
            let jd: f64 = m.getattr("julday")?.call1((2000, 1, 1, 12.0))?.extract()?;
            assert_eq!(jd, 2451545.0);
            let date: (i32, i32, i32, f64) = m.getattr("revjul")?.call1((jd,))?.extract()?;
            assert_eq!(date, (2000, 1, 1, 12.0));
            Ok(())
        });
    }

    #[test]
    fn test_result_types() {
        with_module(|_, m| {
            let result = m.getattr("calc_ut")?.call1((2451545.0, 0))?;
            assert!(result.is_instance_of::<PyTuple>());
            let (xx, retflag): (Bound<'_, PyAny>, i32) = result.extract()?;
            assert!(xx.is_instance_of::<PyList>());
            assert_eq!(xx.len()?, 6);
            assert!(retflag >= 0);

            let (cusps, ascmc): (Vec<f64>, Vec<f64>) =
                m.getattr("houses")?.call1((2451545.0, 52.0, 13.4, "P"))?.extract()?;
            assert_eq!(cusps.len(), 13);
            assert_eq!(ascmc.len(), 10);

            let name: String = m.getattr("get_planet_name")?.call1((0,))?.extract()?;
            assert_eq!(name, "Sun");

            let unit = m.getattr("set_ephe_path")?.call0()?;
            assert!(unit.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_errors_raise_typed_exceptions() {
        with_module(|py, m| {
            let err = m.getattr("julday")?.call1((2000, 1, 1)).unwrap_err();
            assert!(err.is_instance_of::<ValidationError>(py));
            assert!(err.is_instance_of::<PyTypeError>(py));
            assert_eq!(err.value(py).to_string(), "missing required argument(s)");

            let err = m.getattr("calc_ut")?.call1((2451545.0, "sun")).unwrap_err();
            assert!(err.is_instance_of::<ValidationError>(py));
            assert_eq!(err.value(py).to_string(), "wrong argument type");

            let err = m.getattr("calc_ut")?.call1((2451545.0, 15)).unwrap_err();
            assert!(err.is_instance_of::<EngineError>(py));
            assert!(err.is_instance_of::<PyRuntimeError>(py));
            Ok(())
        });
    }

    #[test]
    fn test_oversized_int_is_a_real_argument() {
        with_module(|py, m| {
            let big = u64::MAX.into_pyobject(py)?.into_any();
            // accepted as a real jd, then refused by the engine
            let err = m.getattr("calc_ut")?.call1((big, 0)).unwrap_err();
            assert!(err.is_instance_of::<EngineError>(py));

            let big = u64::MAX.into_pyobject(py)?.into_any();
            let err = m.getattr("get_planet_name")?.call1((big,)).unwrap_err();
            assert!(err.is_instance_of::<ValidationError>(py));
            Ok(())
        });
    }

    #[test]
    fn test_omitted_defaults_match_explicit_values() {
        with_module(|py, m| {
            let calc = m.getattr("calc_ut")?;
            let omitted = calc.call1((2451545.0, 0))?;
            let explicit = calc.call1((2451545.0, 0, 258))?;
            let none = calc.call1((2451545.0, 0, py.None()))?;
            assert!(omitted.eq(&explicit)?);
            assert!(omitted.eq(&none)?);

            let houses = m.getattr("houses")?;
            let omitted = houses.call1((2451545.0, 52.0, 13.4))?;
            let explicit = houses.call1((2451545.0, 52.0, 13.4, "P"))?;
            let none = houses.call1((2451545.0, 52.0, 13.4, py.None()))?;
            assert!(omitted.eq(&explicit)?);
            assert!(omitted.eq(&none)?);

            let eclipse = m.getattr("lun_eclipse_when")?;
            let omitted = eclipse.call1((2451545.0,))?;
            let explicit = eclipse.call1((2451545.0, 2, 0, 0))?;
            let none = eclipse.call1((2451545.0, py.None(), py.None(), py.None()))?;
            assert!(omitted.eq(&explicit)?);
            assert!(omitted.eq(&none)?);
            Ok(())
        });
    }

    #[test]
    fn test_constants_registered() {
        with_module(|_, m| {
            let sun: i32 = m.getattr("SE_SUN")?.extract()?;
            assert_eq!(sun, 0);
            let speed: i32 = m.getattr("SEFLG_SPEED")?.extract()?;
            assert_eq!(speed, 256);
            let mc: usize = m.getattr("SE_MC")?.extract()?;
            assert_eq!(mc, 1);
            Ok(())
        });
    }
}
