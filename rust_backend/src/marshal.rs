//! Result Marshaller.
//!
//! Every operation produces one [`Outcome`]; a host renders it through its
//! [`HostMarshal`] implementation. Shapes are fixed here, so both hosts
//! return the same structure:
//!
//! | operation | shape |
//! |---|---|
//! | `set_ephe_path`, `close` | unit |
//! | `julday` | real |
//! | `revjul` | `(year, month, day, hour)` |
//! | `calc_ut` | `([6], retflag)` |
//! | `lun_eclipse_when`, `sol_eclipse_when_glob` | `(type, [10])` |
//! | `houses` | `([13], [10])` |
//! | `get_planet_name`, `version` | text |

use crate::types::{CalendarDate, EclipseResult, HouseResult, PositionResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Unit,
    Real(f64),
    Text(String),
    Date(CalendarDate),
    Position(PositionResult),
    Eclipse(EclipseResult),
    Houses(HouseResult),
}

/// Builds host values. Buffers are copied element by element so no
/// engine-side storage is referenced after the call.
pub trait HostMarshal {
    type Value;
    type Error;

    fn unit(&self) -> Result<Self::Value, Self::Error>;
    fn int(&self, value: i32) -> Result<Self::Value, Self::Error>;
    fn real(&self, value: f64) -> Result<Self::Value, Self::Error>;
    fn text(&self, value: &str) -> Result<Self::Value, Self::Error>;
    /// A fixed-size engine buffer, same length and order.
    fn buffer(&self, values: &[f64]) -> Result<Self::Value, Self::Error>;
    /// A heterogeneous group of results.
    fn composite(&self, items: Vec<Self::Value>) -> Result<Self::Value, Self::Error>;
}

impl Outcome {
    pub fn render<M: HostMarshal>(&self, m: &M) -> Result<M::Value, M::Error> {
        match self {
            Self::Unit => m.unit(),
            Self::Real(x) => m.real(*x),
            Self::Text(s) => m.text(s),
            Self::Date(date) => m.composite(vec![
                m.int(date.year)?,
                m.int(date.month)?,
                m.int(date.day)?,
                m.real(date.hour)?,
            ]),
            Self::Position(p) => m.composite(vec![m.buffer(&p.position)?, m.int(p.flags)?]),
            Self::Eclipse(e) => m.composite(vec![m.int(e.eclipse_type)?, m.buffer(&e.times)?]),
            Self::Houses(h) => m.composite(vec![m.buffer(&h.cusps)?, m.buffer(&h.ascmc)?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Renders into a compact textual form for shape assertions.
    struct Shape;

    impl HostMarshal for Shape {
        type Value = String;
        type Error = Infallible;

        fn unit(&self) -> Result<String, Infallible> {
            Ok("()".into())
        }
        fn int(&self, _: i32) -> Result<String, Infallible> {
            Ok("i".into())
        }
        fn real(&self, _: f64) -> Result<String, Infallible> {
            Ok("r".into())
        }
        fn text(&self, _: &str) -> Result<String, Infallible> {
            Ok("s".into())
        }
        fn buffer(&self, values: &[f64]) -> Result<String, Infallible> {
            Ok(format!("[{}]", values.len()))
        }
        fn composite(&self, items: Vec<String>) -> Result<String, Infallible> {
            Ok(format!("({})", items.join(",")))
        }
    }

    fn shape(outcome: Outcome) -> String {
        outcome.render(&Shape).unwrap_or_else(|never| match never {})
    }

    #[test]
    fn test_result_shapes() {
        assert_eq!(shape(Outcome::Unit), "()");
        assert_eq!(shape(Outcome::Real(1.0)), "r");
        assert_eq!(shape(Outcome::Text("Sun".into())), "s");
        assert_eq!(
            shape(Outcome::Date(CalendarDate::new(2000, 1, 1, 12.0))),
            "(i,i,i,r)"
        );
        assert_eq!(
            shape(Outcome::Position(PositionResult {
                position: [0.0; 6],
                flags: 260
            })),
            "([6],i)"
        );
        assert_eq!(
            shape(Outcome::Eclipse(EclipseResult {
                eclipse_type: 4,
                times: [0.0; 10]
            })),
            "(i,[10])"
        );
        assert_eq!(
            shape(Outcome::Houses(HouseResult {
                cusps: [0.0; 13],
                ascmc: [0.0; 10]
            })),
            "([13],[10])"
        );
    }
}
