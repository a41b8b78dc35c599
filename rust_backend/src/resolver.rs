//! Argument Resolver: host values → typed engine calls.
//!
//! The operation registry, the default table and the coercion rules live
//! here once and are used by both host front ends. A host only has to say
//! what a value looks like through [`HostValue`].

use std::fmt;
use std::str::FromStr;

use sweph_sys as sys;

use crate::error::{BridgeError, BridgeResult};

/// Neutral view of a dynamically-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Host null/None
    Absent,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    /// Anything else (lists, objects, ...)
    Other,
}

/// Implemented by each host's value type.
pub trait HostValue {
    fn primitive(&self) -> Primitive;
}

impl HostValue for Primitive {
    fn primitive(&self) -> Primitive {
        self.clone()
    }
}

/// The ten operations, identical on both host surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SetEphePath,
    Julday,
    Revjul,
    CalcUt,
    GetPlanetName,
    LunEclipseWhen,
    SolEclipseWhenGlob,
    Houses,
    Close,
    Version,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::SetEphePath,
        Operation::Julday,
        Operation::Revjul,
        Operation::CalcUt,
        Operation::GetPlanetName,
        Operation::LunEclipseWhen,
        Operation::SolEclipseWhenGlob,
        Operation::Houses,
        Operation::Close,
        Operation::Version,
    ];

    /// Host-visible name.
    pub fn name(self) -> &'static str {
        match self {
            Self::SetEphePath => "set_ephe_path",
            Self::Julday => "julday",
            Self::Revjul => "revjul",
            Self::CalcUt => "calc_ut",
            Self::GetPlanetName => "get_planet_name",
            Self::LunEclipseWhen => "lun_eclipse_when",
            Self::SolEclipseWhenGlob => "sol_eclipse_when_glob",
            Self::Houses => "houses",
            Self::Close => "close",
            Self::Version => "version",
        }
    }

    pub fn signature(self) -> &'static Signature {
        match self {
            Self::SetEphePath => &SET_EPHE_PATH,
            Self::Julday => &JULDAY,
            Self::Revjul => &REVJUL,
            Self::CalcUt => &CALC_UT,
            Self::GetPlanetName => &GET_PLANET_NAME,
            Self::LunEclipseWhen | Self::SolEclipseWhenGlob => &ECLIPSE_WHEN,
            Self::Houses => &HOUSES,
            Self::Close | Self::Version => &NO_ARGUMENTS,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| BridgeError::Validation(format!("unknown operation '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Real,
    Text,
    /// Single ASCII character, passed to the engine as a byte
    Char,
}

/// Value substituted for an omitted optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    /// Engine default behaviour (null path)
    Unset,
    Int(i32),
    Char(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    /// `None` for required parameters
    pub default: Option<ParamDefault>,
}

const fn required(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        default: None,
    }
}

const fn optional(name: &'static str, kind: ParamKind, default: ParamDefault) -> Param {
    Param {
        name,
        kind,
        default: Some(default),
    }
}

/// Ordered parameters of an operation; required ones come first.
#[derive(Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [Param],
}

impl Signature {
    pub fn min_arity(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    pub fn max_arity(&self) -> usize {
        self.params.len()
    }
}

pub const DEFAULT_GREGFLAG: i32 = sys::SE_GREG_CAL;
pub const DEFAULT_CALC_FLAGS: i32 = sys::SEFLG_SWIEPH | sys::SEFLG_SPEED;
pub const DEFAULT_ECLIPSE_FLAGS: i32 = sys::SEFLG_SWIEPH;
pub const DEFAULT_ECLIPSE_TYPE: i32 = 0;
pub const DEFAULT_BACKWARD: i32 = 0;
pub const DEFAULT_HOUSE_SYSTEM: u8 = b'P';

static SET_EPHE_PATH: Signature = Signature {
    params: &[optional("path", ParamKind::Text, ParamDefault::Unset)],
};

static JULDAY: Signature = Signature {
    params: &[
        required("year", ParamKind::Int),
        required("month", ParamKind::Int),
        required("day", ParamKind::Int),
        required("hour", ParamKind::Real),
        optional("gregflag", ParamKind::Int, ParamDefault::Int(DEFAULT_GREGFLAG)),
    ],
};

static REVJUL: Signature = Signature {
    params: &[
        required("jd", ParamKind::Real),
        optional("gregflag", ParamKind::Int, ParamDefault::Int(DEFAULT_GREGFLAG)),
    ],
};

static CALC_UT: Signature = Signature {
    params: &[
        required("tjd_ut", ParamKind::Real),
        required("ipl", ParamKind::Int),
        optional("iflag", ParamKind::Int, ParamDefault::Int(DEFAULT_CALC_FLAGS)),
    ],
};

static GET_PLANET_NAME: Signature = Signature {
    params: &[required("ipl", ParamKind::Int)],
};

static ECLIPSE_WHEN: Signature = Signature {
    params: &[
        required("tjd_start", ParamKind::Real),
        optional("ifl", ParamKind::Int, ParamDefault::Int(DEFAULT_ECLIPSE_FLAGS)),
        optional("ifltype", ParamKind::Int, ParamDefault::Int(DEFAULT_ECLIPSE_TYPE)),
        optional("backward", ParamKind::Int, ParamDefault::Int(DEFAULT_BACKWARD)),
    ],
};

static HOUSES: Signature = Signature {
    params: &[
        required("tjd_ut", ParamKind::Real),
        required("geolat", ParamKind::Real),
        required("geolon", ParamKind::Real),
        optional("hsys", ParamKind::Char, ParamDefault::Char(DEFAULT_HOUSE_SYSTEM)),
    ],
};

static NO_ARGUMENTS: Signature = Signature { params: &[] };

/// A fully resolved call, ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetEphePath {
        path: Option<String>,
    },
    Julday {
        year: i32,
        month: i32,
        day: i32,
        hour: f64,
        gregflag: i32,
    },
    Revjul {
        jd: f64,
        gregflag: i32,
    },
    CalcUt {
        tjd_ut: f64,
        ipl: i32,
        iflag: i32,
    },
    GetPlanetName {
        ipl: i32,
    },
    LunEclipseWhen {
        tjd_start: f64,
        ifl: i32,
        ifltype: i32,
        backward: i32,
    },
    SolEclipseWhenGlob {
        tjd_start: f64,
        ifl: i32,
        ifltype: i32,
        backward: i32,
    },
    Houses {
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: u8,
    },
    Close,
    Version,
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::SetEphePath { .. } => Operation::SetEphePath,
            Self::Julday { .. } => Operation::Julday,
            Self::Revjul { .. } => Operation::Revjul,
            Self::CalcUt { .. } => Operation::CalcUt,
            Self::GetPlanetName { .. } => Operation::GetPlanetName,
            Self::LunEclipseWhen { .. } => Operation::LunEclipseWhen,
            Self::SolEclipseWhenGlob { .. } => Operation::SolEclipseWhenGlob,
            Self::Houses { .. } => Operation::Houses,
            Self::Close => Operation::Close,
            Self::Version => Operation::Version,
        }
    }
}

/// One coerced argument.
#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Int(i32),
    Real(f64),
    Text(Option<String>),
    Char(u8),
}

fn coerce(kind: ParamKind, value: Primitive) -> BridgeResult<Arg> {
    match (kind, value) {
        (ParamKind::Int, Primitive::Int(i)) => i32::try_from(i)
            .map(Arg::Int)
            .map_err(|_| BridgeError::wrong_type()),
        (ParamKind::Int, Primitive::Bool(b)) => Ok(Arg::Int(i32::from(b))),
        (ParamKind::Int, Primitive::Real(x))
            if x.is_finite()
                && x.fract() == 0.0
                && x >= f64::from(i32::MIN)
                && x <= f64::from(i32::MAX) =>
        {
            Ok(Arg::Int(x as i32))
        }
        (ParamKind::Real, Primitive::Int(i)) => Ok(Arg::Real(i as f64)),
        (ParamKind::Real, Primitive::Real(x)) => Ok(Arg::Real(x)),
        (ParamKind::Text, Primitive::Text(s)) => Ok(Arg::Text(Some(s))),
        (ParamKind::Char, Primitive::Text(s)) => match s.bytes().next() {
            Some(b) if b.is_ascii() => Ok(Arg::Char(b)),
            _ => Err(BridgeError::wrong_type()),
        },
        _ => Err(BridgeError::wrong_type()),
    }
}

fn default_arg(default: ParamDefault) -> Arg {
    match default {
        ParamDefault::Unset => Arg::Text(None),
        ParamDefault::Int(i) => Arg::Int(i),
        ParamDefault::Char(c) => Arg::Char(c),
    }
}

/// Coerced arguments consumed in signature order.
struct Args(std::vec::IntoIter<Arg>);

impl Args {
    fn int(&mut self) -> BridgeResult<i32> {
        match self.0.next() {
            Some(Arg::Int(i)) => Ok(i),
            _ => Err(BridgeError::wrong_type()),
        }
    }

    fn real(&mut self) -> BridgeResult<f64> {
        match self.0.next() {
            Some(Arg::Real(x)) => Ok(x),
            _ => Err(BridgeError::wrong_type()),
        }
    }

    fn text(&mut self) -> BridgeResult<Option<String>> {
        match self.0.next() {
            Some(Arg::Text(s)) => Ok(s),
            _ => Err(BridgeError::wrong_type()),
        }
    }

    fn char(&mut self) -> BridgeResult<u8> {
        match self.0.next() {
            Some(Arg::Char(c)) => Ok(c),
            _ => Err(BridgeError::wrong_type()),
        }
    }
}

/// Validate `args` against the signature of `op` and build the call.
///
/// Fails with `missing required argument(s)` when fewer than the minimum
/// arity are supplied and with `wrong argument type` when a value does not
/// coerce. Surplus arguments are ignored.
pub fn resolve<V: HostValue>(op: Operation, args: &[V]) -> BridgeResult<Call> {
    let signature = op.signature();
    if args.len() < signature.min_arity() {
        return Err(BridgeError::missing_arguments());
    }
    if args.len() > signature.max_arity() {
        log::debug!(
            "{}: ignoring {} surplus argument(s)",
            op,
            args.len() - signature.max_arity()
        );
    }

    let mut coerced = Vec::with_capacity(signature.params.len());
    for (index, param) in signature.params.iter().enumerate() {
        let value = args
            .get(index)
            .map(HostValue::primitive)
            .unwrap_or(Primitive::Absent);
        let arg = match (value, param.default) {
            (Primitive::Absent, Some(default)) => default_arg(default),
            (Primitive::Absent, None) => return Err(BridgeError::wrong_type()),
            (value, _) => coerce(param.kind, value)?,
        };
        coerced.push(arg);
    }

    let mut a = Args(coerced.into_iter());
    Ok(match op {
        Operation::SetEphePath => Call::SetEphePath { path: a.text()? },
        Operation::Julday => Call::Julday {
            year: a.int()?,
            month: a.int()?,
            day: a.int()?,
            hour: a.real()?,
            gregflag: a.int()?,
        },
        Operation::Revjul => Call::Revjul {
            jd: a.real()?,
            gregflag: a.int()?,
        },
        Operation::CalcUt => Call::CalcUt {
            tjd_ut: a.real()?,
            ipl: a.int()?,
            iflag: a.int()?,
        },
        Operation::GetPlanetName => Call::GetPlanetName { ipl: a.int()? },
        Operation::LunEclipseWhen => Call::LunEclipseWhen {
            tjd_start: a.real()?,
            ifl: a.int()?,
            ifltype: a.int()?,
            backward: a.int()?,
        },
        Operation::SolEclipseWhenGlob => Call::SolEclipseWhenGlob {
            tjd_start: a.real()?,
            ifl: a.int()?,
            ifltype: a.int()?,
            backward: a.int()?,
        },
        Operation::Houses => Call::Houses {
            tjd_ut: a.real()?,
            geolat: a.real()?,
            geolon: a.real()?,
            hsys: a.char()?,
        },
        Operation::Close => Call::Close,
        Operation::Version => Call::Version,
    })
}
