//! Sandboxed virtual-machine surface.
//!
//! Values are JSON. A request names the operation and its positional
//! arguments; the response carries either the result or a tagged error:
//!
//! ```json
//! {"op": "calc_ut", "args": [2451545.0, 0]}
//! {"ok": [[280.37, 0.0, 0.98, 1.02, 0.0, 0.0], 260]}
//! {"error": {"kind": "validation", "message": "wrong argument type"}}
//! ```
//!
//! [`abi`] exports the same surface through a flat C ABI for WebAssembly
//! and other embedded hosts.

pub mod abi;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch;
use crate::error::{BridgeError, BridgeResult, ErrorKind};
use crate::marshal::HostMarshal;
use crate::resolver::{HostValue, Operation, Primitive};
use crate::session::{self, SharedSession};

impl HostValue for Value {
    fn primitive(&self) -> Primitive {
        match self {
            Value::Null => Primitive::Absent,
            Value::Bool(b) => Primitive::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Primitive::Int(i),
                None => n.as_f64().map(Primitive::Real).unwrap_or(Primitive::Other),
            },
            Value::String(s) => Primitive::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Primitive::Other,
        }
    }
}

/// Renders every buffer and composite as a JSON array.
///
/// JSON has no NaN or infinity, so a non-finite real is refused rather than
/// written as `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshal;

fn finite_number(value: f64) -> BridgeResult<Value> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| {
            BridgeError::Engine(format!(
                "non-finite value {} cannot be represented in JSON",
                value
            ))
        })
}

impl HostMarshal for JsonMarshal {
    type Value = Value;
    type Error = BridgeError;

    fn unit(&self) -> BridgeResult<Value> {
        Ok(Value::Null)
    }

    fn int(&self, value: i32) -> BridgeResult<Value> {
        Ok(Value::from(value))
    }

    fn real(&self, value: f64) -> BridgeResult<Value> {
        finite_number(value)
    }

    fn text(&self, value: &str) -> BridgeResult<Value> {
        Ok(Value::from(value))
    }

    fn buffer(&self, values: &[f64]) -> BridgeResult<Value> {
        values
            .iter()
            .copied()
            .map(finite_number)
            .collect::<BridgeResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn composite(&self, items: Vec<Value>) -> BridgeResult<Value> {
        Ok(Value::Array(items))
    }
}

#[derive(Debug, Deserialize)]
pub struct Request {
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Value),
    Error(ErrorBody),
}

impl From<BridgeResult<Value>> for Response {
    fn from(result: BridgeResult<Value>) -> Self {
        match result {
            Ok(value) => Response::Ok(value),
            Err(e) => Response::Error(ErrorBody {
                kind: e.kind(),
                message: e.message().to_string(),
            }),
        }
    }
}

impl Response {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"error":{{"kind":"engine","message":"failed to encode response: {}"}}}}"#,
                e
            )
        })
    }
}

/// The module instance handed to the sandbox.
#[derive(Debug, Clone)]
pub struct SandboxModule {
    session: SharedSession,
}

impl Default for SandboxModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxModule {
    /// Module bound to the process-wide session.
    pub fn new() -> Self {
        Self::with_session(session::global())
    }

    pub fn with_session(session: SharedSession) -> Self {
        Self { session }
    }

    /// Host-visible operation names.
    pub fn operations() -> Vec<&'static str> {
        Operation::ALL.iter().map(|op| op.name()).collect()
    }

    pub fn call(&self, op: &str, args: &[Value]) -> BridgeResult<Value> {
        let op: Operation = op.parse()?;
        let outcome = dispatch::invoke(&self.session, op, args)?;
        outcome.render(&JsonMarshal)
    }

    /// Handle one JSON request and return the JSON response.
    pub fn handle(&self, request: &str) -> String {
        let result = serde_json::from_str::<Request>(request)
            .map_err(|e| BridgeError::Validation(format!("malformed request: {}", e)))
            .and_then(|req| self.call(&req.op, &req.args));
        Response::from(result).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::Outcome;
    #[cfg(feature = "builtin")]
    use crate::session::Session;
    use serde_json::json;

    #[cfg(feature = "builtin")]
    fn module() -> SandboxModule {
        SandboxModule::with_session(session::shared(Session::builtin()))
    }

    #[test]
    fn test_json_primitives() {
        assert_eq!(json!(null).primitive(), Primitive::Absent);
        assert_eq!(json!(3).primitive(), Primitive::Int(3));
        assert_eq!(json!(3.5).primitive(), Primitive::Real(3.5));
        assert_eq!(json!(u64::MAX).primitive(), Primitive::Real(u64::MAX as f64));
        assert_eq!(json!("P").primitive(), Primitive::Text("P".into()));
        assert_eq!(json!([1]).primitive(), Primitive::Other);
    }

    #[test]
    fn test_non_finite_reals_are_refused() {
        let err = JsonMarshal.real(f64::NAN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert!(err.message().contains("non-finite"));

        let outcome = Outcome::Position(crate::types::PositionResult {
            position: [f64::INFINITY, 0.0, 1.0, 0.0, 0.0, 0.0],
            flags: 2,
        });
        assert!(outcome.render(&JsonMarshal).is_err());
        assert_eq!(JsonMarshal.real(280.5).unwrap(), json!(280.5));
    }

    #[cfg(feature = "builtin")]
    #[test]
    fn test_out_of_range_jd_is_an_error_not_null() {
        let m = module();
        let err = m.call("calc_ut", &[json!(1e300), json!(0)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert!(err.message().contains("outside the range"), "{}", err.message());

        let response: Value =
            serde_json::from_str(&m.handle(r#"{"op": "calc_ut", "args": [1e300, 0]}"#)).unwrap();
        assert_eq!(response["error"]["kind"], json!("engine"));
        assert!(response.get("ok").is_none());
    }

    #[cfg(feature = "builtin")]
    #[test]
    fn test_call_shapes() {
        let m = module();
        let pos = m.call("calc_ut", &[json!(2451545.0), json!(0)]).unwrap();
        let pair = pos.as_array().unwrap();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].as_array().unwrap().len(), 6);
        assert_eq!(pair[1], json!(260));

        let houses = m
            .call("houses", &[json!(2451545.0), json!(52.0), json!(13.4)])
            .unwrap();
        let houses = houses.as_array().unwrap();
        assert_eq!(houses[0].as_array().unwrap().len(), 13);
        assert_eq!(houses[1].as_array().unwrap().len(), 10);

        let date = m.call("revjul", &[json!(2451545.0)]).unwrap();
        assert_eq!(date, json!([2000, 1, 1, 12.0]));

        assert_eq!(m.call("close", &[]).unwrap(), Value::Null);
    }

    #[cfg(feature = "builtin")]
    #[test]
    fn test_handle_round_trip() {
        let m = module();
        let response = m.handle(r#"{"op": "get_planet_name", "args": [1]}"#);
        assert_eq!(response, r#"{"ok":"Moon"}"#);

        let response = m.handle(r#"{"op": "version"}"#);
        let parsed: Response = serde_json::from_str(&response).unwrap();
        assert!(matches!(parsed, Response::Ok(Value::String(_))));
    }

    #[cfg(feature = "builtin")]
    #[test]
    fn test_handle_errors() {
        let m = module();
        let response: Value =
            serde_json::from_str(&m.handle(r#"{"op": "julday", "args": [2000]}"#)).unwrap();
        assert_eq!(
            response,
            json!({"error": {"kind": "validation", "message": "missing required argument(s)"}})
        );

        let response: Value = serde_json::from_str(&m.handle("not json")).unwrap();
        assert_eq!(response["error"]["kind"], json!("validation"));

        let response: Value =
            serde_json::from_str(&m.handle(r#"{"op": "calc_ut", "args": [2451545.0, 15]}"#))
                .unwrap();
        assert_eq!(response["error"]["kind"], json!("engine"));

        let response: Value = serde_json::from_str(&m.handle(r#"{"op": "nope"}"#)).unwrap();
        assert_eq!(response["error"]["message"], json!("unknown operation 'nope'"));
    }

    #[test]
    fn test_operation_list() {
        let ops = SandboxModule::operations();
        assert_eq!(ops.len(), 10);
        assert!(ops.contains(&"sol_eclipse_when_glob"));
    }
}
