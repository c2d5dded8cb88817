//! Wire format of the remote execution endpoint.

use runpad_core::ExecutionResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body returned by the execution service.
///
/// Missing and `null` fields fall back to "no output" / "no error". The line
/// number is kept as raw JSON since services send it as an integer, a float
/// or a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub line_number: Option<Value>,
}

impl RunResponse {
    /// Line number as an integer, if it has an integral value.
    #[must_use]
    pub fn line(&self) -> Option<i64> {
        match self.line_number.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<RunResponse> for ExecutionResult {
    fn from(response: RunResponse) -> Self {
        let line = response.line();
        Self::new(response.output.unwrap_or_default(), response.error, line)
    }
}
