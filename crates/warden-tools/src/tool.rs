use async_trait::async_trait;
use serde_json::Value;

/// A callable tool. `execute` never raises; failures are reported as
/// `"Error: ..."` strings instead.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON-schema-like object; `required` lists mandatory argument names.
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> String;
}
