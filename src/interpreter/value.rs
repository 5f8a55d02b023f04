/// Attribute maps and the helpers around the reserved `names` attribute.
pub mod attrs;
/// The `Value` enum, vector payloads, constructors and rendering.
pub mod core;
/// Conversion of runtime values into `serde_json` values for host interop.
pub mod json;
