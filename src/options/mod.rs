//! Shading options with documented defaults.
//!
//! The light and material coefficients live here as explicit configuration
//! so hosts can tune them without touching the render algorithm; the
//! render pass uploads them once at construction and never mutates them.

mod lighting;
mod material;

pub use lighting::LightingOptions;
pub use material::MaterialOptions;
use serde::{Deserialize, Serialize};

/// Top-level shading options container. Both sub-structs use
/// `#[serde(default)]` so partial JSON documents (e.g. only overriding
/// `lighting`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Directional light coefficients.
    pub lighting: LightingOptions,
    /// Surface material coefficients.
    pub material: MaterialOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_json() {
        let opts = Options::default();
        let json = serde_json::to_string_pretty(&opts).unwrap();
        let parsed: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let parsed: Options =
            serde_json::from_str(r#"{"lighting":{"ambient":[0.2,0.2,0.2]}}"#)
                .unwrap();
        assert_eq!(parsed.lighting.ambient, [0.2, 0.2, 0.2]);
        assert_eq!(parsed.lighting.diffuse, [0.9, 0.9, 0.9]);
        assert_eq!(parsed.material, MaterialOptions::default());
    }
}
