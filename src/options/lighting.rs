use serde::{Deserialize, Serialize};

/// Directional light coefficients, camera space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingOptions {
    /// Ambient light color.
    pub ambient: [f32; 3],
    /// Diffuse light color.
    pub diffuse: [f32; 3],
    /// Specular light color.
    pub specular: [f32; 3],
    /// Direction from the surface toward the light.
    pub direction: [f32; 3],
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient: [0.1, 0.1, 0.1],
            diffuse: [0.9, 0.9, 0.9],
            specular: [0.3, 0.3, 0.3],
            direction: [0.0, 0.3, 0.9],
        }
    }
}
