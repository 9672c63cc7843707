use serde::{Deserialize, Serialize};

/// Phong material coefficients of the reconstructed surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaterialOptions {
    /// Ambient reflectance.
    pub ambient: [f32; 3],
    /// Diffuse reflectance.
    pub diffuse: [f32; 3],
    /// Specular reflectance.
    pub specular: [f32; 3],
    /// Specular exponent.
    pub shininess: f32,
}

impl Default for MaterialOptions {
    fn default() -> Self {
        Self {
            ambient: [0.26, 0.26, 0.26],
            diffuse: [1.0, 1.0, 1.0],
            specular: [0.35, 0.35, 0.35],
            shininess: 5.5,
        }
    }
}
