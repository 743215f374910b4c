//! Render probes for the in-memory environment.

use tether_core::RenderProbe;

/// Fixed answers to the render feature probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentProbe {
    pub canvas: bool,
    pub svg: bool,
    pub vml: bool,
}

impl Default for EnvironmentProbe {
    /// A modern browser: canvas and SVG, no VML.
    fn default() -> Self {
        Self {
            canvas: true,
            svg: true,
            vml: false,
        }
    }
}

impl EnvironmentProbe {
    /// No rendering backend at all.
    pub fn headless() -> Self {
        Self {
            canvas: false,
            svg: false,
            vml: false,
        }
    }

    pub fn with_vml(mut self, vml: bool) -> Self {
        self.vml = vml;
        self
    }
}

impl RenderProbe for EnvironmentProbe {
    fn canvas_supported(&self) -> bool {
        self.canvas
    }

    fn svg_supported(&self) -> bool {
        self.svg
    }

    fn vml_supported(&self) -> bool {
        self.vml
    }
}
