//! Render-mode capability detection and selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::cell::OnceCell;

use crate::error::ConfigError;

/// A connector rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Canvas,
    Svg,
    Vml,
}

impl RenderMode {
    /// All render modes, in the order the adapter reports them.
    pub const ALL: [RenderMode; 3] = [RenderMode::Canvas, RenderMode::Svg, RenderMode::Vml];

    /// Get the lowercase name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Canvas => "canvas",
            RenderMode::Svg => "svg",
            RenderMode::Vml => "vml",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canvas" => Ok(RenderMode::Canvas),
            "svg" => Ok(RenderMode::Svg),
            "vml" => Ok(RenderMode::Vml),
            _ => Err(ConfigError::UnknownRenderMode(s.to_string())),
        }
    }
}

/// Feature probes supplied by the host environment.
pub trait RenderProbe {
    /// Check for a 2D canvas context.
    fn canvas_supported(&self) -> bool;

    /// Check for SVG basic structure support.
    fn svg_supported(&self) -> bool;

    /// Check for VML support. May be expensive; called at most once per
    /// [`RenderCapabilities`].
    fn vml_supported(&self) -> bool;
}

/// Cached render capabilities of one host environment.
///
/// Canvas and SVG are sampled on construction. VML is probed on first use
/// and remembered for the lifetime of this value.
#[derive(Debug)]
pub struct RenderCapabilities<P> {
    probe: P,
    canvas: bool,
    svg: bool,
    vml: OnceCell<bool>,
}

impl<P: RenderProbe> RenderCapabilities<P> {
    /// Sample the eager probes.
    pub fn new(probe: P) -> Self {
        let canvas = probe.canvas_supported();
        let svg = probe.svg_supported();
        Self {
            probe,
            canvas,
            svg,
            vml: OnceCell::new(),
        }
    }

    /// Get the underlying probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// All render modes the adapter knows about.
    pub fn render_modes(&self) -> [RenderMode; 3] {
        RenderMode::ALL
    }

    /// Check whether a mode can be used here.
    pub fn is_available(&self, mode: RenderMode) -> bool {
        match mode {
            RenderMode::Canvas => self.canvas,
            RenderMode::Svg => self.svg,
            RenderMode::Vml => *self.vml.get_or_init(|| {
                let supported = self.probe.vml_supported();
                log::debug!("VML probe result: {}", supported);
                supported
            }),
        }
    }

    /// Like [`is_available`](Self::is_available), for a mode name. Unknown
    /// names are never available.
    pub fn is_available_str(&self, mode: &str) -> bool {
        mode.parse::<RenderMode>().is_ok_and(|m| self.is_available(m))
    }

    /// Resolve a requested mode name to the best usable backend.
    ///
    /// SVG falls back to canvas and then VML. Canvas is used only when
    /// available. Anything else (including an unavailable canvas or an
    /// unknown name) falls back to VML. An empty request resolves to none.
    pub fn resolve(&self, requested: &str) -> Option<RenderMode> {
        let requested = requested.trim();
        if requested.is_empty() {
            return None;
        }

        let resolved = match requested.parse::<RenderMode>().ok() {
            Some(RenderMode::Svg) => [RenderMode::Svg, RenderMode::Canvas, RenderMode::Vml]
                .into_iter()
                .find(|&m| self.is_available(m)),
            Some(RenderMode::Canvas) if self.is_available(RenderMode::Canvas) => {
                Some(RenderMode::Canvas)
            }
            _ => self.is_available(RenderMode::Vml).then_some(RenderMode::Vml),
        };

        log::debug!("Render mode {:?} resolved to {:?}", requested, resolved);
        resolved
    }
}
