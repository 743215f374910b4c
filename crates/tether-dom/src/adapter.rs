//! The DOM adapter surface.

use kurbo::Point;
use tether_core::{AdapterConfig, DragManager, OffsetMode, RenderCapabilities, RenderMode, RenderProbe};

use crate::class_list;
use crate::document::Document;
use crate::error::DomResult;
use crate::node::NodeId;
use crate::probe::EnvironmentProbe;
use crate::target::Target;

/// Element queries and manipulation for one diagram context.
#[derive(Debug)]
pub struct DomAdapter<P = EnvironmentProbe> {
    document: Document,
    capabilities: RenderCapabilities<P>,
    config: AdapterConfig,
    render_mode: Option<RenderMode>,
}

impl DomAdapter<EnvironmentProbe> {
    /// Create an adapter whose render probes follow `config.headless`.
    pub fn from_config(config: AdapterConfig) -> Self {
        let probe = if config.headless {
            EnvironmentProbe::headless()
        } else {
            EnvironmentProbe::default()
        };
        Self::new(config, probe)
    }
}

impl Default for DomAdapter<EnvironmentProbe> {
    fn default() -> Self {
        Self::from_config(AdapterConfig::default())
    }
}

impl<P: RenderProbe> DomAdapter<P> {
    /// Create an adapter over a fresh document. A render mode named in the
    /// configuration is resolved immediately.
    pub fn new(config: AdapterConfig, probe: P) -> Self {
        let mut adapter = Self {
            document: Document::with_id_prefix(config.id_prefix.clone()),
            capabilities: RenderCapabilities::new(probe),
            config,
            render_mode: None,
        };
        if let Some(mode) = adapter.config.render_mode.clone() {
            adapter.set_render_mode(&mode);
        }
        adapter
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn is_headless(&self) -> bool {
        self.config.headless
    }

    /// A new drag tracker for this context.
    ///
    /// The tracker is not bound to this adapter's document. Pass
    /// [`document`](Self::document) or [`document_mut`](Self::document_mut)
    /// to each tracker call as the host.
    pub fn drag_manager(&self) -> DragManager {
        DragManager::new()
    }

    /// Add class tokens to every targeted element.
    pub fn add_class(&mut self, target: impl Into<Target>, classes: &str) -> DomResult<()> {
        for node in self.document.resolve(&target.into())? {
            self.document.update_classes(node, classes, true)?;
        }
        Ok(())
    }

    /// Remove class tokens from every targeted element.
    pub fn remove_class(&mut self, target: impl Into<Target>, classes: &str) -> DomResult<()> {
        for node in self.document.resolve(&target.into())? {
            self.document.update_classes(node, classes, false)?;
        }
        Ok(())
    }

    /// Replace the class string of every targeted element.
    pub fn set_class(&mut self, target: impl Into<Target>, class_name: &str) -> DomResult<()> {
        for node in self.document.resolve(&target.into())? {
            self.document.set_class_name(node, class_name)?;
        }
        Ok(())
    }

    /// Check whether the targeted element has the class token.
    pub fn has_class(&self, target: impl Into<Target>, class: &str) -> DomResult<bool> {
        let node = self.document.get_dom_element(&target.into())?;
        Ok(class_list::contains(self.document.class_name(node)?, class))
    }

    pub fn set_position(&mut self, node: NodeId, position: Point) -> DomResult<()> {
        self.document.set_position(node, position)
    }

    pub fn get_position(&self, node: NodeId) -> DomResult<Point> {
        self.document.get_position(node)
    }

    pub fn get_offset(&self, node: NodeId, mode: OffsetMode) -> Point {
        self.document.get_offset(node, mode)
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> DomResult<Option<String>> {
        self.document.get_attribute(node, name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.document.set_attribute(node, name, value)
    }

    pub fn append_to_root(&mut self, node: NodeId) -> DomResult<()> {
        self.document.append_to_root(node)
    }

    pub fn render_modes(&self) -> [RenderMode; 3] {
        self.capabilities.render_modes()
    }

    pub fn is_render_mode_available(&self, mode: &str) -> bool {
        self.capabilities.is_available_str(mode)
    }

    /// Resolve and remember the render mode to use. Returns the mode
    /// actually selected, or `None` when nothing suitable is available.
    pub fn set_render_mode(&mut self, requested: &str) -> Option<RenderMode> {
        self.render_mode = self.capabilities.resolve(requested);
        self.render_mode
    }

    /// The render mode last selected.
    pub fn render_mode(&self) -> Option<RenderMode> {
        self.render_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomError;
    use crate::node::Namespace;

    fn adapter_with_nodes() -> (DomAdapter, NodeId, NodeId) {
        let mut adapter = DomAdapter::default();
        let doc = adapter.document_mut();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.set_element_id(a, Some("a")).unwrap();
        doc.set_element_id(b, Some("b")).unwrap();
        doc.append_to_root(a).unwrap();
        doc.append_to_root(b).unwrap();
        (adapter, a, b)
    }

    #[test]
    fn test_class_targets() {
        let (mut adapter, a, b) = adapter_with_nodes();

        adapter.add_class(a, "node").unwrap();
        adapter.add_class("b", "node selected").unwrap();
        adapter.add_class(vec![a, b], "hover").unwrap();

        assert_eq!(adapter.document().class_name(a).unwrap(), "node hover");
        assert_eq!(adapter.document().class_name(b).unwrap(), "node selected hover");

        adapter.remove_class(vec![Target::from("a"), Target::Node(b)], "hover").unwrap();
        assert!(!adapter.has_class(a, "hover").unwrap());
        assert!(adapter.has_class("b", "selected").unwrap());

        adapter.set_class(a, "  fresh  ").unwrap();
        assert_eq!(adapter.document().class_name(a).unwrap(), "fresh");
    }

    #[test]
    fn test_svg_element_classes() {
        let (mut adapter, a, _) = adapter_with_nodes();
        let doc = adapter.document_mut();
        let path = doc.create_element_ns(Namespace::Svg, "path");
        doc.set_element_id(path, Some("edge")).unwrap();
        doc.append_child(a, path).unwrap();

        adapter.add_class("edge", "connector").unwrap();
        adapter.add_class(path, "hover").unwrap();
        assert!(adapter.has_class("edge", "connector").unwrap());
        assert_eq!(adapter.get_attribute(path, "class").unwrap().as_deref(), Some("connector hover"));

        adapter.remove_class(path, "connector hover").unwrap();
        assert!(!adapter.has_class(path, "hover").unwrap());
        assert_eq!(adapter.get_attribute(path, "class").unwrap(), None);
    }

    #[test]
    fn test_unknown_selector() {
        let (mut adapter, _, _) = adapter_with_nodes();
        assert_eq!(
            adapter.add_class("missing", "x"),
            Err(DomError::NotFound("missing".to_string()))
        );
        assert!(adapter.has_class("missing", "x").is_err());
    }

    #[test]
    fn test_render_mode_from_config() {
        let config = AdapterConfig {
            render_mode: Some("svg".to_string()),
            ..AdapterConfig::default()
        };
        let adapter = DomAdapter::from_config(config);
        assert_eq!(adapter.render_mode(), Some(RenderMode::Svg));
        assert!(adapter.is_render_mode_available("canvas"));
        assert!(!adapter.is_render_mode_available("vml"));
    }

    #[test]
    fn test_headless_has_no_render_mode() {
        let config = AdapterConfig {
            headless: true,
            render_mode: Some("svg".to_string()),
            ..AdapterConfig::default()
        };
        let mut adapter = DomAdapter::from_config(config);
        assert!(adapter.is_headless());
        assert_eq!(adapter.render_mode(), None);
        assert_eq!(adapter.set_render_mode("canvas"), None);
    }

    #[test]
    fn test_vml_only_environment() {
        let probe = EnvironmentProbe::headless().with_vml(true);
        let mut adapter = DomAdapter::new(AdapterConfig::default(), probe);
        assert_eq!(adapter.set_render_mode("svg"), Some(RenderMode::Vml));
        assert_eq!(adapter.render_modes(), RenderMode::ALL);
    }

    #[test]
    fn test_generated_ids_use_config_prefix() {
        use tether_core::IdentityService;

        let config = AdapterConfig {
            id_prefix: "flow".to_string(),
            ..AdapterConfig::default()
        };
        let mut adapter = DomAdapter::from_config(config);
        let doc = adapter.document_mut();
        let el = doc.create_element("div");
        doc.append_to_root(el).unwrap();

        let id = doc.get_id(el, None, true).unwrap();
        assert!(id.starts_with("flow_"));
        assert_eq!(adapter.get_attribute(el, "id").unwrap(), Some(id));
    }

    #[test]
    fn test_position_and_offset() {
        let (mut adapter, a, _) = adapter_with_nodes();
        let child = adapter.document_mut().create_element("span");
        adapter.document_mut().append_child(a, child).unwrap();

        adapter.set_position(a, Point::new(100.0, 40.0)).unwrap();
        adapter.set_position(child, Point::new(5.0, 6.0)).unwrap();

        assert_eq!(adapter.get_position(child).unwrap(), Point::new(5.0, 6.0));
        assert_eq!(adapter.get_offset(child, OffsetMode::ToRoot), Point::new(105.0, 46.0));
    }
}
