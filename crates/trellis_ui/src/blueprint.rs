//! Declarative subtrees and the loader hand-off.
//!
//! A [`NodeBlueprint`] is plain data: it can be parsed and validated on a
//! loader thread, then sent to the thread that owns the scene. Only that
//! thread turns blueprints into nodes.
//!
//! ```toml
//! type = "Container"
//! name = "menu"
//!
//! [properties]
//! w = 200
//! h = 120
//!
//! [[children]]
//! type = "ColoredQuad"
//! name = "menu_background"
//! properties = { anchors = "all", color = "203040ff" }
//! ```

use std::collections::{BTreeMap, HashSet};

use crossbeam_channel::{Receiver, SendError, Sender};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SceneError, SceneResult};
use crate::factory::NodeFactory;
use crate::node::NodeId;
use crate::scene::Scene;

/// A property value as written in a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// `true` / `false`.
    Flag(bool),
    /// Any number.
    Number(f64),
    /// Anything else, passed through as is.
    Text(String),
}

impl PropertyValue {
    /// The value in the string form the property protocol expects.
    #[must_use]
    pub fn to_property_string(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A node and its subtree, as data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeBlueprint {
    /// Factory type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Node name. Empty names are generated.
    #[serde(default)]
    pub name: String,
    /// Properties applied in key order before children are attached.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Child nodes and animators.
    #[serde(default)]
    pub children: Vec<NodeBlueprint>,
}

impl NodeBlueprint {
    /// Creates a blueprint without properties or children.
    #[must_use]
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Adds a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the document does not parse.
    pub fn from_toml_str(source: &str) -> SceneResult<Self> {
        toml::from_str(source).map_err(|e| SceneError::InvalidConfig(e.to_string()))
    }

    /// Number of nodes in the subtree, this one included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Checks type names and name uniqueness without touching a scene.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` or `ObjectExists` for the first offending node.
    pub fn validate(&self, factory: &NodeFactory) -> SceneResult<()> {
        let mut names = HashSet::new();
        self.validate_into(factory, &mut names)
    }

    fn validate_into<'a>(&'a self, factory: &NodeFactory, names: &mut HashSet<&'a str>) -> SceneResult<()> {
        if !factory.contains(&self.type_name) {
            return Err(SceneError::UnknownType(self.type_name.clone()));
        }
        if !self.name.is_empty() && !names.insert(self.name.as_str()) {
            return Err(SceneError::ObjectExists(self.name.clone()));
        }
        self.children
            .iter()
            .try_for_each(|child| child.validate_into(factory, names))
    }
}

/// A blueprint waiting for the scene thread.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubtree {
    /// The subtree.
    pub blueprint: NodeBlueprint,
    /// Name of the node to attach to. None makes it a root.
    pub parent: Option<String>,
}

/// Loader side of the hand-off. Cheap to clone, one per loader thread.
#[derive(Debug, Clone)]
pub struct SubtreeSender {
    sender: Sender<PendingSubtree>,
}

impl SubtreeSender {
    /// Queues a subtree for the scene thread.
    ///
    /// # Errors
    ///
    /// Fails if the inbox was dropped.
    pub fn send(&self, blueprint: NodeBlueprint, parent: Option<String>) -> Result<(), SendError<PendingSubtree>> {
        self.sender.send(PendingSubtree { blueprint, parent })
    }
}

/// Scene side of the hand-off.
#[derive(Debug)]
pub struct SubtreeInbox {
    receiver: Receiver<PendingSubtree>,
}

impl SubtreeInbox {
    /// Number of queued subtrees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Creates a loader-to-scene channel.
#[must_use]
pub fn handoff() -> (SubtreeSender, SubtreeInbox) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (SubtreeSender { sender }, SubtreeInbox { receiver })
}

impl Scene {
    /// Builds a blueprint and attaches it to `parent`, or as a root.
    ///
    /// Unknown properties only warn. On a structural error the partly
    /// built subtree is destroyed and the scene is left as it was.
    ///
    /// # Errors
    ///
    /// Returns the first structural error: `UnknownType`, `ObjectExists`,
    /// `InvalidChild`, or an attach error.
    pub fn instantiate(&mut self, blueprint: &NodeBlueprint, parent: Option<NodeId>) -> SceneResult<NodeId> {
        let root = self.build(blueprint)?;
        let attached = match parent {
            Some(parent) => self.add_child(parent, root),
            None => self.add_root(root),
        };
        if let Err(err) = attached {
            self.destroy(root);
            return Err(err);
        }
        debug!(node = %root, nodes = blueprint.count(), "Blueprint instantiated");
        Ok(root)
    }

    fn build(&mut self, blueprint: &NodeBlueprint) -> SceneResult<NodeId> {
        let id = self.create(&blueprint.type_name, blueprint.name.clone())?;
        for (name, value) in &blueprint.properties {
            self.set_property(id, name, &value.to_property_string());
        }
        for child in &blueprint.children {
            let attached = match self.build(child) {
                Ok(child_id) => self.add_child(id, child_id).map_err(|err| {
                    self.destroy(child_id);
                    err
                }),
                Err(err) => Err(err),
            };
            if let Err(err) = attached {
                self.destroy(id);
                return Err(err);
            }
        }
        Ok(id)
    }

    /// Instantiates every queued subtree. Parents are looked up by name.
    pub fn drain_inbox(&mut self, inbox: &SubtreeInbox) -> Vec<SceneResult<NodeId>> {
        inbox
            .receiver
            .try_iter()
            .map(|pending| {
                let parent = match pending.parent {
                    Some(name) => Some(self.find(&name).ok_or(SceneError::NodeNotFound(name))?),
                    None => None,
                };
                self.instantiate(&pending.blueprint, parent)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MENU: &str = r#"
        type = "Container"
        name = "menu"

        [properties]
        w = 200
        h = 120
        clip = true

        [[children]]
        type = "ColoredQuad"
        name = "background"
        properties = { anchors = "all", color = "203040ff" }

        [[children]]
        type = "AlphaChanger"
        name = "pulse"
        properties = { amplitude = 40, offset = 200, periods = -1 }
    "#;

    #[test]
    fn test_parses_toml() {
        let blueprint = NodeBlueprint::from_toml_str(MENU).expect("parse");
        assert_eq!(blueprint.type_name, "Container");
        assert_eq!(blueprint.count(), 3);
        assert_eq!(blueprint.properties.get("clip"), Some(&PropertyValue::Flag(true)));
        assert_eq!(blueprint.children[0].properties["anchors"], PropertyValue::Text("all".into()));
    }

    #[test]
    fn test_validate() {
        let factory = NodeFactory::with_builtins();
        NodeBlueprint::from_toml_str(MENU).expect("parse").validate(&factory).expect("valid");

        let unknown = NodeBlueprint::new("Container", "a").with_child(NodeBlueprint::new("Slider", "s"));
        assert_eq!(unknown.validate(&factory), Err(SceneError::UnknownType("Slider".into())));

        let duplicate = NodeBlueprint::new("Container", "a").with_child(NodeBlueprint::new("Container", "a"));
        assert_eq!(duplicate.validate(&factory), Err(SceneError::ObjectExists("a".into())));
    }

    #[test]
    fn test_instantiate_applies_properties() {
        let mut scene = Scene::new();
        let blueprint = NodeBlueprint::from_toml_str(MENU).expect("parse");
        let menu = scene.instantiate(&blueprint, None).expect("instantiate");

        assert_eq!(scene.roots(), &[menu]);
        let visual = scene.visual(menu).expect("visual");
        assert_eq!(visual.size(), trellis_core::Vec2::new(200.0, 120.0));
        assert!(visual.clips());

        let background = scene.find("background").expect("built");
        assert_eq!(scene.parent(background), Some(menu));
        assert_eq!(scene.node(menu).expect("node").animators().len(), 1);
    }

    #[test]
    fn test_failed_instantiate_leaves_scene_unchanged() {
        let mut scene = Scene::new();
        scene.create_container("taken", trellis_core::Rect::ZERO).expect("create");
        let before = scene.len();

        let blueprint = NodeBlueprint::new("Container", "fresh")
            .with_child(NodeBlueprint::new("Container", "fresh_child"))
            .with_child(NodeBlueprint::new("Container", "taken"));
        assert_eq!(
            scene.instantiate(&blueprint, None),
            Err(SceneError::ObjectExists("taken".into()))
        );
        assert_eq!(scene.len(), before);
        assert!(scene.find("fresh").is_none());
        assert!(scene.find("fresh_child").is_none());
    }

    #[test]
    fn test_handoff_between_threads() {
        let (sender, inbox) = handoff();
        let loader = std::thread::spawn(move || {
            let factory = NodeFactory::with_builtins();
            let blueprint = NodeBlueprint::from_toml_str(MENU).expect("parse");
            blueprint.validate(&factory).expect("valid");
            sender.send(blueprint, None).expect("inbox alive");
            sender
                .send(NodeBlueprint::new("ColoredQuad", "badge"), Some("menu".into()))
                .expect("inbox alive");
            sender
                .send(NodeBlueprint::new("ColoredQuad", "orphan"), Some("missing".into()))
                .expect("inbox alive");
        });
        loader.join().expect("loader");

        let mut scene = Scene::new();
        assert_eq!(inbox.len(), 3);
        let results = scene.drain_inbox(&inbox);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(results[2], Err(SceneError::NodeNotFound("missing".into())));

        let menu = scene.find("menu").expect("menu");
        let badge = scene.find("badge").expect("badge");
        assert_eq!(scene.parent(badge), Some(menu));
        assert!(inbox.is_empty());
    }
}
