//! scope tree
//!
//! A [Tree] mirrors the nesting of the document being decoded. Every block registers its type name and labels as
//! a path of nodes, every evaluated attribute is stored as an item on the node of the body it belongs to.
//!
//! ```hcl
//! region = "eu"
//!
//! server "alpha" {
//!   port = 80
//! }
//! ```
//!
//! decodes into
//!
//! ```text
//! var                  { region = "eu" }
//! └── server
//!     └── alpha        { port = 80 }
//! ```
//!
//! The root is named [Segment::Var]. Its [Tree::snapshot] also exposes itself under `var`, so expressions may
//! refer to `region`, `var.region` or `server.alpha.port`.
//!
//! Structural changes (adding or removing children) and item storage are guarded by separate locks. Readers copy
//! the list of children under a short read lock and recurse without holding it.
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Well-known path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// name of the root node and the key under which the root exposes itself
    Var,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Var => "var",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct Tree {
    name: String,
    data: RwLock<IndexMap<String, hcl::Value>>,
    children: RwLock<Vec<Arc<Tree>>>,
    parent: Weak<Tree>,
}

impl Tree {
    pub fn new(name: impl Into<String>) -> Arc<Tree> {
        Arc::new(Tree {
            name: name.into(),
            data: RwLock::default(),
            children: RwLock::default(),
            parent: Weak::new(),
        })
    }

    /// Fresh root node for one decode call
    pub fn root() -> Arc<Tree> {
        Tree::new(Segment::Var.as_str())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Arc<Tree>> {
        self.parent.upgrade()
    }

    /// Copy of the current list of children
    pub fn children(&self) -> Vec<Arc<Tree>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the child called `name`, creating it if it does not exist yet
    pub fn add_node(self: &Arc<Self>, name: &str) -> Arc<Tree> {
        let mut children = self
            .children
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = children.iter().find(|child| child.name == name) {
            return Arc::clone(existing);
        }

        let child = Arc::new(Tree {
            name: name.to_owned(),
            data: RwLock::default(),
            children: RwLock::default(),
            parent: Arc::downgrade(self),
        });
        children.push(Arc::clone(&child));
        child
    }

    /// Get or create every node along `path`, returning the last one
    pub fn add_nodes<S: AsRef<str>>(self: &Arc<Self>, path: &[S]) -> Arc<Tree> {
        path.iter()
            .fold(Arc::clone(self), |node, name| node.add_node(name.as_ref()))
    }

    /// Follow `path` from this node. An empty path yields this node.
    pub fn get_node<S: AsRef<str>>(self: &Arc<Self>, path: &[S]) -> Option<Arc<Tree>> {
        let mut node = Arc::clone(self);
        for name in path {
            let next = node
                .children()
                .into_iter()
                .find(|child| child.name == name.as_ref())?;
            node = next;
        }
        Some(node)
    }

    /// Depth-first search for a node reachable by consuming `path` from anywhere below this node
    pub fn find_node<S: AsRef<str>>(&self, path: &[S]) -> Option<Arc<Tree>> {
        let (first, rest) = path.split_first()?;

        for child in self.children() {
            if child.name == first.as_ref() {
                if rest.is_empty() {
                    return Some(child);
                }
                if let Some(found) = child.find_node(rest) {
                    return Some(found);
                }
            }
            if let Some(found) = child.find_node(path) {
                return Some(found);
            }
        }

        None
    }

    /// Remove the child called `name`
    pub fn delete_node(&self, name: &str) -> Option<Arc<Tree>> {
        let mut children = self
            .children
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let index = children.iter().position(|child| child.name == name)?;
        Some(children.remove(index))
    }

    pub fn add_item(&self, key: impl Into<String>, value: hcl::Value) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    pub fn delete_item(&self, key: &str) -> Option<hcl::Value> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(key)
    }

    pub fn item(&self, key: &str) -> Option<hcl::Value> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Nested copy of everything visible from this node: children by name, then this node's own items
    pub fn snapshot(&self) -> hcl::value::Map<String, hcl::Value> {
        let mut hash = hcl::value::Map::new();

        for child in self.children() {
            hash.insert(child.name.clone(), hcl::Value::Object(child.snapshot()));
        }

        {
            let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
            for (key, value) in data.iter() {
                if key != Segment::Var.as_str() {
                    hash.insert(key.clone(), value.clone());
                }
            }
        }

        if self.name == Segment::Var.as_str() {
            let copy = hash.clone();
            hash.insert(Segment::Var.to_string(), hcl::Value::Object(copy));
        }

        hash
    }
}
