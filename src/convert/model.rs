/// Generic document tree shared by the reader, the rewrite engine and the
/// emitter. A node is either an element or a text run; SQL text and nested
/// tags interleave in `children`, so child order is semantic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Builds a text run. Text runs are created only after trimming and
    /// blank rejection, so an empty payload is a programming error.
    pub fn text(text: impl Into<String>) -> Node {
        let text = text.into();
        debug_assert!(!text.trim().is_empty(), "blank text run");
        Node::Text(text)
    }
}

/// One attribute. Attributes keep their insertion order so emitted markup
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Attr {
        Attr {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        get_attr(&self.attrs, name)
    }

    /// Overwrites an existing attribute in place, otherwise appends.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attr::new(name, value)),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }
}

pub fn get_attr<'a>(attrs: &'a [Attr], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
}

/// Removes the named attribute and returns its value.
pub fn take_attr(attrs: &mut Vec<Attr>, name: &str) -> Option<String> {
    attrs
        .iter()
        .position(|a| a.name == name)
        .map(|i| attrs.remove(i).value)
}
