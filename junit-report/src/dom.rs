//! Document tree for HTML reports
//!
//! An arena of nodes addressed by [`NodeId`]. Every node knows its parent and
//! its ordered children, which gives the report decorator the sibling and
//! parent relations it classifies cells by. The tree can be serialized back
//! to HTML with [`Document::to_html`].

use std::collections::HashMap;

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Payload of a single node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The root of every document (always `NodeId` 0)
    Document,
    /// `<!DOCTYPE name [PUBLIC "public_id"] ["system_id"]>`
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    /// Position in the parent's children
    index: usize,
    children: Vec<NodeId>,
}

/// Elements that never have children or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text content is written without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// An HTML document stored as an arena of nodes
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create an empty document containing only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                index: 0,
                children: Vec::new(),
            }],
        }
    }

    /// The document root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            index: 0,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element with no attributes
    ///
    /// The name is kept as given, so imported SVG names such as
    /// `foreignObject` keep their case.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    /// Create a doctype; empty ids are left out when serializing
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(NodeKind::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        })
    }

    /// Attach `child` as the last child of `parent`
    ///
    /// A child that is already attached elsewhere is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].index = self.nodes[parent.0].children.len();
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        let index = self.nodes[node.0].index;
        self.nodes[parent.0].children.remove(index);
        for i in index..self.nodes[parent.0].children.len() {
            let sibling = self.nodes[parent.0].children[i];
            self.nodes[sibling.0].index = i;
        }
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.create_element(name);
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { .. })
    }

    /// Tag name of an element node
    pub fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Next element sibling, skipping text and comment nodes
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        siblings[self.nodes[node.0].index + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Previous element sibling, skipping text and comment nodes
    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        siblings[..self.nodes[node.0].index]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_element(c))
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing an existing value in place
    ///
    /// Has no effect on non-element nodes.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Whether the element's whitespace-separated class list contains `class`
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Set one declaration of the inline `style` attribute
    ///
    /// `declaration` is written verbatim (e.g. `"font-family: monospace"`).
    /// An existing declaration for the same property is replaced; other
    /// declarations are kept in order.
    pub fn set_style_declaration(&mut self, node: NodeId, declaration: &str) {
        let property = style_property(declaration);
        let mut declarations: Vec<String> = self
            .attr(node, "style")
            .map(|style| {
                style
                    .split(';')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        match declarations
            .iter_mut()
            .find(|d| style_property(d) == property)
        {
            Some(existing) => *existing = declaration.to_string(),
            None => declarations.push(declaration.to_string()),
        }

        self.set_attr(node, "style", &declarations.join("; "));
    }

    /// All nodes below `node` in document order (not including `node`)
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Every `id` attribute value mapped to the first element carrying it
    pub fn id_map(&self) -> HashMap<String, NodeId> {
        let mut ids = HashMap::new();
        for node in self.descendants(self.root()) {
            if let Some(id) = self.attr(node, "id") {
                ids.entry(id.to_string()).or_insert(node);
            }
        }
        ids
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        if let NodeKind::Text(text) = self.kind(node) {
            return text.clone();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serialized markup of the node's children
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        let raw = self
            .element_name(node)
            .map(|name| RAW_TEXT_ELEMENTS.contains(&name))
            .unwrap_or(false);
        for &child in self.children(node) {
            self.write_node(child, raw, &mut out);
        }
        out
    }

    /// Serialize the whole document to HTML
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    fn write_node(&self, node: NodeId, raw_text: bool, out: &mut String) {
        match self.kind(node) {
            NodeKind::Document => out.push_str(&self.inner_html(node)),
            NodeKind::Doctype {
                name,
                public_id,
                system_id,
            } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                if !public_id.is_empty() {
                    out.push_str(" PUBLIC \"");
                    out.push_str(public_id);
                    out.push('"');
                } else if !system_id.is_empty() {
                    out.push_str(" SYSTEM");
                }
                if !system_id.is_empty() {
                    out.push_str(" \"");
                    out.push_str(system_id);
                    out.push('"');
                }
                out.push('>');
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Text(text) => {
                if raw_text {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                out.push_str(&self.inner_html(node));
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn style_property(declaration: &str) -> String {
    declaration
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// <div class="feature"><table><tr class="table_header"><td>A</td></tr>
    /// <tr><td>x</td> <td>y</td></tr></table></div>
    fn sample() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "body");
        let div = doc.append_element(body, "div");
        doc.set_attr(div, "class", "feature wide");
        let table = doc.append_element(div, "table");
        let header = doc.append_element(table, "tr");
        doc.set_attr(header, "class", "table_header");
        let h = doc.append_element(header, "td");
        doc.append_text(h, "A");
        let row = doc.append_element(table, "tr");
        let x = doc.append_element(row, "td");
        doc.append_text(x, "x");
        doc.append_text(row, " ");
        let y = doc.append_element(row, "td");
        doc.append_text(y, "y");
        (doc, vec![h, x, y])
    }

    #[test]
    fn test_sibling_relations_skip_text() {
        let (doc, cells) = sample();
        let (h, x, y) = (cells[0], cells[1], cells[2]);
        assert_eq!(doc.next_sibling(x), Some(y));
        assert_eq!(doc.prev_sibling(y), Some(x));
        assert_eq!(doc.next_sibling(y), None);
        assert_eq!(doc.prev_sibling(x), None);
        assert_eq!(doc.next_sibling(h), None);
        assert_eq!(doc.next_sibling(doc.root()), None);
    }

    #[test]
    fn test_id_map_keeps_first_element() {
        let mut doc = Document::new();
        let div = doc.append_element(doc.root(), "div");
        doc.set_attr(div, "id", "summary");
        let span = doc.append_element(div, "span");
        doc.set_attr(span, "id", "summary");
        let a = doc.append_element(doc.root(), "a");
        doc.set_attr(a, "id", "LoginTest");

        let ids = doc.id_map();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.get("summary"), Some(&div));
        assert_eq!(ids.get("LoginTest"), Some(&a));
        assert_eq!(ids.get("missing"), None);
    }

    #[test]
    fn test_doctype_ids_are_written() {
        let mut doc = Document::new();
        let dt = doc.create_doctype("html", "-//W3C//DTD HTML 4.01//EN", "");
        doc.append_child(doc.root(), dt);
        assert_eq!(doc.to_html(), r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN">"#);

        let mut doc = Document::new();
        let dt = doc.create_doctype("html", "", "about:legacy-compat");
        doc.append_child(doc.root(), dt);
        assert_eq!(doc.to_html(), r#"<!DOCTYPE html SYSTEM "about:legacy-compat">"#);
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        let mut doc = Document::new();
        for name in ["xmp", "noembed", "p"] {
            let el = doc.append_element(doc.root(), name);
            doc.append_text(el, "a < b");
        }
        assert_eq!(
            doc.to_html(),
            "<xmp>a < b</xmp><noembed>a < b</noembed><p>a &lt; b</p>"
        );
    }

    #[test]
    fn test_element_names_keep_case() {
        let mut doc = Document::new();
        let svg = doc.append_element(doc.root(), "svg");
        doc.append_element(svg, "foreignObject");
        assert_eq!(doc.to_html(), "<svg><foreignObject></foreignObject></svg>");
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut doc = Document::new();
        let td = doc.append_element(doc.root(), "td");
        doc.set_attr(td, "style", "color:red");
        doc.set_attr(td, "style", "color:blue");
        assert_eq!(doc.attr(td, "style"), Some("color:blue"));
        assert_eq!(doc.to_html(), r#"<td style="color:blue"></td>"#);
    }

    #[test]
    fn test_style_declarations_merge_by_property() {
        let mut doc = Document::new();
        let td = doc.append_element(doc.root(), "td");
        doc.set_style_declaration(td, "background-color:#afa");
        assert_eq!(doc.attr(td, "style"), Some("background-color:#afa"));

        doc.set_style_declaration(td, "font-family: monospace");
        doc.set_style_declaration(td, "background-color:#faa");
        assert_eq!(
            doc.attr(td, "style"),
            Some("background-color:#faa; font-family: monospace")
        );
    }

    #[test]
    fn test_serialization() {
        let mut doc = Document::new();
        let dt = doc.create_doctype("html", "", "");
        doc.append_child(doc.root(), dt);
        let html = doc.append_element(doc.root(), "html");
        let head = doc.append_element(html, "head");
        let meta = doc.append_element(head, "meta");
        doc.set_attr(meta, "charset", "utf-8");
        let script = doc.append_element(head, "script");
        doc.append_text(script, "if (a < b && c) {}");
        let body = doc.append_element(html, "body");
        let p = doc.append_element(body, "p");
        doc.set_attr(p, "title", "say \"hi\" & go");
        doc.append_text(p, "1 < 2 & 3 > 2");
        let c = doc.create_comment(" done ");
        doc.append_child(body, c);

        assert_eq!(
            doc.to_html(),
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
             <script>if (a < b && c) {}</script></head><body>\
             <p title=\"say &quot;hi&quot; &amp; go\">1 &lt; 2 &amp; 3 &gt; 2</p>\
             <!-- done --></body></html>"
        );
    }

    #[test]
    fn test_text_content_and_inner_html() {
        let mut doc = Document::new();
        let td = doc.append_element(doc.root(), "td");
        let b = doc.append_element(td, "b");
        doc.append_text(b, "Login");
        doc.append_text(td, "Test");
        assert_eq!(doc.text_content(td), "LoginTest");
        assert_eq!(doc.inner_html(td), "<b>Login</b>Test");
    }

    #[test]
    fn test_append_child_moves_node() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.root(), "div");
        let b = doc.append_element(doc.root(), "div");
        let span = doc.append_element(a, "span");
        doc.append_child(b, span);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[span]);
        assert_eq!(doc.parent(span), Some(b));
    }

    #[test]
    fn test_siblings_after_move() {
        let mut doc = Document::new();
        let tr = doc.append_element(doc.root(), "tr");
        let first = doc.append_element(tr, "td");
        let second = doc.append_element(tr, "td");
        let third = doc.append_element(tr, "td");
        let other = doc.append_element(doc.root(), "tr");

        doc.append_child(other, first);
        assert_eq!(doc.prev_sibling(second), None);
        assert_eq!(doc.next_sibling(second), Some(third));
        assert_eq!(doc.prev_sibling(third), Some(second));

        doc.append_child(tr, first);
        assert_eq!(doc.children(tr), &[second, third, first]);
        assert_eq!(doc.next_sibling(third), Some(first));
        assert_eq!(doc.next_sibling(first), None);
        assert!(doc.children(other).is_empty());
    }
}
