use super::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let element = Element { tag_name, attrs };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            if !id_attr.is_empty() {
                self.id_index.insert(id_attr, id);
            }
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn parent_element(&self, node_id: NodeId) -> Option<NodeId> {
        self.parent(node_id)
            .filter(|parent| self.element(*parent).is_some())
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id.0].children
    }

    pub(crate) fn element_children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.nodes[node_id.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    pub(crate) fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let mut previous = None;
        for child in &self.nodes[parent.0].children {
            if *child == node_id {
                return previous;
            }
            if self.element(*child).is_some() {
                previous = Some(*child);
            }
        }
        None
    }

    pub(crate) fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let mut seen_self = false;
        for child in &self.nodes[parent.0].children {
            if *child == node_id {
                seen_self = true;
                continue;
            }
            if seen_self && self.element(*child).is_some() {
                return Some(*child);
            }
        }
        None
    }

    pub(crate) fn ancestor_path(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.parent(node);
        }
        path.reverse();
        path
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            match &self.nodes[node.0].node_type {
                NodeType::Element(element) => {
                    if let Some(id) = element.attrs.get("id") {
                        if !id.is_empty() {
                            next.insert(id.clone(), node);
                        }
                    }
                }
                NodeType::Document | NodeType::Text(_) => {}
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn collect_descendant_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    // Attributes.

    pub(crate) fn attribute(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.rebuild_id_index();
        }
    }

    // Dataset entries live in data-* attributes.

    pub(crate) fn data_value(&self, node_id: NodeId, key: &str) -> Option<String> {
        self.attribute(node_id, &dataset_key_to_attr_name(key))
    }

    pub(crate) fn set_data_value(&mut self, node_id: NodeId, key: &str, value: &str) {
        self.set_attribute(node_id, &dataset_key_to_attr_name(key), value);
    }

    // Classes.

    pub(crate) fn has_class(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id)
            .map(|element| has_class(element, class_name))
            .unwrap_or(false)
    }

    pub(crate) fn add_class(&mut self, node_id: NodeId, class_name: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|c| c == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
    }

    pub(crate) fn remove_class(&mut self, node_id: NodeId, class_name: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|c| c != class_name);
        set_class_attr(element, &classes);
    }

    pub(crate) fn toggle_class(&mut self, node_id: NodeId, class_name: &str) {
        if self.has_class(node_id, class_name) {
            self.remove_class(node_id, class_name);
        } else {
            self.add_class(node_id, class_name);
        }
    }

    // Inline style.

    pub(crate) fn style_property(&self, node_id: NodeId, name: &str) -> Option<String> {
        let style_attr = self.attribute(node_id, "style");
        let name = js_prop_to_css_name(name);
        parse_style_declarations(style_attr.as_deref())
            .into_iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn set_style_property(&mut self, node_id: NodeId, name: &str, value: &str) {
        if self.element(node_id).is_none() {
            return;
        }
        let style_attr = self.attribute(node_id, "style");
        let mut decls = parse_style_declarations(style_attr.as_deref());
        let decl = format!("{}: {}", js_prop_to_css_name(name), value);
        push_style_declaration(&decl, &mut decls);
        self.set_attribute(node_id, "style", &serialize_style_declarations(&decls));
    }

    pub(crate) fn is_visible(&self, node_id: NodeId) -> bool {
        self.style_property(node_id, "display").as_deref() != Some("none")
    }

    // Markup content.

    pub(crate) fn inner_html(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[node_id.0].children {
            out.push_str(&self.dump_node(*child));
        }
        out
    }

    pub(crate) fn set_inner_html(&mut self, node_id: NodeId, html: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Ok(());
        }
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        parse_fragment_into(self, node_id, html)?;
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                for (k, v) in &element.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                out.push('>');
                if is_void_tag(&element.tag_name) {
                    return out;
                }
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }

    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => "#document".to_string(),
            NodeType::Text(_) => "#text".to_string(),
            NodeType::Element(element) => match element.attrs.get("id") {
                Some(id) if !id.is_empty() => format!("{}#{}", element.tag_name, id),
                _ => element.tag_name.clone(),
            },
        }
    }
}

pub(crate) fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

pub(crate) fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| {
            value
                .split_whitespace()
                .filter(|token| !token.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

pub(crate) fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}

pub(crate) fn dataset_key_to_attr_name(key: &str) -> String {
    format!("data-{}", js_prop_to_css_name(key))
}

pub(crate) fn js_prop_to_css_name(prop: &str) -> String {
    let mut out = String::new();
    for ch in prop.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    for decl in style_attr.split(';') {
        push_style_declaration(decl, &mut out);
    }
    out
}

pub(crate) fn push_style_declaration(raw_decl: &str, out: &mut Vec<(String, String)>) {
    let decl = raw_decl.trim();
    if decl.is_empty() {
        return;
    }
    let Some((name, value)) = decl.split_once(':') else {
        return;
    };
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return;
    }
    let value = value.trim().to_string();
    if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
        out[pos].1 = value;
    } else {
        out.push((name, value));
    }
}

pub(crate) fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    let mut out = String::new();
    for (idx, (name, value)) in decls.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}
