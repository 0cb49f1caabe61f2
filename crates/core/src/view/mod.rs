use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Element>,
    },
    Text(String),
}

/// Tags serialised without a closing tag.
const VOID_TAGS: &[&str] = &["img", "meta", "br", "hr", "link"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self::Node {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Self::Node { attrs, .. } = &mut self {
            attrs.push((name, value.into()));
        }
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, child: Element) -> Self {
        if let Self::Node { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn children(mut self, items: impl IntoIterator<Item = Element>) -> Self {
        if let Self::Node { children, .. } = &mut self {
            children.extend(items);
        }
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Node { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str()),
            Self::Text(_) => None,
        }
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Node { children, .. } => children.iter().map(Element::text_content).collect(),
        }
    }

    /// Depth-first search for elements satisfying `predicate`.
    pub fn find_all<'a>(&'a self, predicate: &impl Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(predicate, &mut found);
        found
    }

    fn collect<'a>(&'a self, predicate: &impl Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if predicate(self) {
            out.push(self);
        }
        if let Self::Node { children, .. } = self {
            for child in children {
                child.collect(predicate, out);
            }
        }
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Node { tag, .. } => Some(*tag),
            Self::Text(_) => None,
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape(text)),
            Self::Node {
                tag,
                attrs,
                children,
            } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value));
                }
                out.push('>');
                if VOID_TAGS.contains(tag) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_nested_elements() {
        let html = Element::new("div")
            .class("hero")
            .child(Element::new("h1").child(Element::text("MOON")))
            .child(Element::new("img").attr("src", "a.png"))
            .to_html();
        assert_eq!(
            html,
            r#"<div class="hero"><h1>MOON</h1><img src="a.png"></div>"#
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = Element::new("a")
            .attr("href", "https://x.test/?a=1&b=\"2\"")
            .child(Element::text("<b>"))
            .to_html();
        assert_eq!(
            html,
            r#"<a href="https://x.test/?a=1&amp;b=&quot;2&quot;">&lt;b&gt;</a>"#
        );
    }

    #[test]
    fn finds_descendants() {
        let tree = Element::new("ul").children(
            ["one", "two"]
                .into_iter()
                .map(|t| Element::new("li").child(Element::text(t))),
        );
        let items = tree.find_all(&|e: &Element| e.tag() == Some("li"));
        assert_eq!(items.len(), 2);
        assert_eq!(tree.text_content(), "onetwo");
    }
}
