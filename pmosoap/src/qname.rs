//! Noms qualifiés et comparaison structurelle d'éléments

use std::fmt;

use xmltree::{Element, XMLNode};

use crate::SOAP_NAMESPACE;

/// Namespace-qualified element name.
///
/// Displayed in Clark notation (`{namespace}local`), or as the bare local
/// name when the element has no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Name in the SOAP envelope namespace
    pub fn soap(local: &str) -> Self {
        Self::new(Some(SOAP_NAMESPACE), local)
    }

    pub fn of(element: &Element) -> Self {
        Self {
            namespace: element.namespace.clone().filter(|ns| !ns.is_empty()),
            local: element.name.clone(),
        }
    }

    pub fn matches(&self, element: &Element) -> bool {
        let namespace = element.namespace.as_deref().filter(|ns| !ns.is_empty());
        element.name == self.local && namespace == self.namespace.as_deref()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// True when `element` is `{SOAP_NAMESPACE}local`.
pub fn is_soap(element: &Element, local: &str) -> bool {
    element.name == local && element.namespace.as_deref() == Some(SOAP_NAMESPACE)
}

/// Iterates over the element children of `element`, in document order.
pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|n| n.as_element())
}

/// Concatenated text content of the direct children.
pub fn text_of(element: &Element) -> String {
    let mut text = String::new();
    for child in &element.children {
        match child {
            XMLNode::Text(t) | XMLNode::CData(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Structural equality between two elements.
///
/// Compares qualified names, attributes, element children (recursively, in
/// order) and trimmed text content. Prefixes and in-scope namespace
/// declarations are ignored, so a freshly built element compares equal to
/// the same element read back from its serialized form.
pub fn same_element(a: &Element, b: &Element) -> bool {
    if QName::of(a) != QName::of(b) || a.attributes != b.attributes {
        return false;
    }
    if text_of(a).trim() != text_of(b).trim() {
        return false;
    }

    let mut left = child_elements(a);
    let mut right = child_elements(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) if same_element(l, r) => continue,
            _ => return false,
        }
    }
}

/// Pairwise [`same_element`] over two sequences.
pub fn same_elements(a: &[Element], b: &[Element]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(l, r)| same_element(l, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_element(name: &str, text: &str) -> Element {
        let mut elem = Element::new(name);
        elem.children.push(XMLNode::Text(text.to_string()));
        elem
    }

    #[test]
    fn test_clark_notation() {
        assert_eq!(
            QName::soap("Envelope").to_string(),
            "{http://schemas.xmlsoap.org/soap/envelope/}Envelope"
        );
        assert_eq!(QName::new(None, "Foo").to_string(), "Foo");
        assert_eq!(QName::new(Some(""), "Foo").to_string(), "Foo");
    }

    #[test]
    fn test_matches_ignores_prefix() {
        let mut elem = Element::new("Body");
        elem.prefix = Some("s".to_string());
        elem.namespace = Some(SOAP_NAMESPACE.to_string());

        assert!(QName::soap("Body").matches(&elem));
        assert!(is_soap(&elem, "Body"));
        assert!(!is_soap(&elem, "Header"));
    }

    #[test]
    fn test_unqualified_is_not_soap() {
        let elem = Element::new("Body");
        assert!(!is_soap(&elem, "Body"));
    }

    #[test]
    fn test_same_element_recurses() {
        let mut a = Element::new("Discover");
        a.children
            .push(XMLNode::Element(text_element("RequestType", "MDSCHEMA")));
        let mut b = a.clone();
        b.prefix = Some("x".to_string());
        assert!(same_element(&a, &b));

        let mut c = Element::new("Discover");
        c.children
            .push(XMLNode::Element(text_element("RequestType", "OTHER")));
        assert!(!same_element(&a, &c));
    }

    #[test]
    fn test_same_element_child_count() {
        let mut a = Element::new("List");
        a.children.push(XMLNode::Element(Element::new("Item")));
        let mut b = a.clone();
        b.children.push(XMLNode::Element(Element::new("Item")));

        assert!(!same_element(&a, &b));
        assert!(!same_elements(&[a.clone()], &[a, b]));
    }

    #[test]
    fn test_text_of_concatenates() {
        let mut elem = Element::new("detail");
        elem.children.push(XMLNode::Text("a".to_string()));
        elem.children.push(XMLNode::CData("b".to_string()));
        elem.children.push(XMLNode::Comment("ignored".to_string()));
        assert_eq!(text_of(&elem), "ab");
    }
}
