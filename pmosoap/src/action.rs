//! Actions RPC (style UPnP) portées par le corps SOAP
//!
//! An action is the first element of the `Body`: its qualified name names
//! the action and its children are text-valued arguments.
//!
//! ```ignore
//! <u:Play xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
//!   <InstanceID>0</InstanceID>
//!   <Speed>1</Speed>
//! </u:Play>
//! ```

use xmltree::{Element, Namespace, XMLNode};

use crate::envelope::Envelope;
use crate::qname::{child_elements, text_of};

const ACTION_PREFIX: &str = "u";

/// Action extraite ou à placer dans une enveloppe SOAP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapAction {
    /// Nom de l'action (ex: "Play", "SetAVTransportURI")
    pub name: String,

    /// Namespace de l'action (ex: "urn:schemas-upnp-org:service:AVTransport:1")
    pub namespace: Option<String>,

    /// Arguments, in document order
    pub args: Vec<(String, String)>,
}

impl SoapAction {
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, name: &str, value: &str) -> Self {
        self.args.push((name.to_string(), value.to_string()));
        self
    }

    /// First argument called `name`
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Response action for this one: same namespace, `{name}Response`.
    pub fn response(&self) -> Self {
        Self {
            name: format!("{}Response", self.name),
            namespace: self.namespace.clone(),
            args: Vec::new(),
        }
    }

    pub fn from_element(element: &Element) -> Self {
        let args = child_elements(element)
            .map(|e| (e.name.clone(), text_of(e)))
            .collect();

        Self {
            name: element.name.clone(),
            namespace: element.namespace.clone().filter(|ns| !ns.is_empty()),
            args,
        }
    }

    /// Builds `{namespace}name`, declaring the namespace under the `u` prefix.
    pub fn to_element(&self) -> Element {
        let mut action = Element::new(&self.name);
        if let Some(ns) = &self.namespace {
            let mut namespaces = Namespace::empty();
            namespaces.put(ACTION_PREFIX, ns.as_str());
            action.prefix = Some(ACTION_PREFIX.to_string());
            action.namespace = Some(ns.clone());
            action.namespaces = Some(namespaces);
        }

        for (name, value) in &self.args {
            let mut child = Element::new(name);
            if !value.is_empty() {
                child.children.push(XMLNode::Text(value.clone()));
            }
            action.children.push(XMLNode::Element(child));
        }
        action
    }
}

impl Envelope {
    /// Envelope whose body is the single `action` element
    pub fn for_action(action: &SoapAction) -> Self {
        Envelope::new().with_body(action.to_element())
    }

    /// Action carried by the first body element, if any.
    pub fn action(&self) -> Option<SoapAction> {
        self.body.first().map(SoapAction::from_element)
    }
}
