//! XML Event Types
//!
//! Event types for pull-parser style XML processing.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

/// XML parsing event
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(EndElement<'a>),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// Text content between tags
    Text(Cow<'a, str>),
    /// CDATA section content
    CData(Cow<'a, str>),
    /// Comment content
    Comment(Cow<'a, str>),
    /// Processing instruction: <?target data?>
    ProcessingInstruction {
        target: Cow<'a, str>,
        data: Cow<'a, str>,
    },
    /// XML declaration: <?xml version="1.0"?>
    XmlDeclaration {
        version: Option<Cow<'a, str>>,
        encoding: Option<Cow<'a, str>>,
    },
    /// DOCTYPE declaration
    DocType(Cow<'a, str>),
    /// End of document
    EndDocument,
}

/// Start element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement<'a> {
    /// Full element name (may include prefix)
    pub name: Cow<'a, str>,
    /// Element attributes in document order
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, attributes: Vec<Attribute<'a>>) -> Self {
        StartElement {
            name: name.into(),
            attributes,
        }
    }

    /// Value of the attribute at `index` in document order
    pub fn attribute_at(&self, index: usize) -> Option<&str> {
        self.attributes.get(index).map(|a| a.value.as_ref())
    }
}

/// End element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement<'a> {
    /// Full element name
    pub name: Cow<'a, str>,
}

impl<'a> EndElement<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        EndElement { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_element_positional_access() {
        let elem = StartElement::new(
            "concept",
            vec![Attribute::new("name", "c1"), Attribute::new("score", "0.8")],
        );
        assert_eq!(elem.attribute_at(0), Some("c1"));
        assert_eq!(elem.attribute_at(1), Some("0.8"));
        assert_eq!(elem.attribute_at(2), None);
    }
}
