//! SAX (Simple API for XML) Module
//!
//! Push-style callbacks on top of the pull reader:
//!
//! ```text
//! SliceReader ---> drive() ---> SaxHandler (start / end / characters)
//! ```
//!
//! Empty elements (`<concept .../>`) are delivered as a start callback
//! immediately followed by an end callback, so handlers see one open and
//! one close per element regardless of syntax. Each event is fully handled
//! before the next one is read; the first error from either side stops
//! the drive.

use crate::core::tokenizer::ParseError;
use crate::reader::{SliceReader, StartElement, XmlEvent};

/// Receives document events in order
pub trait SaxHandler {
    /// Error type; must absorb well-formedness failures from the reader
    type Error: From<ParseError>;

    /// An element opened (attributes in document order)
    fn start_element(&mut self, element: &StartElement<'_>) -> Result<(), Self::Error>;

    /// An element closed
    fn end_element(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Character data inside the root element (text and CDATA)
    fn characters(&mut self, _text: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// The input was exhausted after a complete root element
    fn end_document(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Pump every event of `input` into `handler`
pub fn drive<H: SaxHandler>(input: &[u8], handler: &mut H) -> Result<(), H::Error> {
    let mut reader = SliceReader::new(input);

    loop {
        match reader.next_event()? {
            XmlEvent::StartElement(element) => handler.start_element(&element)?,
            XmlEvent::EmptyElement(element) => {
                handler.start_element(&element)?;
                handler.end_element(&element.name)?;
            }
            XmlEvent::EndElement(element) => handler.end_element(&element.name)?,
            XmlEvent::Text(text) | XmlEvent::CData(text) => handler.characters(&text)?,
            XmlEvent::EndDocument => return handler.end_document(),
            XmlEvent::Comment(_)
            | XmlEvent::ProcessingInstruction { .. }
            | XmlEvent::XmlDeclaration { .. }
            | XmlEvent::DocType(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records callbacks as compact strings
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl SaxHandler for Recorder {
        type Error = String;

        fn start_element(&mut self, element: &StartElement<'_>) -> Result<(), String> {
            if self.fail_on == Some(element.name.as_ref()) {
                return Err(format!("rejected <{}>", element.name));
            }
            let attrs: Vec<&str> = element.attributes.iter().map(|a| a.value.as_ref()).collect();
            self.events.push(format!("+{}{:?}", element.name, attrs));
            Ok(())
        }

        fn end_element(&mut self, name: &str) -> Result<(), String> {
            self.events.push(format!("-{}", name));
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<(), String> {
            self.events.push(format!("'{}'", text));
            Ok(())
        }

        fn end_document(&mut self) -> Result<(), String> {
            self.events.push("$".to_string());
            Ok(())
        }
    }

    impl From<ParseError> for String {
        fn from(err: ParseError) -> String {
            err.to_string()
        }
    }

    #[test]
    fn test_callback_order() {
        let mut rec = Recorder::default();
        drive(b"<root><user id=\"u1\">x<concept name=\"c\" score=\"\"/></user></root>", &mut rec).unwrap();
        assert_eq!(
            rec.events,
            vec![
                "+root[]",
                "+user[\"u1\"]",
                "'x'",
                "+concept[\"c\", \"\"]",
                "-concept",
                "-user",
                "-root",
                "$",
            ]
        );
    }

    #[test]
    fn test_prolog_events_ignored() {
        let mut rec = Recorder::default();
        drive(b"<?xml version=\"1.0\"?><!-- c --><root/>", &mut rec).unwrap();
        assert_eq!(rec.events, vec!["+root[]", "-root", "$"]);
    }

    #[test]
    fn test_handler_error_stops_drive() {
        let mut rec = Recorder {
            fail_on: Some("lesson"),
            ..Default::default()
        };
        let err = drive(b"<root><lesson/><after/></root>", &mut rec).unwrap_err();
        assert_eq!(err, "rejected <lesson>");
        assert_eq!(rec.events, vec!["+root[]"]);
    }

    #[test]
    fn test_reader_error_converted() {
        let mut rec = Recorder::default();
        let err = drive(b"<root><user></root>", &mut rec).unwrap_err();
        assert!(err.contains("Mismatched end tag"));
    }
}
