//! Receiver state machine
//!
//! Each open element is handled by the receiver on top of the stack,
//! which interprets the element's attributes positionally and names the
//! receiver that will handle the element's children:
//!
//! ```text
//! DocumentStart --(root)--> UserContext --(user)--> LessonContext
//!     --(lesson)--> ConceptContext --(concept)--> ConceptContext
//! ```
//!
//! The element name is a second dispatch key: `user`, `lesson` and
//! `concept` each demand a specific receiver, and a mismatch is reported
//! as `Error::UnexpectedElement` instead of being interpreted anyway.

use super::model::{LessonRecord, ResultSet, UserRecord, MISSING_SCORE};
use crate::config::UnknownElements;
use crate::error::{Error, Result};
use crate::reader::StartElement;
use log::{trace, warn};

pub const USER: &str = "user";
pub const LESSON: &str = "lesson";
pub const CONCEPT: &str = "concept";

/// Parse state active for the children of an open element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Nothing opened yet; accepts the root wrapper under any name
    DocumentStart,
    /// Inside the root; expects `user` elements
    UserContext,
    /// Inside a user; expects `lesson` elements
    LessonContext,
    /// Inside a lesson; expects `concept` elements
    ConceptContext,
    /// Inside an ignored element; swallows the whole subtree
    Skipping,
}

/// One stack entry per open element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Receiver that consumed the element's open event; finishes it on close
    pub handled_by: Receiver,
    /// Receiver for the element's children
    pub active: Receiver,
}

/// Working set threaded through every transition of one parse
#[derive(Debug, Default)]
pub struct ParseContext {
    results: Option<ResultSet>,
    current_user: Option<UserRecord>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users committed so far (None until the root element opened)
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    /// The user whose element is currently open
    pub fn current_user(&self) -> Option<&UserRecord> {
        self.current_user.as_ref()
    }

    pub fn into_results(self) -> Option<ResultSet> {
        self.results
    }
}

impl Receiver {
    /// Receiver a schema element must be opened under
    fn required_for(name: &str) -> Option<Receiver> {
        match name {
            USER => Some(Receiver::UserContext),
            LESSON => Some(Receiver::LessonContext),
            CONCEPT => Some(Receiver::ConceptContext),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Receiver::DocumentStart => "expecting the root element",
            Receiver::UserContext => "expecting <user>",
            Receiver::LessonContext => "expecting <lesson>",
            Receiver::ConceptContext => "expecting <concept>",
            Receiver::Skipping => "skipping an unknown element",
        }
    }

    /// Consume an opening element; `None` keeps `self` active for its children
    pub fn process_data(self, element: &StartElement<'_>, ctx: &mut ParseContext) -> Result<Option<Receiver>> {
        match self {
            Receiver::DocumentStart => {
                ctx.results = Some(ResultSet::new());
                Ok(Some(Receiver::UserContext))
            }
            Receiver::UserContext => {
                let id = attribute(element, 0)?;
                ctx.current_user = Some(UserRecord::new(id));
                Ok(Some(Receiver::LessonContext))
            }
            Receiver::LessonContext => {
                let name = attribute(element, 0)?;
                let user = ctx.current_user.as_mut().ok_or_else(|| unexpected(element, self))?;
                user.add_lesson(LessonRecord::new(name));
                Ok(Some(Receiver::ConceptContext))
            }
            Receiver::ConceptContext => {
                let concept = attribute(element, 0)?;
                let score = parse_score(concept, element.attribute_at(1))?;
                let lesson = ctx
                    .current_user
                    .as_mut()
                    .and_then(UserRecord::current_lesson_mut)
                    .ok_or_else(|| unexpected(element, self))?;
                lesson.push_concept(concept, score);
                Ok(None)
            }
            Receiver::Skipping => Ok(None),
        }
    }

    /// Commit whatever the element this receiver handled still owes
    pub fn finish_process_data(self, name: &str, ctx: &mut ParseContext) {
        if self != Receiver::UserContext {
            return;
        }
        if let (Some(results), Some(user)) = (ctx.results.as_mut(), ctx.current_user.take()) {
            trace!("</{}> commits user '{}' ({} lessons)", name, user.id(), user.lessons().len());
            results.push(user);
        }
    }
}

/// Select the receiver for `element` from the top of the stack and run it
pub fn transition(
    top: Receiver,
    element: &StartElement<'_>,
    ctx: &mut ParseContext,
    unknown: UnknownElements,
) -> Result<Frame> {
    let name = element.name.as_ref();

    let handler = match (top, Receiver::required_for(name)) {
        (Receiver::Skipping, _) => Receiver::Skipping,
        (Receiver::DocumentStart, _) => Receiver::DocumentStart,
        (_, Some(required)) if required == top => top,
        (_, Some(_)) => return Err(unexpected(element, top)),
        (_, None) => match unknown {
            UnknownElements::Reject => return Err(unexpected(element, top)),
            UnknownElements::Skip => {
                warn!("skipping unknown element <{}> while {}", name, top.describe());
                Receiver::Skipping
            }
        },
    };

    let next = handler.process_data(element, ctx)?;
    let frame = Frame {
        handled_by: handler,
        active: next.unwrap_or(handler),
    };
    trace!("<{}> {:?} -> {:?}", name, frame.handled_by, frame.active);
    Ok(frame)
}

/// Positional attribute read
fn attribute<'e>(element: &'e StartElement<'_>, index: usize) -> Result<&'e str> {
    element.attribute_at(index).ok_or_else(|| Error::MissingAttribute {
        element: element.name.to_string(),
        index,
    })
}

/// Empty or absent score strings map to `MISSING_SCORE`
fn parse_score(concept: &str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(MISSING_SCORE);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .ok_or_else(|| Error::InvalidScore {
            concept: concept.to_string(),
            value: raw.to_string(),
        })
}

fn unexpected(element: &StartElement<'_>, state: Receiver) -> Error {
    Error::UnexpectedElement {
        element: element.name.to_string(),
        state: state.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::Attribute;

    fn elem(name: &'static str, attrs: &[(&'static str, &'static str)]) -> StartElement<'static> {
        StartElement::new(
            name,
            attrs.iter().map(|&(n, v)| Attribute::new(n, v)).collect(),
        )
    }

    fn open(top: Receiver, e: &StartElement<'_>, ctx: &mut ParseContext) -> Result<Frame> {
        transition(top, e, ctx, UnknownElements::Reject)
    }

    #[test]
    fn test_full_progression() {
        let mut ctx = ParseContext::new();

        let root = open(Receiver::DocumentStart, &elem("profiles", &[]), &mut ctx).unwrap();
        assert_eq!(root.active, Receiver::UserContext);
        assert!(ctx.results().unwrap().is_empty());

        let user = open(root.active, &elem("user", &[("id", "u1")]), &mut ctx).unwrap();
        assert_eq!(user, Frame { handled_by: Receiver::UserContext, active: Receiver::LessonContext });
        assert_eq!(ctx.current_user().map(UserRecord::id), Some("u1"));

        let lesson = open(user.active, &elem("lesson", &[("name", "intro")]), &mut ctx).unwrap();
        assert_eq!(lesson.active, Receiver::ConceptContext);

        let concept = open(lesson.active, &elem("concept", &[("name", "c1"), ("score", "0.8")]), &mut ctx).unwrap();
        assert_eq!(concept, Frame { handled_by: Receiver::ConceptContext, active: Receiver::ConceptContext });

        concept.handled_by.finish_process_data("concept", &mut ctx);
        lesson.handled_by.finish_process_data("lesson", &mut ctx);
        assert!(ctx.results().unwrap().is_empty(), "user commits only on its own close");

        user.handled_by.finish_process_data("user", &mut ctx);
        root.handled_by.finish_process_data("profiles", &mut ctx);

        let results = ctx.into_results().unwrap();
        assert_eq!(results.len(), 1);
        let lesson = &results.users()[0].lessons()[0];
        assert_eq!(lesson.name(), "intro");
        assert_eq!(lesson.score_of("c1"), Some(0.8));
    }

    #[test]
    fn test_positional_not_named() {
        let mut ctx = ParseContext::new();
        open(Receiver::DocumentStart, &elem("root", &[]), &mut ctx).unwrap();
        open(Receiver::UserContext, &elem("user", &[("login", "alice"), ("id", "u9")]), &mut ctx).unwrap();
        assert_eq!(ctx.current_user().map(UserRecord::id), Some("alice"));
    }

    #[test]
    fn test_empty_and_absent_scores() {
        assert_eq!(parse_score("c", Some("")).unwrap(), MISSING_SCORE);
        assert_eq!(parse_score("c", Some("  ")).unwrap(), MISSING_SCORE);
        assert_eq!(parse_score("c", None).unwrap(), MISSING_SCORE);
        assert_eq!(parse_score("c", Some(" 7.5 ")).unwrap(), 7.5);
        assert!(matches!(parse_score("c", Some("high")), Err(Error::InvalidScore { .. })));
        assert!(matches!(parse_score("c", Some("NaN")), Err(Error::InvalidScore { .. })));
    }

    #[test]
    fn test_concept_under_user_context_rejected() {
        let mut ctx = ParseContext::new();
        let err = open(Receiver::UserContext, &elem("concept", &[("name", "c")]), &mut ctx).unwrap_err();
        match err {
            Error::UnexpectedElement { element, state } => {
                assert_eq!(element, "concept");
                assert_eq!(state, "expecting <user>");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_identifier() {
        let mut ctx = ParseContext::new();
        let err = open(Receiver::UserContext, &elem("user", &[]), &mut ctx).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { index: 0, .. }));
    }

    #[test]
    fn test_unknown_element_policies() {
        let mut ctx = ParseContext::new();
        let group = elem("group", &[]);
        assert!(open(Receiver::UserContext, &group, &mut ctx).is_err());

        let frame = transition(Receiver::UserContext, &group, &mut ctx, UnknownElements::Skip).unwrap();
        assert_eq!(frame.active, Receiver::Skipping);

        // Schema names inside a skipped subtree are ignored too
        let inner = transition(frame.active, &elem("user", &[("id", "x")]), &mut ctx, UnknownElements::Reject).unwrap();
        assert_eq!(inner.active, Receiver::Skipping);
        assert!(ctx.current_user().is_none());
    }

    #[test]
    fn test_root_name_not_validated() {
        let mut ctx = ParseContext::new();
        let frame = open(Receiver::DocumentStart, &elem("user", &[("id", "u1")]), &mut ctx).unwrap();
        assert_eq!(frame.active, Receiver::UserContext);
        assert!(ctx.current_user().is_none());
    }
}
