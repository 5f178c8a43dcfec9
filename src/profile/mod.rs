//! User profile parsing
//!
//! Builds users → lessons → concept/score pairs from documents shaped like:
//!
//! ```text
//! <root>
//!   <user id="...">
//!     <lesson name="...">
//!       <concept name="..." score="..."/>
//!     </lesson>
//!   </user>
//! </root>
//! ```
//!
//! Attributes are read by position, not by name: a user's first attribute
//! is its id, a lesson's first is its name, a concept's first and second
//! are its name and score.

pub mod driver;
pub mod model;
pub mod receiver;

pub use driver::{parse_profiles, parse_profiles_file, parse_profiles_file_with, InputSource, ProfileParser};
pub use model::{LessonRecord, ResultSet, UserRecord, MISSING_SCORE};
pub use receiver::{Frame, ParseContext, Receiver};
