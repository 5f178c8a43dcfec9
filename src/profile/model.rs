//! Profile records built during a parse

/// Score stored for a concept whose score attribute is empty
pub const MISSING_SCORE: f64 = -1.0;

/// One lesson of a user, with its concepts in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LessonRecord {
    name: String,
    // Parallel sequences: concepts[i] is scored by scores[i]
    concepts: Vec<String>,
    scores: Vec<f64>,
}

impl LessonRecord {
    pub fn new(name: impl Into<String>) -> Self {
        LessonRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Append a concept and its score as one pair
    pub fn push_concept(&mut self, concept: impl Into<String>, score: f64) {
        self.concepts.push(concept.into());
        self.scores.push(score);
        debug_assert_eq!(self.concepts.len(), self.scores.len());
    }

    /// `(concept, score)` pairs in document order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.concepts
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Score of the first concept with this name
    pub fn score_of(&self, concept: &str) -> Option<f64> {
        self.pairs().find(|(c, _)| *c == concept).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// A user and their lessons in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    id: String,
    lessons: Vec<LessonRecord>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>) -> Self {
        UserRecord {
            id: id.into(),
            lessons: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lessons(&self) -> &[LessonRecord] {
        &self.lessons
    }

    pub fn lesson(&self, name: &str) -> Option<&LessonRecord> {
        self.lessons.iter().find(|l| l.name == name)
    }

    pub fn add_lesson(&mut self, lesson: LessonRecord) {
        self.lessons.push(lesson);
    }

    /// The most recently attached lesson, which receives concepts
    pub fn current_lesson_mut(&mut self) -> Option<&mut LessonRecord> {
        self.lessons.last_mut()
    }
}

/// All users of a document, in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    users: Vec<UserRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, user: UserRecord) {
        self.users.push(user);
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserRecord> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn into_users(self) -> Vec<UserRecord> {
        self.users
    }
}

impl IntoIterator for ResultSet {
    type Item = UserRecord;
    type IntoIter = std::vec::IntoIter<UserRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.users.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a UserRecord;
    type IntoIter = std::slice::Iter<'a, UserRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.users.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concepts_stay_paired() {
        let mut lesson = LessonRecord::new("intro");
        lesson.push_concept("c1", 0.8);
        lesson.push_concept("c2", MISSING_SCORE);

        assert_eq!(lesson.concepts().len(), lesson.scores().len());
        let pairs: Vec<_> = lesson.pairs().collect();
        assert_eq!(pairs, vec![("c1", 0.8), ("c2", -1.0)]);
        assert_eq!(lesson.score_of("c2"), Some(-1.0));
        assert_eq!(lesson.score_of("c3"), None);
    }

    #[test]
    fn test_current_lesson_is_last() {
        let mut user = UserRecord::new("u1");
        assert!(user.current_lesson_mut().is_none());
        user.add_lesson(LessonRecord::new("a"));
        user.add_lesson(LessonRecord::new("b"));
        user.current_lesson_mut().unwrap().push_concept("x", 1.0);

        assert!(user.lesson("a").unwrap().is_empty());
        assert_eq!(user.lesson("b").unwrap().len(), 1);
    }

    #[test]
    fn test_result_set_lookup() {
        let mut results = ResultSet::new();
        results.push(UserRecord::new("u1"));
        results.push(UserRecord::new("u2"));

        assert_eq!(results.len(), 2);
        assert_eq!(results.get("u2").map(UserRecord::id), Some("u2"));
        let ids: Vec<_> = results.iter().map(|u| u.id().to_string()).collect();
        assert_eq!(ids, ["u1", "u2"]);
        assert_eq!(results.into_users().len(), 2);
    }
}
