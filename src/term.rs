//! Elixir Term Conversion Utilities
//!
//! Converts profile records and errors to Elixir terms.

use crate::error::Error;
use crate::profile::{LessonRecord, ResultSet, UserRecord};
use rustler::{Encoder, Env, NewBinary, NifResult, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    id,
    lessons,
    name,
    concepts,
    scores,
}

/// `{:ok, [%{id: ..., lessons: [...]}, ...]}`
pub fn results_to_term<'a>(env: Env<'a>, results: &ResultSet) -> NifResult<Term<'a>> {
    Ok((ok(), users_to_term(env, results)?).encode(env))
}

/// `{:error, "reason"}`
pub fn error_to_term<'a>(env: Env<'a>, err: &Error) -> Term<'a> {
    (error(), str_to_binary(env, &err.to_string())).encode(env)
}

/// `{:ok, users}` or `{:error, reason}`
pub fn outcome_to_term<'a>(env: Env<'a>, outcome: &Result<ResultSet, Error>) -> NifResult<Term<'a>> {
    match outcome {
        Ok(results) => results_to_term(env, results),
        Err(err) => Ok(error_to_term(env, err)),
    }
}

/// List of user maps, in document order
pub fn users_to_term<'a>(env: Env<'a>, results: &ResultSet) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);
    for user in results.users().iter().rev() {
        list = list.list_prepend(user_to_term(env, user)?);
    }
    Ok(list)
}

fn user_to_term<'a>(env: Env<'a>, user: &UserRecord) -> NifResult<Term<'a>> {
    let mut lesson_list = Term::list_new_empty(env);
    for lesson in user.lessons().iter().rev() {
        lesson_list = lesson_list.list_prepend(lesson_to_term(env, lesson)?);
    }

    Term::map_from_pairs(
        env,
        &[
            (id().encode(env), str_to_binary(env, user.id())),
            (lessons().encode(env), lesson_list),
        ],
    )
}

fn lesson_to_term<'a>(env: Env<'a>, lesson: &LessonRecord) -> NifResult<Term<'a>> {
    let mut concept_list = Term::list_new_empty(env);
    for concept in lesson.concepts().iter().rev() {
        concept_list = concept_list.list_prepend(str_to_binary(env, concept));
    }

    Term::map_from_pairs(
        env,
        &[
            (name().encode(env), str_to_binary(env, lesson.name())),
            (concepts().encode(env), concept_list),
            (scores().encode(env), lesson.scores().encode(env)),
        ],
    )
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
