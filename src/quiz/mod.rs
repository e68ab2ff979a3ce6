// src/quiz/mod.rs

pub mod extract;
pub mod generator;
pub mod labels;
pub mod prompt;
pub mod session;

pub use generator::{Generated, QuizGenerator};
pub use session::{GradeOutcome, ParseFailure, Question, Quiz, QuizSession, Score, grade, load};
