pub mod bank;
pub mod reporter;
pub mod sampler;

use std::collections::BTreeMap;

/// Fixed session length of the knowledge test.
pub const QUIZ_LENGTH: usize = 15;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub questions: Vec<Question>,
    pub current_question: usize,
    pub score: u32,
    // question index -> whether the chosen option was correct
    answered: BTreeMap<usize, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The current question was already answered (or the quiz is over);
    /// duplicate taps never change the score.
    AlreadyAnswered,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current_question: 0,
            score: 0,
            answered: BTreeMap::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current_question)
    }

    pub fn is_complete(&self) -> bool {
        self.current_question >= self.questions.len()
    }

    pub fn current_is_answered(&self) -> bool {
        self.answered.contains_key(&self.current_question)
    }

    /// Records an answer for the current question. Scoring happens here and
    /// only on the first answer; the quiz does not move on until `advance` so
    /// the explanation can be shown first.
    pub fn select_answer(&mut self, option: usize) -> AnswerOutcome {
        if self.is_complete() || self.current_is_answered() {
            return AnswerOutcome::AlreadyAnswered;
        }

        let question = &self.questions[self.current_question];
        let correct = question
            .answers
            .get(option)
            .map(|a| a.is_correct)
            .unwrap_or(false);

        self.answered.insert(self.current_question, correct);
        if correct {
            self.score += 1;
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        }
    }

    /// Moves to the next question. Only allowed once the current question has
    /// been answered; returns false if nothing changed.
    pub fn advance(&mut self) -> bool {
        if self.is_complete() || !self.current_is_answered() {
            return false;
        }
        self.current_question += 1;
        true
    }

    /// Correct answers per topic, for the optional breakdown in the score
    /// submission. Topics with no correct answer are reported as 0.
    pub fn topic_scores(&self) -> BTreeMap<String, u32> {
        let mut topics: BTreeMap<String, u32> = BTreeMap::new();
        for (idx, question) in self.questions.iter().enumerate() {
            let entry = topics.entry(question.topic.clone()).or_insert(0);
            if self.answered.get(&idx).copied().unwrap_or(false) {
                *entry += 1;
            }
        }
        topics
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub text: String,
    pub answers: Vec<Answer>,
    pub explanation: Option<String>,
    pub topic: String,
}

impl Question {
    pub fn new(
        text: String,
        answers: Vec<Answer>,
        explanation: Option<String>,
        topic: String,
    ) -> Self {
        Self {
            text,
            answers,
            explanation,
            topic,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}

impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}
