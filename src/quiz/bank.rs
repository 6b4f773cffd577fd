use serde::Deserialize;

/// The authored question pool, bundled with the binary.
const BANK_JSON: &str = include_str!("../../data/question_bank.json");

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("question bank asset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question {index} (\"{text}\") must have exactly 4 options, found {found}")]
    WrongOptionCount {
        index: usize,
        text: String,
        found: usize,
    },
    #[error("question {index} (\"{text}\") has correct index {correct} out of range")]
    CorrectOutOfRange {
        index: usize,
        text: String,
        correct: usize,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default)]
    pub explanation: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub questions: Vec<BankQuestion>,
}

impl QuestionBank {
    /// Parses the bundled bank and checks the authoring invariants. A broken
    /// asset is a build problem, so the caller treats this as fatal.
    pub fn load() -> Result<Self, BankError> {
        Self::from_json(BANK_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<BankQuestion> = serde_json::from_str(json)?;
        for (index, record) in questions.iter().enumerate() {
            if record.options.len() != 4 {
                return Err(BankError::WrongOptionCount {
                    index,
                    text: record.question.clone(),
                    found: record.options.len(),
                });
            }
            if record.correct >= record.options.len() {
                return Err(BankError::CorrectOutOfRange {
                    index,
                    text: record.question.clone(),
                    correct: record.correct,
                });
            }
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }
}
