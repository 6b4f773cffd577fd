use rand::seq::SliceRandom;
use rand::thread_rng;
use rand::Rng;

use crate::quiz::bank::{BankQuestion, QuestionBank};
use crate::quiz::{Answer, Question, Quiz};

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("requested {requested} questions but the bank only holds {available}")]
    NotEnoughQuestions { requested: usize, available: usize },
}

/// Draws `count` distinct questions from the bank and shuffles each question's
/// options. Every call re-samples, so a retake gets a fresh quiz.
pub fn sample_session(bank: &QuestionBank, count: usize) -> Result<Quiz, SampleError> {
    if count > bank.len() {
        return Err(SampleError::NotEnoughQuestions {
            requested: count,
            available: bank.len(),
        });
    }

    let mut rng = thread_rng();
    let mut picks: Vec<&BankQuestion> = bank.questions.iter().collect();
    picks.shuffle(&mut rng);
    picks.truncate(count);

    let questions = picks
        .into_iter()
        .map(|record| shuffle_options(record, &mut rng))
        .collect();
    Ok(Quiz::new(questions))
}

// The correct option travels with its `is_correct` tag, so the shuffle can
// never lose track of which answer scores.
fn shuffle_options<R: Rng>(record: &BankQuestion, rng: &mut R) -> Question {
    let mut answers: Vec<Answer> = record
        .options
        .iter()
        .enumerate()
        .map(|(i, text)| Answer::new(text.clone(), i == record.correct))
        .collect();
    answers.shuffle(rng);

    Question::new(
        record.question.clone(),
        answers,
        record.explanation.clone(),
        record.source.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_of(n: usize) -> QuestionBank {
        let questions = (0..n)
            .map(|i| BankQuestion {
                question: format!("question {}", i),
                options: vec![
                    "a".to_string(),
                    "b".to_string(),
                    "c".to_string(),
                    "d".to_string(),
                ],
                correct: i % 4,
                explanation: None,
                source: "Ball Birthing".to_string(),
            })
            .collect();
        QuestionBank { questions }
    }

    #[test]
    fn session_has_requested_distinct_questions() {
        let bank = bank_of(40);
        let quiz = sample_session(&bank, 15).unwrap();
        assert_eq!(quiz.total(), 15);

        let mut prompts: Vec<&str> = quiz.questions.iter().map(|q| q.text.as_str()).collect();
        prompts.sort_unstable();
        prompts.dedup();
        assert_eq!(prompts.len(), 15);
    }

    #[test]
    fn every_question_has_exactly_one_correct_option() {
        let bank = bank_of(40);
        let quiz = sample_session(&bank, 15).unwrap();
        for question in &quiz.questions {
            let correct = question.answers.iter().filter(|a| a.is_correct).count();
            assert_eq!(correct, 1, "question {:?}", question.text);
        }
    }

    #[test]
    fn shuffled_options_are_a_permutation_of_the_record() {
        let bank = bank_of(8);
        let quiz = sample_session(&bank, 8).unwrap();
        for question in &quiz.questions {
            let mut texts: Vec<&str> = question.answers.iter().map(|a| a.text.as_str()).collect();
            texts.sort_unstable();
            assert_eq!(texts, vec!["a", "b", "c", "d"]);
        }
    }

    #[test]
    fn correct_tag_follows_the_authored_option() {
        let bank = bank_of(4);
        let quiz = sample_session(&bank, 4).unwrap();
        for question in &quiz.questions {
            let record = bank
                .questions
                .iter()
                .find(|r| r.question == question.text)
                .unwrap();
            let tagged = question.answers.iter().find(|a| a.is_correct).unwrap();
            assert_eq!(tagged.text, record.options[record.correct]);
        }
    }

    #[test]
    fn oversized_request_fails_without_a_partial_session() {
        let bank = bank_of(10);
        let err = sample_session(&bank, 15).unwrap_err();
        assert!(matches!(
            err,
            SampleError::NotEnoughQuestions {
                requested: 15,
                available: 10
            }
        ));
    }

    #[test]
    fn full_bank_draw_is_allowed() {
        let bank = bank_of(15);
        let quiz = sample_session(&bank, 15).unwrap();
        assert_eq!(quiz.total(), 15);
    }
}
