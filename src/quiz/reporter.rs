use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::types::ScoreSubmission;
use crate::api::ApiClient;
use crate::quiz::Quiz;

/// Final `{score, total}` payload for a finished quiz, with the per-topic
/// breakdown attached.
pub fn build_submission(quiz: &Quiz) -> ScoreSubmission {
    ScoreSubmission {
        score: quiz.score,
        total: quiz.total() as u32,
        topics: Some(quiz.topic_scores()),
    }
}

/// Sends the finished score in the background. The summary is already on
/// screen when this runs, so a failure produces a log line and a toast notice
/// and nothing else; there is no retry.
pub fn submit_in_background(
    api: ApiClient,
    submission: ScoreSubmission,
    notices: UnboundedSender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match api.submit_score(&submission).await {
            Ok(()) => {
                log::info!("test score {}/{} saved", submission.score, submission.total);
            }
            Err(err) => {
                log::warn!("failed to save test score: {}", err);
                let _ = notices.send(
                    "Could not save your score online. Your result is still shown here."
                        .to_string(),
                );
            }
        }
    })
}
