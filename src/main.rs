mod api;
mod auth;
mod prefs;
mod quiz;
mod toast;

use std::io::{self, Write};
use std::time::Instant;

use dotenv::dotenv;
use tokio::sync::mpsc;

use api::types::{RiskInput, StatsPeriod, UserInfo};
use api::ApiClient;
use auth::SessionStore;
use prefs::{Preferences, PrefsStore};
use quiz::bank::QuestionBank;
use quiz::{reporter, sampler, AnswerOutcome, QUIZ_LENGTH};
use toast::ToastQueue;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting SymbiHelp terminal client...");

    let bank = QuestionBank::load().expect("bundled question bank is invalid");
    log::debug!("question bank loaded with {} questions", bank.len());

    let prefs_store = PrefsStore::from_env();
    let mut prefs = prefs_store.load();
    let session_store = SessionStore::from_env();
    let mut client = ApiClient::from_env();

    let mut toasts = ToastQueue::new();
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<String>();

    let mut user = match auth::restore(&mut client, &session_store) {
        Some(user) => {
            println!("Welcome back, {}!", user.full_name);
            user
        }
        None => match sign_in_dialogue(&mut client, &session_store).await {
            Some(user) => user,
            None => return,
        },
    };

    register_push_token(&client, &prefs_store, &mut prefs, &mut toasts).await;

    loop {
        // Background submissions report through the notice channel; surface
        // them as toasts before drawing the menu.
        while let Ok(message) = notice_rx.try_recv() {
            toasts.show(message);
        }
        if let Some(message) = toasts.poll(Instant::now()) {
            println!("\n[!] {}", message);
        }

        println!("\n--- SymbiHelp ({} theme) ---", prefs.theme.as_str());
        println!("[1] Take the knowledge test");
        println!("[2] View progress");
        println!("[3] Risk prediction");
        println!("[4] Chat assistant");
        if user.is_admin {
            println!("[5] Admin statistics");
        }
        println!("[6] Toggle theme");
        println!("[7] Sign out");
        println!("[q] Quit");

        match prompt("> ").as_str() {
            "1" => {
                if let Err(err) = run_quiz(&bank, &client, notice_tx.clone()) {
                    log::error!("quiz failed to start: {}", err);
                    println!("Could not start the test: {}", err);
                }
            }
            "2" => {
                if let Err(err) = show_progress(&client).await {
                    log::warn!("failed to load progress: {}", err);
                    println!("Could not load your progress: {}", err);
                }
            }
            "3" => {
                if let Err(err) = run_prediction(&client).await {
                    log::warn!("prediction failed: {}", err);
                    println!("Could not get a prediction: {}", err);
                }
            }
            "4" => chat_dialogue(&client).await,
            "5" if user.is_admin => {
                if let Err(err) = show_admin_stats(&client).await {
                    log::warn!("failed to load admin stats: {}", err);
                    println!("Could not load statistics: {}", err);
                }
            }
            "6" => {
                prefs.theme = prefs.theme.toggled();
                if let Err(err) = prefs_store.save(&prefs) {
                    log::warn!("could not save theme preference: {}", err);
                }
                println!("Theme set to {}.", prefs.theme.as_str());
            }
            "7" => {
                if let Err(err) = auth::sign_out(&mut client, &session_store) {
                    log::warn!("could not clear saved session: {}", err);
                }
                println!("Signed out.");
                match sign_in_dialogue(&mut client, &session_store).await {
                    Some(next_user) => {
                        user = next_user;
                        register_push_token(&client, &prefs_store, &mut prefs, &mut toasts).await;
                    }
                    None => break,
                }
            }
            "q" | "Q" => break,
            _ => println!("Please pick one of the options."),
        }
    }

    println!("Take care!");
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    io::stdout().flush().expect("failed to flush stdout");
    match read_input(&mut io::stdin().lock()) {
        Some(line) => line,
        None => {
            // Piped input ran out; there is nobody left to ask.
            println!();
            log::info!("input closed, exiting");
            std::process::exit(0);
        }
    }
}

/// Reads one trimmed line. None means the input is closed (EOF), which the
/// caller must treat as quitting rather than asking again.
fn read_input<R: io::BufRead>(input: &mut R) -> Option<String> {
    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .expect("failed to read from stdin");
    if bytes == 0 {
        None
    } else {
        Some(line.trim().to_string())
    }
}

fn prompt_number(label: &str) -> f64 {
    loop {
        match prompt(label).parse::<f64>() {
            Ok(value) => return value,
            Err(_) => println!("Please enter a number."),
        }
    }
}

async fn sign_in_dialogue(client: &mut ApiClient, store: &SessionStore) -> Option<UserInfo> {
    loop {
        println!("\n[1] Sign in  [2] Sign up  [q] Quit");
        match prompt("> ").as_str() {
            "1" => {
                let email = prompt("Email: ");
                let password = prompt("Password: ");
                match auth::sign_in(client, store, &email, &password).await {
                    Ok(user) => {
                        println!("Signed in as {}.", user.full_name);
                        return Some(user);
                    }
                    Err(err) => println!("Sign in failed: {}", err),
                }
            }
            "2" => {
                let full_name = prompt("Full name: ");
                let email = prompt("Email: ");
                let password = prompt("Password: ");
                match auth::sign_up(client, store, &full_name, &email, &password).await {
                    Ok(user) => {
                        println!("Welcome, {}!", user.full_name);
                        return Some(user);
                    }
                    Err(err) => println!("Registration failed: {}", err),
                }
            }
            "q" | "Q" => return None,
            _ => println!("Please pick one of the options."),
        }
    }
}

/// The push token itself comes from the OS layer; here it arrives through the
/// environment. Registration happens once per token, never fatally.
async fn register_push_token(
    client: &ApiClient,
    prefs_store: &PrefsStore,
    prefs: &mut Preferences,
    toasts: &mut ToastQueue,
) {
    let token = match std::env::var("SYMBIHELP_PUSH_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => return,
    };
    if prefs.push_token.as_deref() == Some(token.as_str()) {
        log::debug!("push token already registered");
        return;
    }

    match client.register_push_token(&token, std::env::consts::OS).await {
        Ok(()) => {
            log::info!("push token registered");
            prefs.push_token = Some(token);
            if let Err(err) = prefs_store.save(prefs) {
                log::warn!("could not cache push token: {}", err);
            }
        }
        Err(err) => {
            log::warn!("push token registration failed: {}", err);
            toasts.show("Could not enable notifications right now.");
        }
    }
}

/// Question-and-answer loop against the backend assistant. Errors stay in
/// the conversation as an apology line, like the app's chat screen does.
async fn chat_dialogue(client: &ApiClient) {
    println!("\nChat assistant. Type your question, or press Enter to go back.");
    loop {
        let message = prompt("You: ");
        if message.is_empty() {
            return;
        }
        match client.chat(&message).await {
            Ok(reply) => println!("Assistant: {}", reply),
            Err(err) => {
                log::warn!("chat request failed: {}", err);
                println!("I'm having trouble connecting right now. Please try again.");
            }
        }
    }
}

fn run_quiz(
    bank: &QuestionBank,
    client: &ApiClient,
    notices: mpsc::UnboundedSender<String>,
) -> HandlerResult {
    loop {
        let mut session = sampler::sample_session(bank, QUIZ_LENGTH)?;
        println!(
            "\nKnowledge test: {} questions. Answer with 1-4.",
            session.total()
        );

        while !session.is_complete() {
            let number = session.current_question + 1;
            let question = match session.current() {
                Some(question) => question.clone(),
                None => break,
            };

            println!("\nQuestion {}/{}: {}", number, session.total(), question.text);
            for (i, answer) in question.answers.iter().enumerate() {
                println!("  [{}] {}", i + 1, answer.text);
            }

            let choice = loop {
                match prompt("> ").parse::<usize>() {
                    Ok(n) if (1..=question.answers.len()).contains(&n) => break n - 1,
                    _ => println!(
                        "Please answer with a number between 1 and {}.",
                        question.answers.len()
                    ),
                }
            };

            match session.select_answer(choice) {
                AnswerOutcome::Correct => println!("Correct!"),
                AnswerOutcome::Incorrect => {
                    let right = question
                        .answers
                        .iter()
                        .find(|a| a.is_correct)
                        .map(|a| a.text.as_str())
                        .unwrap_or("");
                    println!("Not quite. The right answer is: {}", right);
                }
                AnswerOutcome::AlreadyAnswered => {}
            }
            if let Some(explanation) = &question.explanation {
                println!("{}", explanation);
            }
            session.advance();
        }

        // The summary renders now; saving the score happens behind it.
        println!(
            "\nTest completed! Your score: {}/{}",
            session.score,
            session.total()
        );
        let submission = reporter::build_submission(&session);
        reporter::submit_in_background(client.clone(), submission, notices.clone());

        if !prompt("Retake the test? [y/N] ").eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }
}

async fn show_progress(client: &ApiClient) -> HandlerResult {
    println!("\nLoading history...");
    let mut scores = client.test_scores().await?;
    scores.sort_by(|a, b| b.test_date.cmp(&a.test_date));

    if scores.is_empty() {
        println!("No test history found. Complete a test to see your progress here.");
        return Ok(());
    }

    println!("Test history:");
    for entry in &scores {
        println!(
            "  {}  Score: {}/{}",
            entry.test_date.format("%d %b %Y"),
            entry.score,
            entry.max_score
        );
    }
    Ok(())
}

async fn run_prediction(client: &ApiClient) -> HandlerResult {
    println!("\nEnter the vitals for the risk check.");
    let vitals = RiskInput {
        age: prompt_number("Age: "),
        systolic_bp: prompt_number("Systolic BP: "),
        diastolic_bp: prompt_number("Diastolic BP: "),
        blood_sugar: prompt_number("Blood sugar (mmol/L): "),
        body_temp: prompt_number("Body temperature (F): "),
        heart_rate: prompt_number("Heart rate (bpm): "),
    };

    println!("Requesting prediction...");
    let prediction = client.predict(&vitals).await?;
    println!(
        "Predicted risk: {} ({:.1}%)",
        prediction.prediction, prediction.probability
    );
    println!("Recommendation: {}", prediction.recommendation);
    Ok(())
}

async fn show_admin_stats(client: &ApiClient) -> HandlerResult {
    let period = match prompt("Period [week/month/year] (default week): ").as_str() {
        "month" => StatsPeriod::Month,
        "year" => StatsPeriod::Year,
        _ => StatsPeriod::Week,
    };

    let stats = client.admin_stats(period).await?;
    println!("\nStatistics for the last {}:", stats.time_period);
    println!("  Users: {}", stats.total_users);
    println!("  Tests taken: {}", stats.total_tests);
    println!("  Average score: {:.2}", stats.average_score);
    println!("  Topic performance:");
    for (topic, score) in &stats.topic_performance {
        println!("    {}: {:.2}", topic, score);
    }
    if !stats.recent_activity.is_empty() {
        println!("  Recent activity:");
        for activity in &stats.recent_activity {
            println!(
                "    {} - {}/{} on {}",
                activity.user_name,
                activity.score,
                activity.max_score,
                activity.date.format("%d %b %Y")
            );
        }
    }
    Ok(())
}
