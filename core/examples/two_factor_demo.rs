//! Example walking through a second-factor challenge
//!
//! This example shows how to:
//! - Load configuration and initialise tracing
//! - Issue a verification code and deliver it through a transport
//! - Verify the submitted code and observe expiration
//!
//! Run with `cargo run -p intramural_core --example two_factor_demo`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use intramural_core::services::verification::{
    ChallengeService, CodeDelivery, FixedClock, InMemoryCodeStore, OsRandomSource,
};
use intramural_shared::{init_tracing, AppConfig};

/// Prints the code instead of emailing it
struct ConsoleMailer;

#[async_trait]
impl CodeDelivery for ConsoleMailer {
    async fn deliver(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, String> {
        println!("  -> mail to {}: your code is {} (valid until {})", recipient, code, expires_at);
        Ok(format!("console-{}", uuid::Uuid::new_v4()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging);

    println!("Two-factor verification demo");
    println!("============================\n");
    println!("Environment: {}", config.environment);
    println!(
        "Codes live {} minutes, {} attempts, {}s resend cooldown\n",
        config.verification.code_expiration_minutes,
        config.verification.max_attempts,
        config.verification.resend_cooldown_seconds
    );

    let clock = Arc::new(FixedClock::new(Utc::now()));
    let service = ChallengeService::new(
        OsRandomSource,
        Arc::clone(&clock),
        Arc::new(InMemoryCodeStore::new()),
        Arc::new(ConsoleMailer),
        config.verification.clone(),
    )?;

    // 1. Issue and deliver
    println!("1. Sending code");
    let sent = service.send_code("captain@uni.edu").await?;
    let code = sent.verification_code.code.clone();
    println!("   message id: {}\n", sent.message_id);

    // 2. Wrong code
    println!("2. Submitting a wrong code");
    let wrong = service.verify_code("captain@uni.edu", "000000").await?;
    println!("   success={} message={:?}\n", wrong.success, wrong.error_message());

    // 3. Right code, just before expiry
    clock.advance(Duration::minutes(config.verification.code_expiration_minutes));
    println!("3. Submitting the right code at the expiration instant");
    let right = service.verify_code("captain@uni.edu", &code).await?;
    println!("   success={}\n", right.success);

    // 4. Fresh code, submitted too late
    println!("4. Sending another code and waiting past expiry");
    let sent = service.send_code("captain@uni.edu").await?;
    clock.advance(Duration::minutes(config.verification.code_expiration_minutes) + Duration::seconds(1));
    let late = service
        .verify_code("captain@uni.edu", &sent.verification_code.code)
        .await?;
    println!("   success={} message={:?}", late.success, late.error_message());

    Ok(())
}
