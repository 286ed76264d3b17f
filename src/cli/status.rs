//! Status command implementation

use anyhow::{bail, Result};
use std::path::Path;

use ecochallenge::{NotificationStatus, User};

/// Show reward and challenge progress for one user or all users
pub async fn status_command(config_path: Option<&Path>, user: Option<String>) -> Result<()> {
    let (_, store) = super::open_store(config_path)?;

    let users = match user {
        Some(id) => match store.load_user(&id)? {
            Some(user) => vec![user],
            None => bail!("Unknown user: {}", id),
        },
        None => store.load_users()?,
    };

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    for user in &users {
        print_user(user);
    }

    Ok(())
}

fn print_user(user: &User) {
    println!("User {} ({} measurements)", user.id, user.measurements.len());

    let Some(rewards) = &user.rewards else {
        println!("  not onboarded\n");
        return;
    };

    for reward in rewards {
        let pending = if reward.notification_status == NotificationStatus::PendingAcknowledgment {
            " *new*"
        } else {
            ""
        };
        println!(
            "  {} [{}] {} ({}/{} challenges){}",
            reward.id,
            reward.status,
            reward.title,
            reward.challenges.len() - reward.incomplete_challenges(),
            reward.challenges.len(),
            pending
        );

        for challenge in &reward.challenges {
            let rule = &challenge.rule;
            println!(
                "    {} [{}] {}.{} {} {:.0}% ({}/{})",
                challenge.id,
                challenge.status,
                rule.category,
                rule.subcategory,
                rule.restriction,
                challenge.progress_percent() * 100.0,
                challenge.progress,
                rule.target()
            );
            if let Some(done) = challenge.date_completed {
                println!("      completed {}", done.format("%Y-%m-%d %H:%M"));
            }
        }
    }
    println!();
}
