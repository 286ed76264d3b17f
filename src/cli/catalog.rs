//! Reward catalog commands

use anyhow::Result;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::info;

use ecochallenge::Catalog;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Load rewards from a YAML catalog (existing ids are replaced)
    Import {
        file: PathBuf,
    },

    /// List catalog rewards and their challenges
    List,

    /// Remove a reward from the catalog and from every user holding it
    Retire {
        reward_id: String,
    },
}

pub async fn catalog_command(config_path: Option<&Path>, command: CatalogCommands) -> Result<()> {
    let (_, store) = super::open_store(config_path)?;

    match command {
        CatalogCommands::Import { file } => {
            let catalog = Catalog::from_file(&file)?;
            for reward in &catalog.rewards {
                store.save_catalog_reward(reward)?;
            }
            info!("Imported {} rewards from {}", catalog.rewards.len(), file.display());
            println!("Imported {} rewards", catalog.rewards.len());
        }
        CatalogCommands::List => {
            let rewards = store.load_catalog()?;
            if rewards.is_empty() {
                println!("Catalog is empty.");
                return Ok(());
            }

            println!("Rewards ({}):\n", rewards.len());
            for reward in rewards {
                println!("  {} - {}", reward.id, reward.title);
                if let Some(desc) = &reward.description {
                    println!("    {}", desc);
                }
                for challenge in &reward.challenges {
                    let rule = &challenge.rule;
                    println!(
                        "    [{}] {}.{} {} (target {})",
                        challenge.id,
                        rule.category,
                        rule.subcategory,
                        rule.restriction,
                        rule.target()
                    );
                }
                println!();
            }
        }
        CatalogCommands::Retire { reward_id } => {
            let users = store.retire_reward(&reward_id)?;
            println!("Retired {} ({} users affected)", reward_id, users);
        }
    }

    Ok(())
}
