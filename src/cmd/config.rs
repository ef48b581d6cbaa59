use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = AppConfig::load()?;

    println!("GitHub token: {}", mask_secret(cfg.github_token.as_deref()));
    println!("API URL: {}", cfg.api_url);
    println!("Repository: {}", cfg.repo);
    println!("Label: {}", cfg.label);
    println!("Primary branch: {}", cfg.primary_branch);
    println!("Extra branches: {}", display_list(&cfg.extra_branches));
    println!("Allowed origins: {}", display_list(&cfg.allowed_origins));

    Ok(())
}

fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        "<not set>".to_string()
    } else {
        values.join(", ")
    }
}

fn mask_secret(value: Option<&str>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix: String = token.chars().take(3).collect();
            let suffix: String = token.chars().skip(token.chars().count() - 3).collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_long_secrets() {
        assert_eq!(mask_secret(Some("ghp_abcdef123")), "ghp***123");
    }

    #[test]
    fn masks_short_and_missing_secrets() {
        assert_eq!(mask_secret(Some("abc")), "***");
        assert_eq!(mask_secret(Some("")), "<not set>");
        assert_eq!(mask_secret(None), "<not set>");
    }

    #[test]
    fn lists_are_joined() {
        assert_eq!(display_list(&[]), "<not set>");
        assert_eq!(
            display_list(&["a".to_string(), "b".to_string()]),
            "a, b"
        );
    }
}
