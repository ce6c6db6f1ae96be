//! Command-line interface parsing for Foody
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --meal and --diet filters that replace the saved selection and the
//! --refresh flag that bypasses the recipe cache.

use clap::Parser;
use thiserror::Error;

use crate::data::{diet_type_id, meal_type_id, DIET_TYPES, MEAL_TYPES};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified meal type is not recognized
    #[error("Invalid meal type: '{0}'. Valid meal types: {valid}", valid = MEAL_TYPES.join(", "))]
    InvalidMealType(String),

    /// The specified diet type is not recognized
    #[error("Invalid diet type: '{0}'. Valid diet types: {valid}", valid = DIET_TYPES.join(", "))]
    InvalidDietType(String),
}

/// Foody - browse recipes by meal and diet type
#[derive(Parser, Debug)]
#[command(name = "foody")]
#[command(about = "Browse recipes from Spoonacular, with an offline cache")]
#[command(version)]
pub struct Cli {
    /// Meal type to search for (saved for later sessions)
    ///
    /// Examples: "main course", dessert, breakfast, soup
    #[arg(long, value_name = "TYPE")]
    pub meal: Option<String>,

    /// Diet type to search for (saved for later sessions)
    ///
    /// Examples: "gluten free", vegan, ketogenic, paleo
    #[arg(long, value_name = "TYPE")]
    pub diet: Option<String>,

    /// Fetch fresh recipes even if cached recipes exist
    #[arg(long)]
    pub refresh: bool,

    /// Print recipe titles to stdout instead of starting the interface
    #[arg(long)]
    pub print: bool,

    /// Spoonacular API key
    #[arg(long, env = "FOODY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Do not probe the API host for connectivity changes
    #[arg(long)]
    pub no_monitor: bool,

    /// Base URL of the recipe API
    #[arg(long, value_name = "URL", default_value = crate::data::spoonacular::SPOONACULAR_BASE_URL)]
    pub api_url: String,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupConfig {
    /// Whether the first load bypasses the cache
    pub force_refresh: bool,
    /// Meal type chip to select before the first load
    pub meal_type_id: Option<usize>,
    /// Diet type chip to select before the first load
    pub diet_type_id: Option<usize>,
    /// Print results and exit
    pub print_only: bool,
}

/// Parses a meal type argument into its chip position
pub fn parse_meal_arg(s: &str) -> Result<usize, CliError> {
    meal_type_id(s).ok_or_else(|| CliError::InvalidMealType(s.to_string()))
}

/// Parses a diet type argument into its chip position
pub fn parse_diet_arg(s: &str) -> Result<usize, CliError> {
    diet_type_id(s).ok_or_else(|| CliError::InvalidDietType(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Changing a filter implies a forced refresh, since cached recipes were
    /// fetched for the previous selection.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an unknown meal or diet type was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let meal_type_id = cli.meal.as_deref().map(parse_meal_arg).transpose()?;
        let diet_type_id = cli.diet.as_deref().map(parse_diet_arg).transpose()?;

        Ok(StartupConfig {
            force_refresh: cli.refresh || meal_type_id.is_some() || diet_type_id.is_some(),
            meal_type_id,
            diet_type_id,
            print_only: cli.print,
        })
    }

    /// Whether the CLI changes the saved filter selection
    pub fn changes_filter(&self) -> bool {
        self.meal_type_id.is_some() || self.diet_type_id.is_some()
    }
}
