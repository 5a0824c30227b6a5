use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use ingredient_scaler::{
    portion_multiplier, scale_amount, scale_ingredient, DisplayMode, IngredientEngine,
    ParsedIngredient, ShoppingList, Tables,
};

#[derive(Parser, Debug)]
#[command(
    name = "ingredient-scaler",
    version,
    about = "Parse, scale and convert recipe ingredients"
)]
struct Cli {
    /// JSON file with extra unit synonyms, densities and keywords
    #[arg(long, global = true, env = "INGREDIENT_TABLES")]
    tables: Option<PathBuf>,

    /// Print compact instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an ingredient list (file or stdin), one ingredient per line
    Parse { input: Option<PathBuf> },

    /// Parse an ingredient list and scale it to a new number of portions
    Scale {
        input: Option<PathBuf>,
        /// Portions the recipe is written for
        #[arg(long)]
        from: f64,
        /// Portions wanted
        #[arg(long)]
        to: f64,
    },

    /// Convert an amount to another unit or measurement system
    Convert {
        amount: String,
        unit: String,
        /// Target unit
        #[arg(long, conflicts_with = "mode")]
        to: Option<String>,
        /// Target measurement system
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Ingredient name, used for density lookups
        #[arg(long, default_value = "")]
        ingredient: String,
    },

    /// Annotate an instruction step with the ingredients it mentions
    Enrich {
        /// Ingredient list file
        ingredients: PathBuf,
        /// Instruction text
        step: String,
        #[arg(long, default_value_t = 1.0)]
        multiplier: f64,
        /// Use the second variant amounts
        #[arg(long)]
        variant: bool,
        #[arg(long, value_enum, default_value_t = Mode::Original)]
        mode: Mode,
    },

    /// Build a shopping list from several ingredient list files
    Shop {
        #[arg(required = true)]
        recipes: Vec<PathBuf>,
        #[arg(long)]
        variant: bool,
    },

    /// Import a JSON recipe with `recipeIngredient` and `recipeInstructions`
    Import { input: Option<PathBuf> },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Original,
    Metric,
    American,
}

impl From<Mode> for DisplayMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Original => DisplayMode::Original,
            Mode::Metric => DisplayMode::Metric,
            Mode::American => DisplayMode::American,
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn parse_file(engine: &IngredientEngine, path: Option<&Path>) -> Result<Vec<ParsedIngredient>> {
    let text = read_input(path)?;
    let lines: Vec<&str> = text.lines().collect();
    Ok(engine.import_ingredients(&lines))
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}

fn build_engine(tables: Option<&Path>) -> Result<IngredientEngine> {
    let tables = match tables {
        Some(path) => Tables::load(path)
            .with_context(|| format!("Failed to load tables from {}", path.display()))?,
        None => Tables::default(),
    };
    IngredientEngine::new(tables).context("Failed to build ingredient engine")
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let engine = build_engine(cli.tables.as_deref())?;
    info!("Ingredient engine ready");

    match cli.command {
        Command::Parse { input } => {
            let ingredients = parse_file(&engine, input.as_deref())?;
            print_json(&ingredients, cli.compact)
        }
        Command::Scale { input, from, to } => {
            let Some(multiplier) = portion_multiplier(from, to) else {
                bail!("--from must be a positive number of portions");
            };
            let scaled: Vec<ParsedIngredient> = parse_file(&engine, input.as_deref())?
                .iter()
                .map(|ingredient| scale_ingredient(ingredient, multiplier))
                .collect();
            print_json(&scaled, cli.compact)
        }
        Command::Convert {
            amount,
            unit,
            to,
            mode,
            ingredient,
        } => match (to, mode) {
            (Some(to), _) => print_json(
                &engine.convert_ingredient(&amount, &unit, &to, &ingredient),
                cli.compact,
            ),
            (None, Some(mode)) => print_json(
                &engine.convert_for_display(&amount, &unit, &ingredient, mode.into()),
                cli.compact,
            ),
            (None, None) => bail!("Either --to or --mode is required"),
        },
        Command::Enrich {
            ingredients,
            step,
            multiplier,
            variant,
            mode,
        } => {
            let ingredients = parse_file(&engine, Some(ingredients.as_path()))?;
            let parts = engine.enrich_step_with_ingredients(
                &step,
                &ingredients,
                |amount| scale_amount(amount, multiplier),
                variant,
                |amount, unit, name| engine.convert_for_display(amount, unit, name, mode.into()),
            );
            print_json(&parts, cli.compact)
        }
        Command::Shop { recipes, variant } => {
            let mut list = ShoppingList::new(&engine);
            for path in &recipes {
                let ingredients = parse_file(&engine, Some(path.as_path()))?;
                list.add_recipe(&path.display().to_string(), &ingredients, variant);
            }
            print_json(&list.items(), cli.compact)
        }
        Command::Import { input } => {
            let recipe: Value = serde_json::from_str(&read_input(input.as_deref())?)
                .context("Recipe is not valid JSON")?;
            let lines: Vec<&str> = recipe["recipeIngredient"]
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let parsed = engine.import_recipe(&lines, &recipe["recipeInstructions"]);
            print_json(&parsed, cli.compact)
        }
    }
}
