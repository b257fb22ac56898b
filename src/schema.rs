//! Note type inspection and field selection.
//!
//! All note types of a collection live in one JSON object in `col.models`,
//! keyed by model id. The filter works on the first one in document order,
//! which `serde_json` keeps because it is built with `preserve_order`.

use anyhow::{bail, Context, Result};
use sqlx::SqlitePool;
use std::io::{BufRead, Write};

use crate::models::{Model, ModelJson};

/// Parse the `col.models` JSON blob into models, in document order.
pub fn parse_models(json: &str) -> Result<Vec<Model>> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).context("Failed to parse note type definitions")?;

    map.into_iter()
        .map(|(key, value)| {
            let id: i64 = key
                .parse()
                .with_context(|| format!("Invalid note type id: '{}'", key))?;
            let def: ModelJson = serde_json::from_value(value)
                .with_context(|| format!("Invalid note type definition: {}", id))?;
            Ok(Model {
                id,
                name: def.name,
                fields: def.fields,
            })
        })
        .collect()
}

pub async fn load_models(pool: &SqlitePool) -> Result<Vec<Model>> {
    let json: String = sqlx::query_scalar("SELECT models FROM col LIMIT 1")
        .fetch_one(pool)
        .await
        .context("Failed to read note types from the collection")?;
    parse_models(&json)
}

/// The first note type of the collection.
pub async fn load_first_model(pool: &SqlitePool) -> Result<Model> {
    load_models(pool)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("the collection defines no note types"))
}

/// Chooses which field of a model the wordlist is matched against.
pub trait FieldSelector {
    /// Return the 0-based field offset.
    fn select(&mut self, model: &Model) -> Result<usize>;
}

/// Interactive selection: lists the fields and asks for a 1-based number
/// until a valid one is entered.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Prompt<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> FieldSelector for Prompt<R, W> {
    fn select(&mut self, model: &Model) -> Result<usize> {
        if model.fields.is_empty() {
            bail!("note type '{}' has no fields", model.name);
        }

        writeln!(self.output, "Model Name: {}", model.name)?;
        writeln!(self.output, "Fields:")?;
        for (i, field) in model.fields.iter().enumerate() {
            writeln!(self.output, "{} - {}", i + 1, field.name)?;
        }

        loop {
            write!(self.output, "Enter the field number to filter: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("no field selected: input closed");
            }

            match parse_choice(line.trim(), model.fields.len()) {
                Ok(offset) => return Ok(offset),
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }
    }
}

/// Validate a 1-based answer against `count` fields.
fn parse_choice(input: &str, count: usize) -> Result<usize, String> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Invalid input. Please enter a number.".to_string());
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(format!(
            "Invalid input. Please enter a number between 1 and {}",
            count
        )),
    }
}
