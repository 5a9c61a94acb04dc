//! The movement form.
//!
//! A form holds the four fields a user types for one inbound or outbound
//! movement, exactly as typed. Nothing is interpreted until the form is
//! submitted: the quantity is parsed then, and its sign is forced to match
//! the requested direction.

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::record::{Column, LabelSet, NewMovement};

/// Direction of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Stock coming into the warehouse.
    Inbound,
    /// Stock leaving the warehouse.
    Outbound,
}

impl Direction {
    /// Title shown on the form and in the status line.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
        }
    }

    /// Sign a quantity for this direction, whatever sign it was typed with.
    ///
    /// `i64::MIN` has no positive counterpart and saturates to `i64::MAX`.
    #[must_use]
    pub fn apply(self, quantity: i64) -> i64 {
        let magnitude = quantity.saturating_abs();
        match self {
            Self::Inbound => magnitude,
            Self::Outbound => -magnitude,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Raw field values for one movement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementForm {
    /// Asset name as typed.
    pub asset_name: String,
    /// Asset type as typed or picked from the suggestions.
    pub asset_type: String,
    /// Quantity as typed; parsed on submit.
    pub quantity: String,
    /// Location as typed.
    pub location: String,
}

impl MovementForm {
    /// Create a form from already-collected values.
    #[must_use]
    pub fn new(
        asset_name: impl Into<String>,
        asset_type: impl Into<String>,
        quantity: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            asset_type: asset_type.into(),
            quantity: quantity.into(),
            location: location.into(),
        }
    }

    /// Parse the quantity field as a whole number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuantity`] if the text is not an integer.
    pub fn parse_quantity(&self) -> Result<i64> {
        self.quantity
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::invalid_quantity(self.quantity.clone()))
    }

    /// Turn the form into a signed movement stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuantity`] if the quantity does not parse.
    pub fn to_movement(&self, direction: Direction, now: DateTime<Utc>) -> Result<NewMovement> {
        let quantity = direction.apply(self.parse_quantity()?);
        Ok(NewMovement {
            asset_name: self.asset_name.clone(),
            asset_type: self.asset_type.clone(),
            quantity,
            location: self.location.clone(),
            timestamp: now,
        })
    }

    /// Validate, sign and write the movement. Returns the new row id.
    ///
    /// Nothing is written if the quantity does not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is invalid or the insert fails.
    pub fn submit(&self, direction: Direction, ledger: &Ledger, now: DateTime<Utc>) -> Result<i64> {
        let movement = self.to_movement(direction, now)?;
        debug!(
            "{} form for '{}' signed to {}",
            direction, movement.asset_name, movement.quantity
        );
        ledger.insert(&movement)
    }

    /// Collect the four fields interactively, one prompt per line.
    ///
    /// Fields that are already filled in are not asked for again. Reaching
    /// end of input leaves the remaining fields empty.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `input` or writing to `output` fails.
    pub fn prompt<R: BufRead, W: Write>(
        &mut self,
        direction: Direction,
        labels: LabelSet,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        let filled = [
            &self.asset_name,
            &self.asset_type,
            &self.quantity,
            &self.location,
        ];
        if filled.iter().all(|f| !f.is_empty()) {
            return Ok(());
        }

        writeln!(output, "-- {} --", direction.title())?;

        let suggestions = labels.type_suggestions().join(", ");
        for column in Column::INPUT {
            let field = match column {
                Column::AssetName => &mut self.asset_name,
                Column::AssetType => &mut self.asset_type,
                Column::Quantity => &mut self.quantity,
                Column::Location => &mut self.location,
                Column::Id | Column::LastUpdate => continue,
            };
            if !field.is_empty() {
                continue;
            }

            if column == Column::AssetType {
                write!(output, "{} [{suggestions}]: ", labels.label(column))?;
            } else {
                write!(output, "{}: ", labels.label(column))?;
            }
            output.flush()?;

            let mut line = String::new();
            input.read_line(&mut line)?;
            *field = line.trim_end_matches(&['\r', '\n'][..]).to_string();
        }
        Ok(())
    }
}
