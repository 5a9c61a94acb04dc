//! The application session.
//!
//! A [`Session`] owns the ledger for its lifetime together with what the user
//! sees: the table of all movements and the status line. Each toolbar action
//! is a method that either succeeds, reloads the table and updates the
//! status, or returns the error and leaves both untouched.

use std::io::{BufRead, Write};
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::Result;
use crate::form::{Direction, MovementForm};
use crate::ledger::Ledger;
use crate::record::{AssetRecord, LabelSet};
use crate::transfer;
use crate::view::Status;

/// An open ledger plus its table view and status line.
#[derive(Debug)]
pub struct Session {
    ledger: Ledger,
    labels: LabelSet,
    sheet_name: String,
    records: Vec<AssetRecord>,
    status: Status,
}

impl Session {
    /// Start a session over an open ledger and load the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails.
    pub fn new(ledger: Ledger, labels: LabelSet, sheet_name: impl Into<String>) -> Result<Self> {
        let mut session = Self {
            ledger,
            labels,
            sheet_name: sheet_name.into(),
            records: Vec::new(),
            status: Status::ready(),
        };
        session.reload()?;
        Ok(session)
    }

    /// The underlying ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Header language in use.
    #[must_use]
    pub fn labels(&self) -> LabelSet {
        self.labels
    }

    /// Every movement as of the last reload.
    #[must_use]
    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    /// The current status line.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Re-read every row from the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; the previous table is kept.
    pub fn reload(&mut self) -> Result<()> {
        self.records = self.ledger.fetch_all()?;
        Ok(())
    }

    /// Record an inbound movement.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is invalid or the insert fails.
    pub fn inbound(&mut self, form: &MovementForm) -> Result<&Status> {
        self.save(form, Direction::Inbound)
    }

    /// Record an outbound movement.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is invalid or the insert fails.
    pub fn outbound(&mut self, form: &MovementForm) -> Result<&Status> {
        self.save(form, Direction::Outbound)
    }

    /// Record a movement in the given direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is invalid or the insert fails.
    pub fn save(&mut self, form: &MovementForm, direction: Direction) -> Result<&Status> {
        let result = form.submit(direction, &self.ledger, Utc::now());
        let id = Self::report(result)?;
        info!("{} movement saved as id {}", direction, id);

        self.finish(format!("{} operation succeeded.", direction.title()))
    }

    /// Prompt for whatever `form` is missing, then save it.
    ///
    /// # Errors
    ///
    /// Returns an error if prompting fails, the quantity is invalid or the
    /// insert fails.
    pub fn enter<R: BufRead, W: Write>(
        &mut self,
        mut form: MovementForm,
        direction: Direction,
        input: &mut R,
        output: &mut W,
    ) -> Result<&Status> {
        form.prompt(direction, self.labels, input, output)?;
        self.save(&form, direction)
    }

    /// Import movements from a spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any row is rejected, in
    /// which case nothing is imported.
    pub fn import(&mut self, path: &Path) -> Result<&Status> {
        let count = Self::report(transfer::import_file(&self.ledger, path, Utc::now()))?;
        self.finish(format!("Imported {count} records."))
    }

    /// Export every movement to a spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read or the file cannot be written.
    pub fn export(&mut self, path: &Path) -> Result<&Status> {
        let written = Self::report(transfer::export_file(
            &self.ledger,
            path,
            self.labels,
            &self.sheet_name,
        ))?;
        self.status
            .set(format!("Data exported to {}", written.display()));
        Ok(&self.status)
    }

    /// Write an empty import template.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn generate_template(&mut self, path: &Path) -> Result<&Status> {
        let written = Self::report(transfer::write_template(
            path,
            self.labels,
            &self.sheet_name,
        ))?;
        self.status
            .set(format!("Template generated at {}", written.display()));
        Ok(&self.status)
    }

    /// Reload after a mutation and set the status line.
    fn finish(&mut self, status: String) -> Result<&Status> {
        Self::report(self.reload())?;
        self.status.set(status);
        Ok(&self.status)
    }

    fn report<T>(result: Result<T>) -> Result<T> {
        match &result {
            Err(e) if e.is_user_input_error() => info!("Rejected input: {}", e),
            Err(e) => warn!("Operation failed: {}", e),
            Ok(_) => {}
        }
        result
    }
}
