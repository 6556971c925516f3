//! The form state controller.
//!
//! A controller owns one in-progress record for one form definition and drives it
//! through the step state machine:
//!
//! ```text
//! step i --advance (step i valid)--> step i+1
//! step i --retreat-----------------> step max(i-1, 1)
//! step N --begin_submit (valid)----> Submitting --finish_submit(Ok)--> Submitted
//!                                    Submitting --finish_submit(Err)-> step N, `submit` error
//! any    --reset-------------------> step 1, fresh record
//! ```
//!
//! Validation is recomputed from the record on every call; nothing is cached between
//! passes, so relaxing a gate field relaxes the fields it controls immediately.

use crate::constants::{SELECTION_SLOT, SUBMIT_ERROR_FIELD, SUBMIT_ERROR_MESSAGE};
use crate::definition::{FieldKind, FormDefinition, FormId, StepDefinition};
use crate::error::{FormError, FormResult, SubmitError};
use crate::forms;
use crate::record::{FormRecord, ValidationErrors};
use crate::sink::{Receipt, Submission, SubmissionSink};
use crate::storage::{FormSnapshot, PersistedState, Selection};
use crate::upload::{Upload, check_upload};
use crate::value::{FieldValue, FileRef};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    /// A submission has been handed to a sink and has not completed.
    Submitting,
    Submitted,
}

#[derive(Debug)]
pub struct FormController {
    definition: &'static FormDefinition,
    step: usize,
    record: FormRecord,
    errors: ValidationErrors,
    phase: Phase,
    persistence: Option<PersistedState>,
}

impl FormController {
    /// A fresh controller on step 1 with every field at its default.
    pub fn new(definition: &'static FormDefinition) -> Self {
        Self {
            definition,
            step: 1,
            record: definition.empty_record(),
            errors: ValidationErrors::new(),
            phase: Phase::Editing,
            persistence: None,
        }
    }

    pub fn for_form(id: FormId) -> Self {
        Self::new(forms::definition(id))
    }

    /// Binds the controller to persisted state without reading it.
    pub fn with_persistence(mut self, state: PersistedState) -> Self {
        self.persistence = Some(state);
        self
    }

    /// Restores progress from the definition's slot.
    ///
    /// Expired, malformed or out-of-range entries are discarded and the controller
    /// starts fresh. A fresh registration is prefilled from the landing page's
    /// selection when one is stored.
    pub fn resume(definition: &'static FormDefinition, state: PersistedState) -> Self {
        let snapshot = state.load::<FormSnapshot>(definition.slot);
        let mut controller = Self::new(definition).with_persistence(state);

        match snapshot {
            Some(snapshot) if (1..=definition.step_count()).contains(&snapshot.step) => {
                for (name, value) in snapshot.record.iter() {
                    if definition.field(name).is_some() {
                        controller.record.set(name, value.clone());
                    } else {
                        tracing::warn!(
                            "Ignoring undeclared field {} in persisted {} record",
                            name,
                            definition.id
                        );
                    }
                }
                controller.step = snapshot.step;
                tracing::info!("Resumed {} form at step {}", definition.id, snapshot.step);
            }
            Some(snapshot) => {
                tracing::warn!(
                    "Discarding persisted {} record at step {} (form has {} steps)",
                    definition.id,
                    snapshot.step,
                    definition.step_count()
                );
                controller.clear_slot();
            }
            None if definition.id == FormId::Registration => {
                if let Some(selection) = controller
                    .persistence
                    .as_ref()
                    .and_then(|state| state.load::<Selection>(SELECTION_SLOT))
                {
                    controller.prefill_selection(&selection);
                }
            }
            None => {}
        }

        controller
    }

    pub fn definition(&self) -> &'static FormDefinition {
        self.definition
    }

    /// Current 1-based step.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn current_step(&self) -> &'static StepDefinition {
        &self.definition.steps()[self.step - 1]
    }

    pub fn is_final_step(&self) -> bool {
        self.step == self.definition.step_count()
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sets a field and clears its error. No validation runs.
    ///
    /// # Errors
    ///
    /// [`FormError::UnknownField`] for names the form does not declare,
    /// [`FormError::WrongKind`] when the value does not fit the field's kind and
    /// [`FormError::Submitted`] once the form is no longer editable. File references
    /// only enter the record through [`attach_file`](Self::attach_file).
    pub fn update_field(&mut self, name: &str, value: impl Into<FieldValue>) -> FormResult<()> {
        self.ensure_editable()?;
        let field = self.ensure_declared(name)?;
        let value = value.into();
        if !field.kind.accepts(&value) {
            return Err(FormError::WrongKind {
                field: name.to_string(),
                expected: field.kind.expected(),
            });
        }
        self.record.set(name, value);
        self.errors.clear_field(name);
        Ok(())
    }

    /// Checks an upload and, if it passes, stores its reference in `name`.
    ///
    /// A rejected upload records the message as the field's error and leaves the
    /// record untouched.
    pub fn attach_file(&mut self, name: &str, upload: &Upload) -> FormResult<FileRef> {
        self.ensure_editable()?;
        let field = self.ensure_declared(name)?;
        if field.kind != FieldKind::File {
            return Err(FormError::NotAFileField(name.to_string()));
        }

        match check_upload(upload) {
            Ok(file) => {
                self.record.set(name, FieldValue::File(file.clone()));
                self.errors.clear_field(name);
                Ok(file)
            }
            Err(message) => {
                self.errors.insert(name, message);
                Err(FormError::UploadRejected {
                    field: name.to_string(),
                    message: message.to_string(),
                })
            }
        }
    }

    /// Runs step `index`'s rules, replacing the error state with the result.
    pub fn validate_step(&mut self, index: usize) -> FormResult<ValidationErrors> {
        let errors = self.definition.step(index)?.validate(&self.record);
        self.errors = errors.clone();
        Ok(errors)
    }

    /// Moves to the next step if the current one is valid.
    ///
    /// On success the record is persisted and the new step returned. The final step
    /// is not advanced past; it leaves through [`begin_submit`](Self::begin_submit).
    /// Outside `Editing` the step never moves and the current errors come back.
    pub fn advance_step(&mut self) -> Result<usize, ValidationErrors> {
        if self.phase != Phase::Editing {
            return Err(self.errors.clone());
        }
        let errors = self.current_step().validate(&self.record);
        self.errors = errors.clone();
        if !errors.is_empty() {
            return Err(errors);
        }

        if !self.is_final_step() {
            self.step += 1;
        }
        self.persist();
        Ok(self.step)
    }

    /// Moves back one step without validating; a no-op on step 1.
    pub fn retreat_step(&mut self) -> usize {
        if self.phase == Phase::Editing && self.step > 1 {
            self.step -= 1;
        }
        self.step
    }

    /// Validates for submission and, if valid, enters `Submitting`.
    ///
    /// Section forms validate every step; stepped forms validate the final step.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        match self.phase {
            Phase::Submitting => return Err(SubmitError::InFlight),
            Phase::Submitted => return Err(SubmitError::AlreadySubmitted),
            Phase::Editing => {}
        }

        let errors = if self.definition.validate_all_on_submit {
            self.definition.validate_all(&self.record)
        } else {
            let last = self.definition.step_count();
            self.definition.steps()[last - 1].validate(&self.record)
        };
        self.errors = errors.clone();
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }

        self.phase = Phase::Submitting;
        tracing::debug!("Submitting {} form", self.definition.id);
        Ok(Submission::new(self.definition.id, self.record.clone()))
    }

    /// Completes a submission started with [`begin_submit`](Self::begin_submit).
    ///
    /// Success clears the persisted slot. A transport failure returns to the final
    /// step with the data intact and a single `submit` error.
    pub fn finish_submit(
        &mut self,
        outcome: Result<Receipt, String>,
    ) -> Result<Receipt, SubmitError> {
        if self.phase != Phase::Submitting {
            return Err(SubmitError::NotSubmitting);
        }

        match outcome {
            Ok(receipt) => {
                self.phase = Phase::Submitted;
                self.errors = ValidationErrors::new();
                self.clear_slot();
                tracing::info!("Submitted {} form", self.definition.id);
                Ok(receipt)
            }
            Err(reason) => {
                tracing::warn!("Submission of {} form failed: {}", self.definition.id, reason);
                self.phase = Phase::Editing;
                self.step = self.definition.step_count();
                self.errors = ValidationErrors::new();
                self.errors.insert(SUBMIT_ERROR_FIELD, SUBMIT_ERROR_MESSAGE);
                Err(SubmitError::Transport(reason))
            }
        }
    }

    /// Validates, hands the record to `sink` and records the outcome.
    pub async fn submit<S: SubmissionSink>(&mut self, sink: &S) -> Result<Receipt, SubmitError> {
        let submission = self.begin_submit()?;
        let outcome = sink
            .submit(&submission)
            .await
            .map_err(|err| err.to_string());
        self.finish_submit(outcome)
    }

    /// Cancels the session: fresh record, step 1, and the persisted slot cleared.
    pub fn reset(&mut self) -> FormResult<()> {
        self.step = 1;
        self.record = self.definition.empty_record();
        self.errors = ValidationErrors::new();
        self.phase = Phase::Editing;
        if let Some(state) = &self.persistence {
            state.clear(self.definition.slot)?;
        }
        Ok(())
    }

    /// Copies the landing page's preselection into the fields this form declares.
    pub fn prefill_selection(&mut self, selection: &Selection) {
        let pairs = [
            ("city", &selection.city),
            ("campDate", &selection.camp_date),
            ("date", &selection.camp_date),
            ("category", &selection.category),
        ];
        for (field, value) in pairs {
            if !value.is_empty() && self.definition.field(field).is_some() {
                self.record.set(field, FieldValue::text(value.as_str()));
            }
        }
    }

    /// Writes the current step and record to the bound slot.
    pub fn save(&self) -> FormResult<()> {
        if let Some(state) = &self.persistence {
            let snapshot = FormSnapshot {
                step: self.step,
                record: self.record.clone(),
            };
            state.save(self.definition.slot, &snapshot)?;
        }
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Could not persist {} form: {}", self.definition.id, e);
        }
    }

    fn clear_slot(&self) {
        if let Some(state) = &self.persistence {
            if let Err(e) = state.clear(self.definition.slot) {
                tracing::warn!("Could not clear persisted {} form: {}", self.definition.id, e);
            }
        }
    }

    fn ensure_editable(&self) -> FormResult<()> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting | Phase::Submitted => Err(FormError::Submitted),
        }
    }

    fn ensure_declared(&self, name: &str) -> FormResult<&'static crate::definition::FieldDef> {
        self.definition
            .field(name)
            .ok_or_else(|| FormError::UnknownField {
                form: self.definition.id.to_string(),
                field: name.to_string(),
            })
    }
}
