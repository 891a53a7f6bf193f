//! Teacher create/edit form.
//!
//! `Loading -> {NotFound | Ready} -> Submitting -> {Succeeded | Failed}`, with a
//! delete confirmation sub-state in edit mode that is unlocked by typing the
//! teacher's name exactly.

use std::sync::Arc;

use shared::{
    domain::{TeacherField, TeacherFields, TeacherId},
    protocol::TeacherPayload,
};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    api::TeacherApi,
    error::{ClientError, ClientResult},
    navigation::{go, Navigator, Route},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TeacherId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Loading,
    /// Terminal: the requested teacher could not be loaded.
    NotFound,
    Ready,
    Submitting,
    Succeeded,
    Failed(ClientError),
}

pub struct TeacherForm {
    api: Arc<dyn TeacherApi>,
    navigator: Arc<dyn Navigator>,
    mode: FormMode,
    fields: TeacherFields,
    display_name: String,
    state: FormState,
    delete_input: Option<String>,
    default_password: String,
}

impl TeacherForm {
    /// Opens the form; edit mode loads the teacher before returning.
    pub async fn open(
        api: Arc<dyn TeacherApi>,
        navigator: Arc<dyn Navigator>,
        mode: FormMode,
        default_password: impl Into<String>,
    ) -> Self {
        let mut form = Self {
            api,
            navigator,
            mode,
            fields: TeacherFields::default(),
            display_name: String::new(),
            state: FormState::Loading,
            delete_input: None,
            default_password: default_password.into(),
        };

        match mode {
            FormMode::Create => form.state = FormState::Ready,
            FormMode::Edit(id) => form.load(id).await,
        }
        form
    }

    async fn load(&mut self, id: TeacherId) {
        self.state = match self.api.get(id).await {
            Ok(Some(teacher)) => {
                self.fields = teacher.fields();
                self.display_name = teacher.name;
                FormState::Ready
            }
            Ok(None) => {
                info!(teacher_id = id.0, "teachers: not found");
                FormState::NotFound
            }
            Err(err) => {
                warn!(teacher_id = id.0, error = %err, "teachers: load failed");
                FormState::NotFound
            }
        };
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn fields(&self) -> &TeacherFields {
        &self.fields
    }

    /// Name as loaded from the server; edits to the name field do not change it.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn heading(&self) -> String {
        match self.mode {
            FormMode::Create => "Add teacher".to_string(),
            FormMode::Edit(_) => format!("Edit teacher {}", self.display_name),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            FormState::Failed(err) => Some(err.user_message()),
            FormState::NotFound => Some("The requested teacher was not found.".to_string()),
            _ => None,
        }
    }

    fn editable(&self) -> bool {
        matches!(self.state, FormState::Ready | FormState::Failed(_))
    }

    /// Returns `false` when the form does not accept input in its current state.
    pub fn set_field(&mut self, field: TeacherField, value: impl Into<String>) -> bool {
        if !self.editable() {
            return false;
        }
        let value = value.into();
        match field {
            TeacherField::Name => self.fields.name = value,
            TeacherField::PhoneNumber => self.fields.phone_number = value,
            TeacherField::Email => self.fields.email = value,
        }
        self.state = FormState::Ready;
        true
    }

    fn validated(&self) -> ClientResult<TeacherFields> {
        let trimmed = self.fields.trimmed();
        trimmed.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            fields.sort();
            ClientError::ValidationFailure { fields }
        })?;
        Ok(trimmed)
    }

    /// Validates and sends POST (create) or PUT (edit); navigates to the list on success.
    /// Failures stay on the form as `Failed`.
    pub async fn submit(&mut self) -> ClientResult<()> {
        if let (FormState::NotFound, FormMode::Edit(id)) = (&self.state, self.mode) {
            return Err(ClientError::NotFound(id));
        }
        if !self.editable() {
            debug!(state = ?self.state, "teachers: submit rejected");
            return Err(ClientError::InvalidState(format!("{:?}", self.state)));
        }

        let fields = match self.validated() {
            Ok(fields) => fields,
            Err(err) => {
                self.state = FormState::Failed(err.clone());
                return Err(err);
            }
        };

        self.state = FormState::Submitting;
        let payload = TeacherPayload::new(&fields, self.default_password.as_str());
        let result = match self.mode {
            FormMode::Create => self.api.create(&payload).await,
            FormMode::Edit(id) => self.api.update(id, &payload).await,
        };

        match result {
            Ok(()) => {
                self.fields = fields;
                self.state = FormState::Succeeded;
                go(self.navigator.as_ref(), &Route::TeacherList);
                Ok(())
            }
            Err(err) => {
                warn!(mode = ?self.mode, error = %err, "teachers: save failed");
                self.state = FormState::Failed(err.clone());
                Err(err)
            }
        }
    }

    pub fn cancel(&self) {
        go(self.navigator.as_ref(), &Route::TeacherList);
    }

    /// Opens the delete confirmation; only available for a loaded teacher.
    pub fn begin_delete(&mut self) -> bool {
        if !self.is_edit() || !self.editable() {
            return false;
        }
        self.delete_input = Some(String::new());
        true
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.delete_input.is_some()
    }

    pub fn delete_prompt(&self) -> Option<String> {
        self.delete_input
            .as_ref()
            .map(|_| format!("To confirm deletion, type {}:", self.display_name))
    }

    pub fn set_delete_input(&mut self, input: impl Into<String>) {
        if let Some(current) = self.delete_input.as_mut() {
            *current = input.into();
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete_input = None;
    }

    /// Exact, case-sensitive match against the loaded name.
    pub fn delete_enabled(&self) -> bool {
        match &self.delete_input {
            Some(input) => !self.display_name.is_empty() && *input == self.display_name,
            None => false,
        }
    }

    pub async fn confirm_delete(&mut self) -> ClientResult<()> {
        let FormMode::Edit(id) = self.mode else {
            return Err(ClientError::InvalidState("create mode".to_string()));
        };
        if !self.delete_enabled() {
            return Err(ClientError::ValidationFailure {
                fields: vec!["confirmation".to_string()],
            });
        }

        self.state = FormState::Submitting;
        match self.api.delete(id).await {
            Ok(()) => {
                self.delete_input = None;
                self.state = FormState::Succeeded;
                go(self.navigator.as_ref(), &Route::TeacherList);
                Ok(())
            }
            Err(err) => {
                warn!(teacher_id = id.0, error = %err, "teachers: delete failed");
                self.state = FormState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/form_view_tests.rs"]
mod tests;
