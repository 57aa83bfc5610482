use crate::model::{CreateMessageInput, User};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("no signed-in user")]
    NoUser,
}

/// Pending outbound text of the send form.
#[derive(Debug, Default)]
pub struct Composer {
    text: String,
}

impl Composer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Takes the pending text for sending. The text is cleared as soon as
    /// the submission is valid; it is not restored if sending later fails.
    pub fn submit(&mut self, user: Option<&User>) -> Result<CreateMessageInput, ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        let user = user.ok_or(ValidationError::NoUser)?;

        Ok(CreateMessageInput {
            message: std::mem::take(&mut self.text),
            owner: user.username.clone(),
        })
    }
}
