use std::borrow::Cow;

/// Errors raised by domain invariants.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Cube coordinates that do not sum to zero, or an unknown coordinate system.
    #[error("Geometry error{}: {message}", format_context(.context))]
    Geometry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A time span that does not land on a whole step.
    #[error("Steps must be an integer{}: got {steps}", format_context(.context))]
    NonIntegerSteps { steps: f64, context: Option<Cow<'static, str>> },

    /// A tile class name with no matching [`crate::tile::TileClass`].
    #[error("Unknown tile class{}: '{class}'", format_context(.context))]
    UnknownTileClass { class: String, context: Option<Cow<'static, str>> },

    /// Agent lifecycle violations (e.g. updating a dead agent).
    #[error("Agent error{}: {message}", format_context(.context))]
    Agent { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches a human-readable context to a [`DomainError`] result.
pub trait DomainErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DomainError>;
}

impl<T> DomainErrorExt<T> for Result<T, DomainError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            let slot = match &mut e {
                DomainError::Geometry { context, .. }
                | DomainError::NonIntegerSteps { context, .. }
                | DomainError::UnknownTileClass { context, .. }
                | DomainError::Agent { context, .. } => context,
            };
            *slot = Some(context.into());
            e
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
