use sim_domain::DomainError;
use std::borrow::Cow;

/// Error types specific to map loading and world updates.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Filesystem error with optional context.
    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Malformed Tiled JSON with optional context.
    #[error("Map parse error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Layer data that is not valid base64.
    #[error("Layer data decode error{}: {source}", format_context(.context))]
    Base64 { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// A Tiled feature this loader does not handle (infinite maps, compression, XML).
    #[error("Unsupported map feature{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Structurally valid JSON that does not describe a usable map.
    #[error("Invalid map{}: {message}", format_context(.context))]
    InvalidMap { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Domain error{}: {source}", format_context(.context))]
    Domain { source: DomainError, context: Option<Cow<'static, str>> },
}

pub trait WorldErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, WorldError>;
}

impl<T> WorldErrorExt<T> for Result<T, WorldError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            let slot = match &mut e {
                WorldError::Io { context, .. }
                | WorldError::Json { context, .. }
                | WorldError::Base64 { context, .. }
                | WorldError::Unsupported { context, .. }
                | WorldError::InvalidMap { context, .. }
                | WorldError::Domain { context, .. } => context,
            };
            *slot = Some(context.into());
            e
        })
    }
}

macro_rules! from_source {
    ($($source:ty => $variant:ident),* $(,)?) => {$(
        impl From<$source> for WorldError {
            fn from(source: $source) -> Self {
                Self::$variant { source, context: None }
            }
        }

        impl<T> WorldErrorExt<T> for Result<T, $source> {
            fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, WorldError> {
                self.map_err(|source| WorldError::$variant { source, context: Some(context.into()) })
            }
        }
    )*};
}

from_source! {
    std::io::Error => Io,
    serde_json::Error => Json,
    base64::DecodeError => Base64,
    DomainError => Domain,
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_pick_up_context() {
        let io: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.context("reading map.tmj").unwrap_err();
        assert_eq!(err.to_string(), "I/O error (reading map.tmj): gone");
    }

    #[test]
    fn message_errors_render_without_context() {
        let err = WorldError::Unsupported { message: "infinite maps".into(), context: None };
        assert_eq!(err.to_string(), "Unsupported map feature: infinite maps");
    }
}
