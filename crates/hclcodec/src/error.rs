//! error types shared by decoding and encoding

use crate::conversion::ConversionError;
use crate::shape::ShapeError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error from a collaborator (the expression evaluator or a custom codec)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to parse HCL")]
    Syntax(#[from] hcl::Error),

    #[error("failed to format HCL")]
    Format(#[source] hcl::Error),

    #[error("failed to evaluate expression for {name:?}")]
    Evaluation {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    ShapeMismatch(String),

    #[error("failed to convert value")]
    Conversion(#[from] ConversionError),

    #[error("{0}")]
    Structural(String),

    #[error("invalid shape specification")]
    Shape(#[from] ShapeError),

    #[error("custom codec failed")]
    Custom(#[source] BoxError),

    /// Breadcrumb: the wrapped error happened while processing `field`
    #[error("field {field}")]
    Field {
        field: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Error::ShapeMismatch(message.into())
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Error::Structural(message.into())
    }

    /// Wrap this error with the name of the field (plus index or key) being processed
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Error::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error of a breadcrumb chain
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Field path leading to the root cause, outermost first
    pub fn breadcrumbs(&self) -> Vec<&str> {
        let mut trail = Vec::new();
        let mut current = self;
        while let Error::Field { field, source } = current {
            trail.push(field.as_str());
            current = source;
        }
        trail
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn breadcrumbs_unwind_outermost_first() {
        let error = Error::structural("too many labels")
            .in_field("toys[1]")
            .in_field("brand");

        assert_eq!(error.breadcrumbs(), vec!["brand", "toys[1]"]);
        assert!(matches!(error.root_cause(), Error::Structural(_)));
        assert_eq!(error.to_string(), "field brand");
    }
}
