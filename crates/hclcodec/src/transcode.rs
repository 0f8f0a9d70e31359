//! conversion between HCL, JSON and YAML documents
//!
//! Every document is read into a [Map] first and written from there. Nulls from JSON and YAML are dropped on the
//! way in, HCL expressions are evaluated.
use crate::value::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Hcl,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Hcl => "hcl",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("input is empty")]
    Empty,

    #[error("from and to format are the same")]
    SameFormat,

    #[error("failed to unmarshal input")]
    Unmarshal(#[source] FormatError),

    #[error("failed to marshal output")]
    Marshal(#[source] FormatError),
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid HCL")]
    Hcl(#[from] crate::Error),

    #[error("document must be a map, got {0}")]
    NotAMap(&'static str),
}

/// Convert `input` from one format into another
#[tracing::instrument(level = "debug", skip(input))]
pub fn convert(input: &str, from: Format, to: Format) -> Result<String, ConvertError> {
    if input.trim().is_empty() {
        return Err(ConvertError::Empty);
    }
    if from == to {
        return Err(ConvertError::SameFormat);
    }

    let document = read(input, from).map_err(ConvertError::Unmarshal)?;
    tracing::trace!(entries = document.len(), "document read");
    write(&document, to).map_err(ConvertError::Marshal)
}

/// Read a document
pub fn read(input: &str, format: Format) -> Result<Map, FormatError> {
    match format {
        Format::Json => into_map(serde_json::from_str(input)?),
        Format::Yaml => into_map(serde_yaml::from_str(input)?),
        Format::Hcl => Ok(crate::unmarshal_map(input)?),
    }
}

/// Write a document; JSON is pretty-printed
pub fn write(document: &Map, format: Format) -> Result<String, FormatError> {
    let value = Value::Object(document.clone());
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&value)?,
        Format::Yaml => serde_yaml::to_string(&value)?,
        Format::Hcl => crate::marshal_map(document)?,
    })
}

fn into_map(value: Value) -> Result<Map, FormatError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(FormatError::NotAMap(other.kind())),
    }
}

pub fn json_to_yaml(input: &str) -> Result<String, ConvertError> {
    convert(input, Format::Json, Format::Yaml)
}

pub fn yaml_to_json(input: &str) -> Result<String, ConvertError> {
    convert(input, Format::Yaml, Format::Json)
}

pub fn json_to_hcl(input: &str) -> Result<String, ConvertError> {
    convert(input, Format::Json, Format::Hcl)
}

pub fn hcl_to_json(input: &str) -> Result<String, ConvertError> {
    convert(input, Format::Hcl, Format::Json)
}

pub fn yaml_to_hcl(input: &str) -> Result<String, ConvertError> {
    convert(input, Format::Yaml, Format::Hcl)
}

pub fn hcl_to_yaml(input: &str) -> Result<String, ConvertError> {
    convert(input, Format::Hcl, Format::Yaml)
}
