/*!
# Input Formats

Decodes documents from the serialization formats `jdig` accepts. Every format
is decoded into a [`serde_json::Value`], so queries behave the same whatever
the input. Formats other than JSON are behind cargo features.
*/
use serde_json::Value;
use std::{error::Error, fmt, path::Path};

/// Serialization format of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InputFormat {
    /// JSON (always available)
    #[default]
    Json,
    /// YAML (`yaml` feature)
    Yaml,
    /// TOML (`toml` feature)
    Toml,
    /// CBOR (`cbor` feature)
    Cbor,
    /// MessagePack (`msgpack` feature)
    Msgpack,
}

impl InputFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "cbor" => Some(Self::Cbor),
            "msgpack" | "mpk" => Some(Self::Msgpack),
            _ => None,
        }
    }

    /// Whether support for the format was compiled in.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        match self {
            Self::Json => true,
            Self::Yaml => cfg!(feature = "yaml"),
            Self::Toml => cfg!(feature = "toml"),
            Self::Cbor => cfg!(feature = "cbor"),
            Self::Msgpack => cfg!(feature = "msgpack"),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Cbor => "CBOR",
            Self::Msgpack => "MessagePack",
        };
        write!(f, "{name}")
    }
}

/// Represents errors that can occur while decoding an input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input is not valid for the format.
    Malformed {
        /// The format the input was decoded as
        format: InputFormat,
        /// Decoder message
        message: String,
    },
    /// The format was not compiled in.
    Unsupported(InputFormat),
}

impl Error for DecodeError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { format, message } => {
                write!(f, "Malformed {format} input: {message}")
            }
            Self::Unsupported(format) => {
                write!(f, "{format} support was not compiled in")
            }
        }
    }
}

impl DecodeError {
    fn malformed(format: InputFormat, err: impl fmt::Display) -> Self {
        Self::Malformed { format, message: err.to_string() }
    }
}

/// Decodes `bytes` as a document in the given format.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the input is malformed or the format is not
/// compiled in.
pub fn decode(bytes: &[u8], format: InputFormat) -> Result<Value, DecodeError> {
    if !format.is_enabled() {
        return Err(DecodeError::Unsupported(format));
    }
    log::debug!("Decoding {} bytes as {format}", bytes.len());

    match format {
        InputFormat::Json => serde_json::from_slice(bytes)
            .map_err(|e| DecodeError::malformed(format, e)),
        #[cfg(feature = "yaml")]
        InputFormat::Yaml => serde_yaml::from_slice(bytes)
            .map_err(|e| DecodeError::malformed(format, e)),
        #[cfg(feature = "toml")]
        InputFormat::Toml => std::str::from_utf8(bytes)
            .map_err(|e| DecodeError::malformed(format, e))
            .and_then(|text| {
                toml::from_str(text)
                    .map_err(|e| DecodeError::malformed(format, e))
            }),
        #[cfg(feature = "cbor")]
        InputFormat::Cbor => ciborium::from_reader(bytes)
            .map_err(|e| DecodeError::malformed(format, e)),
        #[cfg(feature = "msgpack")]
        InputFormat::Msgpack => rmp_serde::from_slice(bytes)
            .map_err(|e| DecodeError::malformed(format, e)),
        #[allow(unreachable_patterns)]
        _ => Err(DecodeError::Unsupported(format)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("a/b.JSON")),
            Some(InputFormat::Json)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("conf.yml")),
            Some(InputFormat::Yaml)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("Cargo.toml")),
            Some(InputFormat::Toml)
        );
        assert_eq!(InputFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn decode_json() {
        let doc = decode(br#"{"a": [1, 2]}"#, InputFormat::Json).unwrap();
        assert_eq!(doc, json!({"a": [1, 2]}));
    }

    #[test]
    fn decode_json_keeps_key_order() {
        let doc = decode(br#"{"z": 1, "a": 2, "m": 3}"#, InputFormat::Json)
            .unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn decode_malformed_json() {
        let result = decode(b"{\"a\":", InputFormat::Json);
        assert!(matches!(
            result,
            Err(DecodeError::Malformed { format: InputFormat::Json, .. })
        ));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn decode_yaml() {
        let yaml = b"servers:\n  web:\n    ip: 10.0.0.1\n";
        let doc = decode(yaml, InputFormat::Yaml).unwrap();
        assert_eq!(doc, json!({"servers": {"web": {"ip": "10.0.0.1"}}}));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn decode_toml() {
        let doc = decode(b"[package]\nname = \"x\"\n", InputFormat::Toml)
            .unwrap();
        assert_eq!(doc, json!({"package": {"name": "x"}}));
    }

    #[cfg(feature = "cbor")]
    #[test]
    fn decode_cbor() {
        let original = json!({"v": [1, 2, 3]});
        let mut bytes = Vec::new();
        ciborium::into_writer(&original, &mut bytes).unwrap();
        assert_eq!(decode(&bytes, InputFormat::Cbor).unwrap(), original);
    }

    #[cfg(feature = "msgpack")]
    #[test]
    fn decode_msgpack() {
        let original = json!({"v": ["a", null, true]});
        let bytes = rmp_serde::to_vec_named(&original).unwrap();
        assert_eq!(decode(&bytes, InputFormat::Msgpack).unwrap(), original);
    }
}
