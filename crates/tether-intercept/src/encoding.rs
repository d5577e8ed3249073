//! Serde helpers shared by the wire-facing types.

/// Binary bodies as standard base64 strings.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(|e| D::Error::custom(format!("invalid base64 body: {e}")))
    }
}

/// `Duration` as fractional seconds.
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration: {secs} seconds")))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::base64_bytes")]
        body: Bytes,
        #[serde(with = "super::duration_secs")]
        wait: Duration,
    }

    #[test]
    fn test_body_and_duration_encoding() {
        let holder = Holder {
            body: Bytes::from_static(b"\x00\xffdata"),
            wait: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&holder).unwrap();
        assert_eq!(json["body"], "AP9kYXRh");
        assert_eq!(json["wait"], 1.5);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"body": "", "wait": -1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"body": "***", "wait": 0}"#);
        assert!(result.unwrap_err().to_string().contains("invalid base64"));
    }
}
