//! AMF value types
//!
//! The RTMP layer decodes `onMetaData` and hands individual properties over
//! as [`AmfValue`]s. Codec fields (`videocodecid`, `audiocodecid`) arrive as
//! either a FourCC string, a number, or null, so only the scalar shapes get
//! accessor support here.

/// Loosely typed AMF value as produced by an AMF0/AMF3 decoder
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AmfValue {
    /// Null value (AMF0: 0x05, AMF3: 0x01)
    #[default]
    Null,

    /// Undefined value (AMF0: 0x06, AMF3: 0x00)
    Undefined,

    /// Boolean value (AMF0: 0x01, AMF3: 0x02/0x03)
    Boolean(bool),

    /// IEEE 754 double (AMF0: 0x00, AMF3: 0x05)
    Number(f64),

    /// UTF-8 string (AMF0: 0x02, AMF3: 0x06)
    String(String),

    /// Integer (AMF3 only: 0x04, 29-bit signed)
    Integer(i32),

    /// Any compound value (object, array, date...) that carries no codec meaning
    Other,
}

impl AmfValue {
    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AmfValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an integer
    ///
    /// Numbers are truncated toward zero. Booleans map to 0/1.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AmfValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            AmfValue::Integer(i) => Some(*i as i64),
            AmfValue::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, AmfValue::Null | AmfValue::Undefined)
    }
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Boolean(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Number(v)
    }
}

impl From<i32> for AmfValue {
    fn from(v: i32) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<u32> for AmfValue {
    fn from(v: u32) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::String(v.to_string())
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_integer() {
        assert_eq!(AmfValue::Number(7.0).as_integer(), Some(7));
        assert_eq!(AmfValue::Number(12.9).as_integer(), Some(12));
        assert_eq!(AmfValue::Integer(10).as_integer(), Some(10));
        assert_eq!(AmfValue::Boolean(true).as_integer(), Some(1));
        assert_eq!(AmfValue::Number(f64::NAN).as_integer(), None);
        assert_eq!(AmfValue::String("7".into()).as_integer(), None);
        assert_eq!(AmfValue::Null.as_integer(), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(AmfValue::from("avc1").as_str(), Some("avc1"));
        assert_eq!(AmfValue::Number(1.0).as_str(), None);
    }

    #[test]
    fn test_is_null_or_undefined() {
        assert!(AmfValue::Null.is_null_or_undefined());
        assert!(AmfValue::Undefined.is_null_or_undefined());
        assert!(!AmfValue::Other.is_null_or_undefined());
        assert!(!AmfValue::Number(0.0).is_null_or_undefined());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(AmfValue::from(7i32), AmfValue::Number(7.0));
        assert_eq!(AmfValue::from(1000u32), AmfValue::Number(1000.0));
        assert_eq!(AmfValue::default(), AmfValue::Null);
    }
}
