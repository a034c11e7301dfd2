use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

use crate::{StackError, repr::Tagged};

/// Value on TVM stack as passed to and returned from get-methods.
///
/// Each variant has a bare JSON shape (`tvm.slice`, `tvm.cell`,
/// `tvm.numberDecimal`, `tvm.tuple`, `tvm.list`) and a stack entry shape
/// wrapping it (`tvm.stackEntrySlice` and so on). Both are accepted when
/// decoding.
///
/// [`Serialize`] and [`Deserialize`] use the stack entry shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackValue {
    /// Serialized BoC of a slice
    Slice(Vec<u8>),
    /// Serialized BoC of a cell
    Cell(Vec<u8>),
    Number(BigInt),
    Tuple(Vec<StackValue>),
    List(Vec<StackValue>),
}

impl StackValue {
    /// Decode either shape. Returns `None` if this value or any of its
    /// elements has unknown `@type`.
    pub fn from_json(value: Value) -> Result<Option<Self>, StackError> {
        serde_json::from_value::<Tagged>(value)?.into_value()
    }

    /// Same as [`from_json`](StackValue::from_json), but from string
    pub fn from_json_str(s: &str) -> Result<Option<Self>, StackError> {
        serde_json::from_str::<Tagged>(s)?.into_value()
    }

    /// Encode as bare shape. Elements of tuples and lists are always in
    /// stack entry shape.
    pub fn to_json(&self) -> Result<Value, StackError> {
        serde_json::to_value(Tagged::bare(self)).map_err(Into::into)
    }

    /// Encode as stack entry shape
    pub fn to_entry_json(&self) -> Result<Value, StackError> {
        serde_json::to_value(Tagged::entry(self)).map_err(Into::into)
    }

    /// `@type` of the bare shape
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Slice(_) => "tvm.slice",
            Self::Cell(_) => "tvm.cell",
            Self::Number(_) => "tvm.numberDecimal",
            Self::Tuple(_) => "tvm.tuple",
            Self::List(_) => "tvm.list",
        }
    }
}

impl From<BigInt> for StackValue {
    #[inline]
    fn from(number: BigInt) -> Self {
        Self::Number(number)
    }
}

impl Serialize for StackValue {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Tagged::entry(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StackValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Tagged::deserialize(deserializer)?
            .into_value()
            .map_err(de::Error::custom)?
            .ok_or_else(|| de::Error::custom("unknown @type"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn number(s: &str) -> StackValue {
        StackValue::Number(s.parse().unwrap())
    }

    #[rstest]
    #[case::slice(StackValue::Slice(vec![0x01, 0x02]))]
    #[case::big_number(number("12345678901234567890"))]
    #[case::empty_tuple(StackValue::Tuple(Vec::new()))]
    #[case::list(StackValue::List(vec![number("-7"), StackValue::Tuple(Vec::new())]))]
    fn round_trip(#[case] value: StackValue) {
        assert_eq!(
            StackValue::from_json(value.to_json().unwrap()).unwrap(),
            Some(value.clone())
        );
        assert_eq!(
            StackValue::from_json(value.to_entry_json().unwrap()).unwrap(),
            Some(value)
        );
    }

    #[test]
    fn slice_shapes() {
        let value = StackValue::Slice(vec![0x01, 0x02]);
        assert_eq!(
            value.to_json().unwrap(),
            json!({"@type": "tvm.slice", "bytes": "AQI="})
        );
        assert_eq!(
            value.to_entry_json().unwrap(),
            json!({
                "@type": "tvm.stackEntrySlice",
                "slice": {"@type": "tvm.slice", "bytes": "AQI="},
            })
        );
    }

    #[test]
    fn cell_entry_field() {
        let value = StackValue::Cell(vec![0xff]);
        let entry = json!({
            "@type": "tvm.stackEntryCell",
            "cell": {"@type": "tvm.cell", "bytes": "/w=="},
        });
        assert_eq!(value.to_entry_json().unwrap(), entry);
        assert_eq!(StackValue::from_json(entry).unwrap(), Some(value));
    }

    #[test]
    fn number_is_decimal_string() {
        let value = number("12345678901234567890");
        assert_eq!(
            value.to_entry_json().unwrap(),
            json!({
                "@type": "tvm.stackEntryNumber",
                "number": {"@type": "tvm.numberDecimal", "number": "12345678901234567890"},
            })
        );
    }

    #[test]
    fn elements_are_entries() {
        let value = StackValue::List(vec![number("1"), StackValue::Tuple(Vec::new())]);
        assert_eq!(
            value.to_json().unwrap(),
            json!({
                "@type": "tvm.list",
                "elements": [
                    {
                        "@type": "tvm.stackEntryNumber",
                        "number": {"@type": "tvm.numberDecimal", "number": "1"},
                    },
                    {
                        "@type": "tvm.stackEntryTuple",
                        "tuple": {"@type": "tvm.tuple", "elements": []},
                    },
                ],
            })
        );
    }

    #[test]
    fn bare_elements() {
        let value = StackValue::from_json(json!({
            "@type": "tvm.tuple",
            "elements": [
                {"@type": "tvm.numberDecimal", "number": "5"},
                {
                    "@type": "tvm.stackEntrySlice",
                    "slice": {"@type": "tvm.slice", "bytes": "AQI="},
                },
            ],
        }))
        .unwrap();
        assert_eq!(
            value,
            Some(StackValue::Tuple(vec![
                number("5"),
                StackValue::Slice(vec![0x01, 0x02])
            ]))
        );
    }

    #[rstest]
    #[case::top_level(json!({"@type": "tvm.stackEntryContinuation", "continuation": {}}))]
    #[case::inside_entry(json!({"@type": "tvm.stackEntryTuple", "tuple": {"@type": "tvm.unknown"}}))]
    #[case::nested_element(json!({
        "@type": "tvm.list",
        "elements": [
            {"@type": "tvm.numberDecimal", "number": "1"},
            {"@type": "tvm.tuple", "elements": [{"@type": "tvm.unsupported"}]},
        ],
    }))]
    fn unknown_type(#[case] value: Value) {
        assert_eq!(StackValue::from_json(value).unwrap(), None);
    }

    #[rstest]
    #[case::not_object(json!(5))]
    #[case::no_type(json!({"bytes": "AQI="}))]
    #[case::missing_bytes(json!({"@type": "tvm.slice"}))]
    #[case::bad_base64(json!({"@type": "tvm.cell", "bytes": "not base64!"}))]
    #[case::non_decimal(json!({"@type": "tvm.numberDecimal", "number": "0x10"}))]
    #[case::native_number(json!({"@type": "tvm.numberDecimal", "number": 10}))]
    #[case::missing_elements(json!({"@type": "tvm.tuple"}))]
    fn malformed(#[case] value: Value) {
        assert!(matches!(
            StackValue::from_json(value),
            Err(StackError::Json(_))
        ));
    }

    #[test]
    fn entry_mismatch() {
        let err = StackValue::from_json(json!({
            "@type": "tvm.stackEntrySlice",
            "slice": {"@type": "tvm.cell", "bytes": "AQI="},
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            StackError::EntryMismatch {
                entry: "tvm.stackEntrySlice",
                inner: "tvm.cell",
            }
        ));
    }

    #[test]
    fn from_str() {
        assert_eq!(
            StackValue::from_json_str(r#"{"@type":"tvm.numberDecimal","number":"-1"}"#).unwrap(),
            Some(number("-1"))
        );
    }

    #[test]
    fn serde() {
        let value = StackValue::Tuple(vec![StackValue::Cell(vec![0xff])]);
        let s = serde_json::to_string(&value).unwrap();
        assert_eq!(serde_json::from_str::<StackValue>(&s).unwrap(), value);
        assert!(serde_json::from_str::<StackValue>(r#"{"@type":"tvm.null"}"#).is_err());
    }
}
