//! Wire shapes of stack values as tagged by `@type`
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, base64::Base64, serde_as};
use tracing::debug;

use crate::{StackError, StackValue};

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Bytes {
    #[serde_as(as = "Base64")]
    bytes: Vec<u8>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Number {
    #[serde_as(as = "DisplayFromStr")]
    number: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Elements {
    elements: Vec<Tagged>,
}

/// Both the bare and the stack entry shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub(crate) enum Tagged {
    #[serde(rename = "tvm.slice")]
    Slice(Bytes),
    #[serde(rename = "tvm.cell")]
    Cell(Bytes),
    #[serde(rename = "tvm.numberDecimal")]
    Number(Number),
    #[serde(rename = "tvm.tuple")]
    Tuple(Elements),
    #[serde(rename = "tvm.list")]
    List(Elements),

    #[serde(rename = "tvm.stackEntrySlice")]
    EntrySlice { slice: Box<Tagged> },
    #[serde(rename = "tvm.stackEntryCell")]
    EntryCell { cell: Box<Tagged> },
    #[serde(rename = "tvm.stackEntryNumber")]
    EntryNumber { number: Box<Tagged> },
    #[serde(rename = "tvm.stackEntryTuple")]
    EntryTuple { tuple: Box<Tagged> },
    #[serde(rename = "tvm.stackEntryList")]
    EntryList { list: Box<Tagged> },

    #[serde(other)]
    Unknown,
}

impl Tagged {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Slice(_) => "tvm.slice",
            Self::Cell(_) => "tvm.cell",
            Self::Number(_) => "tvm.numberDecimal",
            Self::Tuple(_) => "tvm.tuple",
            Self::List(_) => "tvm.list",
            Self::EntrySlice { .. } => "tvm.stackEntrySlice",
            Self::EntryCell { .. } => "tvm.stackEntryCell",
            Self::EntryNumber { .. } => "tvm.stackEntryNumber",
            Self::EntryTuple { .. } => "tvm.stackEntryTuple",
            Self::EntryList { .. } => "tvm.stackEntryList",
            Self::Unknown => "unknown",
        }
    }

    /// Bare shape of given value
    pub fn bare(value: &StackValue) -> Self {
        match value {
            StackValue::Slice(bytes) => Self::Slice(Bytes {
                bytes: bytes.clone(),
            }),
            StackValue::Cell(bytes) => Self::Cell(Bytes {
                bytes: bytes.clone(),
            }),
            StackValue::Number(number) => Self::Number(Number {
                number: number.clone(),
            }),
            StackValue::Tuple(elements) => Self::Tuple(Elements {
                elements: elements.iter().map(Self::entry).collect(),
            }),
            StackValue::List(elements) => Self::List(Elements {
                elements: elements.iter().map(Self::entry).collect(),
            }),
        }
    }

    /// Stack entry shape of given value
    pub fn entry(value: &StackValue) -> Self {
        let bare = Box::new(Self::bare(value));
        match value {
            StackValue::Slice(_) => Self::EntrySlice { slice: bare },
            StackValue::Cell(_) => Self::EntryCell { cell: bare },
            StackValue::Number(_) => Self::EntryNumber { number: bare },
            StackValue::Tuple(_) => Self::EntryTuple { tuple: bare },
            StackValue::List(_) => Self::EntryList { list: bare },
        }
    }

    /// Returns `None` if this or any nested value has unknown `@type`
    pub fn into_value(self) -> Result<Option<StackValue>, StackError> {
        let entry = self.type_name();
        Ok(Some(match self {
            Self::Slice(Bytes { bytes }) => StackValue::Slice(bytes),
            Self::Cell(Bytes { bytes }) => StackValue::Cell(bytes),
            Self::Number(Number { number }) => StackValue::Number(number),
            Self::Tuple(Elements { elements }) => match Self::into_values(elements)? {
                Some(elements) => StackValue::Tuple(elements),
                None => return Ok(None),
            },
            Self::List(Elements { elements }) => match Self::into_values(elements)? {
                Some(elements) => StackValue::List(elements),
                None => return Ok(None),
            },
            Self::EntrySlice { slice: inner } => return (*inner).unwrap_entry(entry, "tvm.slice"),
            Self::EntryCell { cell: inner } => return (*inner).unwrap_entry(entry, "tvm.cell"),
            Self::EntryNumber { number: inner } => {
                return (*inner).unwrap_entry(entry, "tvm.numberDecimal");
            }
            Self::EntryTuple { tuple: inner } => return (*inner).unwrap_entry(entry, "tvm.tuple"),
            Self::EntryList { list: inner } => return (*inner).unwrap_entry(entry, "tvm.list"),
            Self::Unknown => {
                debug!("skipping stack value of unknown @type");
                return Ok(None);
            }
        }))
    }

    pub fn into_values(values: Vec<Self>) -> Result<Option<Vec<StackValue>>, StackError> {
        values.into_iter().map(Self::into_value).collect()
    }

    fn unwrap_entry(
        self,
        entry: &'static str,
        expected: &'static str,
    ) -> Result<Option<StackValue>, StackError> {
        match self.type_name() {
            "unknown" => self.into_value(),
            inner if inner == expected => self.into_value(),
            inner => Err(StackError::EntryMismatch { entry, inner }),
        }
    }
}
