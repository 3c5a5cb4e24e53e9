// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Column type model
//!
//! [`LogicalType`] is the physical-independent type of a column; a
//! [`ComplexLogicalType`] pairs it with an alias (the column name).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a field inside a schema
pub type FieldId = u64;

/// Logical column types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    /// Type not known yet
    Na,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    HugeInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    Float,
    Double,
    StringLiteral,
    Timestamp,
    List(Box<ComplexLogicalType>),
    Struct(Vec<ComplexLogicalType>),
}

impl LogicalType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt
                | LogicalType::SmallInt
                | LogicalType::Integer
                | LogicalType::BigInt
                | LogicalType::HugeInt
                | LogicalType::UTinyInt
                | LogicalType::USmallInt
                | LogicalType::UInteger
                | LogicalType::UBigInt
                | LogicalType::Float
                | LogicalType::Double
        )
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, LogicalType::List(_) | LogicalType::Struct(_))
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Na => write!(f, "NA"),
            LogicalType::Boolean => write!(f, "BOOLEAN"),
            LogicalType::TinyInt => write!(f, "TINYINT"),
            LogicalType::SmallInt => write!(f, "SMALLINT"),
            LogicalType::Integer => write!(f, "INTEGER"),
            LogicalType::BigInt => write!(f, "BIGINT"),
            LogicalType::HugeInt => write!(f, "HUGEINT"),
            LogicalType::UTinyInt => write!(f, "UTINYINT"),
            LogicalType::USmallInt => write!(f, "USMALLINT"),
            LogicalType::UInteger => write!(f, "UINTEGER"),
            LogicalType::UBigInt => write!(f, "UBIGINT"),
            LogicalType::Float => write!(f, "FLOAT"),
            LogicalType::Double => write!(f, "DOUBLE"),
            LogicalType::StringLiteral => write!(f, "STRING"),
            LogicalType::Timestamp => write!(f, "TIMESTAMP"),
            LogicalType::List(inner) => write!(f, "LIST<{}>", inner.logical_type()),
            LogicalType::Struct(children) => {
                write!(f, "STRUCT<")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", child.alias(), child.logical_type())?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Logical type with an alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplexLogicalType {
    #[serde(rename = "type")]
    ty: LogicalType,
    #[serde(default)]
    alias: String,
}

impl ComplexLogicalType {
    pub fn new(ty: LogicalType) -> Self {
        Self {
            ty,
            alias: String::new(),
        }
    }

    pub fn named(alias: impl Into<String>, ty: LogicalType) -> Self {
        Self {
            ty,
            alias: alias.into(),
        }
    }

    pub fn create_list(inner: LogicalType) -> Self {
        Self::new(LogicalType::List(Box::new(ComplexLogicalType::new(inner))))
    }

    pub fn create_struct(children: Vec<ComplexLogicalType>) -> Self {
        Self::new(LogicalType::Struct(children))
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.ty
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = alias.into();
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Children of a struct type, empty for anything else
    pub fn child_types(&self) -> &[ComplexLogicalType] {
        match &self.ty {
            LogicalType::Struct(children) => children,
            _ => &[],
        }
    }
}

impl From<LogicalType> for ComplexLogicalType {
    fn from(ty: LogicalType) -> Self {
        Self::new(ty)
    }
}

/// Per-column description stored alongside the type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub field_id: FieldId,
    pub required: bool,
    #[serde(default)]
    pub doc: String,
}

impl FieldDescription {
    pub fn new(field_id: FieldId) -> Self {
        Self {
            field_id,
            required: false,
            doc: String::new(),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let ty = ComplexLogicalType::create_struct(vec![
            ComplexLogicalType::named("id", LogicalType::BigInt),
            ComplexLogicalType::create_list(LogicalType::USmallInt).with_alias("tags"),
        ]);
        assert_eq!(
            ty.logical_type().to_string(),
            "STRUCT<id: BIGINT, tags: LIST<USMALLINT>>"
        );
        assert_eq!(ty.child_types().len(), 2);
        assert!(ty.logical_type().is_nested());
        assert!(LogicalType::HugeInt.is_numeric());
    }
}
