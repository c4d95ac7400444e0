// Copyright 2024 The Lakesync Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hand-written bindings for the slice of `parquet.thrift` the core
//! needs: the schema-element tree and the file metadata envelope that
//! wraps it. Field IDs match the upstream `parquet-format` IDL; this
//! is the same shape the Thrift compiler would generate, trimmed to
//! the fields this crate reads.

use thrift::protocol::TFieldIdentifier;
use thrift::protocol::TInputProtocol;
use thrift::protocol::TType;
use thrift::Error as ThriftError;
use thrift::ProtocolError;
use thrift::ProtocolErrorKind;

fn field_id(field_ident: &TFieldIdentifier) -> thrift::Result<i16> {
    field_ident.id.ok_or_else(|| {
        ThriftError::Protocol(ProtocolError::new(
            ProtocolErrorKind::Unknown,
            "missing field id in protocol stack".to_string(),
        ))
    })
}

/// `parquet.thrift` `Type`: the physical storage type of a primitive
/// leaf. Group nodes carry no `Type` at all (`None` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Boolean = 0,
    Int32 = 1,
    Int64 = 2,
    Int96 = 3,
    Float = 4,
    Double = 5,
    ByteArray = 6,
    FixedLenByteArray = 7,
}

impl Type {
    fn from_i32(v: i32) -> thrift::Result<Self> {
        match v {
            0 => Ok(Type::Boolean),
            1 => Ok(Type::Int32),
            2 => Ok(Type::Int64),
            3 => Ok(Type::Int96),
            4 => Ok(Type::Float),
            5 => Ok(Type::Double),
            6 => Ok(Type::ByteArray),
            7 => Ok(Type::FixedLenByteArray),
            _ => Err(ThriftError::Protocol(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                format!("unknown parquet Type {}", v),
            ))),
        }
    }
}

/// `parquet.thrift` `ConvertedType`: the logical annotation layered on
/// top of a physical `Type` (or a group, for LIST/MAP/MAP_KEY_VALUE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertedType {
    Utf8 = 0,
    MapKeyValue = 2,
    Map = 1,
    List = 3,
    Decimal = 5,
    Other(i32),
}

impl ConvertedType {
    fn from_i32(v: i32) -> Self {
        match v {
            0 => ConvertedType::Utf8,
            1 => ConvertedType::Map,
            2 => ConvertedType::MapKeyValue,
            3 => ConvertedType::List,
            5 => ConvertedType::Decimal,
            other => ConvertedType::Other(other),
        }
    }
}

/// `parquet.thrift` `FieldRepetitionType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRepetitionType {
    Required = 0,
    Optional = 1,
    Repeated = 2,
}

impl FieldRepetitionType {
    fn from_i32(v: i32) -> thrift::Result<Self> {
        match v {
            0 => Ok(FieldRepetitionType::Required),
            1 => Ok(FieldRepetitionType::Optional),
            2 => Ok(FieldRepetitionType::Repeated),
            _ => Err(ThriftError::Protocol(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                format!("unknown parquet FieldRepetitionType {}", v),
            ))),
        }
    }
}

/// One node of the flattened, pre-order schema tree. `type_` is `None`
/// on group nodes (structs, lists, maps); `num_children` is only
/// meaningful on group nodes.
#[derive(Debug, Clone)]
pub struct SchemaElement {
    pub type_: Option<Type>,
    pub type_length: Option<i32>,
    pub repetition_type: Option<FieldRepetitionType>,
    pub name: String,
    pub num_children: Option<i32>,
    pub converted_type: Option<ConvertedType>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
}

impl SchemaElement {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<SchemaElement> {
        i_prot.read_struct_begin()?;
        let mut f_1: Option<Type> = None;
        let mut f_2: Option<i32> = None;
        let mut f_3: Option<FieldRepetitionType> = None;
        let mut f_4: Option<String> = None;
        let mut f_5: Option<i32> = None;
        let mut f_6: Option<ConvertedType> = None;
        let mut f_7: Option<i32> = None;
        let mut f_8: Option<i32> = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            let id = field_id(&field_ident)?;
            match id {
                1 => f_1 = Some(Type::from_i32(i_prot.read_i32()?)?),
                2 => f_2 = Some(i_prot.read_i32()?),
                3 => f_3 = Some(FieldRepetitionType::from_i32(i_prot.read_i32()?)?),
                4 => f_4 = Some(i_prot.read_string()?),
                5 => f_5 = Some(i_prot.read_i32()?),
                6 => f_6 = Some(ConvertedType::from_i32(i_prot.read_i32()?)),
                7 => f_7 = Some(i_prot.read_i32()?),
                8 => f_8 = Some(i_prot.read_i32()?),
                _ => {
                    i_prot.skip(field_ident.field_type)?;
                }
            };
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        let name = f_4.ok_or_else(|| {
            ThriftError::Protocol(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                "SchemaElement.name is required".to_string(),
            ))
        })?;
        Ok(SchemaElement {
            type_: f_1,
            type_length: f_2,
            repetition_type: f_3,
            name,
            num_children: f_5,
            converted_type: f_6,
            scale: f_7,
            precision: f_8,
        })
    }

    pub fn is_group(&self) -> bool {
        self.type_.is_none()
    }
}

/// `parquet.thrift` `FileMetaData`, trimmed to the field the schema
/// projector reads. Unknown/unused fields (`row_groups`, `key_value_
/// metadata`, `created_by`, `column_orders`, `num_rows`) are skipped
/// on the wire rather than materialized.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: Vec<SchemaElement>,
}

impl FileMetaData {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<FileMetaData> {
        i_prot.read_struct_begin()?;
        let mut version: Option<i32> = None;
        let mut schema: Option<Vec<SchemaElement>> = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            let id = field_id(&field_ident)?;
            match id {
                1 => version = Some(i_prot.read_i32()?),
                2 => {
                    let list_ident = i_prot.read_list_begin()?;
                    let mut elements = Vec::with_capacity(list_ident.size.max(0) as usize);
                    for _ in 0..list_ident.size {
                        elements.push(SchemaElement::read_from_in_protocol(i_prot)?);
                    }
                    i_prot.read_list_end()?;
                    schema = Some(elements);
                }
                _ => {
                    i_prot.skip(field_ident.field_type)?;
                }
            };
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        let schema = schema.ok_or_else(|| {
            ThriftError::Protocol(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                "FileMetaData.schema is required".to_string(),
            ))
        })?;
        Ok(FileMetaData {
            version: version.unwrap_or_default(),
            schema,
        })
    }
}
