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

//! Hand-written bindings for the slice of `hive_metastore.thrift` the
//! core talks to. Struct names, field names and field IDs follow the
//! upstream Hive Metastore IDL so a real metastore decodes these
//! exactly as it would decode output from the official generated
//! client.

use std::collections::BTreeMap;

use thrift::protocol::TFieldIdentifier;
use thrift::protocol::TInputProtocol;
use thrift::protocol::TListIdentifier;
use thrift::protocol::TMapIdentifier;
use thrift::protocol::TOutputProtocol;
use thrift::protocol::TStructIdentifier;
use thrift::protocol::TType;
use thrift::Error as ThriftError;
use thrift::ProtocolError;
use thrift::ProtocolErrorKind;

pub(crate) fn field_id(field_ident: &TFieldIdentifier) -> thrift::Result<i16> {
    field_ident.id.ok_or_else(|| {
        ThriftError::Protocol(ProtocolError::new(
            ProtocolErrorKind::Unknown,
            "missing field id in protocol stack".to_string(),
        ))
    })
}

fn missing_field(struct_name: &str, field_name: &str) -> ThriftError {
    ThriftError::Protocol(ProtocolError::new(
        ProtocolErrorKind::InvalidData,
        format!("{}.{} is required", struct_name, field_name),
    ))
}

fn read_string_map(i_prot: &mut dyn TInputProtocol) -> thrift::Result<BTreeMap<String, String>> {
    let map_ident = i_prot.read_map_begin()?;
    let mut map = BTreeMap::new();
    for _ in 0..map_ident.size {
        let key = i_prot.read_string()?;
        let val = i_prot.read_string()?;
        map.insert(key, val);
    }
    i_prot.read_map_end()?;
    Ok(map)
}

fn write_string_map(
    o_prot: &mut dyn TOutputProtocol,
    map: &BTreeMap<String, String>,
) -> thrift::Result<()> {
    o_prot.write_map_begin(&TMapIdentifier::new(TType::String, TType::String, map.len() as i32))?;
    for (k, v) in map {
        o_prot.write_string(k)?;
        o_prot.write_string(v)?;
    }
    o_prot.write_map_end()
}

fn read_string_list(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Vec<String>> {
    let list_ident = i_prot.read_list_begin()?;
    let mut items = Vec::with_capacity(list_ident.size.max(0) as usize);
    for _ in 0..list_ident.size {
        items.push(i_prot.read_string()?);
    }
    i_prot.read_list_end()?;
    Ok(items)
}

fn write_string_list(o_prot: &mut dyn TOutputProtocol, items: &[String]) -> thrift::Result<()> {
    o_prot.write_list_begin(&TListIdentifier::new(TType::String, items.len() as i32))?;
    for item in items {
        o_prot.write_string(item)?;
    }
    o_prot.write_list_end()
}

/// `hive_metastore.thrift` `FieldSchema`: a named, typed column
/// (also used for partition keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub type_: String,
    pub comment: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        FieldSchema {
            name: name.into(),
            type_: type_.into(),
            comment: None,
        }
    }

    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut name = None;
        let mut type_ = None;
        let mut comment = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => name = Some(i_prot.read_string()?),
                2 => type_ = Some(i_prot.read_string()?),
                3 => comment = Some(i_prot.read_string()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(FieldSchema {
            name: name.ok_or_else(|| missing_field("FieldSchema", "name"))?,
            type_: type_.ok_or_else(|| missing_field("FieldSchema", "type"))?,
            comment,
        })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("FieldSchema"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("name", TType::String, 1))?;
        o_prot.write_string(&self.name)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("type", TType::String, 2))?;
        o_prot.write_string(&self.type_)?;
        o_prot.write_field_end()?;
        if let Some(ref comment) = self.comment {
            o_prot.write_field_begin(&TFieldIdentifier::new("comment", TType::String, 3))?;
            o_prot.write_string(comment)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `SerDeInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerDeInfo {
    pub name: Option<String>,
    pub serialization_lib: Option<String>,
    pub parameters: BTreeMap<String, String>,
}

impl SerDeInfo {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut name = None;
        let mut serialization_lib = None;
        let mut parameters = BTreeMap::new();
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => name = Some(i_prot.read_string()?),
                2 => serialization_lib = Some(i_prot.read_string()?),
                3 => parameters = read_string_map(i_prot)?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(SerDeInfo {
            name,
            serialization_lib,
            parameters,
        })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("SerDeInfo"))?;
        if let Some(ref name) = self.name {
            o_prot.write_field_begin(&TFieldIdentifier::new("name", TType::String, 1))?;
            o_prot.write_string(name)?;
            o_prot.write_field_end()?;
        }
        if let Some(ref lib) = self.serialization_lib {
            o_prot.write_field_begin(&TFieldIdentifier::new("serializationLib", TType::String, 2))?;
            o_prot.write_string(lib)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_begin(&TFieldIdentifier::new("parameters", TType::Map, 3))?;
        write_string_map(o_prot, &self.parameters)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `SkewedInfo`. The reconciler never creates
/// skewed tables; this is always the empty value, carried only so the
/// storage descriptor round-trips byte-for-byte with what a real
/// metastore hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkewedInfo {
    pub skewed_col_names: Vec<String>,
    pub skewed_col_values: Vec<Vec<String>>,
}

impl SkewedInfo {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut skewed_col_names = Vec::new();
        let mut skewed_col_values = Vec::new();
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => skewed_col_names = read_string_list(i_prot)?,
                2 => {
                    let list_ident = i_prot.read_list_begin()?;
                    let mut values = Vec::with_capacity(list_ident.size.max(0) as usize);
                    for _ in 0..list_ident.size {
                        values.push(read_string_list(i_prot)?);
                    }
                    i_prot.read_list_end()?;
                    skewed_col_values = values;
                }
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(SkewedInfo {
            skewed_col_names,
            skewed_col_values,
        })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("SkewedInfo"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("skewedColNames", TType::List, 1))?;
        write_string_list(o_prot, &self.skewed_col_names)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("skewedColValues", TType::List, 2))?;
        o_prot.write_list_begin(&TListIdentifier::new(TType::List, self.skewed_col_values.len() as i32))?;
        for values in &self.skewed_col_values {
            write_string_list(o_prot, values)?;
        }
        o_prot.write_list_end()?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `StorageDescriptor`. Carries the fixed
/// external-Parquet-table template described in the Catalog design:
/// `MapredParquetInputFormat`/`MapredParquetOutputFormat`,
/// `ParquetHiveSerDe` with `serialization.format=1`, uncompressed,
/// unbucketed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDescriptor {
    pub cols: Vec<FieldSchema>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub compressed: bool,
    pub num_buckets: i32,
    pub serde_info: SerDeInfo,
    pub bucket_cols: Vec<String>,
    pub parameters: BTreeMap<String, String>,
    pub skewed_info: SkewedInfo,
    pub stored_as_sub_directories: bool,
}

pub const PARQUET_INPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat";
pub const PARQUET_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat";
pub const PARQUET_SERDE_LIB: &str = "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe";

impl StorageDescriptor {
    /// The fixed template all lakesync-managed tables and partitions
    /// use, with `cols` and `location` filled in by the caller.
    pub fn template(cols: Vec<FieldSchema>, location: String) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("serialization.format".to_string(), "1".to_string());
        StorageDescriptor {
            cols,
            location,
            input_format: PARQUET_INPUT_FORMAT.to_string(),
            output_format: PARQUET_OUTPUT_FORMAT.to_string(),
            compressed: false,
            num_buckets: -1,
            serde_info: SerDeInfo {
                name: None,
                serialization_lib: Some(PARQUET_SERDE_LIB.to_string()),
                parameters,
            },
            bucket_cols: Vec::new(),
            parameters: BTreeMap::new(),
            skewed_info: SkewedInfo::default(),
            stored_as_sub_directories: false,
        }
    }

    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut cols = Vec::new();
        let mut location = None;
        let mut input_format = String::new();
        let mut output_format = String::new();
        let mut compressed = false;
        let mut num_buckets = -1;
        let mut serde_info = None;
        let mut bucket_cols = Vec::new();
        let mut parameters = BTreeMap::new();
        let mut skewed_info = SkewedInfo::default();
        let mut stored_as_sub_directories = false;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => {
                    let list_ident = i_prot.read_list_begin()?;
                    let mut items = Vec::with_capacity(list_ident.size.max(0) as usize);
                    for _ in 0..list_ident.size {
                        items.push(FieldSchema::read_from_in_protocol(i_prot)?);
                    }
                    i_prot.read_list_end()?;
                    cols = items;
                }
                2 => location = Some(i_prot.read_string()?),
                3 => input_format = i_prot.read_string()?,
                4 => output_format = i_prot.read_string()?,
                5 => compressed = i_prot.read_bool()?,
                6 => num_buckets = i_prot.read_i32()?,
                7 => serde_info = Some(SerDeInfo::read_from_in_protocol(i_prot)?),
                8 => bucket_cols = read_string_list(i_prot)?,
                10 => parameters = read_string_map(i_prot)?,
                11 => skewed_info = SkewedInfo::read_from_in_protocol(i_prot)?,
                12 => stored_as_sub_directories = i_prot.read_bool()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(StorageDescriptor {
            cols,
            location: location.ok_or_else(|| missing_field("StorageDescriptor", "location"))?,
            input_format,
            output_format,
            compressed,
            num_buckets,
            serde_info: serde_info.ok_or_else(|| missing_field("StorageDescriptor", "serdeInfo"))?,
            bucket_cols,
            parameters,
            skewed_info,
            stored_as_sub_directories,
        })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("StorageDescriptor"))?;

        o_prot.write_field_begin(&TFieldIdentifier::new("cols", TType::List, 1))?;
        o_prot.write_list_begin(&TListIdentifier::new(TType::Struct, self.cols.len() as i32))?;
        for col in &self.cols {
            col.write_to_out_protocol(o_prot)?;
        }
        o_prot.write_list_end()?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("location", TType::String, 2))?;
        o_prot.write_string(&self.location)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("inputFormat", TType::String, 3))?;
        o_prot.write_string(&self.input_format)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("outputFormat", TType::String, 4))?;
        o_prot.write_string(&self.output_format)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("compressed", TType::Bool, 5))?;
        o_prot.write_bool(self.compressed)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("numBuckets", TType::I32, 6))?;
        o_prot.write_i32(self.num_buckets)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("serdeInfo", TType::Struct, 7))?;
        self.serde_info.write_to_out_protocol(o_prot)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("bucketCols", TType::List, 8))?;
        write_string_list(o_prot, &self.bucket_cols)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("parameters", TType::Map, 10))?;
        write_string_map(o_prot, &self.parameters)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("skewedInfo", TType::Struct, 11))?;
        self.skewed_info.write_to_out_protocol(o_prot)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("storedAsSubDirectories", TType::Bool, 12))?;
        o_prot.write_bool(self.stored_as_sub_directories)?;
        o_prot.write_field_end()?;

        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `Table`. `table_type` is always
/// `EXTERNAL_TABLE`; `parameters` always sets `EXTERNAL=TRUE` and
/// `hive.hcatalog.partition.spec.grouping.enabled=TRUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub table_name: String,
    pub db_name: String,
    pub owner: String,
    pub sd: StorageDescriptor,
    pub partition_keys: Vec<FieldSchema>,
    pub parameters: BTreeMap<String, String>,
    pub table_type: Option<String>,
}

impl Table {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut table_name = None;
        let mut db_name = None;
        let mut owner = String::new();
        let mut sd = None;
        let mut partition_keys = Vec::new();
        let mut parameters = BTreeMap::new();
        let mut table_type = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => table_name = Some(i_prot.read_string()?),
                2 => db_name = Some(i_prot.read_string()?),
                3 => owner = i_prot.read_string()?,
                7 => sd = Some(StorageDescriptor::read_from_in_protocol(i_prot)?),
                8 => {
                    let list_ident = i_prot.read_list_begin()?;
                    let mut items = Vec::with_capacity(list_ident.size.max(0) as usize);
                    for _ in 0..list_ident.size {
                        items.push(FieldSchema::read_from_in_protocol(i_prot)?);
                    }
                    i_prot.read_list_end()?;
                    partition_keys = items;
                }
                9 => parameters = read_string_map(i_prot)?,
                12 => table_type = Some(i_prot.read_string()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(Table {
            table_name: table_name.ok_or_else(|| missing_field("Table", "tableName"))?,
            db_name: db_name.ok_or_else(|| missing_field("Table", "dbName"))?,
            owner,
            sd: sd.ok_or_else(|| missing_field("Table", "sd"))?,
            partition_keys,
            parameters,
            table_type,
        })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Table"))?;

        o_prot.write_field_begin(&TFieldIdentifier::new("tableName", TType::String, 1))?;
        o_prot.write_string(&self.table_name)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("dbName", TType::String, 2))?;
        o_prot.write_string(&self.db_name)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("owner", TType::String, 3))?;
        o_prot.write_string(&self.owner)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("sd", TType::Struct, 7))?;
        self.sd.write_to_out_protocol(o_prot)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("partitionKeys", TType::List, 8))?;
        o_prot.write_list_begin(&TListIdentifier::new(TType::Struct, self.partition_keys.len() as i32))?;
        for key in &self.partition_keys {
            key.write_to_out_protocol(o_prot)?;
        }
        o_prot.write_list_end()?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("parameters", TType::Map, 9))?;
        write_string_map(o_prot, &self.parameters)?;
        o_prot.write_field_end()?;

        if let Some(ref table_type) = self.table_type {
            o_prot.write_field_begin(&TFieldIdentifier::new("tableType", TType::String, 12))?;
            o_prot.write_string(table_type)?;
            o_prot.write_field_end()?;
        }

        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `Partition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub values: Vec<String>,
    pub db_name: String,
    pub table_name: String,
    pub sd: StorageDescriptor,
    pub parameters: BTreeMap<String, String>,
}

impl Partition {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut values = Vec::new();
        let mut db_name = String::new();
        let mut table_name = String::new();
        let mut sd = None;
        let mut parameters = BTreeMap::new();
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => values = read_string_list(i_prot)?,
                2 => db_name = i_prot.read_string()?,
                3 => table_name = i_prot.read_string()?,
                6 => sd = Some(StorageDescriptor::read_from_in_protocol(i_prot)?),
                7 => parameters = read_string_map(i_prot)?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(Partition {
            values,
            db_name,
            table_name,
            sd: sd.ok_or_else(|| missing_field("Partition", "sd"))?,
            parameters,
        })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Partition"))?;

        o_prot.write_field_begin(&TFieldIdentifier::new("values", TType::List, 1))?;
        write_string_list(o_prot, &self.values)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("dbName", TType::String, 2))?;
        o_prot.write_string(&self.db_name)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("tableName", TType::String, 3))?;
        o_prot.write_string(&self.table_name)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("sd", TType::Struct, 6))?;
        self.sd.write_to_out_protocol(o_prot)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("parameters", TType::Map, 7))?;
        write_string_map(o_prot, &self.parameters)?;
        o_prot.write_field_end()?;

        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `RequestPartsSpec` union. Only the
/// `names` arm is produced by this client — partition drops are
/// always addressed by their `k=v/...` name, never by expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPartsSpec {
    Names(Vec<String>),
}

impl RequestPartsSpec {
    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("RequestPartsSpec"))?;
        match self {
            RequestPartsSpec::Names(names) => {
                o_prot.write_field_begin(&TFieldIdentifier::new("names", TType::List, 1))?;
                write_string_list(o_prot, names)?;
                o_prot.write_field_end()?;
            }
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `DropPartitionsRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPartitionsRequest {
    pub db_name: String,
    pub tbl_name: String,
    pub parts: RequestPartsSpec,
    pub delete_data: bool,
    pub if_exists: bool,
    pub need_result: bool,
}

impl DropPartitionsRequest {
    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("DropPartitionsRequest"))?;

        o_prot.write_field_begin(&TFieldIdentifier::new("dbName", TType::String, 1))?;
        o_prot.write_string(&self.db_name)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("tblName", TType::String, 2))?;
        o_prot.write_string(&self.tbl_name)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("parts", TType::Struct, 3))?;
        self.parts.write_to_out_protocol(o_prot)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("deleteData", TType::Bool, 4))?;
        o_prot.write_bool(self.delete_data)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("ifExists", TType::Bool, 5))?;
        o_prot.write_bool(self.if_exists)?;
        o_prot.write_field_end()?;

        o_prot.write_field_begin(&TFieldIdentifier::new("needResult", TType::Bool, 8))?;
        o_prot.write_bool(self.need_result)?;
        o_prot.write_field_end()?;

        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// `hive_metastore.thrift` `NoSuchObjectException`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoSuchObjectException {
    pub message: Option<String>,
}

impl std::fmt::Display for NoSuchObjectException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NoSuchObjectException: {}",
            self.message.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for NoSuchObjectException {}

impl NoSuchObjectException {
    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        i_prot.read_struct_begin()?;
        let mut message = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            if field_id(&field_ident)? == 1 {
                message = Some(i_prot.read_string()?);
            } else {
                i_prot.skip(field_ident.field_type)?;
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(NoSuchObjectException { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use thrift::protocol::TBinaryInputProtocol;
    use thrift::protocol::TBinaryOutputProtocol;

    fn roundtrip_partition(p: &Partition) -> Partition {
        let mut buf = Vec::new();
        {
            let mut o_prot = TBinaryOutputProtocol::new(&mut buf, true);
            p.write_to_out_protocol(&mut o_prot).unwrap();
        }
        let mut i_prot = TBinaryInputProtocol::new(Cursor::new(buf), true);
        Partition::read_from_in_protocol(&mut i_prot).unwrap()
    }

    #[test]
    fn partition_round_trips_over_binary_protocol() {
        let sd = StorageDescriptor::template(
            vec![FieldSchema::new("a", "int")],
            "s3://bucket/ds/v1/k=1".to_string(),
        );
        let partition = Partition {
            values: vec!["1".to_string()],
            db_name: "telemetry".to_string(),
            table_name: "ds_v1".to_string(),
            sd,
            parameters: BTreeMap::new(),
        };
        assert_eq!(roundtrip_partition(&partition), partition);
    }
}
