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

//! A minimal, blocking `ThriftHiveMetastore` client speaking
//! `TBinaryProtocol` over a buffered TCP transport. The `thrift` crate
//! has no async runtime integration, so [`crate::HiveCatalog`] drives
//! this from inside `tokio::task::spawn_blocking`.

use common_exception::ErrorCode;
use common_exception::Result;
use thrift::protocol::TBinaryInputProtocol;
use thrift::protocol::TBinaryOutputProtocol;
use thrift::protocol::TFieldIdentifier;
use thrift::protocol::TInputProtocol;
use thrift::protocol::TMessageIdentifier;
use thrift::protocol::TMessageType;
use thrift::protocol::TOutputProtocol;
use thrift::protocol::TStructIdentifier;
use thrift::protocol::TType;
use thrift::transport::ReadHalf;
use thrift::transport::TBufferedReadTransport;
use thrift::transport::TBufferedWriteTransport;
use thrift::transport::TIoChannel;
use thrift::transport::TTcpChannel;
use thrift::transport::WriteHalf;
use thrift::ApplicationError;
use thrift::ApplicationErrorKind;

use crate::ttypes::field_id;
use crate::ttypes::DropPartitionsRequest;
use crate::ttypes::NoSuchObjectException;
use crate::ttypes::Partition;
use crate::ttypes::Table;

type InProt = TBinaryInputProtocol<ReadHalf<TBufferedReadTransport<TTcpChannel>>>;
type OutProt = TBinaryOutputProtocol<WriteHalf<TBufferedWriteTransport<TTcpChannel>>>;

/// A synchronous connection to a `hive_metastore.thrift` server.
/// Each instance owns one TCP connection; callers needing concurrency
/// should open one client per blocking task rather than share one.
pub struct ThriftHiveMetastoreClient {
    i_prot: InProt,
    o_prot: OutProt,
    seqid: i32,
}

fn read_application_error(i_prot: &mut dyn TInputProtocol) -> thrift::Result<ApplicationError> {
    i_prot.read_struct_begin()?;
    let mut message = None;
    let mut kind = ApplicationErrorKind::Unknown;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        match field_id(&field_ident)? {
            1 => message = Some(i_prot.read_string()?),
            2 => {
                let _kind_code = i_prot.read_i32()?;
                kind = ApplicationErrorKind::Unknown;
            }
            _ => i_prot.skip(field_ident.field_type)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    Ok(ApplicationError::new(kind, message.unwrap_or_default()))
}

/// Drains a void-result struct. Hive's `void`-returning calls (create,
/// alter, drop) put nothing in the success case; any field present at
/// all is one of the call's declared exceptions.
fn read_void_result(i_prot: &mut dyn TInputProtocol, method: &str) -> thrift::Result<()> {
    i_prot.read_struct_begin()?;
    let mut failed = false;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        i_prot.skip(field_ident.field_type)?;
        failed = true;
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    if failed {
        Err(thrift::Error::Application(ApplicationError::new(
            ApplicationErrorKind::Unknown,
            format!("{} raised a declared exception", method),
        )))
    } else {
        Ok(())
    }
}

/// Like [`read_value_result`] but decodes a `NoSuchObjectException` at
/// field id 1 into `Ok(None)` instead of an error, since every caller
/// of this variant wants "the object does not exist" treated as data,
/// not failure.
fn read_value_result_or_not_found<T>(
    i_prot: &mut dyn TInputProtocol,
    method: &str,
    read_success: impl FnOnce(&mut dyn TInputProtocol) -> thrift::Result<T>,
) -> thrift::Result<Option<T>> {
    i_prot.read_struct_begin()?;
    let mut result = None;
    let mut not_found = false;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        match field_id(&field_ident)? {
            0 => result = Some(read_success(i_prot)?),
            1 => {
                NoSuchObjectException::read_from_in_protocol(i_prot)?;
                not_found = true;
            }
            _ => i_prot.skip(field_ident.field_type)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    if not_found {
        return Ok(None);
    }
    result.map(Some).ok_or_else(|| {
        thrift::Error::Application(ApplicationError::new(
            ApplicationErrorKind::MissingResult,
            format!("{} returned neither a result nor a declared exception", method),
        ))
    })
}

/// Reads a result struct whose success case lives at field id 0, via
/// `read_success`. Any other field is a declared exception and, since
/// none of the calls here distinguish between them, is reported as a
/// single opaque failure.
fn read_value_result<T>(
    i_prot: &mut dyn TInputProtocol,
    method: &str,
    read_success: impl FnOnce(&mut dyn TInputProtocol) -> thrift::Result<T>,
) -> thrift::Result<T> {
    i_prot.read_struct_begin()?;
    let mut result = None;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        if field_id(&field_ident)? == 0 {
            result = Some(read_success(i_prot)?);
        } else {
            i_prot.skip(field_ident.field_type)?;
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    result.ok_or_else(|| {
        thrift::Error::Application(ApplicationError::new(
            ApplicationErrorKind::MissingResult,
            format!("{} returned neither a result nor a declared exception", method),
        ))
    })
}

impl ThriftHiveMetastoreClient {
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let mut channel = TTcpChannel::new();
        channel
            .open(format!("{}:{}", host, port))
            .map_err(|e| ErrorCode::catalog(format!("connecting to hive metastore {}:{}: {}", host, port, e)))?;
        let (i_chan, o_chan) = channel
            .split()
            .map_err(|e| ErrorCode::catalog(format!("splitting hive metastore channel: {}", e)))?;
        let i_prot = TBinaryInputProtocol::new(TBufferedReadTransport::new(i_chan), true);
        let o_prot = TBinaryOutputProtocol::new(TBufferedWriteTransport::new(o_chan), true);
        Ok(ThriftHiveMetastoreClient {
            i_prot,
            o_prot,
            seqid: 0,
        })
    }

    fn call<R>(
        &mut self,
        name: &str,
        write_args: impl FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
        read_result: impl FnOnce(&mut dyn TInputProtocol) -> thrift::Result<R>,
    ) -> thrift::Result<R> {
        self.seqid += 1;
        self.o_prot
            .write_message_begin(&TMessageIdentifier::new(name, TMessageType::Call, self.seqid))?;
        self.o_prot
            .write_struct_begin(&TStructIdentifier::new(format!("{}_args", name)))?;
        write_args(&mut self.o_prot)?;
        self.o_prot.write_field_stop()?;
        self.o_prot.write_struct_end()?;
        self.o_prot.write_message_end()?;
        self.o_prot.flush()?;

        let message_ident = self.i_prot.read_message_begin()?;
        if message_ident.message_type == TMessageType::Exception {
            let err = read_application_error(&mut self.i_prot)?;
            self.i_prot.read_message_end()?;
            return Err(thrift::Error::Application(err));
        }
        let result = read_result(&mut self.i_prot)?;
        self.i_prot.read_message_end()?;
        Ok(result)
    }

    /// `Ok(None)` when the metastore raised `NoSuchObjectException`;
    /// any other declared exception still propagates as an error.
    pub fn get_table(&mut self, db_name: &str, table_name: &str) -> Result<Option<Table>> {
        self.call(
            "get_table",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("dbname", TType::String, 1))?;
                o.write_string(db_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("tbl_name", TType::String, 2))?;
                o.write_string(table_name)?;
                o.write_field_end()
            },
            |i| read_value_result_or_not_found(i, "get_table", Table::read_from_in_protocol),
        )
        .map_err(ErrorCode::from)
    }

    pub fn create_table(&mut self, table: &Table) -> Result<()> {
        self.call(
            "create_table",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("tbl", TType::Struct, 1))?;
                table.write_to_out_protocol(o)?;
                o.write_field_end()
            },
            |i| read_void_result(i, "create_table"),
        )
        .map_err(ErrorCode::from)
    }

    pub fn alter_table(&mut self, db_name: &str, table_name: &str, new_table: &Table) -> Result<()> {
        self.call(
            "alter_table",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("dbname", TType::String, 1))?;
                o.write_string(db_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("tbl_name", TType::String, 2))?;
                o.write_string(table_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("new_tbl", TType::Struct, 3))?;
                new_table.write_to_out_protocol(o)?;
                o.write_field_end()
            },
            |i| read_void_result(i, "alter_table"),
        )
        .map_err(ErrorCode::from)
    }

    pub fn drop_table(&mut self, db_name: &str, table_name: &str, delete_data: bool) -> Result<()> {
        self.call(
            "drop_table",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("dbname", TType::String, 1))?;
                o.write_string(db_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("name", TType::String, 2))?;
                o.write_string(table_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("deleteData", TType::Bool, 3))?;
                o.write_bool(delete_data)?;
                o.write_field_end()
            },
            |i| read_void_result(i, "drop_table"),
        )
        .map_err(ErrorCode::from)
    }

    pub fn get_partition_names(&mut self, db_name: &str, table_name: &str, max_parts: i16) -> Result<Vec<String>> {
        self.call(
            "get_partition_names",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("db_name", TType::String, 1))?;
                o.write_string(db_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("tbl_name", TType::String, 2))?;
                o.write_string(table_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("max_parts", TType::I16, 3))?;
                o.write_i16(max_parts)?;
                o.write_field_end()
            },
            |i| {
                read_value_result(i, "get_partition_names", |i2| {
                    let list_ident = i2.read_list_begin()?;
                    let mut names = Vec::with_capacity(list_ident.size.max(0) as usize);
                    for _ in 0..list_ident.size {
                        names.push(i2.read_string()?);
                    }
                    i2.read_list_end()?;
                    Ok(names)
                })
            },
        )
        .map_err(ErrorCode::from)
    }

    pub fn get_partitions_by_names(
        &mut self,
        db_name: &str,
        table_name: &str,
        names: &[String],
    ) -> Result<Vec<Partition>> {
        self.call(
            "get_partitions_by_names",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("db_name", TType::String, 1))?;
                o.write_string(db_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("tbl_name", TType::String, 2))?;
                o.write_string(table_name)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("names", TType::List, 3))?;
                o.write_list_begin(&thrift::protocol::TListIdentifier::new(TType::String, names.len() as i32))?;
                for name in names {
                    o.write_string(name)?;
                }
                o.write_list_end()?;
                o.write_field_end()
            },
            |i| {
                read_value_result(i, "get_partitions_by_names", |i2| {
                    let list_ident = i2.read_list_begin()?;
                    let mut partitions = Vec::with_capacity(list_ident.size.max(0) as usize);
                    for _ in 0..list_ident.size {
                        partitions.push(Partition::read_from_in_protocol(i2)?);
                    }
                    i2.read_list_end()?;
                    Ok(partitions)
                })
            },
        )
        .map_err(ErrorCode::from)
    }

    /// Returns the number of partitions the metastore reports as added.
    pub fn add_partitions(&mut self, partitions: &[Partition]) -> Result<i32> {
        self.call(
            "add_partitions",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("new_parts", TType::List, 1))?;
                o.write_list_begin(&thrift::protocol::TListIdentifier::new(TType::Struct, partitions.len() as i32))?;
                for partition in partitions {
                    partition.write_to_out_protocol(o)?;
                }
                o.write_list_end()?;
                o.write_field_end()
            },
            |i| read_value_result(i, "add_partitions", |i2| i2.read_i32()),
        )
        .map_err(ErrorCode::from)
    }

    /// Drops partitions by name. `req.need_result` is always `false`
    /// on calls from this client, so the response's optional
    /// partition list is drained without being decoded.
    pub fn drop_partitions_req(&mut self, req: &DropPartitionsRequest) -> Result<()> {
        self.call(
            "drop_partitions_req",
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("req", TType::Struct, 1))?;
                req.write_to_out_protocol(o)?;
                o.write_field_end()
            },
            |i| {
                i.read_struct_begin()?;
                loop {
                    let field_ident = i.read_field_begin()?;
                    if field_ident.field_type == TType::Stop {
                        break;
                    }
                    i.skip(field_ident.field_type)?;
                    i.read_field_end()?;
                }
                i.read_struct_end()
            },
        )
        .map_err(ErrorCode::from)
    }
}
