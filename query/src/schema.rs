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

//! Projects a flat, pre-order Parquet schema-element list into Hive
//! column types. The flat list is a pre-order serialization of a tree
//! (each group reserves `num_children` following nodes); this module's
//! first job is rebuilding that tree, the second is a pure recursive
//! walk translating each node into a Hive type string. Neither step
//! touches the network — schema projection is a total function of the
//! decoded footer.

use common_exception::ErrorCode;
use common_exception::Result;
use common_parquet_format::ConvertedType;
use common_parquet_format::FieldRepetitionType;
use common_parquet_format::SchemaElement;
use common_parquet_format::Type;

use crate::models::Column;

struct Node<'a> {
    element: &'a SchemaElement,
    children: Vec<Node<'a>>,
}

fn build_tree<'a>(elements: &'a [SchemaElement], idx: &mut usize) -> Result<Node<'a>> {
    let element = elements
        .get(*idx)
        .ok_or_else(|| ErrorCode::parquet("schema element list ended mid-tree"))?;
    *idx += 1;
    let num_children = element.num_children.unwrap_or(0).max(0) as usize;
    let mut children = Vec::with_capacity(num_children);
    for _ in 0..num_children {
        children.push(build_tree(elements, idx)?);
    }
    Ok(Node { element, children })
}

/// Rebuilds the schema tree and returns one [`Column`] per top-level
/// field of the root group (the root itself is not a column).
pub fn project_columns(schema: &[SchemaElement]) -> Result<Vec<Column>> {
    if schema.is_empty() {
        return Err(ErrorCode::parquet("schema has no elements"));
    }
    let mut idx = 0;
    let root = build_tree(schema, &mut idx)?;
    root.children
        .iter()
        .map(|child| {
            let hive_type = project_node(child)?;
            Ok(Column::new(child.element.name.to_lowercase(), hive_type))
        })
        .collect()
}

fn project_node(node: &Node) -> Result<String> {
    let el = node.element;
    if el.is_group() {
        match el.converted_type {
            Some(ConvertedType::List) => project_list(node),
            Some(ConvertedType::Map) | Some(ConvertedType::MapKeyValue) => project_map(node),
            _ => project_struct(node),
        }
    } else if el.repetition_type == Some(FieldRepetitionType::Repeated) {
        Ok(format!("array<{}>", project_primitive(el)?))
    } else {
        project_primitive(el)
    }
}

fn project_struct(node: &Node) -> Result<String> {
    let fields = node
        .children
        .iter()
        .map(|child| Ok(format!("{}:{}", child.element.name.to_lowercase(), project_node(child)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("struct<{}>", fields.join(",")))
}

/// The `LIST`-annotated group has a single repeated child. Per the
/// Parquet list backward-compatibility rules, a repeated group with
/// exactly one child — whether it is the standard `list`/`element`
/// 3-level form or the legacy `array`/`<parent>_tuple` naming — is
/// unwrapped one more level to reach the actual element type; a
/// repeated child that is itself a plain field or a multi-field group
/// is the element type directly.
fn project_list(node: &Node) -> Result<String> {
    let child = node
        .children
        .first()
        .ok_or_else(|| ErrorCode::parquet("LIST group has no child"))?;

    let element_type = if !child.element.is_group() {
        project_primitive(child.element)?
    } else if child.children.len() > 1 {
        project_struct(child)?
    } else {
        let grandchild = child
            .children
            .first()
            .ok_or_else(|| ErrorCode::parquet("LIST child group has no element field"))?;
        project_node(grandchild)?
    };
    Ok(format!("array<{}>", element_type))
}

fn project_map(node: &Node) -> Result<String> {
    let key_value = node
        .children
        .first()
        .ok_or_else(|| ErrorCode::parquet("MAP group has no key_value child"))?;
    let key = key_value
        .children
        .first()
        .ok_or_else(|| ErrorCode::parquet("MAP key_value group has no key field"))?;
    let value = key_value
        .children
        .get(1)
        .ok_or_else(|| ErrorCode::parquet("MAP key_value group has no value field"))?;
    Ok(format!("map<{},{}>", project_node(key)?, project_node(value)?))
}

fn project_primitive(el: &SchemaElement) -> Result<String> {
    let type_ = el
        .type_
        .ok_or_else(|| ErrorCode::parquet(format!("{} has no primitive type", el.name)))?;

    if type_ == Type::FixedLenByteArray && el.converted_type == Some(ConvertedType::Decimal) {
        let precision = el.precision.unwrap_or_default();
        let scale = el.scale.unwrap_or_default();
        return Ok(format!("decimal({},{})", precision, scale));
    }
    if type_ == Type::ByteArray
        && matches!(el.converted_type, None | Some(ConvertedType::Utf8))
    {
        return Ok("string".to_string());
    }
    Ok(match type_ {
        Type::Boolean => "boolean",
        Type::Int32 => "int",
        Type::Int64 => "bigint",
        Type::Int96 => "timestamp",
        Type::Float => "float",
        Type::Double => "double",
        Type::ByteArray => "binary",
        Type::FixedLenByteArray => "binary",
    }
    .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, type_: Type, repetition: FieldRepetitionType) -> SchemaElement {
        SchemaElement {
            type_: Some(type_),
            type_length: None,
            repetition_type: Some(repetition),
            name: name.to_string(),
            num_children: None,
            converted_type: None,
            scale: None,
            precision: None,
        }
    }

    fn group(name: &str, repetition: Option<FieldRepetitionType>, num_children: i32, converted_type: Option<ConvertedType>) -> SchemaElement {
        SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: repetition,
            name: name.to_string(),
            num_children: Some(num_children),
            converted_type,
            scale: None,
            precision: None,
        }
    }

    #[test]
    fn primitive_schema() {
        let schema = vec![
            group("root", None, 1, None),
            leaf("id", Type::Int64, FieldRepetitionType::Optional),
        ];
        let columns = project_columns(&schema).unwrap();
        assert_eq!(columns, vec![Column::new("id", "bigint")]);
    }

    #[test]
    fn list_with_unannotated_tuple_element() {
        let schema = vec![
            group("root", None, 1, None),
            group("xs", Some(FieldRepetitionType::Optional), 1, Some(ConvertedType::List)),
            group("xs_tuple", Some(FieldRepetitionType::Repeated), 1, None),
            leaf("e", Type::Int32, FieldRepetitionType::Required),
        ];
        let columns = project_columns(&schema).unwrap();
        assert_eq!(columns, vec![Column::new("xs", "array<int>")]);
    }

    #[test]
    fn map_annotation() {
        let schema = vec![
            group("root", None, 1, None),
            group("m", Some(FieldRepetitionType::Optional), 1, Some(ConvertedType::Map)),
            group("key_value", Some(FieldRepetitionType::Repeated), 2, None),
            leaf("key", Type::ByteArray, FieldRepetitionType::Required),
            leaf("value", Type::ByteArray, FieldRepetitionType::Optional),
        ];
        let mut key_leaf = leaf("key", Type::ByteArray, FieldRepetitionType::Required);
        key_leaf.converted_type = Some(ConvertedType::Utf8);
        let schema = vec![schema[0].clone(), schema[1].clone(), schema[2].clone(), key_leaf, schema[4].clone()];
        let columns = project_columns(&schema).unwrap();
        assert_eq!(columns, vec![Column::new("m", "map<string,string>")]);
    }

    #[test]
    fn decimal_column() {
        let mut decimal_leaf = leaf("price", Type::FixedLenByteArray, FieldRepetitionType::Required);
        decimal_leaf.converted_type = Some(ConvertedType::Decimal);
        decimal_leaf.precision = Some(10);
        decimal_leaf.scale = Some(2);
        let schema = vec![group("root", None, 1, None), decimal_leaf];
        let columns = project_columns(&schema).unwrap();
        assert_eq!(columns, vec![Column::new("price", "decimal(10,2)")]);
    }
}
