//! Container node types.
//!
//! A container is a tree of [`Node`]s rooted at a [`Group`]. Node kinds form
//! a closed set; every consumer matches on them exhaustively.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    Str,
    Opaque,
}

/// Semantic class of a dtype, used to pick a comparison law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Float,
    Integer,
    String,
    Other,
}

impl ElementKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ElementKind::Float | ElementKind::Integer)
    }
}

impl Dtype {
    pub fn kind(&self) -> ElementKind {
        match self {
            Dtype::F32 | Dtype::F64 => ElementKind::Float,
            Dtype::I8
            | Dtype::I16
            | Dtype::I32
            | Dtype::I64
            | Dtype::U8
            | Dtype::U16
            | Dtype::U32
            | Dtype::U64
            | Dtype::Bool => ElementKind::Integer,
            Dtype::Str => ElementKind::String,
            Dtype::Opaque => ElementKind::Other,
        }
    }

    /// Human-readable type name used in report messages
    pub fn name(&self) -> &'static str {
        match self {
            Dtype::F32 => "float32",
            Dtype::F64 => "float64",
            Dtype::I8 => "int8",
            Dtype::I16 => "int16",
            Dtype::I32 => "int32",
            Dtype::I64 => "int64",
            Dtype::U8 => "uint8",
            Dtype::U16 => "uint16",
            Dtype::U32 => "uint32",
            Dtype::U64 => "uint64",
            Dtype::Bool => "bool",
            Dtype::Str => "str",
            Dtype::Opaque => "opaque",
        }
    }

    fn accepts(&self, buffer: &Buffer) -> bool {
        matches!(
            (self, buffer),
            (Dtype::F32 | Dtype::F64, Buffer::Float(_))
                | (Dtype::I8 | Dtype::I16 | Dtype::I32 | Dtype::I64, Buffer::Int(_))
                | (Dtype::U8 | Dtype::U16 | Dtype::U32 | Dtype::U64, Buffer::Uint(_))
                | (Dtype::Bool, Buffer::Bool(_))
                | (Dtype::Str, Buffer::Str(_))
                | (Dtype::Opaque, Buffer::Opaque(_))
        )
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Element storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Buffer {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Uint(Vec<u64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
    Opaque(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl Buffer {
    pub fn len(&self) -> usize {
        match self {
            Buffer::Float(v) => v.len(),
            Buffer::Int(v) => v.len(),
            Buffer::Uint(v) => v.len(),
            Buffer::Bool(v) => v.len(),
            Buffer::Str(v) => v.len(),
            Buffer::Opaque(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reorder elements: output element `i` is input element `order[i]`.
    ///
    /// `order` must index within the buffer.
    pub fn gather(&self, order: &[usize]) -> Buffer {
        fn pick<T: Clone>(v: &[T], order: &[usize]) -> Vec<T> {
            order.iter().map(|&i| v[i].clone()).collect()
        }
        match self {
            Buffer::Float(v) => Buffer::Float(pick(v, order)),
            Buffer::Int(v) => Buffer::Int(pick(v, order)),
            Buffer::Uint(v) => Buffer::Uint(pick(v, order)),
            Buffer::Bool(v) => Buffer::Bool(pick(v, order)),
            Buffer::Str(v) => Buffer::Str(pick(v, order)),
            Buffer::Opaque(v) => Buffer::Opaque(pick(v, order)),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// A typed, shaped array: the value of a dataset or an attribute.
///
/// `shape == None` is a null dataspace (no data at all); `Some(vec![])` is a
/// scalar holding one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    pub dtype: Dtype,
    pub shape: Option<Vec<usize>>,
    pub data: Buffer,
}

impl Array {
    pub fn new(dtype: Dtype, shape: Option<Vec<usize>>, data: Buffer) -> Self {
        Self { dtype, shape, data }
    }

    /// 1-D float64 array
    pub fn f64s(values: Vec<f64>) -> Self {
        let n = values.len();
        Self::new(Dtype::F64, Some(vec![n]), Buffer::Float(values))
    }

    /// 1-D int64 array
    pub fn i64s(values: Vec<i64>) -> Self {
        let n = values.len();
        Self::new(Dtype::I64, Some(vec![n]), Buffer::Int(values))
    }

    /// Scalar float64
    pub fn scalar_f64(value: f64) -> Self {
        Self::new(Dtype::F64, Some(Vec::new()), Buffer::Float(vec![value]))
    }

    /// Scalar int64
    pub fn scalar_i64(value: i64) -> Self {
        Self::new(Dtype::I64, Some(Vec::new()), Buffer::Int(vec![value]))
    }

    /// Scalar string
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Dtype::Str, Some(Vec::new()), Buffer::Str(vec![value.into()]))
    }

    /// Replace the shape, keeping dtype and data
    pub fn reshaped(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Number of elements implied by the shape; `None` if the product overflows
    pub fn checked_size(&self) -> Option<usize> {
        match &self.shape {
            None => Some(0),
            Some(dims) => checked_product(dims),
        }
    }

    /// Number of elements implied by the shape, saturating at `usize::MAX`.
    ///
    /// Arrays that passed [`Array::validate`] never saturate.
    pub fn size(&self) -> usize {
        self.checked_size().unwrap_or(usize::MAX)
    }

    /// Number of dimensions (0 for scalars and null dataspaces)
    pub fn rank(&self) -> usize {
        self.shape.as_ref().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Shape rendered like a tuple, e.g. `(2, 3)`; `None` for null dataspaces
    pub fn shape_label(&self) -> String {
        match &self.shape {
            None => "None".to_string(),
            Some(dims) => format_index(dims),
        }
    }

    /// Numeric view; integers and booleans are widened to f64
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match &self.data {
            Buffer::Float(v) => Some(v.clone()),
            Buffer::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Buffer::Uint(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Buffer::Bool(v) => Some(v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect()),
            Buffer::Str(_) | Buffer::Opaque(_) => None,
        }
    }

    /// Exact integer view
    pub fn to_i128(&self) -> Option<Vec<i128>> {
        match &self.data {
            Buffer::Int(v) => Some(v.iter().map(|&x| x as i128).collect()),
            Buffer::Uint(v) => Some(v.iter().map(|&x| x as i128).collect()),
            Buffer::Bool(v) => Some(v.iter().map(|&x| x as i128).collect()),
            Buffer::Float(_) | Buffer::Str(_) | Buffer::Opaque(_) => None,
        }
    }

    pub fn as_strs(&self) -> Option<&[String]> {
        match &self.data {
            Buffer::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Render element `i` for report messages
    pub fn element_label(&self, i: usize) -> String {
        match &self.data {
            Buffer::Float(v) => v.get(i).map(|x| x.to_string()),
            Buffer::Int(v) => v.get(i).map(|x| x.to_string()),
            Buffer::Uint(v) => v.get(i).map(|x| x.to_string()),
            Buffer::Bool(v) => v.get(i).map(|x| x.to_string()),
            Buffer::Str(v) => v.get(i).map(|x| format!("{:?}", x)),
            Buffer::Opaque(v) => v.get(i).map(|x| format!("{:#04x}", x)),
        }
        .unwrap_or_else(|| "<out of range>".to_string())
    }

    /// Check dtype/buffer agreement and the element count
    pub fn validate(&self) -> Result<(), String> {
        if !self.dtype.accepts(&self.data) {
            return Err(format!(
                "dtype {} does not match the stored buffer",
                self.dtype
            ));
        }
        let Some(expected) = self.checked_size() else {
            return Err(format!(
                "shape {} overflows the element count",
                self.shape_label()
            ));
        };
        let actual = self.data.len();
        if expected != actual {
            return Err(format!(
                "shape {} implies {} elements but {} are stored",
                self.shape_label(),
                expected,
                actual
            ));
        }
        Ok(())
    }
}

/// A dataset: an array plus its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub value: Array,
    #[serde(default)]
    pub attrs: BTreeMap<String, Array>,
}

impl Dataset {
    pub fn new(value: Array) -> Self {
        Self {
            value,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Array) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }
}

/// A group: named children plus attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub attrs: BTreeMap<String, Array>,
    #[serde(default)]
    pub children: BTreeMap<String, Node>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Array) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.children.insert(name.into(), node.into());
        self
    }

    /// Shorthand for a dataset child without attributes
    pub fn with_dataset(self, name: impl Into<String>, value: Array) -> Self {
        self.with_child(name, Dataset::new(value))
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Look up a dataset child
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        match self.children.get(name) {
            Some(Node::Dataset(d)) => Some(d),
            _ => None,
        }
    }

    /// Validate every array in the subtree; the error names the offending path
    pub fn validate_tree(&self, path: &str) -> Result<(), (String, String)> {
        for (name, attr) in &self.attrs {
            attr.validate()
                .map_err(|reason| (format!("{}.attrs[{}]", path, name), reason))?;
        }
        for (name, child) in &self.children {
            let child_path = path_join(path, name);
            match child {
                Node::Group(g) => g.validate_tree(&child_path)?,
                Node::Dataset(d) => {
                    d.value
                        .validate()
                        .map_err(|reason| (child_path.clone(), reason))?;
                    for (attr_name, attr) in &d.attrs {
                        attr.validate().map_err(|reason| {
                            (format!("{}.attrs[{}]", child_path, attr_name), reason)
                        })?;
                    }
                }
                Node::ExternalLink(_) => {}
            }
        }
        Ok(())
    }
}

/// Reference to a path inside another container file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub file: String,
    pub path: String,
}

/// A container node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Group(Group),
    Dataset(Dataset),
    ExternalLink(ExternalLink),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Group(_) => "Group",
            Node::Dataset(_) => "Dataset",
            Node::ExternalLink(_) => "ExternalLink",
        }
    }
}

impl From<Group> for Node {
    fn from(g: Group) -> Self {
        Node::Group(g)
    }
}

impl From<Dataset> for Node {
    fn from(d: Dataset) -> Self {
        Node::Dataset(d)
    }
}

impl From<ExternalLink> for Node {
    fn from(l: ExternalLink) -> Self {
        Node::ExternalLink(l)
    }
}

/// Join a parent path and a child name: `/` + `a` is `/a`, `/a` + `b` is `/a/b`
pub fn path_join(parent: &str, name: &str) -> String {
    match parent {
        "/" => format!("/{}", name),
        "" => name.to_string(),
        _ => format!("{}/{}", parent, name),
    }
}

/// Render a multi-index as a tuple: `(1, 2)`, `(3,)`, `()`
pub fn format_index(index: &[usize]) -> String {
    match index {
        [] => "()".to_string(),
        [only] => format!("({},)", only),
        _ => {
            let parts: Vec<String> = index.iter().map(|i| i.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Convert a row-major flat offset into a multi-index over `shape`
pub fn unravel_index(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for axis in (0..shape.len()).rev() {
        let extent = shape[axis].max(1);
        index[axis] = flat % extent;
        flat /= extent;
    }
    index
}

/// Product of `dims`, or `None` on overflow
pub fn checked_product(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_kinds() {
        assert_eq!(Dtype::F32.kind(), ElementKind::Float);
        assert_eq!(Dtype::U16.kind(), ElementKind::Integer);
        assert_eq!(Dtype::Bool.kind(), ElementKind::Integer);
        assert_eq!(Dtype::Str.kind(), ElementKind::String);
        assert_eq!(Dtype::Opaque.kind(), ElementKind::Other);
    }

    #[test]
    fn test_array_size_and_rank() {
        assert_eq!(Array::scalar_f64(1.0).size(), 1);
        assert_eq!(Array::scalar_f64(1.0).rank(), 0);
        assert_eq!(Array::f64s(vec![0.0; 6]).reshaped(vec![2, 3]).size(), 6);
        let null = Array::new(Dtype::F64, None, Buffer::Float(Vec::new()));
        assert!(null.is_empty());
    }

    #[test]
    fn test_overflowing_shape_is_invalid_not_empty() {
        let huge = Array::f64s(Vec::new()).reshaped(vec![1 << 40, 1 << 40, 0]);
        assert_eq!(huge.checked_size(), None);
        let err = huge.validate().unwrap_err();
        assert!(err.contains("overflows"), "{}", err);
        assert_eq!(checked_product(&[2, 3, 4]), Some(24));
    }

    #[test]
    fn test_validate_rejects_mismatches() {
        let wrong_type = Array::new(Dtype::I32, Some(vec![1]), Buffer::Float(vec![1.0]));
        assert!(wrong_type.validate().is_err());
        let wrong_size = Array::f64s(vec![1.0, 2.0]).reshaped(vec![3]);
        assert!(wrong_size.validate().unwrap_err().contains("3 elements"));
    }

    #[test]
    fn test_validate_tree_reports_path() {
        let bad = Array::f64s(vec![1.0]).reshaped(vec![2]);
        let root = Group::new().with_child("mesh", Group::new().with_dataset("x", bad));
        let (path, _) = root.validate_tree("/").unwrap_err();
        assert_eq!(path, "/mesh/x");
    }

    #[test]
    fn test_path_join() {
        assert_eq!(path_join("/", "a"), "/a");
        assert_eq!(path_join("/a", "b"), "/a/b");
        assert_eq!(path_join("", "b"), "b");
    }

    #[test]
    fn test_unravel_and_format_index() {
        assert_eq!(unravel_index(5, &[2, 3]), vec![1, 2]);
        assert_eq!(unravel_index(7, &[2, 3, 4]), vec![0, 1, 3]);
        assert_eq!(format_index(&[1, 2]), "(1, 2)");
        assert_eq!(format_index(&[4]), "(4,)");
        assert_eq!(format_index(&[]), "()");
    }

    #[test]
    fn test_node_serde_shape() {
        let node: Node = Dataset::new(Array::i64s(vec![1, 2])).into();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "dataset");
        assert_eq!(json["value"]["dtype"], "i64");
        assert_eq!(json["value"]["data"]["int"][1], 2);
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_opaque_buffer_is_base64_on_disk() {
        use base64::Engine as _;
        let arr = Array::new(Dtype::Opaque, Some(vec![3]), Buffer::Opaque(vec![1, 2, 255]));
        let json = serde_json::to_value(&arr).unwrap();
        assert_eq!(json["data"]["opaque"], base64::engine::general_purpose::STANDARD.encode([1u8, 2, 255]));
        let back: Array = serde_json::from_value(json).unwrap();
        assert_eq!(back, arr);
    }
}
