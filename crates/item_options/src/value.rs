//! Option values.
//!
//! [`Value`] is the closed set of shapes an option can hold. Enum-typed
//! options carry an [`EnumMember`] in memory and its backing scalar in
//! storage; see [`OptionDefinition::normalize`](crate::OptionDefinition::normalize).

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};


/// The value of an option (or of one row of a multi-row option).
///
/// Equality is strict: `Int(0)` and `Float(0.0)` are different values, and
/// an enum member never equals its backing scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
	/// Absent value.
	#[default]
	Null,
	/// Boolean value.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Floating point value.
	Float(f64),
	/// Text value.
	Text(String),
	/// A case of an [`EnumType`].
	Enum(EnumMember),
	/// Ordered sequence of values.
	Seq(Vec<Value>),
}

impl Value {
	/// Returns an empty sequence.
	pub const fn empty_seq() -> Self {
		Value::Seq(Vec::new())
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn is_empty_seq(&self) -> bool {
		matches!(self, Value::Seq(items) if items.is_empty())
	}

	pub fn is_empty_text(&self) -> bool {
		matches!(self, Value::Text(s) if s.is_empty())
	}

	/// Numeric zero, integer or floating.
	pub fn is_zero(&self) -> bool {
		match self {
			Value::Int(v) => *v == 0,
			Value::Float(v) => *v == 0.0,
			_ => false,
		}
	}

	pub fn is_false(&self) -> bool {
		matches!(self, Value::Bool(false))
	}

	/// Returns true for null, `false`, numeric zero, `""` and `[]`.
	pub fn is_empty_like(&self) -> bool {
		self.is_null() || self.is_false() || self.is_zero() || self.is_empty_text() || self.is_empty_seq()
	}

	/// Returns true for raw int or text values, the shapes an enum case is backed by.
	pub fn is_scalar(&self) -> bool {
		matches!(self, Value::Int(_) | Value::Text(_))
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Text(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumMember> {
		match self {
			Value::Enum(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_seq(&self) -> Option<&[Value]> {
		match self {
			Value::Seq(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Text(_) => "text",
			Value::Enum(_) => "enum",
			Value::Seq(_) => "sequence",
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_string())
	}
}

impl From<EnumMember> for Value {
	fn from(v: EnumMember) -> Self {
		Value::Enum(v)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(v: Vec<T>) -> Self {
		Value::Seq(v.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or(Value::Null, Into::into)
	}
}

/// Backing scalar of an enum case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumScalar {
	Int(i64),
	Text(String),
}

impl EnumScalar {
	fn kind(&self) -> &'static str {
		match self {
			EnumScalar::Int(_) => "int",
			EnumScalar::Text(_) => "text",
		}
	}

	/// Returns the scalar as a [`Value`].
	pub fn to_value(&self) -> Value {
		match self {
			EnumScalar::Int(v) => Value::Int(*v),
			EnumScalar::Text(v) => Value::Text(v.clone()),
		}
	}

	fn matches(&self, value: &Value) -> bool {
		match (self, value) {
			(EnumScalar::Int(a), Value::Int(b)) => a == b,
			(EnumScalar::Text(a), Value::Text(b)) => a == b,
			_ => false,
		}
	}
}

impl From<i64> for EnumScalar {
	fn from(v: i64) -> Self {
		EnumScalar::Int(v)
	}
}

impl From<&str> for EnumScalar {
	fn from(v: &str) -> Self {
		EnumScalar::Text(v.to_string())
	}
}

impl From<String> for EnumScalar {
	fn from(v: String) -> Self {
		EnumScalar::Text(v)
	}
}

impl fmt::Display for EnumScalar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EnumScalar::Int(v) => write!(f, "{v}"),
			EnumScalar::Text(v) => write!(f, "{v:?}"),
		}
	}
}

#[derive(Debug, PartialEq, Eq)]
struct EnumCase {
	name: String,
	scalar: EnumScalar,
}

/// A closed enumeration whose cases are each backed by a scalar.
///
/// All cases share one scalar kind (int or text), and both case names and
/// backing scalars are unique.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumType {
	name: String,
	cases: Vec<EnumCase>,
}

impl EnumType {
	/// Creates and validates an enumeration.
	pub fn new<N, S>(name: impl Into<String>, cases: impl IntoIterator<Item = (N, S)>) -> Result<Arc<Self>>
	where
		N: Into<String>,
		S: Into<EnumScalar>,
	{
		let name = name.into();
		let cases: Vec<EnumCase> = cases
			.into_iter()
			.map(|(case, scalar)| EnumCase {
				name: case.into(),
				scalar: scalar.into(),
			})
			.collect();

		let Some(first) = cases.first() else {
			return Err(Error::InvalidConfiguration(format!("enum type {name:?} has no cases")));
		};
		let kind = first.scalar.kind();

		for (i, case) in cases.iter().enumerate() {
			if case.scalar.kind() != kind {
				return Err(Error::InvalidConfiguration(format!(
					"enum type {name:?} mixes {kind} and {} backed cases",
					case.scalar.kind()
				)));
			}
			let earlier = &cases[..i];
			if earlier.iter().any(|c| c.name == case.name) {
				return Err(Error::InvalidConfiguration(format!(
					"enum type {name:?} declares case {:?} twice",
					case.name
				)));
			}
			if earlier.iter().any(|c| c.scalar == case.scalar) {
				return Err(Error::InvalidConfiguration(format!(
					"enum type {name:?} backs more than one case with {}",
					case.scalar
				)));
			}
		}

		Ok(Arc::new(Self { name, cases }))
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn len(&self) -> usize {
		self.cases.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cases.is_empty()
	}

	/// Returns the member named `case`.
	pub fn case(self: &Arc<Self>, case: &str) -> Option<EnumMember> {
		let index = self.cases.iter().position(|c| c.name == case)?;
		Some(EnumMember {
			ty: Arc::clone(self),
			index,
		})
	}

	/// Returns the member backed by `scalar`, if any.
	pub fn try_from_scalar(self: &Arc<Self>, scalar: &Value) -> Option<EnumMember> {
		let index = self.cases.iter().position(|c| c.scalar.matches(scalar))?;
		Some(EnumMember {
			ty: Arc::clone(self),
			index,
		})
	}

	/// Iterates over all members in declaration order.
	pub fn members(self: &Arc<Self>) -> impl Iterator<Item = EnumMember> + '_ {
		(0..self.cases.len()).map(|index| EnumMember {
			ty: Arc::clone(self),
			index,
		})
	}
}

/// One case of an [`EnumType`].
#[derive(Clone)]
pub struct EnumMember {
	ty: Arc<EnumType>,
	index: usize,
}

impl EnumMember {
	pub fn enum_type(&self) -> &Arc<EnumType> {
		&self.ty
	}

	pub fn name(&self) -> &str {
		&self.ty.cases[self.index].name
	}

	pub fn scalar(&self) -> &EnumScalar {
		&self.ty.cases[self.index].scalar
	}

	/// Returns true if this member belongs to `ty`.
	pub fn is_of(&self, ty: &EnumType) -> bool {
		std::ptr::eq(Arc::as_ptr(&self.ty), ty) || *self.ty == *ty
	}
}

impl PartialEq for EnumMember {
	fn eq(&self, other: &Self) -> bool {
		self.index == other.index && (Arc::ptr_eq(&self.ty, &other.ty) || self.ty == other.ty)
	}
}

impl fmt::Debug for EnumMember {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}::{}", self.ty.name, self.name())
	}
}
