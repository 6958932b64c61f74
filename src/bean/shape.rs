use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
    str::FromStr,
};

/// Scalar wire types that have a canonical single-value text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "string" => ScalarKind::String,
            "bool" => ScalarKind::Bool,
            "i8" => ScalarKind::I8,
            "i16" => ScalarKind::I16,
            "i32" => ScalarKind::I32,
            "i64" => ScalarKind::I64,
            "u8" => ScalarKind::U8,
            "u16" => ScalarKind::U16,
            "u32" => ScalarKind::U32,
            "u64" => ScalarKind::U64,
            "f32" => ScalarKind::F32,
            "f64" => ScalarKind::F64,
            _ => return None,
        };
        Some(kind)
    }
}

/// Structural shape of a type crossing the contract boundary.
///
/// Shapes are what the contract validator inspects; they are produced either by
/// [`WireType::shape`] for Rust types or parsed from contract schema files via
/// [`FromStr`] (`void`, `u64`, `enum:Status`, `List<UserView>`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Void,
    Scalar(ScalarKind),
    Enum(String),
    Bean(String),
    List(Box<TypeShape>),
    Optional(Box<TypeShape>),
    Map(Box<TypeShape>, Box<TypeShape>),
}

impl TypeShape {
    pub fn is_bean(&self) -> bool {
        matches!(self, TypeShape::Bean(_))
    }

    /// `List<Bean>`
    pub fn is_bean_list(&self) -> bool {
        matches!(self, TypeShape::List(item) if item.is_bean())
    }

    /// Scalars and enums are the only shapes with a single-segment text form.
    pub fn is_value(&self) -> bool {
        matches!(self, TypeShape::Scalar(_) | TypeShape::Enum(_))
    }
}

impl Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Void => write!(f, "void"),
            TypeShape::Scalar(kind) => write!(f, "{}", kind.as_str()),
            TypeShape::Enum(name) => write!(f, "enum:{}", name),
            TypeShape::Bean(name) => write!(f, "{}", name),
            TypeShape::List(item) => write!(f, "List<{}>", item),
            TypeShape::Optional(item) => write!(f, "Optional<{}>", item),
            TypeShape::Map(key, value) => write!(f, "Map<{},{}>", key, value),
        }
    }
}

impl FromStr for TypeShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("type name is empty".to_string());
        }
        if s == "void" {
            return Ok(TypeShape::Void);
        }
        if let Some(kind) = ScalarKind::parse(s) {
            return Ok(TypeShape::Scalar(kind));
        }
        if let Some(name) = s.strip_prefix("enum:") {
            return identifier(name).map(|name| TypeShape::Enum(name.to_string()));
        }
        if let Some(inner) = generic_argument(s, "List")? {
            return Ok(TypeShape::List(Box::new(inner.parse()?)));
        }
        if let Some(inner) = generic_argument(s, "Optional")? {
            return Ok(TypeShape::Optional(Box::new(inner.parse()?)));
        }
        if let Some(inner) = generic_argument(s, "Map")? {
            let (key, value) = split_top_level_comma(inner).ok_or_else(|| format!("map type requires two arguments, type={}", s))?;
            return Ok(TypeShape::Map(Box::new(key.parse()?), Box::new(value.parse()?)));
        }
        identifier(s).map(|name| TypeShape::Bean(name.to_string()))
    }
}

fn generic_argument<'a>(s: &'a str, name: &str) -> Result<Option<&'a str>, String> {
    let Some(rest) = s.strip_prefix(name).and_then(|rest| rest.strip_prefix('<')) else {
        return Ok(None);
    };
    rest.strip_suffix('>')
        .map(Some)
        .ok_or_else(|| format!("unbalanced generic type, type={}", s))
}

fn split_top_level_comma(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (index, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&s[..index], &s[index + 1..])),
            _ => {},
        }
    }
    None
}

fn identifier(name: &str) -> Result<&str, String> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(format!("invalid type name, name={}", name))
    }
}

/// Reports the structural shape of a Rust type.
///
/// Implemented here for unit, scalars, `Vec`, `Option` and maps. User beans and
/// enums implement it through [`impl_bean!`](crate::impl_bean) and
/// [`impl_wire_enum!`](crate::impl_wire_enum).
pub trait WireType {
    fn shape() -> TypeShape;
}

/// Last path segment of the type name, used as the bean/enum name in shapes.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

macro_rules! scalar_wire_types {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl WireType for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Scalar(ScalarKind::$kind)
                }
            }
        )+
    };
}

scalar_wire_types! {
    String => String,
    str => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    f32 => F32,
    f64 => F64,
}

impl WireType for () {
    fn shape() -> TypeShape {
        TypeShape::Void
    }
}

impl<T: WireType + ?Sized> WireType for &T {
    fn shape() -> TypeShape {
        T::shape()
    }
}

impl<T: WireType> WireType for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::List(Box::new(T::shape()))
    }
}

impl<T: WireType> WireType for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::Optional(Box::new(T::shape()))
    }
}

impl<K: WireType, V: WireType, S> WireType for HashMap<K, V, S> {
    fn shape() -> TypeShape {
        TypeShape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }
}

impl<K: WireType, V: WireType> WireType for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }
}

/// Declares one or more structs as beans.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct UserView {
///     id: u64,
/// }
///
/// ws_client::impl_bean!(UserView);
/// ```
#[macro_export]
macro_rules! impl_bean {
    ($($bean:ty),+ $(,)?) => {
        $(
            impl $crate::bean::WireType for $bean {
                fn shape() -> $crate::bean::TypeShape {
                    $crate::bean::TypeShape::Bean($crate::bean::short_type_name::<$bean>())
                }
            }
        )+
    };
}

/// Declares one or more enums as wire enums, encoded through their serde token.
#[macro_export]
macro_rules! impl_wire_enum {
    ($($value:ty),+ $(,)?) => {
        $(
            impl $crate::bean::WireType for $value {
                fn shape() -> $crate::bean::TypeShape {
                    $crate::bean::TypeShape::Enum($crate::bean::short_type_name::<$value>())
                }
            }
        )+
    };
}
