use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use im::Vector as ImVector;

use crate::environment::{Environment, Params};
use crate::error::{Error, Result};
use crate::interner::InternedSymbol;
use crate::stack::ensure_sufficient_stack;

// ============================================================================
// Core Type System
// ============================================================================

/// Lead character marking a string as a keyword. The reader rejects string
/// literals that begin with it, so `"x"` and `:x` stay distinct.
pub const KEYWORD_PREFIX: char = '\u{29e}';

/// Whether a sequence was written with parentheses or brackets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    List,
    Vector,
}

/// List or vector - persistent, shares structure on `cons`/`rest`
#[derive(Debug, Clone)]
pub struct ListValue {
    pub items: ImVector<Value>,
    pub kind: ListKind,
    pub meta: Value,
}

// Dropping a deeply nested value recurses once per level.
impl Drop for ListValue {
    fn drop(&mut self) {
        let items = std::mem::take(&mut self.items);
        ensure_sufficient_stack(move || drop(items));
    }
}

/// Map - insertion-ordered key/value pairs with lookup by deep equality.
///
/// Keys may be compound values, so this is a linear association list rather
/// than a hash map.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    entries: ImVector<(Value, Value)>,
    pub meta: Value,
}

impl Drop for MapValue {
    fn drop(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        ensure_sufficient_stack(move || drop(entries));
    }
}

#[derive(Clone)]
pub struct ClosureCell {
    pub params: Params,
    pub body: Value,
    pub env: Environment,
    pub is_macro: bool,
    pub meta: Value,
}

// Manual implementation: printing the captured environment would walk every
// binding up to the root.
impl fmt::Debug for ClosureCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureCell")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("env", &"<environment>")
            .field("is_macro", &self.is_macro)
            .finish()
    }
}

/// Native function type - Rust functions callable from the language
pub type NativeFn = fn(&[Value]) -> Result<Value>;

pub struct BuiltinFn {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Symbol(InternedSymbol),
    /// String or keyword; keywords start with `KEYWORD_PREFIX`
    Str(Rc<str>),
    List(Rc<ListValue>),
    Map(Rc<MapValue>),
    Closure(Rc<ClosureCell>),
    Builtin(Rc<BuiltinFn>),
    /// The only mutable cell; every holder shares one identity
    Atom(Rc<RefCell<Value>>),
}

// ============================================================================
// Constructors and Accessors
// ============================================================================

impl Value {
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(InternedSymbol::new(name))
    }

    pub fn string(s: impl Into<String>) -> Self {
        let s: String = s.into();
        Value::Str(Rc::from(s))
    }

    pub fn keyword(name: &str) -> Self {
        if name.starts_with(KEYWORD_PREFIX) {
            return Value::string(name);
        }
        Value::string(format!("{KEYWORD_PREFIX}{name}"))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::sequence(items.into_iter().collect(), ListKind::List)
    }

    pub fn vector(items: impl IntoIterator<Item = Value>) -> Self {
        Self::sequence(items.into_iter().collect(), ListKind::Vector)
    }

    pub fn sequence(items: ImVector<Value>, kind: ListKind) -> Self {
        Value::List(Rc::new(ListValue {
            items,
            kind,
            meta: Value::Nil,
        }))
    }

    pub fn map(map: MapValue) -> Self {
        Value::Map(Rc::new(map))
    }

    pub fn builtin(name: &'static str, func: NativeFn) -> Self {
        Value::Builtin(Rc::new(BuiltinFn { name, func }))
    }

    pub fn atom(value: Value) -> Self {
        Value::Atom(Rc::new(RefCell::new(value)))
    }

    /// Everything except `false` and `nil` is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Value::Str(s) if s.starts_with(KEYWORD_PREFIX))
    }

    pub fn as_symbol(&self) -> Option<InternedSymbol> {
        match self {
            Value::Symbol(sym) => Some(*sym),
            _ => None,
        }
    }

    /// Elements of a list or vector
    pub fn as_seq(&self) -> Option<&ImVector<Value>> {
        match self {
            Value::List(list) => Some(&list.items),
            _ => None,
        }
    }

    /// True for a parenthesised list whose first element is `head`
    pub fn is_form(&self, head: InternedSymbol) -> bool {
        match self {
            Value::List(list) if list.kind == ListKind::List => {
                matches!(list.items.front(), Some(Value::Symbol(sym)) if *sym == head)
            }
            _ => false,
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Value::Closure(closure) if closure.is_macro)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Symbol(_) => "symbol",
            Value::Str(_) if self.is_keyword() => "keyword",
            Value::Str(_) => "string",
            Value::List(list) if list.kind == ListKind::Vector => "vector",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Closure(closure) if closure.is_macro => "macro",
            Value::Closure(_) | Value::Builtin(_) => "function",
            Value::Atom(_) => "atom",
        }
    }

    pub fn meta(&self) -> Value {
        match self {
            Value::List(list) => list.meta.clone(),
            Value::Map(map) => map.meta.clone(),
            Value::Closure(closure) => closure.meta.clone(),
            _ => Value::Nil,
        }
    }

    /// Copy of this value carrying `meta`; the original is untouched
    pub fn with_meta(&self, meta: Value) -> Result<Value> {
        match self {
            Value::List(list) => Ok(Value::List(Rc::new(ListValue {
                items: list.items.clone(),
                kind: list.kind,
                meta,
            }))),
            Value::Map(map) => Ok(Value::Map(Rc::new(MapValue {
                entries: map.entries.clone(),
                meta,
            }))),
            Value::Closure(closure) => Ok(Value::Closure(Rc::new(ClosureCell {
                meta,
                ..(**closure).clone()
            }))),
            other => Err(Error::type_error(format!(
                "with-meta: cannot attach metadata to {}",
                other.type_name()
            ))),
        }
    }

    pub fn equals(&self, other: &Value) -> Result<bool> {
        equals(self, other)
    }
}

// ============================================================================
// Maps
// ============================================================================

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from alternating keys and values; later keys overwrite
    /// earlier equal ones.
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        if values.len() % 2 != 0 {
            return Err(Error::type_error(format!(
                "map requires an even number of forms, got {}",
                values.len()
            )));
        }
        let mut map = MapValue::new();
        let mut iter = values.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    fn position(&self, key: &Value) -> Result<Option<usize>> {
        for (i, (k, _)) in self.entries.iter().enumerate() {
            if equals(k, key)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>> {
        Ok(self
            .position(key)?
            .map(|i| self.entries[i].1.clone()))
    }

    pub fn contains(&self, key: &Value) -> Result<bool> {
        Ok(self.position(key)?.is_some())
    }

    /// Insert in place; only used while building a fresh map
    pub fn insert(&mut self, key: Value, value: Value) -> Result<()> {
        match self.position(&key)? {
            Some(i) => {
                self.entries.set(i, (key, value));
            }
            None => self.entries.push_back((key, value)),
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> Result<()> {
        if let Some(i) = self.position(key)? {
            self.entries.remove(i);
        }
        Ok(())
    }
}

// ============================================================================
// Equality
// ============================================================================

/// Structural equality.
///
/// Lists and vectors compare by elements only. Atoms and builtins compare by
/// identity. Two closures cannot be compared and yield a TypeError.
pub fn equals(a: &Value, b: &Value) -> Result<bool> {
    ensure_sufficient_stack(|| equals_inner(a, b))
}

fn equals_inner(a: &Value, b: &Value) -> Result<bool> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Symbol(x), Value::Symbol(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::List(x), Value::List(y)) => {
            if x.items.len() != y.items.len() {
                return Ok(false);
            }
            for (l, r) in x.items.iter().zip(y.items.iter()) {
                if !equals(l, r)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (key, value) in x.iter() {
                match y.get(key)? {
                    Some(other) if equals(value, &other)? => {}
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        (Value::Atom(x), Value::Atom(y)) => Ok(Rc::ptr_eq(x, y)),
        (Value::Builtin(x), Value::Builtin(y)) => Ok(Rc::ptr_eq(x, y)),
        (Value::Closure(_), Value::Closure(_)) => Err(Error::type_error(
            "=: function equality is not supported",
        )),
        _ => Ok(false),
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c => result.push(c),
        }
    }
    result
}

/// Renders a value either readably (strings quoted and escaped) or for display
pub struct Printer<'a> {
    value: &'a Value,
    readably: bool,
}

impl<'a> Printer<'a> {
    pub fn new(value: &'a Value, readably: bool) -> Self {
        Printer { value, readably }
    }

    fn nested<'b>(&self, value: &'b Value) -> Printer<'b> {
        Printer::new(value, self.readably)
    }
}

impl fmt::Display for Printer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| self.render(f))
    }
}

impl Printer<'_> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Symbol(sym) => write!(f, "{sym}"),
            Value::Str(s) => match s.strip_prefix(KEYWORD_PREFIX) {
                Some(name) => write!(f, ":{name}"),
                None if self.readably => write!(f, "\"{}\"", escape_string(s)),
                None => write!(f, "{s}"),
            },
            Value::List(list) => {
                let (open, close) = match list.kind {
                    ListKind::List => ('(', ')'),
                    ListKind::Vector => ('[', ']'),
                };
                write!(f, "{open}")?;
                for (i, item) in list.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", self.nested(item))?;
                }
                write!(f, "{close}")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{} {}", self.nested(k), self.nested(v))?;
                }
                write!(f, "}}")
            }
            Value::Closure(closure) if closure.is_macro => write!(f, "#<macro>"),
            Value::Closure(_) | Value::Builtin(_) => write!(f, "#<function>"),
            Value::Atom(cell) => {
                write!(f, "(atom {})", Printer::new(&cell.borrow(), self.readably))
            }
        }
    }
}

/// Render `value` as text; `readably` quotes and escapes strings
pub fn pr_str(value: &Value, readably: bool) -> String {
    Printer::new(value, readably).to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Printer::new(self, true))
    }
}
