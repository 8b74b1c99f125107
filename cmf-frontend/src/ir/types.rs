//! IR Type System
//!
//! Types are interned in a [`TypeTable`] owned by the module. A [`TypeId`]
//! is a cheap copyable handle; two handles are equal exactly when the types
//! they denote are structurally equal.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Handle to an interned type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const INT1: TypeId = TypeId(1);
    pub const INT32: TypeId = TypeId(2);
    pub const FLOAT32: TypeId = TypeId(3);
}

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    Void,

    /// Boolean-width integer (comparison results)
    Int1,
    Int32,
    Float32,

    Pointer(TypeId),

    /// Array type [len x element]
    Array { len: u32, element: TypeId },

    Function {
        return_type: TypeId,
        params: Vec<TypeId>,
    },
}

/// Interner for [`IrType`]s
#[derive(Debug, Clone, Serialize)]
pub struct TypeTable {
    types: Vec<IrType>,
    #[serde(skip)]
    lookup: HashMap<IrType, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            lookup: HashMap::new(),
        };
        // The primitive types live at fixed ids (see the TypeId constants)
        for ty in [IrType::Void, IrType::Int1, IrType::Int32, IrType::Float32] {
            table.intern(ty);
        }
        table
    }

    /// Return the handle for `ty`, adding it to the table if needed
    pub fn intern(&mut self, ty: IrType) -> TypeId {
        if let Some(&id) = self.lookup.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.lookup.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &IrType {
        &self.types[id.0 as usize]
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.intern(IrType::Pointer(pointee))
    }

    pub fn array_of(&mut self, element: TypeId, len: u32) -> TypeId {
        self.intern(IrType::Array { len, element })
    }

    pub fn function(&mut self, return_type: TypeId, params: Vec<TypeId>) -> TypeId {
        self.intern(IrType::Function { return_type, params })
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        id == TypeId::VOID
    }

    /// Check if this is an integer type (i1 or i32)
    pub fn is_integer(&self, id: TypeId) -> bool {
        id == TypeId::INT1 || id == TypeId::INT32
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        id == TypeId::FLOAT32
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(id), IrType::Pointer(_))
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.get(id), IrType::Array { .. })
    }

    /// Pointee of a pointer type
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            IrType::Pointer(pointee) => Some(*pointee),
            _ => None,
        }
    }

    /// Element type of an array type
    pub fn element(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            IrType::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Return and parameter types of a function type
    pub fn signature(&self, id: TypeId) -> Option<(TypeId, &[TypeId])> {
        match self.get(id) {
            IrType::Function { return_type, params } => Some((*return_type, params.as_slice())),
            _ => None,
        }
    }

    /// Render a type for printing, e.g. `[10 x i32]*`
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { table: self, id }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    id: TypeId,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table;
        match table.get(self.id) {
            IrType::Void => write!(f, "void"),
            IrType::Int1 => write!(f, "i1"),
            IrType::Int32 => write!(f, "i32"),
            IrType::Float32 => write!(f, "float"),
            IrType::Pointer(pointee) => write!(f, "{}*", table.display(*pointee)),
            IrType::Array { len, element } => write!(f, "[{len} x {}]", table.display(*element)),
            IrType::Function { return_type, params } => {
                write!(f, "{} (", table.display(*return_type))?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", table.display(*param))?;
                }
                write!(f, ")")
            }
        }
    }
}
