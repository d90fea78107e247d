use crate::Field;

/// Fields of a struct, in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// all fields, readable or not
    pub fields: &'static [Field],
}

impl StructDef {
    /// Const ctor.
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Looks a field up by name, ignoring ASCII case. The first match wins.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}
