//! Record schemas: named, ordered field lists

use super::field::FieldDef;

/// Fixed shape of one record kind
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
    /// External column name to field name, e.g. a spreadsheet header
    pub aliases: &'static [(&'static str, &'static str)],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self {
            name,
            fields,
            aliases: &[],
        }
    }

    pub const fn with_aliases(self, aliases: &'static [(&'static str, &'static str)]) -> Self {
        Self { aliases, ..self }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Position of the field a key refers to, by field name first, then alias
    pub fn resolve(&self, key: &str) -> Option<usize> {
        self.index_of(key).or_else(|| {
            self.aliases
                .iter()
                .find(|(alias, _)| *alias == key)
                .and_then(|(_, target)| self.index_of(target))
        })
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// First field name declared more than once, if any
    pub fn duplicate_field(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .enumerate()
            .find(|(i, f)| self.fields[..*i].iter().any(|prev| prev.name == f.name))
            .map(|(_, f)| f.name)
    }
}
