use std::collections::BTreeMap;
use std::fmt;

use super::{Type, Value};

/// A name declared at program scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalSymbol {
    pub is_constant: bool,
    pub symbol_type: Type,
    pub value: Value,
}

impl GlobalSymbol {
    pub fn constant(symbol_type: Type, value: Value) -> Self {
        Self {
            is_constant: true,
            symbol_type,
            value,
        }
    }

    pub fn variable(symbol_type: Type) -> Self {
        Self {
            is_constant: false,
            symbol_type,
            value: Value::default_for(symbol_type),
        }
    }
}

impl fmt::Display for GlobalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IsConstant={} Type={} Value={}",
            self.is_constant, self.symbol_type, self.value
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Const,
    Var,
    Param,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Const => "CONST",
            SymbolKind::Var => "VAR",
            SymbolKind::Param => "PARAM",
        })
    }
}

/// A name declared inside a procedure. `position` is the 0-based argument
/// slot for parameters and unused otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalSymbol {
    pub symbol_type: Type,
    pub kind: SymbolKind,
    pub position: usize,
    pub value: Value,
}

impl LocalSymbol {
    pub fn constant(symbol_type: Type, value: Value) -> Self {
        Self {
            symbol_type,
            kind: SymbolKind::Const,
            position: 0,
            value,
        }
    }

    pub fn variable(symbol_type: Type) -> Self {
        Self {
            symbol_type,
            kind: SymbolKind::Var,
            position: 0,
            value: Value::default_for(symbol_type),
        }
    }

    pub fn param(symbol_type: Type, position: usize) -> Self {
        Self {
            symbol_type,
            kind: SymbolKind::Param,
            position,
            value: Value::default_for(symbol_type),
        }
    }
}

impl fmt::Display for LocalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Type={} Kind={} Position={} Value={}",
            self.symbol_type, self.kind, self.position, self.value
        )
    }
}

/// Program-scope symbols, kept name-ordered so table dumps and emitted
/// field declarations are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalSymbolTable {
    symbols: BTreeMap<String, GlobalSymbol>,
}

impl GlobalSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, symbol: GlobalSymbol) {
        self.symbols.insert(name.into(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&GlobalSymbol> {
        self.symbols.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GlobalSymbol)> {
        self.symbols.iter()
    }
}

impl fmt::Display for GlobalSymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Global Symbol Table")?;
        writeln!(f, "====")?;
        for (name, symbol) in &self.symbols {
            writeln!(f, "{name}: {symbol}")?;
        }
        writeln!(f, "====")
    }
}

/// Symbols of one procedure, name-ordered like the global table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalSymbolTable {
    symbols: BTreeMap<String, LocalSymbol>,
}

impl LocalSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, symbol: LocalSymbol) {
        self.symbols.insert(name.into(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&LocalSymbol> {
        self.symbols.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocalSymbol)> {
        self.symbols.iter()
    }
}

impl fmt::Display for LocalSymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, symbol) in &self.symbols {
            writeln!(f, "    {name}: {symbol}")?;
        }
        Ok(())
    }
}

/// One callable procedure: a library primitive or a user declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalProcedure {
    pub is_predefined: bool,
    pub return_type: Type,
    pub locals: LocalSymbolTable,
}

impl GlobalProcedure {
    pub fn new(is_predefined: bool, return_type: Type, locals: LocalSymbolTable) -> Self {
        Self {
            is_predefined,
            return_type,
            locals,
        }
    }

    /// Parameters in declaration order (by argument slot).
    pub fn parameters(&self) -> Vec<(&str, &LocalSymbol)> {
        let mut params: Vec<(&str, &LocalSymbol)> = self
            .locals
            .iter()
            .filter(|(_, symbol)| symbol.kind == SymbolKind::Param)
            .map(|(name, symbol)| (name.as_str(), symbol))
            .collect();
        params.sort_by_key(|(_, symbol)| symbol.position);
        params
    }
}

impl fmt::Display for GlobalProcedure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "IsPredefined={} ReturnType={}",
            self.is_predefined, self.return_type
        )?;
        write!(f, "{}", self.locals)
    }
}

/// All procedures visible to the program, predefined ones included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalProcedureTable {
    procedures: BTreeMap<String, GlobalProcedure>,
}

impl GlobalProcedureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, procedure: GlobalProcedure) {
        self.procedures.insert(name.into(), procedure);
    }

    pub fn get(&self, name: &str) -> Option<&GlobalProcedure> {
        self.procedures.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GlobalProcedure)> {
        self.procedures.iter()
    }
}

impl fmt::Display for GlobalProcedureTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Global Procedure Table")?;
        writeln!(f, "====")?;
        for (name, procedure) in &self.procedures {
            writeln!(f, "{name}: {procedure}")?;
        }
        writeln!(f, "====")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_keep_declaration_order() {
        let mut locals = LocalSymbolTable::new();
        locals.insert("b", LocalSymbol::param(Type::Integer, 1));
        locals.insert("a", LocalSymbol::param(Type::String, 0));
        locals.insert("tmp", LocalSymbol::variable(Type::Integer));

        let procedure = GlobalProcedure::new(false, Type::Void, locals);
        let params = procedure.parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].0, "a");
        assert_eq!(params[0].1.symbol_type, Type::String);
        assert_eq!(params[1].0, "b");
    }

    #[test]
    fn test_tables_iterate_in_name_order() {
        let mut table = GlobalSymbolTable::new();
        table.insert("zeta", GlobalSymbol::variable(Type::Integer));
        table.insert("alpha", GlobalSymbol::variable(Type::Boolean));

        let names: Vec<&String> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }
}
