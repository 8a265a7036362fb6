//! dblity_ast
//!
//! Resolved declaration model consumed by the `dblity` closedness checker.
//!
//! The host front-end (an IDE plugin, a compiler pass, a script) parses the
//! analysed program, resolves names to declarations and hands over a
//! [`CompilationUnit`]. Units can be built in memory or loaded from JSON.
//!
//! # Example
//!
//! ```
//! use dblity_ast::CompilationUnit;
//!
//! let unit = CompilationUnit::from_json(r#"{"name": "Empty.java"}"#).unwrap();
//! assert!(unit.types.is_empty());
//! ```

pub mod ast;
pub mod error;
pub mod span;
pub mod validate;

// Re-exports
pub use ast::*;
pub use error::{AstError, AstResult};
pub use span::Span;

// Test utilities (available in tests or with "testing" feature)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

impl CompilationUnit {
    /// Deserialize a compilation unit from JSON and validate it.
    pub fn from_json(json: &str) -> AstResult<CompilationUnit> {
        let unit: CompilationUnit = serde_json::from_str(json)?;
        unit.validate()?;
        Ok(unit)
    }

    /// Serialize this unit to pretty-printed JSON.
    pub fn to_json(&self) -> AstResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            CompilationUnit::from_json("{\"types\": 3}"),
            Err(AstError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_unit() {
        let mut b = UnitBuilder::new("Main.java");
        let unit_ty = b.singleton("Unit", &[], &["Term"], at(4));
        let main = b.class("Main", at(1));
        let m = b.method(Some(main), MethodSpec::static_method("make").returns("Term"), at(5));
        b.body(m.id, vec![ret(Some(singleton(unit_ty, at(6))), at(6))]);
        let unit = b.finish();

        let json = unit.to_json().unwrap();
        let back = CompilationUnit::from_json(&json).unwrap();
        assert_eq!(back, unit);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
