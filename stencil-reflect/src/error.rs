use miette::Diagnostic;
use serde::Serialize;
use stencil_ir::Loc;
use thiserror::Error;

/// Result type for reflection (boxed to keep the Ok path small).
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// The closed classification of constructs the reflector cannot model.
///
/// Every category carries a fixed description; the set is total over the raw
/// AST, so nothing downstream ever encounters an unmodeled shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeCategory {
    FunctionType,
    WildcardType,
    ObjectType,
    ClassType,
    HigherRankField,
    PackagedModule,
    SyntaxExtension,
    ConstrainedAlias,
    ExtensibleVariant,
    OpenVariant,
}

impl ShapeCategory {
    pub fn description(&self) -> &'static str {
        match self {
            ShapeCategory::FunctionType => "function type",
            ShapeCategory::WildcardType => "wildcard/placeholder type",
            ShapeCategory::ObjectType => "structural object type",
            ShapeCategory::ClassType => "class-style type",
            ShapeCategory::HigherRankField => "higher-rank field type",
            ShapeCategory::PackagedModule => "packaged module type",
            ShapeCategory::SyntaxExtension => "embedded syntax extension",
            ShapeCategory::ConstrainedAlias => "constrained alias",
            ShapeCategory::ExtensibleVariant => "open-at-declaration-site sum",
            ShapeCategory::OpenVariant => "non-closed open-sum literal",
        }
    }
}

impl std::fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Reflection errors.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A construct the Shape Reflector cannot model. Always fatal to the
    /// whole batch.
    #[error("unsupported shape at {loc}: {category}")]
    #[diagnostic(
        code(stencil::unsupported_shape),
        help(
            "only records, closed sums, tuples, synonyms, named references, type variables, and closed open-sum literals can be derived"
        )
    )]
    UnsupportedShape { loc: Loc, category: ShapeCategory },
}

impl Error {
    pub fn unsupported(loc: Loc, category: ShapeCategory) -> Box<Self> {
        Box::new(Error::UnsupportedShape { loc, category })
    }

    /// The location the error points at.
    pub fn loc(&self) -> Loc {
        match self {
            Error::UnsupportedShape { loc, .. } => *loc,
        }
    }
}
