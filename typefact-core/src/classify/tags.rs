use std::fmt;

use serde::{Serialize, Serializer};
use typefact_graphs::TypeKind;

use crate::hierarchy::HierarchyRelation;

/// One observation about a type change. Serializes to its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeTag {
    /// Both sides have the same kind.
    Update(TypeKind),
    Replace(TypeKind, TypeKind),
    Hierarchy(HierarchyRelation),

    PrimitiveWidening,
    PrimitiveNarrowing,
    Boxing,
    Unboxing,

    IntroduceTypeVariable,
    RemoveTypeVariable,
    ChangeTypeVariable,
    IntroduceEnum,
    Composition,
    NoComposition,

    ConvertToArray,
    ConvertFromArray,

    AddTypeParameters,
    RemoveTypeParameters,
    ReorderTypeParameters,
    UpdateTypeParameters,
    UpdateContainer,
    WrapWithParameterizedType,
    UnwrapParameterizedType,

    AddUpperBound,
    AddLowerBound,
    ConvertToWildCard,
    ConvertFromWildCard,
    UpperToLowerBound,
    LowerToUpperBound,
    RemoveUpperBound,
    RemoveLowerBound,
    IntroduceUpperBound,
    IntroduceLowerBound,
}

impl ChangeTag {
    /// `Update K` for equal kinds, `Replace K1 with K2` otherwise.
    pub fn for_kinds(from: TypeKind, to: TypeKind) -> Self {
        if from == to {
            Self::Update(from)
        } else {
            Self::Replace(from, to)
        }
    }

    pub fn is_kind(self) -> bool {
        matches!(self, Self::Update(_) | Self::Replace(..))
    }

    pub fn relation(self) -> Option<HierarchyRelation> {
        match self {
            Self::Hierarchy(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Update(kind) => return write!(f, "Update {kind}"),
            Self::Replace(from, to) => return write!(f, "Replace {from} with {to}"),
            Self::Hierarchy(relation) => return fmt::Display::fmt(relation, f),
            Self::PrimitiveWidening => "Primitive Widening",
            Self::PrimitiveNarrowing => "Primitive Narrowing",
            Self::Boxing => "Box",
            Self::Unboxing => "Unbox",
            Self::IntroduceTypeVariable => "Introduce Type Variable",
            Self::RemoveTypeVariable => "Remove Type Variable",
            Self::ChangeTypeVariable => "Change Type Variable",
            Self::IntroduceEnum => "Introduce Enum",
            Self::Composition => "Composition",
            Self::NoComposition => "No Composition",
            Self::ConvertToArray => "Convert To Array",
            Self::ConvertFromArray => "Convert From Array",
            Self::AddTypeParameters => "Add Type Parameters",
            Self::RemoveTypeParameters => "Remove Type Parameters",
            Self::ReorderTypeParameters => "Reorder Type Parameters",
            Self::UpdateTypeParameters => "Update Type Parameters",
            Self::UpdateContainer => "Update Container",
            Self::WrapWithParameterizedType => "Wrap With Parameterized Type",
            Self::UnwrapParameterizedType => "UnWrap Parameterized Type",
            Self::AddUpperBound => "Add upper bound",
            Self::AddLowerBound => "Add lower bound",
            Self::ConvertToWildCard => "Convert to WildCard",
            Self::ConvertFromWildCard => "Convert from WildCard",
            Self::UpperToLowerBound => "Change upper bound to lower bound",
            Self::LowerToUpperBound => "Change lower bound to upper bound",
            Self::RemoveUpperBound => "Remove upper bound",
            Self::RemoveLowerBound => "Remove lower bound",
            Self::IntroduceUpperBound => "Introduce upper bound",
            Self::IntroduceLowerBound => "Introduce lower bound",
        };
        f.write_str(s)
    }
}

impl Serialize for ChangeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags() {
        assert_eq!(
            ChangeTag::for_kinds(TypeKind::Simple, TypeKind::Simple).to_string(),
            "Update Simple"
        );
        assert_eq!(
            ChangeTag::for_kinds(TypeKind::Array, TypeKind::WildCard).to_string(),
            "Replace Array with WildCard"
        );
    }

    #[test]
    fn serializes_as_display_string() {
        let tags = vec![
            ChangeTag::Hierarchy(HierarchyRelation::RSuperT),
            ChangeTag::UnwrapParameterizedType,
            ChangeTag::Boxing,
        ];
        insta::assert_json_snapshot!(tags, @r#"
        [
          "R_SUPER_T",
          "UnWrap Parameterized Type",
          "Box"
        ]
        "#);
    }
}
