//! Generated schema classes

/// Define a typed wrapper for a schema class
///
/// Each property names its IRI constant, value type, and the accessor
/// identifiers to generate. Accessors call straight into the bridge.
///
/// ```ignore
/// reactor_class! {
///     /// A person
///     pub struct Person: PERSON_CLASS;
///
///     property NAME = NAME_IRI => String {
///         get: name,
///         get_all: all_names,
///         add: add_name,
///         set: set_name,
///         remove: remove_name,
///         remove_all: remove_all_names,
///         inverse: with_name,
///     }
/// }
/// ```
#[macro_export]
macro_rules! reactor_class {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $class:expr;
        $(
            $(#[$pmeta:meta])*
            property $pconst:ident = $piri:expr => $pty:ty {
                get: $get:ident,
                get_all: $get_all:ident,
                add: $add:ident,
                set: $set:ident,
                remove: $remove:ident,
                remove_all: $remove_all:ident,
                inverse: $inverse:ident $(,)?
            }
        )*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            base: $crate::ReactorBase,
        }

        impl $name {
            $(
                $(#[$pmeta])*
                pub const $pconst: $crate::triplemap_core::Iri = $piri;

                pub fn $get(&self) -> $crate::triplemap_core::Result<Option<$pty>> {
                    self.base.get(&Self::$pconst)
                }

                pub fn $get_all(&self) -> $crate::ReactorResult<$pty> {
                    self.base.get_all(&Self::$pconst)
                }

                pub fn $add(&self, value: &$pty) -> $crate::triplemap_core::Result<bool> {
                    self.base.add(&Self::$pconst, value)
                }

                pub fn $set(&self, value: &$pty) -> $crate::triplemap_core::Result<()> {
                    self.base.set(&Self::$pconst, value)
                }

                pub fn $remove(&self, value: &$pty) -> $crate::triplemap_core::Result<bool> {
                    self.base.remove(&Self::$pconst, value)
                }

                pub fn $remove_all(&self) -> $crate::triplemap_core::Result<bool> {
                    self.base.remove_all(&Self::$pconst)
                }

                pub fn $inverse(
                    graph: &$crate::triplemap_core::GraphHandle,
                    value: &$pty,
                ) -> $crate::ReactorResult<$name> {
                    $crate::bridge::get_all_inverse(graph, &Self::$pconst, value)
                }
            )*
        }

        impl $crate::ReactorClass for $name {
            const RDFS_CLASS: $crate::triplemap_core::Iri = $class;

            fn from_base(base: $crate::ReactorBase) -> Self {
                Self { base }
            }

            fn base(&self) -> &$crate::ReactorBase {
                &self.base
            }
        }

        impl $crate::ToNode for $name {
            fn to_node(&self) -> $crate::triplemap_core::Node {
                $crate::ToNode::to_node(&self.base)
            }
        }

        impl $crate::FromNode for $name {
            fn from_node(
                graph: &$crate::triplemap_core::GraphHandle,
                node: &$crate::triplemap_core::Node,
            ) -> $crate::triplemap_core::Result<Self> {
                let resource = node.as_resource().ok_or_else(|| {
                    $crate::triplemap_core::GraphError::ResourceExpected(node.to_string())
                })?;
                Ok(<Self as $crate::ReactorClass>::wrap(graph, resource))
            }
        }

        impl PartialEq<$crate::triplemap_core::Resource> for $name {
            fn eq(&self, other: &$crate::triplemap_core::Resource) -> bool {
                self.base == *other
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.base, f)
            }
        }
    };
}
